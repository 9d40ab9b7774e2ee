//! Animation blend controller
//!
//! Per-entity state machine with two states: uninitialized (no mixer yet)
//! and ready. The transition happens the first frame the companion
//! skinned-mesh sibling reports a loaded mesh; until then every load
//! request queues and at most one play request is remembered.
//!
//! All load completions are polled from the frame tick. Nothing runs from
//! a load's own completion, so a load resolving after the owning entity
//! was destroyed lands in state nobody reads.

use std::collections::VecDeque;
use std::rc::Rc;

use ember_asset::{AssetServer, ClipData, LoadHandle, LoadPoll};
use ember_core::{EntityId, Result};
use ember_ecs::{Behaviour, Component, DestroyContext, InitContext, TickContext};

use crate::mesh::SkinnedMeshComponent;
use crate::mixer::{Mixer, CROSS_FADE_SECS};

/// Cross-fading animation playback for one entity.
pub struct AnimationComponent {
    assets: Rc<dyn AssetServer>,
    entity: Option<EntityId>,
    mixer: Option<Mixer>,
    /// Name of the action most recently started; at most one action is
    /// current (not fading out).
    current: Option<String>,
    /// Loads requested before the mixer existed, in request order.
    pending_loads: VecDeque<(String, String)>,
    /// The single deferred-queue load in flight; the queue drains one load
    /// at a time to bound asset-loading pressure.
    draining: Option<(String, LoadHandle<Vec<ClipData>>)>,
    /// Loads issued while ready. No ordering guarantee between them.
    in_flight: Vec<(String, LoadHandle<Vec<ClipData>>)>,
    /// The single deferred play-by-name request; last write wins.
    pending_play: Option<String>,
    disposed: bool,
}

impl AnimationComponent {
    pub fn new(assets: Rc<dyn AssetServer>) -> Self {
        Self {
            assets,
            entity: None,
            mixer: None,
            current: None,
            pending_loads: VecDeque::new(),
            draining: None,
            in_flight: Vec::new(),
            pending_play: None,
            disposed: false,
        }
    }

    /// True once the companion mesh has loaded and the mixer exists.
    pub fn is_ready(&self) -> bool {
        self.mixer.is_some()
    }

    /// The name of the current action, if any.
    pub fn current_animation(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn mixer(&self) -> Option<&Mixer> {
        self.mixer.as_ref()
    }

    /// Request that the clips under `source` be bound as `name`.
    ///
    /// Fire-and-forget: before the mixer exists the request queues; once
    /// ready it is fetched through the asset server and bound when the
    /// load resolves. A source yielding zero clips is reported and
    /// abandoned without affecting other loads. Loading an already-bound
    /// name rebinds it: last write wins.
    pub fn load_animation(&mut self, name: impl Into<String>, source: impl Into<String>) {
        if self.disposed {
            return;
        }
        let name = name.into();
        let source = source.into();
        if self.mixer.is_none() {
            self.pending_loads.push_back((name, source));
            return;
        }
        let handle = self.assets.load_clips(&source);
        self.in_flight.push((name, handle));
    }

    /// Play the action bound under `name`, cross-fading from the current
    /// action over [`CROSS_FADE_SECS`].
    ///
    /// An unbound name becomes the pending play request (overwriting any
    /// previous one) and plays automatically once its clip loads.
    /// Re-triggering the already-current action is a no-op.
    pub fn play_animation(&mut self, name: &str) {
        match self.mixer.as_mut() {
            Some(mixer) if mixer.contains(name) => {
                if self.current.as_deref() == Some(name) {
                    return;
                }
                mixer.cross_fade(self.current.as_deref(), name, CROSS_FADE_SECS);
                self.current = Some(name.to_string());
            }
            _ => {
                self.pending_play = Some(name.to_string());
            }
        }
    }

    /// Create the mixer once the mesh sibling reports a loaded mesh.
    fn try_init_mixer(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        let Some(entity) = self.entity else {
            return Ok(());
        };
        // A missing mesh sibling is tolerated: the controller simply never
        // becomes ready.
        let Some(sibling) = ctx.registry.get::<SkinnedMeshComponent>(entity)? else {
            return Ok(());
        };
        let loaded = sibling
            .borrow::<SkinnedMeshComponent>()
            .map_or(false, |mesh| mesh.mesh().is_some());
        if loaded {
            self.mixer = Some(Mixer::new());
        }
        Ok(())
    }

    /// Drain the deferred-load queue in FIFO order, one load at a time.
    fn pump_queue(&mut self) {
        loop {
            if let Some((name, handle)) = self.draining.take() {
                match handle.poll() {
                    LoadPoll::Pending => {
                        self.draining = Some((name, handle));
                        return;
                    }
                    LoadPoll::Ready(clips) => self.bind_loaded(&name, clips),
                    LoadPoll::Failed(message) => {
                        log::error!("Animation load '{}' failed: {}", name, message);
                    }
                }
            }
            match self.pending_loads.pop_front() {
                Some((name, source)) => {
                    let handle = self.assets.load_clips(&source);
                    self.draining = Some((name, handle));
                }
                None => return,
            }
        }
    }

    /// Poll loads issued after the controller became ready.
    fn poll_in_flight(&mut self) {
        let in_flight = std::mem::take(&mut self.in_flight);
        for (name, handle) in in_flight {
            match handle.poll() {
                LoadPoll::Pending => self.in_flight.push((name, handle)),
                LoadPoll::Ready(clips) => self.bind_loaded(&name, clips),
                LoadPoll::Failed(message) => {
                    log::error!("Animation load '{}' failed: {}", name, message);
                }
            }
        }
    }

    /// Bind the first clip of a resolved load and satisfy a matching
    /// pending play request.
    fn bind_loaded(&mut self, name: &str, clips: Vec<ClipData>) {
        let Some(clip) = clips.into_iter().next() else {
            log::error!("No animations in source for '{}'", name);
            return;
        };
        let Some(mixer) = self.mixer.as_mut() else {
            return;
        };
        mixer.bind(name, clip);

        if self.pending_play.as_deref() == Some(name) {
            self.pending_play = None;
            self.play_animation(name);
        }
    }
}

impl Component for AnimationComponent {
    fn init(&mut self, ctx: &mut InitContext<'_>) -> Result<()> {
        self.entity = Some(ctx.entity);
        Ok(())
    }

    fn on_destroy(&mut self, _ctx: &mut DestroyContext<'_>) -> Result<()> {
        self.disposed = true;
        self.pending_loads.clear();
        self.draining = None;
        self.in_flight.clear();
        self.pending_play = None;
        Ok(())
    }

    fn as_behaviour(&mut self) -> Option<&mut dyn Behaviour> {
        Some(self)
    }
}

impl Behaviour for AnimationComponent {
    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        if self.mixer.is_none() {
            self.try_init_mixer(ctx)?;
            if self.mixer.is_none() {
                return Ok(());
            }
        }

        self.pump_queue();
        self.poll_in_flight();

        if let Some(mixer) = self.mixer.as_mut() {
            mixer.advance(ctx.dt);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_asset::{LoadCompleter, MeshData};
    use ember_ecs::{ComponentHandle, EntityRegistry, RuntimeContext, TransformComponent};
    use std::cell::RefCell;

    /// Asset server whose loads stay pending until the test resolves them.
    struct StubAssets {
        clips: RefCell<Vec<(String, LoadCompleter<Vec<ClipData>>)>>,
        meshes: RefCell<Vec<LoadCompleter<MeshData>>>,
    }

    impl StubAssets {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                clips: RefCell::new(Vec::new()),
                meshes: RefCell::new(Vec::new()),
            })
        }

        fn clip_requests(&self) -> Vec<String> {
            self.clips.borrow().iter().map(|(s, _)| s.clone()).collect()
        }

        /// Resolve the oldest clip request with one clip per given name.
        fn resolve_clips(&self, names: &[&str]) {
            let (_, completer) = self.clips.borrow_mut().remove(0);
            completer.complete(
                names
                    .iter()
                    .map(|name| ClipData {
                        name: name.to_string(),
                        duration: 1.0,
                        looping: true,
                    })
                    .collect(),
            );
        }

        fn resolve_mesh(&self) {
            let completer = self.meshes.borrow_mut().remove(0);
            completer.complete(MeshData {
                name: "player".to_string(),
                skinned: true,
            });
        }
    }

    impl AssetServer for StubAssets {
        fn load_clips(&self, source: &str) -> LoadHandle<Vec<ClipData>> {
            let (handle, completer) = LoadHandle::pending();
            self.clips.borrow_mut().push((source.to_string(), completer));
            handle
        }

        fn load_mesh(&self, _source: &str) -> LoadHandle<MeshData> {
            let (handle, completer) = LoadHandle::pending();
            self.meshes.borrow_mut().push(completer);
            handle
        }
    }

    struct Fixture {
        registry: EntityRegistry,
        runtime: RuntimeContext,
        assets: Rc<StubAssets>,
        entity: EntityId,
        anim: ComponentHandle,
    }

    impl Fixture {
        /// Entity with [Transform, SkinnedMesh, AnimationController].
        fn new() -> Self {
            let mut registry = EntityRegistry::new();
            let runtime = RuntimeContext::new();
            let assets = StubAssets::new();

            let anim = ComponentHandle::new(AnimationComponent::new(assets.clone()));
            let entity = registry
                .create_entity(
                    vec![
                        ComponentHandle::new(TransformComponent::identity()),
                        ComponentHandle::new(SkinnedMeshComponent::new(
                            "player.mesh.toml",
                            assets.clone(),
                        )),
                        anim.clone(),
                    ],
                    &runtime,
                )
                .unwrap();

            Self {
                registry,
                runtime,
                assets,
                entity,
                anim,
            }
        }

        fn tick(&mut self, n: usize) {
            for _ in 0..n {
                self.runtime
                    .scheduler
                    .run_update(&mut self.registry, &self.runtime, 0.016);
                self.runtime
                    .scheduler
                    .run_post_update(&mut self.registry, &self.runtime, 0.016);
            }
        }

        fn anim(&self) -> std::cell::Ref<'_, AnimationComponent> {
            self.anim.borrow::<AnimationComponent>().unwrap()
        }

        fn anim_mut(&self) -> std::cell::RefMut<'_, AnimationComponent> {
            self.anim.borrow_mut::<AnimationComponent>().unwrap()
        }
    }

    #[test]
    fn stays_uninitialized_until_the_mesh_loads() {
        let mut fx = Fixture::new();
        fx.tick(3);
        assert!(!fx.anim().is_ready());

        fx.assets.resolve_mesh();
        fx.tick(2);
        assert!(fx.anim().is_ready());
    }

    #[test]
    fn load_before_ready_binds_without_reissuing() {
        let mut fx = Fixture::new();
        fx.anim_mut().load_animation("Walk", "walk.clips.toml");
        fx.tick(1);
        // Nothing requested while uninitialized.
        assert!(fx.assets.clip_requests().is_empty());

        fx.assets.resolve_mesh();
        fx.tick(2);
        assert_eq!(fx.assets.clip_requests(), ["walk.clips.toml"]);

        fx.assets.resolve_clips(&["Walk"]);
        fx.tick(1);
        assert!(fx.anim().mixer().unwrap().contains("Walk"));
    }

    #[test]
    fn deferred_queue_drains_sequentially_in_fifo_order() {
        let mut fx = Fixture::new();
        fx.anim_mut().load_animation("Walk", "walk.clips.toml");
        fx.anim_mut().load_animation("Run", "run.clips.toml");
        fx.assets.resolve_mesh();
        fx.tick(2);

        // Only the first queued load is in flight.
        assert_eq!(fx.assets.clip_requests(), ["walk.clips.toml"]);

        fx.assets.resolve_clips(&["Walk"]);
        fx.tick(1);
        assert_eq!(fx.assets.clip_requests(), ["run.clips.toml"]);

        fx.assets.resolve_clips(&["Run"]);
        fx.tick(1);
        let anim = fx.anim();
        let mixer = anim.mixer().unwrap();
        assert!(mixer.contains("Walk") && mixer.contains("Run"));
    }

    #[test]
    fn pending_play_fires_once_the_clip_binds() {
        let mut fx = Fixture::new();
        fx.anim_mut().load_animation("Idle", "idle.clips.toml");
        fx.anim_mut().play_animation("Idle");
        assert_eq!(fx.anim().current_animation(), None);

        fx.assets.resolve_mesh();
        fx.tick(2);
        fx.assets.resolve_clips(&["Idle"]);
        fx.tick(1);

        assert_eq!(fx.anim().current_animation(), Some("Idle"));
        assert!(fx.anim().mixer().unwrap().action("Idle").unwrap().is_playing());
    }

    #[test]
    fn pending_play_is_last_write_wins() {
        let mut fx = Fixture::new();
        fx.anim_mut().load_animation("Walk", "walk.clips.toml");
        fx.anim_mut().load_animation("Run", "run.clips.toml");
        fx.anim_mut().play_animation("Walk");
        fx.anim_mut().play_animation("Run");

        fx.assets.resolve_mesh();
        fx.tick(2);
        fx.assets.resolve_clips(&["Walk"]);
        fx.tick(1);
        // The overwritten "Walk" request must not fire.
        assert_eq!(fx.anim().current_animation(), None);

        fx.assets.resolve_clips(&["Run"]);
        fx.tick(1);
        assert_eq!(fx.anim().current_animation(), Some("Run"));
    }

    #[test]
    fn replaying_the_current_action_is_a_noop() {
        let mut fx = Fixture::new();
        fx.anim_mut().load_animation("Walk", "walk.clips.toml");
        fx.assets.resolve_mesh();
        fx.tick(2);
        fx.assets.resolve_clips(&["Walk"]);
        fx.tick(1);

        fx.anim_mut().play_animation("Walk");
        fx.tick(5);
        let elapsed = fx.anim().mixer().unwrap().action("Walk").unwrap().time();
        assert!(elapsed > 0.0);

        // Re-triggering must not restart or re-fade the action.
        fx.anim_mut().play_animation("Walk");
        let after = fx.anim().mixer().unwrap().action("Walk").unwrap().time();
        assert_eq!(after, elapsed);
    }

    #[test]
    fn play_cross_fades_from_the_current_action() {
        let mut fx = Fixture::new();
        fx.anim_mut().load_animation("Idle", "idle.clips.toml");
        fx.anim_mut().load_animation("Walk", "walk.clips.toml");
        fx.assets.resolve_mesh();
        fx.tick(2);
        fx.assets.resolve_clips(&["Idle"]);
        fx.tick(1);
        fx.assets.resolve_clips(&["Walk"]);
        fx.tick(1);

        fx.anim_mut().play_animation("Idle");
        fx.tick(20);
        assert_eq!(fx.anim().mixer().unwrap().action("Idle").unwrap().weight(), 1.0);

        fx.anim_mut().play_animation("Walk");
        // Current switches immediately, before the fade completes.
        assert_eq!(fx.anim().current_animation(), Some("Walk"));

        fx.tick(2);
        {
            let anim = fx.anim();
            let mixer = anim.mixer().unwrap();
            assert!(mixer.action("Idle").unwrap().weight() < 1.0);
            assert!(mixer.action("Walk").unwrap().weight() > 0.0);
        }

        fx.tick(20);
        let anim = fx.anim();
        let mixer = anim.mixer().unwrap();
        assert!(!mixer.action("Idle").unwrap().is_playing());
        assert_eq!(mixer.action("Walk").unwrap().weight(), 1.0);
    }

    #[test]
    fn empty_source_is_abandoned_without_binding() {
        let mut fx = Fixture::new();
        fx.anim_mut().load_animation("Ghost", "empty.clips.toml");
        fx.anim_mut().load_animation("Walk", "walk.clips.toml");
        fx.assets.resolve_mesh();
        fx.tick(2);

        fx.assets.resolve_clips(&[]);
        fx.tick(1);
        fx.assets.resolve_clips(&["Walk"]);
        fx.tick(1);

        let anim = fx.anim();
        let mixer = anim.mixer().unwrap();
        assert!(!mixer.contains("Ghost"));
        assert!(mixer.contains("Walk"));
    }

    #[test]
    fn play_before_any_tick_eventually_plays() {
        // Load and play issued before the first frame ever runs.
        let mut fx = Fixture::new();
        fx.anim_mut().load_animation("Idle", "idle.clips.toml");
        fx.anim_mut().play_animation("Idle");

        fx.assets.resolve_mesh();
        fx.tick(2);
        fx.assets.resolve_clips(&["Idle"]);
        fx.tick(1);
        assert_eq!(fx.anim().current_animation(), Some("Idle"));
    }

    #[test]
    fn unresolvable_play_request_is_inert() {
        let mut fx = Fixture::new();
        fx.anim_mut().play_animation("Never");
        fx.assets.resolve_mesh();
        fx.tick(5);
        assert_eq!(fx.anim().current_animation(), None);
    }

    #[test]
    fn completion_after_destroy_is_discarded() {
        let mut fx = Fixture::new();
        fx.anim_mut().load_animation("Walk", "walk.clips.toml");
        fx.assets.resolve_mesh();
        fx.tick(2);
        assert_eq!(fx.assets.clip_requests(), ["walk.clips.toml"]);

        fx.registry.destroy_entity(fx.entity, &fx.runtime);
        // The load resolves after the entity is gone; must not panic.
        fx.assets.resolve_clips(&["Walk"]);
        fx.tick(1);
        assert!(!fx.anim().is_ready() || fx.anim().current_animation().is_none());
    }
}
