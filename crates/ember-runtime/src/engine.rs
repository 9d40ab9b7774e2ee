//! Frame loop

use ember_core::Result;
use ember_ecs::{EntityRegistry, RuntimeContext};

use crate::clock::GameClock;
use crate::scene::{Scene, SceneContext};

/// Owns the registry, the runtime services, and the active scene, and
/// drives the fixed per-frame phase order:
///
/// 1. fixed simulation steps (scene `fixed_update`, 0..n per frame)
/// 2. component `update`
/// 3. component `post_update`
/// 4. scene `update`, then scene `late_update`
/// 5. component `pre_render`
pub struct Engine {
    registry: EntityRegistry,
    runtime: RuntimeContext,
    clock: GameClock,
    scene: Option<Box<dyn Scene>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            registry: EntityRegistry::new(),
            runtime: RuntimeContext::new(),
            clock: GameClock::new(),
            scene: None,
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixed_timestep(hz: f64) -> Self {
        Self {
            clock: GameClock::with_fixed_timestep(hz),
            ..Self::default()
        }
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn runtime(&self) -> &RuntimeContext {
        &self.runtime
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn scene_name(&self) -> Option<&str> {
        self.scene.as_deref().map(Scene::name)
    }

    /// Make `scene` the active scene.
    ///
    /// The outgoing scene's `on_exit` runs first; an error there is logged
    /// and does not stop the switch. Every entity is then destroyed, the
    /// shared scene data slot is cleared, and the new scene's `on_enter`
    /// runs. An `on_enter` error leaves the engine with no active scene.
    pub fn set_scene(&mut self, mut scene: Box<dyn Scene>) -> Result<()> {
        if let Some(mut old) = self.scene.take() {
            log::debug!("Exiting scene '{}'", old.name());
            let mut ctx = SceneContext {
                registry: &mut self.registry,
                runtime: &self.runtime,
            };
            if let Err(err) = old.on_exit(&mut ctx) {
                log::warn!("Scene '{}' failed during exit: {}", old.name(), err);
            }
        }
        self.registry.clear(&self.runtime);
        self.runtime.clear_scene_data();

        log::debug!("Entering scene '{}'", scene.name());
        let mut ctx = SceneContext {
            registry: &mut self.registry,
            runtime: &self.runtime,
        };
        scene.on_enter(&mut ctx)?;
        self.scene = Some(scene);
        Ok(())
    }

    /// Advance one frame using measured wall time.
    pub fn tick(&mut self) -> Result<()> {
        self.clock.tick();
        self.frame()
    }

    /// Advance one frame with an explicit delta, for headless use.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        self.clock.advance(dt);
        self.frame()
    }

    fn frame(&mut self) -> Result<()> {
        let dt = self.clock.delta_time();

        while self.clock.should_fixed_update() {
            self.clock.consume_fixed_step();
            let step = self.clock.fixed_timestep();
            if let Some(scene) = self.scene.as_mut() {
                let mut ctx = SceneContext {
                    registry: &mut self.registry,
                    runtime: &self.runtime,
                };
                scene.fixed_update(&mut ctx, step)?;
            }
        }

        self.runtime
            .scheduler
            .run_update(&mut self.registry, &self.runtime, dt);
        self.runtime
            .scheduler
            .run_post_update(&mut self.registry, &self.runtime, dt);

        if let Some(scene) = self.scene.as_mut() {
            let mut ctx = SceneContext {
                registry: &mut self.registry,
                runtime: &self.runtime,
            };
            scene.update(&mut ctx, dt)?;
            scene.late_update(&mut ctx, dt)?;
        }

        self.runtime
            .scheduler
            .run_pre_render(&mut self.registry, &self.runtime, dt);
        Ok(())
    }
}
