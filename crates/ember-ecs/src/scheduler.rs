//! Frame scheduler - three-phase per-frame hook dispatcher
//!
//! Membership is keyed by component identity, not entity, so an entity may
//! contribute any number of behaviours. Handles join during component init
//! and leave during teardown; both directions may also be driven by
//! components themselves from inside a running phase, so the drivers
//! iterate a snapshot and re-check membership before each invocation.
//!
//! No ordering is guaranteed between members within a phase.

use std::cell::RefCell;
use std::collections::HashMap;

use ember_core::ComponentId;

use crate::component::ComponentHandle;
use crate::context::{RuntimeContext, TickContext};
use crate::registry::EntityRegistry;

/// The three per-frame phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Simulation-driving logic (input → movement).
    Update,
    /// Reconciling derived state after every update has run.
    PostUpdate,
    /// Last hooks before the frame is drawn.
    PreRender,
}

/// Membership set and phase drivers for frame-scheduled behaviours.
#[derive(Default)]
pub struct FrameScheduler {
    members: RefCell<HashMap<ComponentId, ComponentHandle>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component to the membership set. Adding an existing member
    /// again has no effect.
    pub fn add(&self, handle: ComponentHandle) {
        self.members.borrow_mut().entry(handle.id()).or_insert(handle);
    }

    /// Remove a component from the membership set. Removing an absent
    /// member has no effect.
    pub fn remove(&self, id: ComponentId) {
        self.members.borrow_mut().remove(&id);
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.members.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// Run the `update` phase on every current member.
    pub fn run_update(&self, registry: &mut EntityRegistry, runtime: &RuntimeContext, dt: f64) {
        self.run_phase(Phase::Update, registry, runtime, dt);
    }

    /// Run the `post_update` phase on every current member.
    pub fn run_post_update(
        &self,
        registry: &mut EntityRegistry,
        runtime: &RuntimeContext,
        dt: f64,
    ) {
        self.run_phase(Phase::PostUpdate, registry, runtime, dt);
    }

    /// Run the `pre_render` phase on every current member.
    pub fn run_pre_render(&self, registry: &mut EntityRegistry, runtime: &RuntimeContext, dt: f64) {
        self.run_phase(Phase::PreRender, registry, runtime, dt);
    }

    /// Drive one phase over a snapshot of the membership set.
    ///
    /// A member removed after the snapshot but before its turn is skipped;
    /// members added mid-phase run starting next phase. Hook errors are
    /// logged per component and never abort the phase.
    fn run_phase(
        &self,
        phase: Phase,
        registry: &mut EntityRegistry,
        runtime: &RuntimeContext,
        dt: f64,
    ) {
        let snapshot: Vec<ComponentHandle> = self.members.borrow().values().cloned().collect();
        for handle in snapshot {
            if !self.contains(handle.id()) {
                continue;
            }
            let mut ctx = TickContext {
                dt,
                registry: &mut *registry,
                runtime,
            };
            if let Err(e) = handle.run_phase(phase, &mut ctx) {
                log::warn!("{:?} hook failed for component {}: {}", phase, handle.id(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Behaviour, Component};
    use ember_core::Result;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Counts = Rc<RefCell<Vec<&'static str>>>;

    struct Ticker {
        name: &'static str,
        counts: Counts,
    }

    impl Component for Ticker {
        fn as_behaviour(&mut self) -> Option<&mut dyn Behaviour> {
            Some(self)
        }
    }

    impl Behaviour for Ticker {
        fn update(&mut self, _ctx: &mut TickContext<'_>) -> Result<()> {
            self.counts.borrow_mut().push(self.name);
            Ok(())
        }
    }

    /// Removes itself (and optionally another member) during its update.
    struct Remover {
        counts: Counts,
        own_id: Option<ComponentId>,
        victim: Option<ComponentId>,
    }

    impl Component for Remover {
        fn as_behaviour(&mut self) -> Option<&mut dyn Behaviour> {
            Some(self)
        }
    }

    impl Behaviour for Remover {
        fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
            self.counts.borrow_mut().push("remover");
            if let Some(victim) = self.victim {
                ctx.runtime.scheduler.remove(victim);
            }
            if let Some(own) = self.own_id {
                ctx.runtime.scheduler.remove(own);
            }
            Ok(())
        }
    }

    struct Failing;

    impl Component for Failing {
        fn as_behaviour(&mut self) -> Option<&mut dyn Behaviour> {
            Some(self)
        }
    }

    impl Behaviour for Failing {
        fn update(&mut self, _ctx: &mut TickContext<'_>) -> Result<()> {
            Err(ember_core::EmberError::AnimationError("boom".into()))
        }
    }

    fn fixture() -> (EntityRegistry, RuntimeContext, Counts) {
        (
            EntityRegistry::new(),
            RuntimeContext::new(),
            Rc::new(RefCell::new(Vec::new())),
        )
    }

    #[test]
    fn add_is_idempotent() {
        let (_, runtime, counts) = fixture();
        let handle = ComponentHandle::new(Ticker {
            name: "a",
            counts,
        });
        runtime.scheduler.add(handle.clone());
        runtime.scheduler.add(handle.clone());
        assert_eq!(runtime.scheduler.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let (_, runtime, counts) = fixture();
        let handle = ComponentHandle::new(Ticker {
            name: "a",
            counts,
        });
        runtime.scheduler.add(handle.clone());
        runtime.scheduler.remove(handle.id());
        runtime.scheduler.remove(handle.id());
        assert!(runtime.scheduler.is_empty());
    }

    #[test]
    fn update_runs_every_member() {
        let (mut registry, runtime, counts) = fixture();
        runtime.scheduler.add(ComponentHandle::new(Ticker {
            name: "a",
            counts: counts.clone(),
        }));
        runtime.scheduler.add(ComponentHandle::new(Ticker {
            name: "b",
            counts: counts.clone(),
        }));

        runtime.scheduler.run_update(&mut registry, &runtime, 0.016);
        let mut seen = counts.borrow().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn self_removal_mid_phase_is_safe() {
        let (mut registry, runtime, counts) = fixture();
        let handle = ComponentHandle::new(Remover {
            counts: counts.clone(),
            own_id: None,
            victim: None,
        });
        handle.borrow_mut::<Remover>().unwrap().own_id = Some(handle.id());
        runtime.scheduler.add(handle.clone());

        runtime.scheduler.run_update(&mut registry, &runtime, 0.016);
        assert!(!runtime.scheduler.contains(handle.id()));
        assert_eq!(counts.borrow().len(), 1);

        // Next phase runs nothing.
        runtime.scheduler.run_update(&mut registry, &runtime, 0.016);
        assert_eq!(counts.borrow().len(), 1);
    }

    #[test]
    fn member_removed_before_its_turn_is_skipped() {
        let (mut registry, runtime, counts) = fixture();
        let victim = ComponentHandle::new(Ticker {
            name: "victim",
            counts: counts.clone(),
        });
        let remover = ComponentHandle::new(Remover {
            counts: counts.clone(),
            own_id: None,
            victim: Some(victim.id()),
        });
        runtime.scheduler.add(victim.clone());
        runtime.scheduler.add(remover);

        runtime.scheduler.run_update(&mut registry, &runtime, 0.016);
        assert!(!runtime.scheduler.contains(victim.id()));
        // The victim ran at most once, depending on snapshot order.
        let victim_runs = counts.borrow().iter().filter(|n| **n == "victim").count();
        assert!(victim_runs <= 1);

        counts.borrow_mut().clear();
        runtime.scheduler.run_update(&mut registry, &runtime, 0.016);
        assert!(!counts.borrow().contains(&"victim"));
    }

    #[test]
    fn hook_error_does_not_abort_the_phase() {
        let (mut registry, runtime, counts) = fixture();
        runtime.scheduler.add(ComponentHandle::new(Failing));
        runtime.scheduler.add(ComponentHandle::new(Ticker {
            name: "a",
            counts: counts.clone(),
        }));

        runtime.scheduler.run_update(&mut registry, &runtime, 0.016);
        assert_eq!(counts.borrow().as_slice(), ["a"]);
    }

    #[test]
    fn non_behaviour_members_are_tolerated() {
        struct Inert;
        impl Component for Inert {}

        let (mut registry, runtime, _) = fixture();
        runtime.scheduler.add(ComponentHandle::new(Inert));
        runtime.scheduler.run_update(&mut registry, &runtime, 0.016);
        assert_eq!(runtime.scheduler.len(), 1);
    }
}
