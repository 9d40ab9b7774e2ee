//! Runtime context and per-hook contexts
//!
//! `RuntimeContext` replaces the process-wide singletons of classic
//! component runtimes: it owns the frame scheduler and an opaque
//! active-scene slot, and is passed by reference into every registry
//! operation and component hook.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use ember_core::{ComponentId, EntityId};

use crate::registry::EntityRegistry;
use crate::scheduler::FrameScheduler;

/// Ambient services shared by every component hook.
#[derive(Default)]
pub struct RuntimeContext {
    /// Frame scheduler; interior-mutable so components can self-register
    /// and self-remove from within their own hooks.
    pub scheduler: FrameScheduler,
    /// Opaque active-scene data. The core never inspects it.
    scene: RefCell<Option<Rc<dyn Any>>>,
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the active scene's shared data for components to resolve.
    pub fn set_scene_data(&self, data: Rc<dyn Any>) {
        *self.scene.borrow_mut() = Some(data);
    }

    /// Drop the active scene's shared data (on scene exit).
    pub fn clear_scene_data(&self) {
        *self.scene.borrow_mut() = None;
    }

    /// Resolve the active scene's shared data as type `T`, if present.
    pub fn scene_data<T: Any>(&self) -> Option<Rc<T>> {
        let data = self.scene.borrow().clone()?;
        data.downcast::<T>().ok()
    }
}

/// Context for [`Component::init`](crate::Component::init).
///
/// Carries the owning entity's identity, the component's own id, and the
/// registry for sibling lookup during initialization.
pub struct InitContext<'a> {
    pub entity: EntityId,
    pub component: ComponentId,
    pub registry: &'a mut EntityRegistry,
    pub runtime: &'a RuntimeContext,
}

/// Context for the per-frame [`Behaviour`](crate::Behaviour) hooks.
pub struct TickContext<'a> {
    /// Seconds since the previous frame.
    pub dt: f64,
    pub registry: &'a mut EntityRegistry,
    pub runtime: &'a RuntimeContext,
}

/// Context for [`Component::on_destroy`](crate::Component::on_destroy).
///
/// The registry still contains the entity and its remaining siblings when
/// a destroy hook runs.
pub struct DestroyContext<'a> {
    pub entity: EntityId,
    pub component: ComponentId,
    pub registry: &'a mut EntityRegistry,
    pub runtime: &'a RuntimeContext,
}
