//! Ember ECS - Entity registry, component lifecycle, and frame scheduling
//!
//! This crate is the core of the runtime:
//! - `Component` / `Behaviour` - the two-layer lifecycle contract: every
//!   component implements `Component`; per-frame hooks are the opt-in
//!   `Behaviour` capability
//! - `ComponentHandle` - the shared cell that owns a component's identity,
//!   capability tag, and once-only init flag
//! - `EntityRegistry` - authoritative entity → component-list mapping
//! - `FrameScheduler` - three-phase per-frame hook dispatcher
//! - `RuntimeContext` - ambient services passed into every operation in
//!   place of process-wide singletons

mod component;
mod context;
mod registry;
mod scheduler;
mod transform;

pub use component::{AsAny, Behaviour, Component, ComponentHandle, ComponentKind};
pub use context::{DestroyContext, InitContext, RuntimeContext, TickContext};
pub use registry::EntityRegistry;
pub use scheduler::{FrameScheduler, Phase};
pub use transform::TransformComponent;
