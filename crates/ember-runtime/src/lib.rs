//! Ember Runtime - Frame loop infrastructure
//!
//! Provides the building blocks that drive a game from frame to frame:
//! - `GameClock` - fixed-timestep accumulator with frame-delta clamping
//! - `Scene` - lifecycle trait for units of game content
//! - `Engine` - owns the registry and runtime context and drives the
//!   fixed per-frame phase order

mod clock;
mod engine;
mod scene;

pub use clock::GameClock;
pub use engine::Engine;
pub use scene::{Scene, SceneContext};
