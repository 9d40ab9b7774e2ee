//! Ember Animation - per-entity cross-fade playback
//!
//! Provides the animation blend controller and its collaborators:
//! - `Mixer` - named playable actions with overlapping weight fades
//! - `AnimationComponent` - the per-entity state machine managing clip
//!   loading, deferred requests, and timed cross-fades
//! - `SkinnedMeshComponent` - the companion component whose loaded mesh
//!   gates the controller's transition to ready

mod controller;
mod mesh;
mod mixer;

pub use controller::AnimationComponent;
pub use mesh::SkinnedMeshComponent;
pub use mixer::{Action, Mixer, CROSS_FADE_SECS};
