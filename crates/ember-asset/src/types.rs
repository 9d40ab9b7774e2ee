//! Asset sidecar type definitions

use serde::{Deserialize, Serialize};

/// A loaded animation clip: a named stretch of time the mixer can play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipData {
    /// Human-readable name
    pub name: String,
    /// Total duration in seconds
    pub duration: f64,
    /// Whether playback wraps at the end (one-shot clips clamp and stop)
    #[serde(default = "default_looping")]
    pub looping: bool,
}

fn default_looping() -> bool {
    true
}

/// TOML sidecar format for a clip bundle: zero or more clips per source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipFile {
    #[serde(default)]
    pub clips: Vec<ClipData>,
}

/// Metadata for a loaded skinned mesh.
///
/// Ember owns no rendering resources; this is the descriptor the animation
/// layer binds its mixer against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    #[serde(default)]
    pub skinned: bool,
}

/// TOML sidecar format for a mesh descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshFile {
    pub mesh: MeshData,
}
