//! Ember Asset - Deferred asset loading
//!
//! This crate provides the asset-loading collaborator the runtime core
//! consumes: the `AssetServer` trait, poll-driven load handles, and the
//! TOML sidecar formats for animation clips and skinned meshes.
//!
//! Loads are never completed from their own callbacks; consumers poll a
//! [`LoadHandle`] from the frame tick and take the result when it is ready.

mod handle;
mod server;
mod types;

pub use handle::{LoadCompleter, LoadHandle, LoadPoll};
pub use server::{AssetServer, FileAssets};
pub use types::{ClipData, ClipFile, MeshData, MeshFile};
