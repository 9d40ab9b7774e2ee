//! Ember Core - Foundational types for the Ember runtime
//!
//! This crate provides the core types that all other Ember crates depend on:
//! - `EntityId` / `ComponentId` - Entity and component identifiers
//! - `Vec3`, `Transform` - Spatial types
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{EmberError, Result};
pub use id::{ComponentId, EntityId};
pub use types::{Transform, Vec3};
