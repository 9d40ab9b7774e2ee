//! Transform component - the spatial anchor other components resolve

use ember_core::{Transform, Vec3};

use crate::component::Component;

/// Plain data component holding an entity's local transform.
///
/// Conventionally attached first, so siblings attached later can resolve
/// it during their own initialization.
#[derive(Debug, Clone, Default)]
pub struct TransformComponent {
    pub transform: Transform,
}

impl TransformComponent {
    pub fn new(transform: Transform) -> Self {
        Self { transform }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            transform: Transform::identity().with_position(position),
        }
    }
}

impl Component for TransformComponent {}
