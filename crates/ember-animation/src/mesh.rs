//! Skinned mesh component - the animation controller's companion
//!
//! Owns the deferred mesh load and reports the loaded mesh descriptor.
//! The renderable world transform is reconciled from the transform
//! sibling in `post_update`, after every simulation update has run.

use std::rc::Rc;

use ember_asset::{AssetServer, LoadHandle, LoadPoll, MeshData};
use ember_core::{EmberError, Result, Transform};
use ember_ecs::{
    Behaviour, Component, ComponentHandle, InitContext, TickContext, TransformComponent,
};

/// Deferred-loading skinned mesh attached to one entity.
///
/// Requires a [`TransformComponent`] sibling attached earlier on the same
/// entity; initialization fails hard without one.
pub struct SkinnedMeshComponent {
    source: String,
    assets: Rc<dyn AssetServer>,
    load: Option<LoadHandle<MeshData>>,
    mesh: Option<MeshData>,
    transform: Option<ComponentHandle>,
    world_transform: Transform,
}

impl SkinnedMeshComponent {
    pub fn new(source: impl Into<String>, assets: Rc<dyn AssetServer>) -> Self {
        Self {
            source: source.into(),
            assets,
            load: None,
            mesh: None,
            transform: None,
            world_transform: Transform::identity(),
        }
    }

    /// The loaded mesh descriptor, once the deferred load has resolved.
    pub fn mesh(&self) -> Option<&MeshData> {
        self.mesh.as_ref()
    }

    /// The transform the renderer would draw this mesh with.
    pub fn world_transform(&self) -> Transform {
        self.world_transform
    }
}

impl Component for SkinnedMeshComponent {
    fn init(&mut self, ctx: &mut InitContext<'_>) -> Result<()> {
        let transform = ctx.registry.get::<TransformComponent>(ctx.entity)?.ok_or_else(|| {
            EmberError::ComponentNotFound(format!(
                "SkinnedMeshComponent requires a TransformComponent on entity {}",
                ctx.entity
            ))
        })?;
        self.transform = Some(transform);
        self.load = Some(self.assets.load_mesh(&self.source));
        Ok(())
    }

    fn as_behaviour(&mut self) -> Option<&mut dyn Behaviour> {
        Some(self)
    }
}

impl Behaviour for SkinnedMeshComponent {
    fn update(&mut self, _ctx: &mut TickContext<'_>) -> Result<()> {
        if let Some(load) = &self.load {
            match load.poll() {
                LoadPoll::Pending => {}
                LoadPoll::Ready(mesh) => {
                    self.mesh = Some(mesh);
                    self.load = None;
                }
                LoadPoll::Failed(message) => {
                    log::error!("Mesh load '{}' failed: {}", self.source, message);
                    self.load = None;
                }
            }
        }
        Ok(())
    }

    fn post_update(&mut self, _ctx: &mut TickContext<'_>) -> Result<()> {
        if self.mesh.is_none() {
            return Ok(());
        }
        if let Some(transform) = &self.transform {
            if let Some(sibling) = transform.borrow::<TransformComponent>() {
                self.world_transform = sibling.transform;
            }
        }
        Ok(())
    }
}
