//! Scene lifecycle trait

use ember_core::Result;
use ember_ecs::{EntityRegistry, RuntimeContext};

/// Registry and runtime access handed to every scene hook.
pub struct SceneContext<'a> {
    pub registry: &'a mut EntityRegistry,
    pub runtime: &'a RuntimeContext,
}

/// A unit of game content driven by the [`Engine`](crate::Engine).
///
/// One scene is active at a time. Switching scenes exits the old one and
/// clears the registry before the new scene's `on_enter` runs, so a scene
/// owns every entity alive while it is active.
pub trait Scene {
    /// Human-readable name, used in log output.
    fn name(&self) -> &str;

    /// Called once when the scene becomes active. Spawn entities here.
    fn on_enter(&mut self, ctx: &mut SceneContext<'_>) -> Result<()>;

    /// Called when the scene is being switched away from, before its
    /// entities are destroyed.
    fn on_exit(&mut self, _ctx: &mut SceneContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called at the fixed simulation rate, zero or more times per frame.
    fn fixed_update(&mut self, _ctx: &mut SceneContext<'_>, _dt: f64) -> Result<()> {
        Ok(())
    }

    /// Called once per frame after the component update phases.
    fn update(&mut self, _ctx: &mut SceneContext<'_>, _dt: f64) -> Result<()> {
        Ok(())
    }

    /// Called once per frame after `update`, before the pre-render phase.
    fn late_update(&mut self, _ctx: &mut SceneContext<'_>, _dt: f64) -> Result<()> {
        Ok(())
    }
}
