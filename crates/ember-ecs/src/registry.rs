//! Entity registry - authoritative entity → component-list mapping
//!
//! The registry is the single source of truth for "does this entity
//! exist" and "find the component of capability X on entity E". Component
//! lists keep attachment order: initialization walks the list forward,
//! teardown walks it in reverse so a destroy hook still sees a valid
//! sibling set.

use std::collections::{HashMap, HashSet};

use ember_core::{EmberError, EntityId, Result};

use crate::component::{Component, ComponentHandle, ComponentKind};
use crate::context::RuntimeContext;

/// Entity registry with per-registry monotonic id allocation.
#[derive(Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, Vec<ComponentHandle>>,
    next_id: u64,
    /// Entities currently running their teardown; guards against
    /// re-entrant destroys from inside a destroy hook.
    destroying: HashSet<EntityId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh entity, store its component list, and initialize
    /// each component in attachment order.
    ///
    /// A component's init may look up earlier siblings through the
    /// registry; later siblings are present but not yet initialized, so
    /// callers must order their component lists accordingly.
    ///
    /// An init error propagates; the entity stays registered with its
    /// earlier components initialized, and the caller may destroy it.
    pub fn create_entity(
        &mut self,
        components: Vec<ComponentHandle>,
        runtime: &RuntimeContext,
    ) -> Result<EntityId> {
        let id = EntityId::from_raw(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, components.clone());

        for handle in &components {
            handle.init(id, self, runtime)?;
        }
        Ok(id)
    }

    /// Initialize and append a component to an existing entity.
    ///
    /// Fails with `EntityNotFound` if the id is unknown or already
    /// destroyed. The component is not retroactively updated for frames
    /// that ran before it was attached.
    pub fn add_component(
        &mut self,
        entity: EntityId,
        handle: ComponentHandle,
        runtime: &RuntimeContext,
    ) -> Result<()> {
        if !self.entities.contains_key(&entity) {
            return Err(EmberError::EntityNotFound(entity));
        }
        handle.init(entity, self, runtime)?;
        self.entities
            .get_mut(&entity)
            .ok_or(EmberError::EntityNotFound(entity))?
            .push(handle);
        Ok(())
    }

    /// Find the first component with the given capability tag on an
    /// entity.
    ///
    /// Fails with `EntityNotFound` for an unknown entity; an entity that
    /// exists but lacks the capability yields `Ok(None)` - absence is an
    /// expected state, not an error.
    pub fn get_component(
        &self,
        entity: EntityId,
        kind: ComponentKind,
    ) -> Result<Option<ComponentHandle>> {
        let list = self
            .entities
            .get(&entity)
            .ok_or(EmberError::EntityNotFound(entity))?;
        Ok(list.iter().find(|handle| handle.kind() == kind).cloned())
    }

    /// Typed convenience wrapper over [`get_component`](Self::get_component).
    pub fn get<C: Component>(&self, entity: EntityId) -> Result<Option<ComponentHandle>> {
        self.get_component(entity, ComponentKind::of::<C>())
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Destroy an entity, invoking `on_destroy` on every component in
    /// strict reverse attachment order. Unknown ids are a no-op so cleanup
    /// paths stay idempotent.
    ///
    /// The entity remains queryable until its last destroy hook returns;
    /// per-component teardown failures are logged and do not block
    /// siblings from tearing down.
    pub fn destroy_entity(&mut self, entity: EntityId, runtime: &RuntimeContext) {
        if !self.entities.contains_key(&entity) {
            return;
        }
        if !self.destroying.insert(entity) {
            return;
        }

        let handles = self.entities.get(&entity).cloned().unwrap_or_default();
        for handle in handles.iter().rev() {
            if let Err(e) = handle.destroy(entity, self, runtime) {
                log::warn!(
                    "Teardown failed for component {} on entity {}: {}",
                    handle.id(),
                    entity,
                    e
                );
            }
        }

        self.entities.remove(&entity);
        self.destroying.remove(&entity);
    }

    /// Destroy every live entity and reset the id counter.
    ///
    /// Used on scene transitions so no scheduler membership or entity
    /// state leaks across scenes.
    pub fn clear(&mut self, runtime: &RuntimeContext) {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in ids {
            self.destroy_entity(id, runtime);
        }
        self.next_id = 0;
    }
}
