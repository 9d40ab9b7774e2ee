//! Component lifecycle contract
//!
//! Components implement the minimal [`Component`] trait; components that
//! want per-frame hooks additionally implement [`Behaviour`] and bridge it
//! through `Component::as_behaviour`. Concrete components are wrapped in a
//! [`ComponentHandle`], the shared cell that carries the process-unique
//! identity, the capability tag used for registry lookup, and the
//! once-only init flag.

use std::any::{Any, TypeId};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use ember_core::{ComponentId, EmberError, EntityId, Result};

use crate::context::{DestroyContext, InitContext, RuntimeContext, TickContext};
use crate::registry::EntityRegistry;
use crate::scheduler::Phase;

/// Object-safe downcast support, blanket-implemented for every `'static` type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The minimal lifecycle every component implements.
///
/// All hooks default to no-ops so data-only components need no impl body.
pub trait Component: AsAny + 'static {
    /// One-time init hook. Called after the component's handle has wired
    /// infrastructure (scheduler membership for behaviours); may look up
    /// earlier siblings through `ctx.registry`, but must not assume later
    /// siblings are initialized yet.
    ///
    /// An error here propagates to the registry caller.
    fn init(&mut self, ctx: &mut InitContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Teardown hook. Must release any external resource the component
    /// acquired. Siblings are still valid and queryable when this runs.
    fn on_destroy(&mut self, ctx: &mut DestroyContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Frame-scheduled capability marker. Components implementing
    /// [`Behaviour`] return `Some(self)` to opt into the scheduler.
    fn as_behaviour(&mut self) -> Option<&mut dyn Behaviour> {
        None
    }
}

/// Per-frame hooks for components that opt into the frame scheduler.
///
/// `update` drives simulation-facing logic; `post_update` reconciles
/// derived state after every `update` has run; `pre_render` runs last,
/// just before the frame is drawn. Errors are logged by the phase driver
/// and never halt the frame.
pub trait Behaviour: Component {
    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    fn post_update(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    fn pre_render(&mut self, ctx: &mut TickContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
}

/// Capability tag identifying a concrete component type.
///
/// Captured once when a component is wrapped in a handle; registry lookup
/// compares tags instead of downcasting every list element.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKind(TypeId);

impl ComponentKind {
    pub fn of<C: Component>() -> Self {
        Self(TypeId::of::<C>())
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKind({:?})", self.0)
    }
}

/// Shared handle to a component attached (or about to be attached) to an
/// entity.
///
/// Cloning is cheap; all clones refer to the same component cell. The
/// handle owns the lifecycle bookkeeping so no concrete component can get
/// it wrong: init runs at most once, and scheduler membership is wired
/// before the user init hook and released after teardown.
pub struct ComponentHandle {
    id: ComponentId,
    kind: ComponentKind,
    inited: Rc<Cell<bool>>,
    inner: Rc<RefCell<dyn Component>>,
}

impl Clone for ComponentHandle {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            kind: self.kind,
            inited: self.inited.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl ComponentHandle {
    /// Wrap a concrete component, assigning it a fresh process-unique id
    /// and capturing its capability tag.
    pub fn new<C: Component>(component: C) -> Self {
        Self {
            id: ComponentId::new(),
            kind: ComponentKind::of::<C>(),
            inited: Rc::new(Cell::new(false)),
            inner: Rc::new(RefCell::new(component)),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// True if the wrapped component is of type `C`.
    pub fn is<C: Component>(&self) -> bool {
        self.kind == ComponentKind::of::<C>()
    }

    /// Borrow the component as concrete type `C`. Returns `None` when the
    /// type does not match or the component is currently borrowed mutably
    /// (e.g. it is executing one of its own hooks).
    pub fn borrow<C: Component>(&self) -> Option<Ref<'_, C>> {
        let guard = self.inner.try_borrow().ok()?;
        Ref::filter_map(guard, |c| c.as_any().downcast_ref::<C>()).ok()
    }

    /// Mutably borrow the component as concrete type `C`.
    pub fn borrow_mut<C: Component>(&self) -> Option<RefMut<'_, C>> {
        let guard = self.inner.try_borrow_mut().ok()?;
        RefMut::filter_map(guard, |c| c.as_any_mut().downcast_mut::<C>()).ok()
    }

    /// Whether the component's init hook has completed.
    pub fn is_inited(&self) -> bool {
        self.inited.get()
    }

    /// Run the component's initialization. A second call is a silent no-op.
    ///
    /// Behaviours join the scheduler before the user hook runs, so an
    /// overriding init cannot skip the wiring. The init flag is only set
    /// once the user hook succeeds.
    pub(crate) fn init(
        &self,
        entity: EntityId,
        registry: &mut EntityRegistry,
        runtime: &RuntimeContext,
    ) -> Result<()> {
        if self.inited.get() {
            return Ok(());
        }

        let mut guard = self.inner.try_borrow_mut().map_err(|_| {
            EmberError::ComponentBusy(format!("component {} is already executing", self.id))
        })?;

        if guard.as_behaviour().is_some() {
            runtime.scheduler.add(self.clone());
        }

        let mut ctx = InitContext {
            entity,
            component: self.id,
            registry,
            runtime,
        };
        guard.init(&mut ctx)?;
        drop(guard);

        self.inited.set(true);
        Ok(())
    }

    /// Run the component's teardown. Scheduler membership is released even
    /// when the hook fails, so no dangling membership survives.
    pub(crate) fn destroy(
        &self,
        entity: EntityId,
        registry: &mut EntityRegistry,
        runtime: &RuntimeContext,
    ) -> Result<()> {
        let result = match self.inner.try_borrow_mut() {
            Ok(mut guard) => {
                let mut ctx = DestroyContext {
                    entity,
                    component: self.id,
                    registry,
                    runtime,
                };
                guard.on_destroy(&mut ctx)
            }
            Err(_) => Err(EmberError::ComponentBusy(format!(
                "component {} is borrowed during teardown",
                self.id
            ))),
        };

        runtime.scheduler.remove(self.id);
        result
    }

    /// Invoke one frame-phase hook, if this component is a behaviour.
    pub(crate) fn run_phase(&self, phase: Phase, ctx: &mut TickContext<'_>) -> Result<()> {
        let mut guard = self.inner.try_borrow_mut().map_err(|_| {
            EmberError::ComponentBusy(format!("component {} is already executing", self.id))
        })?;
        match guard.as_behaviour() {
            Some(behaviour) => match phase {
                Phase::Update => behaviour.update(ctx),
                Phase::PostUpdate => behaviour.post_update(ctx),
                Phase::PreRender => behaviour.pre_render(ctx),
            },
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("inited", &self.inited.get())
            .finish()
    }
}
