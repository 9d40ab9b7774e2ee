//! Poll-driven load handles
//!
//! A `LoadHandle` is the consumer side of a one-shot load: the issuer gets
//! the handle back immediately and polls it once per frame until the load
//! resolves or fails. The producer side is a `LoadCompleter`.
//!
//! Completion never invokes consumer code. If the consumer is destroyed
//! before the load resolves, the completer writes into shared state that
//! nobody reads again, which makes late completions safely discardable.

use std::cell::RefCell;
use std::rc::Rc;

/// Internal load slot state.
enum LoadState<T> {
    Pending,
    Ready(T),
    Failed(String),
    /// The result was already taken by a previous poll.
    Spent,
}

/// Result of polling a [`LoadHandle`].
#[derive(Debug, PartialEq)]
pub enum LoadPoll<T> {
    /// Still in flight.
    Pending,
    /// Load resolved; the value is handed over exactly once.
    Ready(T),
    /// Load failed; the message is handed over exactly once.
    Failed(String),
}

/// Consumer side of a one-shot load.
pub struct LoadHandle<T> {
    state: Rc<RefCell<LoadState<T>>>,
}

/// Producer side of a one-shot load.
pub struct LoadCompleter<T> {
    state: Rc<RefCell<LoadState<T>>>,
}

impl<T> LoadHandle<T> {
    /// Create a pending load and the completer that will resolve it.
    pub fn pending() -> (Self, LoadCompleter<T>) {
        let state = Rc::new(RefCell::new(LoadState::Pending));
        (
            Self {
                state: state.clone(),
            },
            LoadCompleter { state },
        )
    }

    /// Create an already-resolved load.
    pub fn ready(value: T) -> Self {
        Self {
            state: Rc::new(RefCell::new(LoadState::Ready(value))),
        }
    }

    /// Create an already-failed load.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(LoadState::Failed(message.into()))),
        }
    }

    /// Poll the load. `Ready`/`Failed` are returned at most once; later
    /// polls of a spent handle report `Pending`.
    pub fn poll(&self) -> LoadPoll<T> {
        let mut state = self.state.borrow_mut();
        match &*state {
            LoadState::Pending | LoadState::Spent => LoadPoll::Pending,
            LoadState::Ready(_) => match std::mem::replace(&mut *state, LoadState::Spent) {
                LoadState::Ready(value) => LoadPoll::Ready(value),
                _ => unreachable!(),
            },
            LoadState::Failed(_) => match std::mem::replace(&mut *state, LoadState::Spent) {
                LoadState::Failed(message) => LoadPoll::Failed(message),
                _ => unreachable!(),
            },
        }
    }

    /// True while the load has neither resolved nor failed.
    pub fn is_pending(&self) -> bool {
        matches!(&*self.state.borrow(), LoadState::Pending)
    }
}

impl<T> LoadCompleter<T> {
    /// Resolve the load with a value.
    pub fn complete(self, value: T) {
        *self.state.borrow_mut() = LoadState::Ready(value);
    }

    /// Fail the load with a message.
    pub fn fail(self, message: impl Into<String>) {
        *self.state.borrow_mut() = LoadState::Failed(message.into());
    }
}
