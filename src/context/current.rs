//! The scenario context bound to the executing thread.
//!
//! Each worker thread owns at most one [`ScenarioContext`]. It is created lazily on first
//! access, emptied by [`clear`] when a scenario starts and detached by [`remove`] when it
//! ends, so pooled threads never carry entries from one scenario into the next.
//!
//! Closures passed to [`with`] must not call back into this module.

use std::any::Any;
use std::cell::RefCell;

use crate::context::store::ScenarioContext;
use crate::http::Response;

thread_local! {
    static CURRENT: RefCell<Option<ScenarioContext>> = const { RefCell::new(None) };
}

/// Run `f` against this thread's context, creating it if needed.
pub fn with<R>(f: impl FnOnce(&mut ScenarioContext) -> R) -> R {
    CURRENT.with(|slot| {
        let mut slot = slot.borrow_mut();
        f(slot.get_or_insert_with(ScenarioContext::new))
    })
}

pub fn set<T: Any>(key: impl Into<String>, value: T) {
    with(|ctx| ctx.set(key, value));
}

pub fn get<T: Any + Clone>(key: &str) -> Option<T> {
    with(|ctx| ctx.get::<T>(key))
}

pub fn contains(key: &str) -> bool {
    with(|ctx| ctx.contains(key))
}

pub fn set_response(response: Response) {
    with(|ctx| ctx.set_response(response));
}

/// Copy of the last captured response.
pub fn response() -> Option<Response> {
    with(|ctx| ctx.response().cloned())
}

/// Borrow the last captured response without copying it.
pub fn with_response<R>(f: impl FnOnce(&Response) -> R) -> Option<R> {
    with(|ctx| ctx.response().map(f))
}

/// Empty the context but keep it attached to the thread.
pub fn clear() {
    with(|ctx| ctx.clear());
}

/// Detach the context from the thread entirely.
pub fn remove() {
    CURRENT.with(|slot| {
        slot.borrow_mut().take();
    });
}

/// Whether this thread currently holds a context.
pub fn is_attached() -> bool {
    CURRENT.with(|slot| slot.borrow().is_some())
}
