//! Reentrant correlation identifier scope.
//!
//! # Responsibilities
//! - Create one identifier per outermost scope on a thread
//! - Track nesting depth so inner scopes share the outer identifier
//! - Publish the identifier in the diagnostic map for log tagging

use std::cell::Cell;
use std::marker::PhantomData;
use uuid::Uuid;

use crate::context::mdc;

/// Diagnostic map key holding the current correlation identifier.
pub const CORRELATION_ID_KEY: &str = "correlation_id";

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Entry points for the calling thread's correlation scope.
pub struct CorrelationContext;

impl CorrelationContext {
    /// Open a scope on the calling thread.
    ///
    /// At depth 0 the identifier becomes `supplied_id` when it is non-blank,
    /// otherwise a fresh UUID, and `true` is returned. Nested calls keep the
    /// existing identifier and return `false`. Depth is incremented either way.
    pub fn enter(supplied_id: Option<&str>) -> bool {
        DEPTH.with(|depth| {
            let current = depth.get();
            depth.set(current + 1);
            if current > 0 {
                return false;
            }

            let id = match supplied_id.map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => Uuid::new_v4().to_string(),
            };
            mdc::put(CORRELATION_ID_KEY, id);
            true
        })
    }

    /// Close a scope on the calling thread.
    ///
    /// Returns `true` only when this call brought the depth back to zero and
    /// the identifier was cleared. Calling with no open scope is a no-op.
    pub fn exit() -> bool {
        DEPTH.with(|depth| match depth.get() {
            0 => false,
            1 => {
                depth.set(0);
                mdc::remove(CORRELATION_ID_KEY);
                true
            }
            n => {
                depth.set(n - 1);
                false
            }
        })
    }

    /// Identifier of the calling thread's open scope, if any.
    pub fn current() -> Option<String> {
        mdc::get(CORRELATION_ID_KEY)
    }

    /// Current nesting depth on the calling thread.
    pub fn depth() -> usize {
        DEPTH.with(Cell::get)
    }
}

/// Scope guard that calls [`CorrelationContext::exit`] on drop.
///
/// Not `Send`: the scope belongs to the thread that opened it.
#[derive(Debug)]
pub struct CorrelationScope {
    created: bool,
    _not_send: PhantomData<*const ()>,
}

impl CorrelationScope {
    /// Open a scope, see [`CorrelationContext::enter`].
    pub fn enter(supplied_id: Option<&str>) -> Self {
        let created = CorrelationContext::enter(supplied_id);
        Self {
            created,
            _not_send: PhantomData,
        }
    }

    /// Whether this guard created the identifier (outermost scope).
    pub fn created(&self) -> bool {
        self.created
    }

    /// Identifier in effect for this scope.
    pub fn id(&self) -> String {
        CorrelationContext::current().unwrap_or_default()
    }
}

impl Drop for CorrelationScope {
    fn drop(&mut self) {
        CorrelationContext::exit();
    }
}
