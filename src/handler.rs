//! # Shared callable handle (`Handler`)
//!
//! [`Handler`] wraps a listener closure behind a shared pointer so the same
//! callable can be registered, compared, and removed by identity. Cloning a
//! handler clones the handle, not the closure; two clones of one handler
//! compare equal under [`Handler::same`], two independently constructed
//! handlers never do. This is what makes `remove_listener` addressable.
//!
//! Callability is a compile-time constraint (`Fn(&[Value]) + 'static`). The
//! one place a listener can arrive type-erased (plugin tables, deserialized
//! handler registries) goes through [`Handler::from_any`], which is the only
//! source of [`HubError::InvalidCallback`] at runtime.
//!
//! ## Example
//! ```rust
//! use eventhub::Handler;
//!
//! let h = Handler::new(|args| println!("got {} args", args.len()));
//! let same = h.clone();
//! assert!(h.same(&same));
//!
//! let other = Handler::new(|_| {});
//! assert!(!h.same(&other));
//! ```

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::error::HubError;

/// Shared handle to a listener callable.
///
/// Invoked with the emission's argument slice; state listeners receive an
/// empty slice. Handlers are invoked only by the hub, synchronously, and may
/// re-enter the hub that invoked them.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&[Value])>);

impl Handler {
    /// Wraps a closure into a shared handler.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) + 'static,
    {
        Self(Rc::new(f))
    }

    /// Wraps a zero-argument closure, ignoring whatever arguments arrive.
    ///
    /// Convenient for state listeners, which are always invoked without
    /// arguments.
    pub fn nullary<F>(f: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self(Rc::new(move |_args: &[Value]| f()))
    }

    /// Interprets a type-erased listener as a handler.
    ///
    /// Accepts a boxed [`Handler`], `Rc<dyn Fn(&[Value])>`, or
    /// `Box<dyn Fn(&[Value])>`. Anything else fails with
    /// [`HubError::InvalidCallback`].
    ///
    /// # Example
    /// ```
    /// use eventhub::{Handler, HubError};
    ///
    /// let ok = Handler::from_any(Box::new(Handler::new(|_| {})));
    /// assert!(ok.is_ok());
    ///
    /// let err = Handler::from_any(Box::new("not callable")).unwrap_err();
    /// assert_eq!(err.as_label(), "invalid_callback");
    /// ```
    pub fn from_any(listener: Box<dyn Any>) -> Result<Self, HubError> {
        let listener = match listener.downcast::<Handler>() {
            Ok(handler) => return Ok(*handler),
            Err(other) => other,
        };
        let listener = match listener.downcast::<Rc<dyn Fn(&[Value])>>() {
            Ok(shared) => return Ok(Handler(*shared)),
            Err(other) => other,
        };
        match listener.downcast::<Box<dyn Fn(&[Value])>>() {
            Ok(boxed) => Ok(Handler(Rc::from(*boxed))),
            Err(_) => Err(HubError::InvalidCallback),
        }
    }

    /// Invokes the underlying closure with the given arguments.
    pub fn invoke(&self, args: &[Value]) {
        (self.0)(args)
    }

    /// True if both handles point at the same closure.
    ///
    /// Identity, not structural, comparison: clones are `same`, separately
    /// constructed handlers are not even when built from identical code.
    #[must_use]
    pub fn same(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Creates a non-owning handle to this handler.
    ///
    /// Used by the self-removing `once` adapter, which must refer to itself
    /// without keeping itself alive once removed from the registry.
    #[must_use]
    pub fn downgrade(&self) -> WeakHandler {
        WeakHandler(Rc::downgrade(&self.0))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0))
    }
}

/// Non-owning counterpart of [`Handler`].
#[derive(Clone)]
pub struct WeakHandler(Weak<dyn Fn(&[Value])>);

impl WeakHandler {
    /// Recovers a strong handle if the handler is still alive somewhere.
    #[must_use]
    pub fn upgrade(&self) -> Option<Handler> {
        self.0.upgrade().map(Handler)
    }
}

impl fmt::Debug for WeakHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakHandler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_clones_share_identity() {
        let h = Handler::new(|_| {});
        assert!(h.same(&h.clone()));
    }

    #[test]
    fn test_distinct_handlers_differ() {
        let a = Handler::new(|_| {});
        let b = Handler::new(|_| {});
        assert!(!a.same(&b));
    }

    #[test]
    fn test_nullary_ignores_arguments() {
        let hits = Rc::new(Cell::new(0));
        let h = Handler::nullary({
            let hits = Rc::clone(&hits);
            move || hits.set(hits.get() + 1)
        });
        h.invoke(&[serde_json::json!(1), serde_json::json!(2)]);
        h.invoke(&[]);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_from_any_accepts_boxed_closure() {
        let hits = Rc::new(Cell::new(0));
        let boxed: Box<dyn Fn(&[Value])> = Box::new({
            let hits = Rc::clone(&hits);
            move |_| hits.set(hits.get() + 1)
        });
        let h = Handler::from_any(Box::new(boxed)).unwrap();
        h.invoke(&[]);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_from_any_accepts_shared_closure() {
        let shared: Rc<dyn Fn(&[Value])> = Rc::new(|_| {});
        let h = Handler::from_any(Box::new(Rc::clone(&shared))).unwrap();
        assert!(h.same(&Handler(shared)));
    }

    #[test]
    fn test_from_any_rejects_non_callable() {
        let err = Handler::from_any(Box::new(42_u32)).unwrap_err();
        assert!(matches!(err, HubError::InvalidCallback));
    }

    #[test]
    fn test_weak_handle_dies_with_last_strong_one() {
        let h = Handler::new(|_| {});
        let weak = h.downgrade();
        assert!(weak.upgrade().is_some());
        drop(h);
        assert!(weak.upgrade().is_none());
    }
}
