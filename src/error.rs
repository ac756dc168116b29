//! Error types used by the hub.
//!
//! Registration is statically typed everywhere a handler crosses the API as
//! a [`Handler`](crate::Handler), so the only runtime failure left is the
//! type-erased registration surface ([`EventHub::on_any`](crate::EventHub::on_any)),
//! which validates its input before touching any registry.

use thiserror::Error;

/// # Errors produced by the hub.
///
/// Raised synchronously to the immediate caller; the hub never performs a
/// partial mutation before failing (validation precedes any registry write).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HubError {
    /// A type-erased listener could not be interpreted as a callable handler.
    #[error("listener is not callable")]
    InvalidCallback,
}

impl HubError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventhub::HubError;
    ///
    /// assert_eq!(HubError::InvalidCallback.as_label(), "invalid_callback");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HubError::InvalidCallback => "invalid_callback",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HubError::InvalidCallback => "listener is not callable".to_string(),
        }
    }
}
