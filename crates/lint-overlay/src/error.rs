//! Engine errors.

use crate::host::HostError;
use thiserror::Error;

/// Errors returned by [`AnnotationEngine`](crate::AnnotationEngine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("annotation engine has been disposed")]
    /// The engine was already torn down.
    Disposed,

    #[error(transparent)]
    /// The host rejected a request.
    Host(#[from] HostError),
}
