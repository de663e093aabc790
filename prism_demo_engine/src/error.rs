//! Error types for the Prism demo engine
//!
//! Every error in this taxonomy is unrecoverable at the engine's level: it is
//! surfaced to the application shell, never retried and never downgraded.
//! Correctness is maintained by refusing to proceed, not by compensating.

use std::fmt;

use crate::gpu::SampleCount;

/// Result type for Prism engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prism engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// The device rejected a resource create call (bad parameters, backend error)
    ResourceCreation(String),

    /// `update_state()` was called on a pipeline descriptor with a required
    /// sub-state missing; carries the name of the missing slot
    MissingSubState(&'static str),

    /// A setter was called on an already-finalized pipeline descriptor;
    /// carries the name of the sub-state the caller tried to replace
    DescriptorFinalized(&'static str),

    /// Resolve requested with source sample count not strictly greater than
    /// the destination sample count
    ResolveContract {
        source: SampleCount,
        destination: SampleCount,
    },

    /// The swapchain failed to present
    PresentFailure(String),

    /// The device was lost; no auto-recreation is attempted
    DeviceLost(String),

    /// Backend-specific error (Vulkan, etc.)
    BackendError(String),

    /// Initialization failed (engine, device, subsystems)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ResourceCreation(msg) => write!(f, "Resource creation failed: {}", msg),
            Error::MissingSubState(slot) => {
                write!(f, "Pipeline descriptor finalized without required sub-state: {}", slot)
            }
            Error::DescriptorFinalized(slot) => {
                write!(f, "Cannot set {} on a finalized pipeline descriptor", slot)
            }
            Error::ResolveContract { source, destination } => write!(
                f,
                "Resolve contract violation: source {:?} must exceed destination {:?}",
                source, destination
            ),
            Error::PresentFailure(msg) => write!(f, "Present failed: {}", msg),
            Error::DeviceLost(msg) => write!(f, "Device lost: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
