//! Haptic device driver seam
//!
//! This crate defines the traits the workbench consumes a force-feedback
//! driver through, the typed errors those traits report, and a scriptable
//! simulated backend (`mock`) used by tests and the demo shell. No platform
//! driver lives here.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
pub mod ff_traits;

pub use device_info::*;
pub use ff_traits::*;

use thiserror::Error;

/// Failures reported by a force-feedback driver.
///
/// The workbench's recovery policy hangs off the variant: a [`Rejected`]
/// write is absorbed and the authoritative state re-read, while
/// [`DeviceLost`] always propagates.
///
/// [`Rejected`]: DriverError::Rejected
/// [`DeviceLost`]: DriverError::DeviceLost
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The driver refused a parameter combination for a hardware-specific
    /// reason that cannot be interpreted generically.
    #[error("parameter write rejected by driver: {reason}")]
    Rejected { reason: String },

    /// The device went away or access to it was revoked.
    #[error("device access lost")]
    DeviceLost,

    /// The operation requires the device to be acquired first.
    #[error("operation requires an acquired device")]
    NotAcquired,

    /// Any other driver-side failure.
    #[error("driver failure: {0}")]
    Backend(String),
}

impl DriverError {
    /// Create a rejection with the driver's stated reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        DriverError::Rejected {
            reason: reason.into(),
        }
    }

    /// Create a generic backend failure.
    pub fn backend(message: impl Into<String>) -> Self {
        DriverError::Backend(message.into())
    }

    /// Whether this is a recoverable parameter-write rejection.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DriverError::Rejected { .. } | DriverError::NotAcquired
        )
    }

    /// Whether the device itself is gone. Never absorbed by callers.
    pub fn is_device_lost(&self) -> bool {
        matches!(self, DriverError::DeviceLost)
    }
}

pub type DriverResult<T> = Result<T, DriverError>;
