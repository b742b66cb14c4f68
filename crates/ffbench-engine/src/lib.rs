//! Session engine for the force-feedback workbench.
//!
//! Wires the pieces together: picks a device ([`device`]), builds the
//! selectable effect catalog ([`catalog`]), and keeps the editable model,
//! the driver, and the control surface in step ([`sync`], [`workbench`]).
//! The engine is toolkit-agnostic; embedders implement
//! [`ControlSurface`] and feed operator intent in as [`SurfaceEvent`]s.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod catalog;
pub mod device;
pub mod error;
pub mod surface;
pub mod sync;
pub mod workbench;

pub use catalog::{CatalogPolicy, EffectDescriptor, build_catalog};
pub use device::{SelectedDevice, select_device};
pub use error::{ConfigStep, SetupError};
pub use surface::{ControlSurface, FieldId, ParameterGroup, RecordingSurface, SurfaceEvent};
pub use sync::{ParameterSynchronizer, RefreshGate, RefreshScope, SyncPhase};
pub use workbench::{Workbench, WorkbenchOptions};
