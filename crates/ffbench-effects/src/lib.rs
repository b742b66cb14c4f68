//! Force feedback effect parameter model
//!
//! This crate provides the device-neutral types the workbench edits: effect
//! kinds, parameter blocks, flag sets, the compass-octant direction codec,
//! and the generic creation template. It performs no I/O and knows nothing
//! about any concrete driver.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod constants;
pub mod flags;
pub mod octant;
pub mod params;
pub mod template;

pub use constants::*;
pub use flags::{CoordinateSpec, ParameterFlags};
pub use octant::Octant;
pub use params::{
    AxisCondition, AxisOffset, EffectDuration, EffectKind, EffectParameters, Envelope,
    TypeSpecific,
};
pub use template::{EffectTemplate, TemplateError, generic_template};
