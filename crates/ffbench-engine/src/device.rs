//! Device selection and mandatory configuration.
//!
//! Enumerates attached force-feedback game controllers, accepts the first
//! one that exposes at least one actuator axis, and walks it through the
//! configuration sequence every session requires: auto-center off, joystick
//! data format, exclusive foreground cooperative access.

use ffbench_driver::{
    AxisObjectFilter, CooperativeLevel, DataFormat, DeviceFilter, FfDevice, FfDriver, WindowHandle,
};
use ffbench_effects::{AxisOffset, MAX_FEEDBACK_AXES};
use tracing::{debug, info};

use crate::error::{ConfigStep, SetupError};

/// An accepted, configured device together with its recorded actuator axes.
///
/// `axes` holds at most [`MAX_FEEDBACK_AXES`] offsets, in enumeration order.
/// Every effect template built for this device spans exactly these axes.
pub struct SelectedDevice {
    /// The device, already configured and ready for catalog construction.
    pub device: Box<dyn FfDevice>,
    /// Actuator axis offsets, capped at the supported maximum.
    pub axes: Vec<AxisOffset>,
}

impl SelectedDevice {
    /// Number of recorded actuator axes (1 or 2).
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }
}

/// Selects and configures the first usable force-feedback device.
///
/// Candidates are enumerated with the attached, force-feedback, game
/// controller filter. A candidate with no actuator axes is skipped; the
/// first one with at least one actuator wins and is configured in place.
///
/// # Errors
///
/// [`SetupError::NoSuitableDevice`] when every candidate lacks actuator
/// axes, [`SetupError::DeviceConfig`] when the accepted device refuses a
/// configuration step, and [`SetupError::Driver`] for enumeration failures.
pub fn select_device(
    driver: &dyn FfDriver,
    window: WindowHandle,
) -> Result<SelectedDevice, SetupError> {
    let filter = DeviceFilter::game_controllers()
        .attached_only()
        .force_feedback();
    let candidates = driver.devices(filter)?;
    let candidate_count = candidates.len();

    for (index, mut device) in candidates.into_iter().enumerate() {
        let axes: Vec<AxisOffset> = device
            .axis_objects(AxisObjectFilter::Actuators)?
            .into_iter()
            .take(MAX_FEEDBACK_AXES)
            .collect();
        if axes.is_empty() {
            debug!(
                candidate = index,
                name = %device.info().display_name(),
                "candidate exposes no actuator axes, skipping"
            );
            continue;
        }

        info!(
            name = %device.info().display_name(),
            axes = axes.len(),
            "selected force-feedback device"
        );
        configure(device.as_mut(), window)?;
        return Ok(SelectedDevice { device, axes });
    }

    debug!(candidates = candidate_count, "no candidate exposed an actuator axis");
    Err(SetupError::NoSuitableDevice)
}

/// Runs the mandatory configuration sequence on an accepted device. Each
/// step is fatal on refusal and is reported with its [`ConfigStep`].
fn configure(device: &mut dyn FfDevice, window: WindowHandle) -> Result<(), SetupError> {
    device
        .set_auto_center(false)
        .map_err(|source| SetupError::config(ConfigStep::AutoCenter, source))?;
    device
        .set_data_format(DataFormat::Joystick)
        .map_err(|source| SetupError::config(ConfigStep::DataFormat, source))?;
    device
        .set_cooperative_level(
            window,
            CooperativeLevel::EXCLUSIVE | CooperativeLevel::FOREGROUND,
        )
        .map_err(|source| SetupError::config(ConfigStep::CooperativeLevel, source))?;
    debug!("device configured: auto-center off, joystick format, exclusive foreground");
    Ok(())
}
