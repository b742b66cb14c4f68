//! Device discovery command

use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;

use ffbench_driver::{AxisObjectFilter, DeviceFilter, FfDriver};

use crate::output;
use crate::rig;

/// One enumerated device and what negotiation would make of it.
#[derive(Debug, Serialize)]
pub struct ProbedDevice {
    pub name: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: String,
    pub actuator_axes: usize,
    pub total_axes: usize,
    pub effect_types: usize,
    /// Whether device selection would consider this candidate.
    pub eligible: bool,
}

/// Enumerate the simulated devices and report their capabilities.
pub fn execute(axes: u8, json: bool) -> Result<()> {
    let driver = rig::simulated_driver(axes, false);
    let report = probe_devices(&driver)?;
    output::print_probe_report(&report, json);
    Ok(())
}

fn probe_devices(driver: &dyn FfDriver) -> Result<Vec<ProbedDevice>> {
    let shortlisted: HashSet<String> = driver
        .devices(
            DeviceFilter::game_controllers()
                .attached_only()
                .force_feedback(),
        )?
        .iter()
        .map(|device| device.info().path.clone())
        .collect();

    let mut report = Vec::new();
    for device in driver.devices(DeviceFilter::all())? {
        let info = device.info();
        let actuator_axes = device.axis_objects(AxisObjectFilter::Actuators)?.len();
        report.push(ProbedDevice {
            name: info.display_name(),
            vendor_id: info.vendor_id,
            product_id: info.product_id,
            path: info.path.clone(),
            actuator_axes,
            total_axes: device.axis_objects(AxisObjectFilter::AllAxes)?.len(),
            effect_types: device.effects()?.len(),
            eligible: actuator_axes > 0 && shortlisted.contains(&info.path),
        });
    }
    Ok(report)
}
