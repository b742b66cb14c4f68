//! Effect catalog command

use anyhow::Result;
use serde::Serialize;

use ffbench_driver::{FfDevice, WindowHandle};
use ffbench_effects::AxisOffset;
use ffbench_engine::{CatalogPolicy, build_catalog, select_device};

use crate::output;
use crate::rig;

/// One enumerated effect type and whether the catalog admitted it.
#[derive(Debug, Serialize)]
pub struct CatalogRow {
    pub name: String,
    pub kind: String,
    pub type_id: u64,
    pub supports: Vec<&'static str>,
    pub admitted: bool,
}

/// List the selected device's effect enumeration with admission results.
pub fn execute(axes: u8, all: bool, json: bool) -> Result<()> {
    let policy = if all {
        CatalogPolicy::admitting_periodic()
    } else {
        CatalogPolicy::default()
    };

    let driver = rig::simulated_driver(axes, false);
    let mut selected = select_device(&driver, WindowHandle::NONE)?;
    let device_name = selected.device.info().display_name();
    let rows = catalog_rows(selected.device.as_mut(), &selected.axes, &policy)?;
    output::print_catalog(&device_name, &rows, json);
    Ok(())
}

fn catalog_rows(
    device: &mut dyn FfDevice,
    axes: &[AxisOffset],
    policy: &CatalogPolicy,
) -> Result<Vec<CatalogRow>> {
    let enumerated = device.effects()?;
    let admitted = build_catalog(device, axes, policy)?;

    // The catalog is an in-order subsequence of the enumeration, so one
    // forward pass pairs them up.
    let mut remaining = admitted.iter().peekable();
    let rows = enumerated
        .into_iter()
        .map(|metadata| {
            let is_admitted = matches!(
                remaining.peek(),
                Some(descriptor)
                    if descriptor.name == metadata.name && descriptor.kind == metadata.kind
            );
            if is_admitted {
                remaining.next();
            }
            CatalogRow {
                name: metadata.name,
                kind: output::kind_name(metadata.kind).to_string(),
                type_id: metadata.type_id.0,
                supports: output::flag_names(metadata.static_params),
                admitted: is_admitted,
            }
        })
        .collect();
    Ok(rows)
}
