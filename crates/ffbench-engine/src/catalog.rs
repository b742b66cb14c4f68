//! Effect catalog construction.
//!
//! Turns the device's enumerated effect types into a list of selectable
//! descriptors, each holding a live effect created from the generic
//! template. Types the workbench cannot edit meaningfully are filtered out
//! before any driver object is created.

use ffbench_driver::{DriverError, DriverResult, EffectMetadata, FfDevice, FfEffect};
use ffbench_effects::{AxisOffset, EffectKind, ParameterFlags, generic_template};
use tracing::{debug, warn};

/// Which enumerated effect types the catalog admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogPolicy {
    /// Skip periodic effect types wholesale. On by default: enough driver
    /// stacks mishandle periodic parameter blocks that offering them is
    /// worse than hiding them.
    pub exclude_periodic: bool,
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self {
            exclude_periodic: true,
        }
    }
}

impl CatalogPolicy {
    /// Policy that admits periodic types as well.
    pub fn admitting_periodic() -> Self {
        Self {
            exclude_periodic: false,
        }
    }
}

/// One selectable effect: its metadata plus the live driver object.
pub struct EffectDescriptor {
    /// Driver-reported display name.
    pub name: String,
    pub kind: EffectKind,
    /// Parameter categories the device statically supports for this type.
    pub static_params: ParameterFlags,
    /// The created effect, alive until the descriptor is dropped.
    pub effect: Box<dyn FfEffect>,
}

impl std::fmt::Debug for EffectDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("static_params", &self.static_params)
            .finish_non_exhaustive()
    }
}

fn admitted(metadata: &EffectMetadata, policy: &CatalogPolicy) -> bool {
    match metadata.kind {
        // Custom forces need a waveform editor this workbench does not have.
        EffectKind::CustomForce => false,
        EffectKind::Periodic if policy.exclude_periodic => false,
        // Hardware-defined types are only usable when their parameter block
        // stays internal to the device.
        EffectKind::HardwareDefined => !metadata
            .static_params
            .contains(ParameterFlags::TYPE_SPECIFIC_PARAMS),
        _ => true,
    }
}

/// Builds one descriptor per admitted effect type, in enumeration order.
///
/// Each admitted type gets a live effect created from the generic template
/// over `axes`. An empty result is not an error here; the session layer
/// decides whether an empty catalog is fatal.
///
/// # Errors
///
/// Propagates enumeration and effect-creation failures.
pub fn build_catalog(
    device: &mut dyn FfDevice,
    axes: &[AxisOffset],
    policy: &CatalogPolicy,
) -> DriverResult<Vec<EffectDescriptor>> {
    let mut catalog = Vec::new();
    for metadata in device.effects()? {
        if !admitted(&metadata, policy) {
            debug!(name = %metadata.name, kind = ?metadata.kind, "effect type filtered out");
            continue;
        }

        let template = generic_template(axes, metadata.kind)
            .map_err(|err| DriverError::backend(err.to_string()))?;
        let effect = device.create_effect(metadata.type_id, &template)?;
        debug!(name = %metadata.name, kind = ?metadata.kind, "created live effect");

        catalog.push(EffectDescriptor {
            name: metadata.name,
            kind: metadata.kind,
            static_params: metadata.static_params,
            effect,
        });
    }

    if catalog.is_empty() {
        warn!("effect catalog is empty after filtering");
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use ffbench_driver::mock::MockDevice;

    use super::*;

    const BASIC: ParameterFlags = ParameterFlags::DURATION
        .union(ParameterFlags::GAIN)
        .union(ParameterFlags::DIRECTION)
        .union(ParameterFlags::TYPE_SPECIFIC_PARAMS);

    fn catalog_names(device: &mut MockDevice, policy: &CatalogPolicy) -> Vec<String> {
        let axes = vec![AxisOffset(0), AxisOffset(4)];
        build_catalog(device, &axes, policy)
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect()
    }

    #[test]
    fn default_policy_filters_periodic_and_custom() {
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0, 4])
            .with_effect(EffectMetadata::new("Sine Wave", EffectKind::Periodic, BASIC))
            .with_effect(EffectMetadata::new(
                "Custom Force",
                EffectKind::CustomForce,
                BASIC,
            ))
            .with_effect(EffectMetadata::new(
                "Constant Force",
                EffectKind::ConstantForce,
                BASIC,
            ));

        let names = catalog_names(&mut device, &CatalogPolicy::default());
        assert_eq!(names, vec!["Constant Force"]);
    }

    #[test]
    fn periodic_policy_can_be_lifted() {
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0])
            .with_effect(EffectMetadata::new("Sine Wave", EffectKind::Periodic, BASIC));

        let names = catalog_names(&mut device, &CatalogPolicy::admitting_periodic());
        assert_eq!(names, vec!["Sine Wave"]);
    }

    #[test]
    fn hardware_defined_admitted_only_without_parameter_block() {
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0])
            .with_effect(EffectMetadata::new(
                "Vendor Rumble",
                EffectKind::HardwareDefined,
                ParameterFlags::DURATION | ParameterFlags::GAIN,
            ))
            .with_effect(EffectMetadata::new(
                "Vendor Wave",
                EffectKind::HardwareDefined,
                BASIC,
            ));

        let names = catalog_names(&mut device, &CatalogPolicy::default());
        assert_eq!(names, vec!["Vendor Rumble"]);
    }

    #[test]
    fn descriptors_keep_capability_flags() {
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0, 4])
            .with_effect(EffectMetadata::new(
                "Spring",
                EffectKind::Condition,
                BASIC.union(ParameterFlags::ENVELOPE),
            ));

        let axes = vec![AxisOffset(0), AxisOffset(4)];
        let catalog = build_catalog(&mut device, &axes, &CatalogPolicy::default()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].kind, EffectKind::Condition);
        assert!(catalog[0].static_params.contains(ParameterFlags::ENVELOPE));
    }

    #[test]
    fn everything_filtered_yields_empty_catalog() {
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0])
            .with_effect(EffectMetadata::new(
                "Custom Force",
                EffectKind::CustomForce,
                BASIC,
            ));

        let axes = vec![AxisOffset(0)];
        let catalog = build_catalog(&mut device, &axes, &CatalogPolicy::default()).unwrap();
        assert!(catalog.is_empty());
    }
}
