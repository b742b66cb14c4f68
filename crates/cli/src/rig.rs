//! Simulated bench hardware for the demo commands
//!
//! Every subcommand runs against this rig. Platform driver backends are
//! wired in by embedders; the binary exists to exercise the engine.

use ffbench_driver::EffectMetadata;
use ffbench_driver::mock::{MockDevice, MockDriver};
use ffbench_effects::{EffectKind, ParameterFlags};

const FULL: ParameterFlags = ParameterFlags::DURATION
    .union(ParameterFlags::SAMPLE_PERIOD)
    .union(ParameterFlags::GAIN)
    .union(ParameterFlags::DIRECTION)
    .union(ParameterFlags::ENVELOPE)
    .union(ParameterFlags::TYPE_SPECIFIC_PARAMS);

const CONDITION_ONLY: ParameterFlags = ParameterFlags::DURATION
    .union(ParameterFlags::SAMPLE_PERIOD)
    .union(ParameterFlags::GAIN)
    .union(ParameterFlags::TYPE_SPECIFIC_PARAMS);

const PRESET: ParameterFlags = ParameterFlags::DURATION.union(ParameterFlags::GAIN);

/// Builds the simulated environment: one force-feedback wheelbase plus two
/// devices the workbench must skip during negotiation.
pub fn simulated_driver(axes: u8, flaky: bool) -> MockDriver {
    MockDriver::new()
        .with_device(wheelbase(axes, flaky))
        .with_device(rumble_pad())
        .with_device(stowed_wheelbase())
}

/// The eligible device. Advertises the full enumeration spread so catalog
/// filtering has something to chew on, and shares one condition block
/// across axes the way many drivers do.
fn wheelbase(axes: u8, flaky: bool) -> MockDevice {
    let offsets: &[u32] = if axes >= 2 { &[0, 4] } else { &[0] };

    let mut device = MockDevice::new("Apex Wheelbase")
        .with_ids(0x046d, 0xc262)
        .with_actuator_axes(offsets)
        .with_axes(&[(8, false)])
        .reporting_condition_elements(1)
        .with_effect(EffectMetadata::new(
            "Constant Force",
            EffectKind::ConstantForce,
            FULL,
        ))
        .with_effect(EffectMetadata::new("Ramp Force", EffectKind::RampForce, FULL))
        .with_effect(EffectMetadata::new("Spring", EffectKind::Condition, CONDITION_ONLY))
        .with_effect(EffectMetadata::new("Damper", EffectKind::Condition, CONDITION_ONLY))
        .with_effect(EffectMetadata::new("Sine Wave", EffectKind::Periodic, FULL))
        .with_effect(EffectMetadata::new(
            "Preset Rumble",
            EffectKind::HardwareDefined,
            PRESET,
        ))
        .with_effect(EffectMetadata::new(
            "Custom Force",
            EffectKind::CustomForce,
            FULL,
        ));

    if flaky {
        device = device.rejecting_writes(ParameterFlags::GAIN | ParameterFlags::DIRECTION);
    }

    device
}

/// Attached game controller without a force actuator.
fn rumble_pad() -> MockDevice {
    MockDevice::new("Rumble Pad")
        .with_ids(0x054c, 0x0ce6)
        .with_axes(&[(0, false), (4, false)])
        .without_force_feedback()
}

/// Force-feedback capable but currently unplugged.
fn stowed_wheelbase() -> MockDevice {
    MockDevice::new("Stowed Wheelbase")
        .with_ids(0x044f, 0xb66e)
        .with_actuator_axes(&[0, 4])
        .detached()
}
