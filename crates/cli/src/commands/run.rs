//! Scripted demo session command

use anyhow::Result;
use colored::*;
use serde_json::json;
use tracing::debug;

use ffbench_driver::WindowHandle;
use ffbench_effects::Octant;
use ffbench_engine::{FieldId, RecordingSurface, SurfaceEvent, Workbench};

use crate::output;
use crate::rig;

/// Replay the demo script through a live session and report the recorded
/// surface state.
pub fn execute(axes: u8, flaky: bool, json: bool) -> Result<()> {
    let driver = rig::simulated_driver(axes, flaky);
    let mut bench = Workbench::new(&driver, WindowHandle::NONE, RecordingSurface::new())?;
    let device_name = bench.device_info().display_name();
    debug!(device = %device_name, axes = bench.axis_count(), flaky, "replaying demo script");

    let mut transcript = Vec::new();
    for event in demo_script(bench.axis_count()) {
        let line = describe(&event);
        if !json {
            println!("{} {}", "▶".cyan(), line);
        }
        bench.handle_event(event)?;
        transcript.push(line);
    }

    if json {
        let report = json!({
            "success": true,
            "device": device_name,
            "axes": bench.axis_count(),
            "events": transcript,
            "surface": output::surface_value(bench.surface()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        output::print_surface_human(bench.surface());
    }
    Ok(())
}

/// A tour through the catalog: tune the constant force, shape its
/// envelope, sweep a ramp, then park on the spring and inspect the second
/// condition axis. Ends by closing the session.
fn demo_script(axis_count: usize) -> Vec<SurfaceEvent> {
    let mut script = vec![
        SurfaceEvent::FieldChanged {
            field: FieldId::Gain,
            value: 7_500,
        },
        SurfaceEvent::FieldChanged {
            field: FieldId::Duration,
            value: 4,
        },
        SurfaceEvent::FieldChanged {
            field: FieldId::ConstantMagnitude,
            value: 6_000,
        },
        SurfaceEvent::DirectionSelected(Octant::NorthEast),
        SurfaceEvent::EnvelopeToggled(true),
        SurfaceEvent::FieldChanged {
            field: FieldId::EnvelopeAttackLevel,
            value: 2_500,
        },
        SurfaceEvent::FieldChanged {
            field: FieldId::EnvelopeAttackTime,
            value: 500_000,
        },
        SurfaceEvent::EffectSelected(1),
        SurfaceEvent::FieldChanged {
            field: FieldId::RampStart,
            value: -8_000,
        },
        SurfaceEvent::FieldChanged {
            field: FieldId::RampEnd,
            value: 8_000,
        },
        SurfaceEvent::EffectSelected(2),
        SurfaceEvent::FieldChanged {
            field: FieldId::ConditionOffset,
            value: 1_200,
        },
        SurfaceEvent::FieldChanged {
            field: FieldId::ConditionPositiveCoefficient,
            value: 5_000,
        },
    ];
    if axis_count > 1 {
        script.push(SurfaceEvent::ConditionAxisSelected(1));
    }
    script.push(SurfaceEvent::WindowClosing);
    script
}

fn describe(event: &SurfaceEvent) -> String {
    match event {
        SurfaceEvent::FieldChanged { field, value } => format!("set {field:?} to {value}"),
        SurfaceEvent::DirectionSelected(octant) => format!("point {octant:?}"),
        SurfaceEvent::EnvelopeToggled(true) => "enable envelope".to_string(),
        SurfaceEvent::EnvelopeToggled(false) => "disable envelope".to_string(),
        SurfaceEvent::ConditionAxisSelected(axis) => {
            format!("inspect condition axis {}", axis + 1)
        }
        SurfaceEvent::EffectSelected(index) => format!("select effect {index}"),
        SurfaceEvent::WindowActivated => "activate window".to_string(),
        SurfaceEvent::WindowClosing => "close window".to_string(),
    }
}
