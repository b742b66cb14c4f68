//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use serde_json::json;
use std::collections::BTreeMap;

use ffbench_effects::{EffectKind, ParameterFlags};
use ffbench_engine::{ParameterGroup, RecordingSurface};

use crate::commands::effects::CatalogRow;
use crate::commands::probe::ProbedDevice;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format, with the source chain
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Print the device enumeration in the requested format
pub fn print_probe_report(devices: &[ProbedDevice], json: bool) {
    if json {
        let output = json!({
            "success": true,
            "devices": devices
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format probe report as JSON: {e}"),
        }
    } else {
        if devices.is_empty() {
            println!("{}", "No devices found".yellow());
            return;
        }

        println!("{}", "Simulated devices:".bold());
        for device in devices {
            print_probed_device(device);
        }
    }
}

fn print_probed_device(device: &ProbedDevice) {
    let marker = if device.eligible {
        "●".green()
    } else {
        "○".red()
    };
    println!(
        "  {} {} ({:04x}:{:04x})",
        marker,
        device.name.bold(),
        device.vendor_id,
        device.product_id
    );
    println!("      Path: {}", device.path.dimmed());
    println!(
        "      Axes: {} actuator / {} total",
        device.actuator_axes, device.total_axes
    );
    println!("      Effect types: {}", device.effect_types);
    println!(
        "      Workbench eligible: {}",
        if device.eligible {
            "yes".green()
        } else {
            "no".red()
        }
    );
}

/// Print the effect catalog in the requested format
pub fn print_catalog(device: &str, rows: &[CatalogRow], json: bool) {
    if json {
        let output = json!({
            "success": true,
            "device": device,
            "effects": rows
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format catalog as JSON: {e}"),
        }
    } else {
        println!("{} {}", "Effect catalog for".bold(), device.bold());
        for row in rows {
            if row.admitted {
                println!(
                    "  {} {} ({}) supports {}",
                    "✓".green(),
                    row.name,
                    row.kind.cyan(),
                    row.supports.join(", ")
                );
            } else {
                println!(
                    "  {} {} ({}) {}",
                    "✗".yellow(),
                    row.name.dimmed(),
                    row.kind.dimmed(),
                    "filtered".yellow()
                );
            }
        }
    }
}

/// Print the recorded surface state after a demo run
pub fn print_surface_human(surface: &RecordingSurface) {
    println!("{}", "Recorded surface state:".bold());
    println!("  Effects: {}", surface.effect_names.join(", "));

    match surface.selected_effect {
        Some(index) => match surface.effect_names.get(index) {
            Some(name) => println!("  Selected: {} ({})", index, name.bold()),
            None => println!("  Selected: {index}"),
        },
        None => println!("  Selected: {}", "none".dimmed()),
    }

    match surface.type_group {
        Some(kind) => println!("  Type group: {}", kind_name(kind).cyan()),
        None => println!("  Type group: {}", "hidden".dimmed()),
    }

    if let Some(direction) = surface.direction {
        println!("  Direction: {direction:?}");
    }
    if let Some(enabled) = surface.envelope_toggle {
        println!(
            "  Envelope: {}",
            if enabled { "on".green() } else { "off".red() }
        );
    }
    if let (Some(axis), Some(choices)) = (surface.condition_axis, surface.condition_axis_choices) {
        println!("  Condition axis: {} of {}", axis + 1, choices);
    }

    print!("  Groups:");
    for group in ParameterGroup::ALL {
        let mark = if surface.group_enabled(group) {
            "✓".green()
        } else {
            "✗".red()
        };
        print!(" {group:?} {mark}");
    }
    println!();

    let mut labels: Vec<&str> = surface.labels.values().map(String::as_str).collect();
    labels.sort_unstable();
    if !labels.is_empty() {
        println!("  Labels:");
        for label in labels {
            println!("    {label}");
        }
    }
}

/// The surface state as a JSON value, with deterministic key order
pub fn surface_value(surface: &RecordingSurface) -> serde_json::Value {
    let groups: BTreeMap<String, bool> = ParameterGroup::ALL
        .into_iter()
        .map(|group| (format!("{group:?}"), surface.group_enabled(group)))
        .collect();
    let values: BTreeMap<String, i32> = surface
        .values
        .iter()
        .map(|(field, value)| (format!("{field:?}"), *value))
        .collect();
    let labels: BTreeMap<String, &str> = surface
        .labels
        .iter()
        .map(|(field, text)| (format!("{field:?}"), text.as_str()))
        .collect();

    json!({
        "effects": surface.effect_names,
        "selected": surface.selected_effect,
        "type_group": surface.type_group.map(kind_name),
        "direction": surface.direction.map(|octant| format!("{octant:?}")),
        "envelope": surface.envelope_toggle,
        "condition_axis": surface.condition_axis,
        "condition_axis_choices": surface.condition_axis_choices,
        "groups": groups,
        "values": values,
        "labels": labels,
    })
}

/// Human-readable effect kind name
pub fn kind_name(kind: EffectKind) -> &'static str {
    match kind {
        EffectKind::ConstantForce => "constant force",
        EffectKind::RampForce => "ramp force",
        EffectKind::Periodic => "periodic",
        EffectKind::Condition => "condition",
        EffectKind::CustomForce => "custom force",
        EffectKind::HardwareDefined => "hardware defined",
    }
}

/// Names of the parameter categories set in `flags`, in ABI bit order
pub fn flag_names(flags: ParameterFlags) -> Vec<&'static str> {
    let mut names = Vec::new();
    for (flag, name) in [
        (ParameterFlags::DURATION, "duration"),
        (ParameterFlags::SAMPLE_PERIOD, "sample period"),
        (ParameterFlags::GAIN, "gain"),
        (ParameterFlags::DIRECTION, "direction"),
        (ParameterFlags::ENVELOPE, "envelope"),
        (ParameterFlags::TYPE_SPECIFIC_PARAMS, "type-specific"),
    ] {
        if flags.contains(flag) {
            names.push(name);
        }
    }
    names
}
