//! Control-surface seam.
//!
//! The engine never talks to a widget toolkit. It pushes state through
//! [`ControlSurface`] and receives operator intent as [`SurfaceEvent`]s;
//! what renders the controls is the embedder's business. Surfaces are
//! passive sinks and must not call back into the engine from inside a
//! `set_*` method.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use ffbench_effects::{EffectKind, Octant, ParameterFlags};

/// One editable numeric control on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    /// Playback duration in whole seconds; the range maximum means infinite.
    Duration,
    Gain,
    SamplePeriod,
    ConstantMagnitude,
    RampStart,
    RampEnd,
    PeriodicMagnitude,
    PeriodicOffset,
    PeriodicPeriod,
    PeriodicPhase,
    ConditionDeadBand,
    ConditionOffset,
    ConditionPositiveCoefficient,
    ConditionNegativeCoefficient,
    ConditionPositiveSaturation,
    ConditionNegativeSaturation,
    EnvelopeAttackLevel,
    EnvelopeAttackTime,
    EnvelopeFadeLevel,
    EnvelopeFadeTime,
}

impl FieldId {
    /// Declared control range. Values pushed at the surface are clamped
    /// into it; operator input is taken as-is.
    pub fn range(self) -> RangeInclusive<i32> {
        match self {
            Self::Duration => 1..=10,
            Self::Gain => 0..=10_000,
            Self::SamplePeriod => 0..=100_000,
            Self::ConstantMagnitude => 0..=10_000,
            Self::RampStart | Self::RampEnd => -10_000..=10_000,
            Self::PeriodicMagnitude => 0..=10_000,
            Self::PeriodicOffset => -10_000..=10_000,
            Self::PeriodicPeriod => 0..=500_000,
            Self::PeriodicPhase => 0..=35_999,
            Self::ConditionDeadBand => 0..=10_000,
            Self::ConditionOffset => -10_000..=10_000,
            Self::ConditionPositiveCoefficient | Self::ConditionNegativeCoefficient => {
                -10_000..=10_000
            }
            Self::ConditionPositiveSaturation | Self::ConditionNegativeSaturation => 0..=10_000,
            Self::EnvelopeAttackLevel | Self::EnvelopeFadeLevel => 0..=10_000,
            Self::EnvelopeAttackTime | Self::EnvelopeFadeTime => 0..=5_000_000,
        }
    }

    /// Clamps a value into the declared range.
    pub fn clamp(self, value: i32) -> i32 {
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }

    /// Clamps an unsigned device value into the declared range.
    pub fn clamp_unsigned(self, value: u32) -> i32 {
        self.clamp(i32::try_from(value).unwrap_or(i32::MAX))
    }
}

/// Parameter categories whose controls are enabled or disabled wholesale,
/// depending on what the device statically supports for the selected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterGroup {
    Direction,
    Duration,
    Gain,
    SamplePeriod,
    Envelope,
}

impl ParameterGroup {
    pub const ALL: [Self; 5] = [
        Self::Direction,
        Self::Duration,
        Self::Gain,
        Self::SamplePeriod,
        Self::Envelope,
    ];

    /// The capability flag that gates this group.
    pub fn flag(self) -> ParameterFlags {
        match self {
            Self::Direction => ParameterFlags::DIRECTION,
            Self::Duration => ParameterFlags::DURATION,
            Self::Gain => ParameterFlags::GAIN,
            Self::SamplePeriod => ParameterFlags::SAMPLE_PERIOD,
            Self::Envelope => ParameterFlags::ENVELOPE,
        }
    }
}

/// Operator intent, as reported by the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A numeric control changed to `value`.
    FieldChanged { field: FieldId, value: i32 },
    /// A compass direction was picked.
    DirectionSelected(Octant),
    /// The envelope checkbox was toggled.
    EnvelopeToggled(bool),
    /// The condition axis of interest changed (zero-based).
    ConditionAxisSelected(usize),
    /// Another catalog entry was picked.
    EffectSelected(usize),
    /// The hosting window regained focus.
    WindowActivated,
    /// The hosting window is closing.
    WindowClosing,
}

/// Outbound half of the interactive surface.
pub trait ControlSurface {
    /// Replaces the selectable effect list.
    fn set_effect_list(&mut self, names: &[String]);
    fn set_selected_effect(&mut self, index: usize);
    fn set_value(&mut self, field: FieldId, value: i32);
    fn set_label(&mut self, field: FieldId, text: &str);
    fn set_direction(&mut self, octant: Octant);
    fn set_envelope_toggle(&mut self, enabled: bool);
    /// Highlights the condition axis of interest.
    fn set_condition_axis(&mut self, axis: usize);
    /// How many condition axes are selectable (1 or 2).
    fn set_condition_axis_choices(&mut self, count: usize);
    fn set_group_enabled(&mut self, group: ParameterGroup, enabled: bool);
    /// Shows the type-specific group for `kind` and hides the rest.
    /// `None` hides all of them.
    fn show_type_group(&mut self, kind: Option<EffectKind>);
}

/// Surface that records everything pushed at it.
///
/// Backs the engine tests and the demo shell; real embedders implement
/// [`ControlSurface`] against their toolkit instead.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub effect_names: Vec<String>,
    pub selected_effect: Option<usize>,
    pub values: HashMap<FieldId, i32>,
    pub labels: HashMap<FieldId, String>,
    pub direction: Option<Octant>,
    pub envelope_toggle: Option<bool>,
    pub condition_axis: Option<usize>,
    pub condition_axis_choices: Option<usize>,
    pub enabled_groups: HashMap<ParameterGroup, bool>,
    /// The type group currently shown, `None` when all are hidden.
    pub type_group: Option<EffectKind>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: FieldId) -> Option<i32> {
        self.values.get(&field).copied()
    }

    pub fn label(&self, field: FieldId) -> Option<&str> {
        self.labels.get(&field).map(String::as_str)
    }

    pub fn group_enabled(&self, group: ParameterGroup) -> bool {
        self.enabled_groups.get(&group).copied().unwrap_or(false)
    }
}

impl ControlSurface for RecordingSurface {
    fn set_effect_list(&mut self, names: &[String]) {
        self.effect_names = names.to_vec();
    }

    fn set_selected_effect(&mut self, index: usize) {
        self.selected_effect = Some(index);
    }

    fn set_value(&mut self, field: FieldId, value: i32) {
        self.values.insert(field, value);
    }

    fn set_label(&mut self, field: FieldId, text: &str) {
        self.labels.insert(field, text.to_owned());
    }

    fn set_direction(&mut self, octant: Octant) {
        self.direction = Some(octant);
    }

    fn set_envelope_toggle(&mut self, enabled: bool) {
        self.envelope_toggle = Some(enabled);
    }

    fn set_condition_axis(&mut self, axis: usize) {
        self.condition_axis = Some(axis);
    }

    fn set_condition_axis_choices(&mut self, count: usize) {
        self.condition_axis_choices = Some(count);
    }

    fn set_group_enabled(&mut self, group: ParameterGroup, enabled: bool) {
        self.enabled_groups.insert(group, enabled);
    }

    fn show_type_group(&mut self, kind: Option<EffectKind>) {
        self.type_group = kind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_is_inclusive_at_both_ends() {
        assert_eq!(FieldId::Gain.clamp(-5), 0);
        assert_eq!(FieldId::Gain.clamp(10_000), 10_000);
        assert_eq!(FieldId::Gain.clamp(15_000), 10_000);
        assert_eq!(FieldId::RampStart.clamp(-20_000), -10_000);
        assert_eq!(FieldId::Duration.clamp(0), 1);
    }

    #[test]
    fn unsigned_clamp_survives_values_past_i32() {
        assert_eq!(FieldId::EnvelopeAttackTime.clamp_unsigned(u32::MAX), 5_000_000);
        assert_eq!(FieldId::SamplePeriod.clamp_unsigned(99_999), 99_999);
    }

    #[test]
    fn phase_range_matches_device_units() {
        assert_eq!(FieldId::PeriodicPhase.range(), 0..=35_999);
    }

    #[test]
    fn every_group_maps_to_a_distinct_flag() {
        let mut seen = ParameterFlags::empty();
        for group in ParameterGroup::ALL {
            assert!(!seen.intersects(group.flag()));
            seen |= group.flag();
        }
    }

    #[test]
    fn recording_surface_keeps_the_latest_push() {
        let mut surface = RecordingSurface::new();
        surface.set_value(FieldId::Gain, 100);
        surface.set_value(FieldId::Gain, 200);
        surface.set_label(FieldId::Gain, "Effect Gain: 200");

        assert_eq!(surface.value(FieldId::Gain), Some(200));
        assert_eq!(surface.label(FieldId::Gain), Some("Effect Gain: 200"));
        assert!(!surface.group_enabled(ParameterGroup::Envelope));
    }
}
