//! Effect parameter blocks
//!
//! Field widths mirror the underlying driver ABI: magnitudes, offsets, and
//! coefficients are signed 32-bit device units in `-10000..=10000`; gain,
//! saturations, times, and phase are unsigned.

use serde::{Deserialize, Serialize};

use crate::constants::{GAIN_MAX, MICROS_PER_SECOND};

/// Data-format offset identifying one axis object on a device.
///
/// Offsets are opaque to the workbench; they are captured during axis
/// enumeration and echoed back verbatim in effect templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisOffset(pub u32);

/// The family an effect type belongs to.
///
/// Only the first four are ever surfaced for editing; `CustomForce` and
/// parameter-bearing `HardwareDefined` types are filtered out when the
/// catalog is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    ConstantForce,
    RampForce,
    Periodic,
    Condition,
    CustomForce,
    HardwareDefined,
}

/// Playback duration: a finite count of hardware time units (µs) or forever.
///
/// # Examples
///
/// ```
/// use ffbench_effects::EffectDuration;
///
/// let five = EffectDuration::from_seconds(5);
/// assert_eq!(five, EffectDuration::Micros(5_000_000));
/// assert_eq!(five.whole_seconds(), Some(5));
///
/// assert!(EffectDuration::Infinite.is_infinite());
/// assert_eq!(EffectDuration::Infinite.whole_seconds(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EffectDuration {
    #[default]
    Infinite,
    Micros(u32),
}

impl EffectDuration {
    /// Builds a finite duration from whole seconds, saturating at `u32::MAX` µs.
    pub fn from_seconds(seconds: u32) -> Self {
        Self::Micros(seconds.saturating_mul(MICROS_PER_SECOND))
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// The duration in microseconds, or `None` when infinite.
    pub fn as_micros(self) -> Option<u32> {
        match self {
            Self::Infinite => None,
            Self::Micros(us) => Some(us),
        }
    }

    /// The duration in whole seconds (truncating), or `None` when infinite.
    pub fn whole_seconds(self) -> Option<u32> {
        self.as_micros().map(|us| us / MICROS_PER_SECOND)
    }
}

/// Attack/fade shaping applied to an effect's magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// Starting level, `0..=10000`.
    pub attack_level: u32,
    /// Time to ramp from the attack level to full magnitude, in µs.
    pub attack_time_us: u32,
    /// Ending level, `0..=10000`.
    pub fade_level: u32,
    /// Time to ramp from full magnitude to the fade level, in µs.
    pub fade_time_us: u32,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attack(mut self, level: u32, time_us: u32) -> Self {
        self.attack_level = level;
        self.attack_time_us = time_us;
        self
    }

    pub fn with_fade(mut self, level: u32, time_us: u32) -> Self {
        self.fade_level = level;
        self.fade_time_us = time_us;
        self
    }
}

/// Spring/damper/friction/inertia response for a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisCondition {
    /// Center point the condition acts around, `-10000..=10000`.
    pub offset: i32,
    /// Region around the offset producing no force, `0..=10000`.
    pub dead_band: i32,
    /// Response on the positive side of the offset, `-10000..=10000`.
    pub positive_coefficient: i32,
    /// Response on the negative side of the offset, `-10000..=10000`.
    pub negative_coefficient: i32,
    /// Force cap on the positive side, `0..=10000`.
    pub positive_saturation: u32,
    /// Force cap on the negative side, `0..=10000`.
    pub negative_saturation: u32,
}

/// The parameter block specific to one effect family.
///
/// Condition effects carry one element per axis; drivers that share a single
/// block across axes report fewer elements, which the synchronizer expands
/// before editing (see the engine crate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeSpecific {
    Constant {
        /// Force magnitude, `-10000..=10000`.
        magnitude: i32,
    },
    Ramp {
        /// Magnitude at the start of playback, `-10000..=10000`.
        start: i32,
        /// Magnitude at the end of playback, `-10000..=10000`.
        end: i32,
    },
    Periodic {
        /// Wave amplitude, `0..=10000`.
        magnitude: u32,
        /// Baseline the wave oscillates around, `-10000..=10000`.
        offset: i32,
        /// Wave period in µs.
        period_us: u32,
        /// Starting point in the wave, `0..=35999` hundredths of a degree.
        phase: u32,
    },
    Condition(Vec<AxisCondition>),
}

impl TypeSpecific {
    /// The effect family this block belongs to.
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::Constant { .. } => EffectKind::ConstantForce,
            Self::Ramp { .. } => EffectKind::RampForce,
            Self::Periodic { .. } => EffectKind::Periodic,
            Self::Condition(_) => EffectKind::Condition,
        }
    }

    /// A zeroed block for the given family, or `None` for families that
    /// carry no type-specific data.
    pub fn zeroed(kind: EffectKind, axis_count: usize) -> Option<Self> {
        match kind {
            EffectKind::ConstantForce => Some(Self::Constant { magnitude: 0 }),
            EffectKind::RampForce => Some(Self::Ramp { start: 0, end: 0 }),
            EffectKind::Periodic => Some(Self::Periodic {
                magnitude: 0,
                offset: 0,
                period_us: 0,
                phase: 0,
            }),
            EffectKind::Condition => {
                Some(Self::Condition(vec![AxisCondition::default(); axis_count]))
            }
            EffectKind::CustomForce | EffectKind::HardwareDefined => None,
        }
    }
}

/// The complete editable state of one live effect.
///
/// `direction` always has one component per device axis. `type_specific` is
/// `None` only for hardware-defined effects that advertise no parameter
/// block of their own.
///
/// # Examples
///
/// ```
/// use ffbench_effects::{EffectDuration, EffectParameters, TypeSpecific};
///
/// let params = EffectParameters::new()
///     .with_duration(EffectDuration::from_seconds(3))
///     .with_gain(7_500)
///     .with_direction(vec![2, 0])
///     .with_type_specific(TypeSpecific::Constant { magnitude: 5_000 });
///
/// assert_eq!(params.duration.whole_seconds(), Some(3));
/// assert_eq!(params.gain, 7_500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectParameters {
    pub duration: EffectDuration,
    /// Overall gain, `0..=10000`.
    pub gain: u32,
    /// Sample period in µs; `0` asks for the driver default.
    pub sample_period_us: u32,
    /// Cartesian direction components, one per axis.
    pub direction: Vec<i32>,
    /// Whether the envelope is applied at all.
    pub uses_envelope: bool,
    pub envelope: Envelope,
    pub type_specific: Option<TypeSpecific>,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            duration: EffectDuration::Infinite,
            gain: GAIN_MAX,
            sample_period_us: 0,
            direction: Vec::new(),
            uses_envelope: false,
            envelope: Envelope::default(),
            type_specific: None,
        }
    }
}

impl EffectParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: EffectDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_gain(mut self, gain: u32) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_sample_period(mut self, period_us: u32) -> Self {
        self.sample_period_us = period_us;
        self
    }

    pub fn with_direction(mut self, direction: Vec<i32>) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_envelope(mut self, uses_envelope: bool, envelope: Envelope) -> Self {
        self.uses_envelope = uses_envelope;
        self.envelope = envelope;
        self
    }

    pub fn with_type_specific(mut self, block: TypeSpecific) -> Self {
        self.type_specific = Some(block);
        self
    }

    /// The family of the type-specific block, if one is present.
    pub fn kind(&self) -> Option<EffectKind> {
        self.type_specific.as_ref().map(TypeSpecific::kind)
    }
}
