//! Generic effect creation templates
//!
//! A template is the creation-time seed for a live effect: every array
//! field is sized to the device's axis count and every scalar takes the
//! least surprising default (play forever, full gain, driver-default sample
//! rate, no trigger). It is never re-read after the effect exists; edits go
//! through the synchronizer instead.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SAMPLE_PERIOD_US, GAIN_MAX, MAX_FEEDBACK_AXES};
use crate::flags::CoordinateSpec;
use crate::params::{AxisCondition, AxisOffset, EffectDuration, EffectKind};

/// Template validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// No axes to address.
    #[error("an effect template requires at least one actuator axis")]
    NoAxes,

    /// More axes than any effect here can address.
    #[error("effect templates address at most {max} axes, got {got}")]
    TooManyAxes { got: usize, max: usize },
}

/// Creation-time description of an effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectTemplate {
    pub kind: EffectKind,
    pub duration: EffectDuration,
    /// Overall gain, `0..=10000`.
    pub gain: u32,
    /// Sample period in µs; `0` asks for the driver default.
    pub sample_period_us: u32,
    /// Button object that triggers playback, or `None` for untriggered.
    pub trigger_button: Option<u32>,
    /// Delay between trigger repeats.
    pub trigger_repeat_interval: EffectDuration,
    /// How the axis list and direction vector are interpreted.
    pub coordinates: CoordinateSpec,
    /// The axes the effect drives, by data-format offset.
    pub axes: Vec<AxisOffset>,
    /// Cartesian direction components, one per axis.
    pub direction: Vec<i32>,
    /// Per-axis condition seed, one element per axis.
    pub condition: Vec<AxisCondition>,
}

impl EffectTemplate {
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }
}

/// Builds the generic template used for every catalog entry.
///
/// The direction vector and condition array are zeroed and sized to the
/// axis list; duration is infinite, gain is full scale, and the coordinate
/// flags request cartesian components addressed by data-format offset.
///
/// # Examples
///
/// ```
/// use ffbench_effects::{AxisOffset, EffectKind, generic_template};
///
/// let axes = [AxisOffset(0), AxisOffset(4)];
/// let template = generic_template(&axes, EffectKind::ConstantForce).unwrap();
///
/// assert_eq!(template.direction, vec![0, 0]);
/// assert_eq!(template.condition.len(), 2);
/// assert!(template.duration.is_infinite());
/// assert_eq!(template.gain, 10_000);
/// ```
///
/// # Errors
///
/// Fails when `axes` is empty or longer than [`MAX_FEEDBACK_AXES`].
pub fn generic_template(
    axes: &[AxisOffset],
    kind: EffectKind,
) -> Result<EffectTemplate, TemplateError> {
    if axes.is_empty() {
        return Err(TemplateError::NoAxes);
    }
    if axes.len() > MAX_FEEDBACK_AXES {
        return Err(TemplateError::TooManyAxes {
            got: axes.len(),
            max: MAX_FEEDBACK_AXES,
        });
    }

    Ok(EffectTemplate {
        kind,
        duration: EffectDuration::Infinite,
        gain: GAIN_MAX,
        sample_period_us: DEFAULT_SAMPLE_PERIOD_US,
        trigger_button: None,
        trigger_repeat_interval: EffectDuration::Infinite,
        coordinates: CoordinateSpec::CARTESIAN | CoordinateSpec::OBJECT_OFFSETS,
        axes: axes.to_vec(),
        direction: vec![0; axes.len()],
        condition: vec![AxisCondition::default(); axes.len()],
    })
}
