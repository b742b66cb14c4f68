//! Live-effect parameter synchronization.
//!
//! Every edit follows the same read/modify/write loop: read the
//! authoritative parameters back from the driver, overlay the edit, write
//! the result with a restart request. Drivers are free to reject any write,
//! so the loop never trusts its own copy after a refusal.

use std::cell::Cell;

use ffbench_driver::{DriverResult, FfEffect};
use ffbench_effects::{
    AxisCondition, CoordinateSpec, EffectDuration, EffectKind, EffectParameters, Envelope,
    ParameterFlags, RAMP_FALLBACK_DURATION_US, TypeSpecific,
};
use tracing::debug;

/// Whether the engine is currently pushing programmatic refreshes at the
/// surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Refreshing,
}

/// Re-entrancy gate around surface refreshes.
///
/// Pushing values into a surface makes interactive surfaces echo change
/// events back. While the gate reads `Refreshing`, edit handling
/// short-circuits so those echoes never turn into device writes.
#[derive(Debug)]
pub struct RefreshGate {
    phase: Cell<SyncPhase>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self {
            phase: Cell::new(SyncPhase::Idle),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase.get()
    }

    pub fn is_refreshing(&self) -> bool {
        self.phase.get() == SyncPhase::Refreshing
    }

    /// Enters `Refreshing` until the returned scope drops. Nested scopes
    /// restore the phase they observed, so the gate ends up `Idle` again on
    /// any exit path.
    pub fn enter(&self) -> RefreshScope<'_> {
        let previous = self.phase.replace(SyncPhase::Refreshing);
        RefreshScope {
            gate: self,
            previous,
        }
    }
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope token returned by [`RefreshGate::enter`].
#[must_use = "dropping the scope immediately reopens the gate"]
pub struct RefreshScope<'a> {
    gate: &'a RefreshGate,
    previous: SyncPhase,
}

impl Drop for RefreshScope<'_> {
    fn drop(&mut self) {
        self.gate.phase.set(self.previous);
    }
}

/// Read/modify/write loop between the editable model and one live effect.
///
/// The synchronizer is stateless apart from the refresh gate and the axis
/// count recorded at device selection; it can serve every effect in the
/// catalog.
#[derive(Debug)]
pub struct ParameterSynchronizer {
    axis_count: usize,
    gate: RefreshGate,
}

impl ParameterSynchronizer {
    pub fn new(axis_count: usize) -> Self {
        Self {
            axis_count,
            gate: RefreshGate::new(),
        }
    }

    pub fn axis_count(&self) -> usize {
        self.axis_count
    }

    pub fn gate(&self) -> &RefreshGate {
        &self.gate
    }

    /// Reads authoritative parameters, expanding shared condition blocks to
    /// one element per recorded axis.
    ///
    /// Some drivers report a single condition element that applies to every
    /// axis. The first element is replicated so the editable model always
    /// carries one element per axis.
    pub fn read(&self, effect: &dyn FfEffect) -> DriverResult<EffectParameters> {
        let mut params =
            effect.parameters(CoordinateSpec::CARTESIAN | CoordinateSpec::OBJECT_IDS)?;
        if let Some(TypeSpecific::Condition(elements)) = &mut params.type_specific {
            replicate_condition(elements, self.axis_count);
        }
        Ok(params)
    }

    /// Overlays `edits` onto fresh authoritative state and writes it back.
    ///
    /// The write always requests a restart and the type-specific block;
    /// `affected` names the general categories the caller actually changed.
    /// A ramp left with infinite duration is forced to the two-second
    /// fallback, adding `DURATION` to the request. The returned parameters
    /// are authoritative: the written state on success, a fresh read after
    /// a rejection.
    ///
    /// # Errors
    ///
    /// Only unrecoverable failures propagate; rejections are absorbed by
    /// re-reading the device.
    pub fn apply_edits(
        &self,
        effect: &mut dyn FfEffect,
        edits: &EffectParameters,
        affected: ParameterFlags,
    ) -> DriverResult<EffectParameters> {
        let mut staged = self.read(effect)?;
        let general = affected
            & (ParameterFlags::DURATION | ParameterFlags::GAIN | ParameterFlags::SAMPLE_PERIOD);
        let mut flags = general | ParameterFlags::TYPE_SPECIFIC_PARAMS | ParameterFlags::START;

        if general.contains(ParameterFlags::DURATION) {
            staged.duration = edits.duration;
        }
        if general.contains(ParameterFlags::GAIN) {
            staged.gain = edits.gain;
        }
        if general.contains(ParameterFlags::SAMPLE_PERIOD) {
            staged.sample_period_us = edits.sample_period_us;
        }

        match (&edits.type_specific, &staged.type_specific) {
            (Some(edited), Some(current)) if edited.kind() == current.kind() => {
                staged.type_specific = Some(edited.clone());
            }
            (Some(edited), _) => {
                debug!(
                    kind = ?edited.kind(),
                    "type-specific edit does not match the live effect, keeping device state"
                );
            }
            (None, _) => {}
        }

        // Infinite ramps never reach their end level; force a finite window.
        if staged.kind() == Some(EffectKind::RampForce) && staged.duration.is_infinite() {
            staged.duration = EffectDuration::Micros(RAMP_FALLBACK_DURATION_US);
            flags |= ParameterFlags::DURATION;
        }

        match effect.set_parameters(&staged, flags) {
            Ok(()) => Ok(staged),
            Err(err) if err.is_rejection() => {
                debug!(error = %err, "parameter write rejected, re-reading authoritative state");
                self.read(effect)
            }
            Err(err) => Err(err),
        }
    }

    /// Writes only the direction vector. Direction support varies between
    /// devices, so a rejection drops the edit without a corrective read.
    ///
    /// # Errors
    ///
    /// Propagates everything except rejections.
    pub fn apply_direction(
        &self,
        effect: &mut dyn FfEffect,
        direction: &[i32],
    ) -> DriverResult<()> {
        let mut staged =
            effect.parameters(CoordinateSpec::CARTESIAN | CoordinateSpec::OBJECT_OFFSETS)?;
        staged.direction = direction.to_vec();
        match effect.set_parameters(&staged, ParameterFlags::DIRECTION | ParameterFlags::START) {
            Ok(()) => Ok(()),
            Err(err) if err.is_rejection() => {
                debug!(error = %err, "direction write rejected, dropping edit");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Writes the envelope toggle and fields, unless a refresh cycle is in
    /// progress. Rejections are dropped like direction writes.
    ///
    /// # Errors
    ///
    /// Propagates everything except rejections.
    pub fn apply_envelope(
        &self,
        effect: &mut dyn FfEffect,
        uses_envelope: bool,
        envelope: Envelope,
    ) -> DriverResult<()> {
        if self.gate.is_refreshing() {
            return Ok(());
        }
        let mut staged = self.read(effect)?;
        staged.uses_envelope = uses_envelope;
        staged.envelope = envelope;
        match effect.set_parameters(&staged, ParameterFlags::ENVELOPE | ParameterFlags::START) {
            Ok(()) => Ok(()),
            Err(err) if err.is_rejection() => {
                debug!(error = %err, "envelope write rejected, dropping edit");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

fn replicate_condition(elements: &mut Vec<AxisCondition>, axis_count: usize) {
    if elements.len() >= axis_count {
        return;
    }
    let fill = elements.first().copied().unwrap_or_default();
    elements.resize(axis_count, fill);
}

#[cfg(test)]
mod tests {
    use ffbench_driver::mock::{MockDevice, MockDeviceProbe, MockEffectProbe};
    use ffbench_driver::{EffectMetadata, FfDevice};

    use super::*;

    const BASIC: ParameterFlags = ParameterFlags::DURATION
        .union(ParameterFlags::GAIN)
        .union(ParameterFlags::SAMPLE_PERIOD)
        .union(ParameterFlags::DIRECTION)
        .union(ParameterFlags::ENVELOPE)
        .union(ParameterFlags::TYPE_SPECIFIC_PARAMS);

    struct Rig {
        effect: Box<dyn FfEffect>,
        device: MockDeviceProbe,
        probe: MockEffectProbe,
        sync: ParameterSynchronizer,
    }

    fn rig(kind: EffectKind) -> Rig {
        rig_with(kind, |device| device)
    }

    fn rig_with(kind: EffectKind, tweak: impl FnOnce(MockDevice) -> MockDevice) -> Rig {
        let device = MockDevice::new("rig")
            .with_actuator_axes(&[0, 4])
            .with_effect(EffectMetadata::new("under test", kind, BASIC));
        let mut device = tweak(device);
        let device_probe = device.probe();

        let axes = device
            .axis_objects(ffbench_driver::AxisObjectFilter::Actuators)
            .unwrap();
        let template = ffbench_effects::generic_template(&axes, kind).unwrap();
        let effect = device
            .create_effect(ffbench_driver::EffectTypeId(0), &template)
            .unwrap();
        let probe = device_probe.effect(0).unwrap();
        Rig {
            effect,
            device: device_probe,
            probe,
            sync: ParameterSynchronizer::new(axes.len()),
        }
    }

    #[test]
    fn gate_scopes_nest_and_restore() {
        let gate = RefreshGate::new();
        assert_eq!(gate.phase(), SyncPhase::Idle);
        {
            let _outer = gate.enter();
            assert!(gate.is_refreshing());
            {
                let _inner = gate.enter();
                assert!(gate.is_refreshing());
            }
            // The inner scope restored Refreshing, not Idle.
            assert!(gate.is_refreshing());
        }
        assert_eq!(gate.phase(), SyncPhase::Idle);
    }

    #[test]
    fn read_replicates_shared_condition_block() {
        let r = rig_with(EffectKind::Condition, |device| {
            device.reporting_condition_elements(1)
        });

        let mut seeded = r.probe.params();
        seeded.type_specific = Some(TypeSpecific::Condition(vec![
            AxisCondition {
                dead_band: 1200,
                positive_coefficient: 5000,
                ..Default::default()
            },
            AxisCondition::default(),
        ]));
        r.probe.set_params(seeded);

        let params = r.sync.read(r.effect.as_ref()).unwrap();
        match params.type_specific {
            Some(TypeSpecific::Condition(elements)) => {
                assert_eq!(elements.len(), 2);
                assert_eq!(elements[0], elements[1]);
                assert_eq!(elements[0].dead_band, 1200);
            }
            other => panic!("expected condition block, got {other:?}"),
        }
    }

    #[test]
    fn read_uses_object_id_coordinates() {
        let r = rig(EffectKind::ConstantForce);
        r.sync.read(r.effect.as_ref()).unwrap();
        assert_eq!(
            r.probe.reads(),
            vec![CoordinateSpec::CARTESIAN | CoordinateSpec::OBJECT_IDS]
        );
    }

    #[test]
    fn apply_edits_requests_restart_and_block() {
        let mut r = rig(EffectKind::ConstantForce);

        let edits = EffectParameters::default().with_gain(2500);
        let result = r
            .sync
            .apply_edits(r.effect.as_mut(), &edits, ParameterFlags::GAIN)
            .unwrap();

        assert_eq!(result.gain, 2500);
        let writes = r.probe.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(
            writes[0].flags,
            ParameterFlags::GAIN | ParameterFlags::TYPE_SPECIFIC_PARAMS | ParameterFlags::START
        );
        assert!(r.probe.playing());
    }

    #[test]
    fn unaffected_general_fields_keep_device_values() {
        let mut r = rig(EffectKind::ConstantForce);

        let mut seeded = r.probe.params();
        seeded.gain = 8000;
        r.probe.set_params(seeded);

        // The edit struct carries a stale gain, but only duration is marked.
        let edits = EffectParameters::default()
            .with_gain(1)
            .with_duration(EffectDuration::from_seconds(3));
        let result = r
            .sync
            .apply_edits(r.effect.as_mut(), &edits, ParameterFlags::DURATION)
            .unwrap();

        assert_eq!(result.gain, 8000);
        assert_eq!(result.duration, EffectDuration::Micros(3_000_000));
    }

    #[test]
    fn mismatched_type_block_is_ignored() {
        let mut r = rig(EffectKind::ConstantForce);

        let edits = EffectParameters::default().with_type_specific(TypeSpecific::Ramp {
            start: -1000,
            end: 1000,
        });
        let result = r
            .sync
            .apply_edits(r.effect.as_mut(), &edits, ParameterFlags::empty())
            .unwrap();

        assert_eq!(result.kind(), Some(EffectKind::ConstantForce));
    }

    #[test]
    fn infinite_ramp_gets_fallback_duration() {
        let mut r = rig(EffectKind::RampForce);

        let edits = EffectParameters::default().with_type_specific(TypeSpecific::Ramp {
            start: -2000,
            end: 2000,
        });
        let result = r
            .sync
            .apply_edits(r.effect.as_mut(), &edits, ParameterFlags::empty())
            .unwrap();

        assert_eq!(
            result.duration,
            EffectDuration::Micros(RAMP_FALLBACK_DURATION_US)
        );
        let writes = r.probe.writes();
        assert!(writes[0].flags.contains(ParameterFlags::DURATION));
        assert_eq!(
            writes[0].params.duration,
            EffectDuration::Micros(RAMP_FALLBACK_DURATION_US)
        );
    }

    #[test]
    fn finite_ramp_duration_is_left_alone() {
        let mut r = rig(EffectKind::RampForce);

        let edits = EffectParameters::default().with_duration(EffectDuration::from_seconds(4));
        r.sync
            .apply_edits(r.effect.as_mut(), &edits, ParameterFlags::DURATION)
            .unwrap();

        let writes = r.probe.writes();
        assert_eq!(writes[0].params.duration, EffectDuration::Micros(4_000_000));
    }

    #[test]
    fn rejected_write_returns_fresh_device_state() {
        let mut r = rig_with(EffectKind::ConstantForce, |device| {
            device.rejecting_writes(ParameterFlags::GAIN)
        });

        let edits = EffectParameters::default().with_gain(123);
        let result = r
            .sync
            .apply_edits(r.effect.as_mut(), &edits, ParameterFlags::GAIN)
            .unwrap();

        // The device kept its template gain; the edit evaporated.
        assert_eq!(result.gain, ffbench_effects::GAIN_MAX);
        // One write attempt, two reads (stage + recovery).
        assert_eq!(r.probe.writes().len(), 1);
        assert_eq!(r.probe.reads().len(), 2);
    }

    #[test]
    fn rejected_direction_write_is_dropped_without_reread() {
        let mut r = rig_with(EffectKind::ConstantForce, |device| {
            device.rejecting_writes(ParameterFlags::DIRECTION)
        });

        r.sync.apply_direction(r.effect.as_mut(), &[2, 0]).unwrap();

        assert_eq!(r.probe.writes().len(), 1);
        // Only the staging read happened, no corrective read.
        assert_eq!(
            r.probe.reads(),
            vec![CoordinateSpec::CARTESIAN | CoordinateSpec::OBJECT_OFFSETS]
        );
    }

    #[test]
    fn direction_read_uses_object_offsets() {
        let mut r = rig(EffectKind::ConstantForce);
        r.sync.apply_direction(r.effect.as_mut(), &[0, 2]).unwrap();
        assert_eq!(
            r.probe.reads(),
            vec![CoordinateSpec::CARTESIAN | CoordinateSpec::OBJECT_OFFSETS]
        );
        assert_eq!(r.probe.params().direction, vec![0, 2]);
    }

    #[test]
    fn envelope_write_skipped_while_refreshing() {
        let mut r = rig(EffectKind::ConstantForce);
        let envelope = Envelope::new().with_attack(5000, 100_000);

        {
            let _scope = r.sync.gate().enter();
            r.sync
                .apply_envelope(r.effect.as_mut(), true, envelope)
                .unwrap();
        }
        assert!(r.probe.writes().is_empty());

        r.sync
            .apply_envelope(r.effect.as_mut(), true, envelope)
            .unwrap();
        let writes = r.probe.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(
            writes[0].flags,
            ParameterFlags::ENVELOPE | ParameterFlags::START
        );
        assert!(writes[0].params.uses_envelope);
    }

    #[test]
    fn device_loss_propagates_from_every_path() {
        let mut r = rig(EffectKind::ConstantForce);
        r.device.mark_lost();

        assert!(r.sync.read(r.effect.as_ref()).unwrap_err().is_device_lost());
        assert!(
            r.sync
                .apply_edits(
                    r.effect.as_mut(),
                    &EffectParameters::default(),
                    ParameterFlags::GAIN
                )
                .unwrap_err()
                .is_device_lost()
        );
        assert!(
            r.sync
                .apply_direction(r.effect.as_mut(), &[0, 2])
                .unwrap_err()
                .is_device_lost()
        );
    }
}
