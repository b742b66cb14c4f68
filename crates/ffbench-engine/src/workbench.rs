//! Interactive workbench session.
//!
//! A [`Workbench`] owns the selected device, the effect catalog, and the
//! editable parameter model, and keeps all three in step with the control
//! surface. Construction runs the whole setup sequence: device selection,
//! catalog construction, initial selection of the first entry.

use ffbench_driver::{DeviceInfo, DriverResult, FfDevice, FfDriver, WindowHandle};
use ffbench_effects::{
    AxisCondition, AxisOffset, EffectDuration, EffectKind, EffectParameters, MICROS_PER_SECOND,
    Octant, ParameterFlags, TypeSpecific,
};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogPolicy, EffectDescriptor, build_catalog};
use crate::device::{SelectedDevice, select_device};
use crate::error::SetupError;
use crate::surface::{ControlSurface, FieldId, ParameterGroup, SurfaceEvent};
use crate::sync::ParameterSynchronizer;

/// Construction knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbenchOptions {
    pub catalog: CatalogPolicy,
}

/// One live editing session against one device.
pub struct Workbench<S: ControlSurface> {
    device: Box<dyn FfDevice>,
    axes: Vec<AxisOffset>,
    catalog: Vec<EffectDescriptor>,
    selected: usize,
    condition_axis: usize,
    model: EffectParameters,
    sync: ParameterSynchronizer,
    surface: S,
    closed: bool,
}

impl<S: ControlSurface> Workbench<S> {
    /// Establishes a session with the default options.
    ///
    /// # Errors
    ///
    /// See [`SetupError`]; an empty effect catalog is fatal here even though
    /// the catalog layer itself treats it as advisory.
    pub fn new(
        driver: &dyn FfDriver,
        window: WindowHandle,
        surface: S,
    ) -> Result<Self, SetupError> {
        Self::with_options(driver, window, surface, WorkbenchOptions::default())
    }

    /// Establishes a session, selecting the first catalog entry.
    ///
    /// # Errors
    ///
    /// See [`SetupError`].
    pub fn with_options(
        driver: &dyn FfDriver,
        window: WindowHandle,
        mut surface: S,
        options: WorkbenchOptions,
    ) -> Result<Self, SetupError> {
        let SelectedDevice { mut device, axes } = select_device(driver, window)?;
        let catalog = build_catalog(device.as_mut(), &axes, &options.catalog)?;
        if catalog.is_empty() {
            return Err(SetupError::EmptyCatalog);
        }

        let names: Vec<String> = catalog.iter().map(|d| d.name.clone()).collect();
        surface.set_effect_list(&names);

        let sync = ParameterSynchronizer::new(axes.len());
        let mut workbench = Self {
            device,
            axes,
            catalog,
            selected: 0,
            condition_axis: 0,
            model: EffectParameters::default(),
            sync,
            surface,
            closed: false,
        };
        workbench.select_effect(0)?;
        Ok(workbench)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The editable model, mirroring the last authoritative read or write.
    pub fn model(&self) -> &EffectParameters {
        &self.model
    }

    pub fn descriptors(&self) -> &[EffectDescriptor] {
        &self.catalog
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn condition_axis(&self) -> usize {
        self.condition_axis
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// Identity of the device this session drives.
    pub fn device_info(&self) -> &DeviceInfo {
        self.device.info()
    }

    /// Routes one operator event.
    ///
    /// Events arriving while a programmatic refresh is in progress are
    /// echoes of the refresh itself and are ignored, except for the closing
    /// notification. After [`Workbench::shutdown`] every event is ignored.
    ///
    /// # Errors
    ///
    /// Only unrecoverable device failures propagate; rejected writes are
    /// absorbed by the synchronization protocol.
    pub fn handle_event(&mut self, event: SurfaceEvent) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        if self.sync.gate().is_refreshing() && event != SurfaceEvent::WindowClosing {
            return Ok(());
        }

        match event {
            SurfaceEvent::FieldChanged { field, value } => self.on_field_changed(field, value),
            SurfaceEvent::DirectionSelected(octant) => self.on_direction(octant),
            SurfaceEvent::EnvelopeToggled(enabled) => {
                self.model.uses_envelope = enabled;
                self.apply_envelope_change()
            }
            SurfaceEvent::ConditionAxisSelected(axis) => self.on_condition_axis(axis),
            SurfaceEvent::EffectSelected(index) => self.select_effect(index),
            SurfaceEvent::WindowActivated => self.on_activated(),
            SurfaceEvent::WindowClosing => {
                self.shutdown();
                Ok(())
            }
        }
    }

    /// Stops playback, releases every catalog effect, gives the device back.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(descriptor) = self.catalog.get_mut(self.selected) {
            if let Err(err) = descriptor.effect.stop() {
                debug!(error = %err, "stop during shutdown failed");
            }
        }
        // Dropping the descriptors releases every created effect.
        self.catalog.clear();
        if let Err(err) = self.device.unacquire() {
            debug!(error = %err, "unacquire during shutdown failed");
        }
        if let Err(err) = self.device.set_auto_center(true) {
            debug!(error = %err, "auto-center restore failed");
        }
        info!("workbench session closed");
    }

    fn select_effect(&mut self, index: usize) -> DriverResult<()> {
        if index >= self.catalog.len() {
            debug!(index, "selection index out of range, ignoring");
            return Ok(());
        }

        // The outgoing effect is unloaded even when re-selecting the same
        // entry; re-selection doubles as a restart.
        if let Some(previous) = self.catalog.get_mut(self.selected) {
            match previous.effect.unload() {
                Ok(()) => {}
                Err(err) if err.is_device_lost() => return Err(err),
                Err(err) => debug!(error = %err, "unload of outgoing effect failed"),
            }
        }

        self.selected = index;
        self.condition_axis = 0;
        self.reload_model()?;
        self.refresh_all();

        let Some(descriptor) = self.catalog.get_mut(self.selected) else {
            return Ok(());
        };
        match descriptor.effect.start(1) {
            Ok(()) => {}
            Err(err) if err.is_rejection() => {
                debug!(error = %err, "start deferred until the device is acquired");
            }
            Err(err) => return Err(err),
        }
        info!(name = %descriptor.name, index, "selected effect");
        Ok(())
    }

    fn on_activated(&mut self) -> DriverResult<()> {
        match self.device.acquire() {
            Ok(()) => debug!("device acquired"),
            Err(err) if err.is_device_lost() => return Err(err),
            Err(err) => warn!(error = %err, "device acquisition failed"),
        }
        // Re-fire the current selection so playback restarts under the new
        // acquisition.
        self.select_effect(self.selected)
    }

    fn on_condition_axis(&mut self, axis: usize) -> DriverResult<()> {
        if axis >= self.axes.len() {
            debug!(axis, "condition axis out of range, ignoring");
            return Ok(());
        }
        self.condition_axis = axis;
        self.reload_model()?;
        self.refresh_type_specific();
        Ok(())
    }

    fn on_direction(&mut self, octant: Octant) -> DriverResult<()> {
        self.model.direction = octant.vector(self.axes.len());
        let Self {
            sync,
            catalog,
            selected,
            model,
            ..
        } = self;
        let Some(descriptor) = catalog.get_mut(*selected) else {
            return Ok(());
        };
        sync.apply_direction(descriptor.effect.as_mut(), &model.direction)
    }

    fn on_field_changed(&mut self, field: FieldId, value: i32) -> DriverResult<()> {
        match field {
            FieldId::Duration => {
                self.model.duration = if value >= *FieldId::Duration.range().end() {
                    EffectDuration::Infinite
                } else {
                    EffectDuration::from_seconds(unsigned(value))
                };
                self.apply_general(ParameterFlags::DURATION)
            }
            FieldId::Gain => {
                self.model.gain = unsigned(value);
                self.apply_general(ParameterFlags::GAIN)
            }
            FieldId::SamplePeriod => {
                self.model.sample_period_us = unsigned(value);
                self.apply_general(ParameterFlags::SAMPLE_PERIOD)
            }

            FieldId::ConstantMagnitude => {
                let Some(TypeSpecific::Constant { magnitude }) = &mut self.model.type_specific
                else {
                    return Self::ignore_mismatch(field);
                };
                *magnitude = value;
                self.apply_type_specific()
            }
            FieldId::RampStart => {
                let Some(TypeSpecific::Ramp { start, .. }) = &mut self.model.type_specific else {
                    return Self::ignore_mismatch(field);
                };
                *start = value;
                self.apply_type_specific()
            }
            FieldId::RampEnd => {
                let Some(TypeSpecific::Ramp { end, .. }) = &mut self.model.type_specific else {
                    return Self::ignore_mismatch(field);
                };
                *end = value;
                self.apply_type_specific()
            }

            FieldId::PeriodicMagnitude => {
                let Some(TypeSpecific::Periodic { magnitude, .. }) = &mut self.model.type_specific
                else {
                    return Self::ignore_mismatch(field);
                };
                *magnitude = unsigned(value);
                self.apply_type_specific()
            }
            FieldId::PeriodicOffset => {
                let Some(TypeSpecific::Periodic { offset, .. }) = &mut self.model.type_specific
                else {
                    return Self::ignore_mismatch(field);
                };
                *offset = value;
                self.apply_type_specific()
            }
            FieldId::PeriodicPeriod => {
                let Some(TypeSpecific::Periodic { period_us, .. }) = &mut self.model.type_specific
                else {
                    return Self::ignore_mismatch(field);
                };
                *period_us = unsigned(value);
                self.apply_type_specific()
            }
            FieldId::PeriodicPhase => {
                let Some(TypeSpecific::Periodic { phase, .. }) = &mut self.model.type_specific
                else {
                    return Self::ignore_mismatch(field);
                };
                *phase = unsigned(value);
                self.apply_type_specific()
            }

            FieldId::ConditionDeadBand => self.edit_condition(field, |c| c.dead_band = value),
            FieldId::ConditionOffset => self.edit_condition(field, |c| c.offset = value),
            FieldId::ConditionPositiveCoefficient => {
                self.edit_condition(field, |c| c.positive_coefficient = value)
            }
            FieldId::ConditionNegativeCoefficient => {
                self.edit_condition(field, |c| c.negative_coefficient = value)
            }
            FieldId::ConditionPositiveSaturation => {
                self.edit_condition(field, |c| c.positive_saturation = unsigned(value))
            }
            FieldId::ConditionNegativeSaturation => {
                self.edit_condition(field, |c| c.negative_saturation = unsigned(value))
            }

            FieldId::EnvelopeAttackLevel => {
                self.model.envelope.attack_level = unsigned(value);
                self.apply_envelope_change()
            }
            FieldId::EnvelopeAttackTime => {
                self.model.envelope.attack_time_us = unsigned(value);
                self.apply_envelope_change()
            }
            FieldId::EnvelopeFadeLevel => {
                self.model.envelope.fade_level = unsigned(value);
                self.apply_envelope_change()
            }
            FieldId::EnvelopeFadeTime => {
                self.model.envelope.fade_time_us = unsigned(value);
                self.apply_envelope_change()
            }
        }
    }

    fn edit_condition(
        &mut self,
        field: FieldId,
        edit: impl FnOnce(&mut AxisCondition),
    ) -> DriverResult<()> {
        let axis = self.condition_axis;
        let Some(TypeSpecific::Condition(elements)) = &mut self.model.type_specific else {
            return Self::ignore_mismatch(field);
        };
        let Some(element) = elements.get_mut(axis) else {
            return Ok(());
        };
        edit(element);
        self.apply_type_specific()
    }

    fn ignore_mismatch(field: FieldId) -> DriverResult<()> {
        debug!(?field, "control does not apply to the selected effect, ignoring");
        Ok(())
    }

    /// Writes the marked general categories and mirrors the authoritative
    /// result back into the model and surface.
    fn apply_general(&mut self, affected: ParameterFlags) -> DriverResult<()> {
        let Self {
            sync,
            catalog,
            selected,
            model,
            ..
        } = self;
        let Some(descriptor) = catalog.get_mut(*selected) else {
            return Ok(());
        };
        *model = sync.apply_edits(descriptor.effect.as_mut(), model, affected)?;
        self.refresh_general();
        Ok(())
    }

    fn apply_type_specific(&mut self) -> DriverResult<()> {
        let Self {
            sync,
            catalog,
            selected,
            model,
            ..
        } = self;
        let Some(descriptor) = catalog.get_mut(*selected) else {
            return Ok(());
        };
        *model = sync.apply_edits(descriptor.effect.as_mut(), model, ParameterFlags::empty())?;
        self.refresh_type_specific();
        Ok(())
    }

    fn apply_envelope_change(&mut self) -> DriverResult<()> {
        let Self {
            sync,
            catalog,
            selected,
            model,
            ..
        } = self;
        let Some(descriptor) = catalog.get_mut(*selected) else {
            return Ok(());
        };
        sync.apply_envelope(descriptor.effect.as_mut(), model.uses_envelope, model.envelope)
    }

    fn reload_model(&mut self) -> DriverResult<()> {
        let Some(descriptor) = self.catalog.get(self.selected) else {
            return Ok(());
        };
        self.model = self.sync.read(descriptor.effect.as_ref())?;
        Ok(())
    }

    fn refresh_all(&mut self) {
        let Self {
            sync,
            surface,
            model,
            catalog,
            selected,
            condition_axis,
            axes,
            ..
        } = self;
        let Some(descriptor) = catalog.get(*selected) else {
            return;
        };
        let _scope = sync.gate().enter();

        surface.set_selected_effect(*selected);
        push_capabilities(surface, descriptor);
        push_general(surface, model);
        surface.set_direction(Octant::from_vector(&model.direction));
        push_envelope(surface, model);
        push_type_specific(surface, model, *condition_axis, axes.len());
    }

    fn refresh_general(&mut self) {
        let Self {
            sync,
            surface,
            model,
            ..
        } = self;
        let _scope = sync.gate().enter();
        push_general(surface, model);
    }

    fn refresh_type_specific(&mut self) {
        let Self {
            sync,
            surface,
            model,
            condition_axis,
            axes,
            ..
        } = self;
        let _scope = sync.gate().enter();
        push_type_specific(surface, model, *condition_axis, axes.len());
    }
}

impl<S: ControlSurface> Drop for Workbench<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Operator input below zero maps to the unsigned floor; everything else
/// passes through exactly.
fn unsigned(value: i32) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(0)
}

fn push_capabilities<S: ControlSurface>(surface: &mut S, descriptor: &EffectDescriptor) {
    for group in ParameterGroup::ALL {
        surface.set_group_enabled(group, descriptor.static_params.contains(group.flag()));
    }

    let shown = if descriptor
        .static_params
        .contains(ParameterFlags::TYPE_SPECIFIC_PARAMS)
    {
        match descriptor.kind {
            EffectKind::ConstantForce
            | EffectKind::RampForce
            | EffectKind::Periodic
            | EffectKind::Condition => Some(descriptor.kind),
            EffectKind::CustomForce | EffectKind::HardwareDefined => None,
        }
    } else {
        None
    };
    surface.show_type_group(shown);
}

fn push_general<S: ControlSurface>(surface: &mut S, model: &EffectParameters) {
    match model.duration {
        EffectDuration::Infinite => {
            surface.set_value(FieldId::Duration, *FieldId::Duration.range().end());
            surface.set_label(FieldId::Duration, "Effect Duration: Infinite");
        }
        EffectDuration::Micros(us) => {
            let seconds = FieldId::Duration.clamp_unsigned(us / MICROS_PER_SECOND);
            surface.set_value(FieldId::Duration, seconds);
            surface.set_label(FieldId::Duration, &format!("Effect Duration: {seconds} seconds"));
        }
    }

    let gain = FieldId::Gain.clamp_unsigned(model.gain);
    surface.set_value(FieldId::Gain, gain);
    surface.set_label(FieldId::Gain, &format!("Effect Gain: {gain}"));

    let period = FieldId::SamplePeriod.clamp_unsigned(model.sample_period_us);
    surface.set_value(FieldId::SamplePeriod, period);
    if period == 0 {
        surface.set_label(FieldId::SamplePeriod, "Sample Rate: Default");
    } else {
        surface.set_label(FieldId::SamplePeriod, &format!("Sample Period: {period}"));
    }
}

fn push_envelope<S: ControlSurface>(surface: &mut S, model: &EffectParameters) {
    surface.set_envelope_toggle(model.uses_envelope);

    let attack_level = FieldId::EnvelopeAttackLevel.clamp_unsigned(model.envelope.attack_level);
    surface.set_value(FieldId::EnvelopeAttackLevel, attack_level);
    surface.set_label(FieldId::EnvelopeAttackLevel, &format!("Attack Level: {attack_level}"));

    let attack_time = FieldId::EnvelopeAttackTime.clamp_unsigned(model.envelope.attack_time_us);
    surface.set_value(FieldId::EnvelopeAttackTime, attack_time);
    // Times are edited in µs but read in ms.
    surface.set_label(
        FieldId::EnvelopeAttackTime,
        &format!("Attack Time: {}", attack_time / 1000),
    );

    let fade_level = FieldId::EnvelopeFadeLevel.clamp_unsigned(model.envelope.fade_level);
    surface.set_value(FieldId::EnvelopeFadeLevel, fade_level);
    surface.set_label(FieldId::EnvelopeFadeLevel, &format!("Fade Level: {fade_level}"));

    let fade_time = FieldId::EnvelopeFadeTime.clamp_unsigned(model.envelope.fade_time_us);
    surface.set_value(FieldId::EnvelopeFadeTime, fade_time);
    surface.set_label(FieldId::EnvelopeFadeTime, &format!("Fade Time: {}", fade_time / 1000));
}

fn push_type_specific<S: ControlSurface>(
    surface: &mut S,
    model: &EffectParameters,
    condition_axis: usize,
    axis_count: usize,
) {
    match &model.type_specific {
        Some(TypeSpecific::Constant { magnitude }) => {
            let value = FieldId::ConstantMagnitude.clamp(*magnitude);
            surface.set_value(FieldId::ConstantMagnitude, value);
            surface.set_label(
                FieldId::ConstantMagnitude,
                &format!("Constant Force Magnitude: {value}"),
            );
        }
        Some(TypeSpecific::Ramp { start, end }) => {
            let start = FieldId::RampStart.clamp(*start);
            surface.set_value(FieldId::RampStart, start);
            surface.set_label(FieldId::RampStart, &format!("Range Start: {start}"));

            let end = FieldId::RampEnd.clamp(*end);
            surface.set_value(FieldId::RampEnd, end);
            surface.set_label(FieldId::RampEnd, &format!("Range End: {end}"));
        }
        Some(TypeSpecific::Periodic {
            magnitude,
            offset,
            period_us,
            phase,
        }) => {
            let magnitude = FieldId::PeriodicMagnitude.clamp_unsigned(*magnitude);
            surface.set_value(FieldId::PeriodicMagnitude, magnitude);
            surface.set_label(FieldId::PeriodicMagnitude, &format!("Magnitude: {magnitude}"));

            let offset = FieldId::PeriodicOffset.clamp(*offset);
            surface.set_value(FieldId::PeriodicOffset, offset);
            surface.set_label(FieldId::PeriodicOffset, &format!("Offset: {offset}"));

            let period = FieldId::PeriodicPeriod.clamp_unsigned(*period_us);
            surface.set_value(FieldId::PeriodicPeriod, period);
            surface.set_label(FieldId::PeriodicPeriod, &format!("Period: {period}"));

            let phase = FieldId::PeriodicPhase.clamp_unsigned(*phase);
            surface.set_value(FieldId::PeriodicPhase, phase);
            surface.set_label(FieldId::PeriodicPhase, &format!("Phase: {phase}"));
        }
        Some(TypeSpecific::Condition(elements)) => {
            surface.set_condition_axis_choices(axis_count);
            surface.set_condition_axis(condition_axis);

            let element = elements.get(condition_axis).copied().unwrap_or_default();

            let dead_band = FieldId::ConditionDeadBand.clamp(element.dead_band);
            surface.set_value(FieldId::ConditionDeadBand, dead_band);
            surface.set_label(FieldId::ConditionDeadBand, &format!("Dead Band: {dead_band}"));

            let offset = FieldId::ConditionOffset.clamp(element.offset);
            surface.set_value(FieldId::ConditionOffset, offset);
            surface.set_label(FieldId::ConditionOffset, &format!("Offset: {offset}"));

            let positive = FieldId::ConditionPositiveCoefficient.clamp(element.positive_coefficient);
            surface.set_value(FieldId::ConditionPositiveCoefficient, positive);
            surface.set_label(
                FieldId::ConditionPositiveCoefficient,
                &format!("Positive Coefficient: {positive}"),
            );

            let negative = FieldId::ConditionNegativeCoefficient.clamp(element.negative_coefficient);
            surface.set_value(FieldId::ConditionNegativeCoefficient, negative);
            surface.set_label(
                FieldId::ConditionNegativeCoefficient,
                &format!("Negative Coefficient: {negative}"),
            );

            let positive_sat =
                FieldId::ConditionPositiveSaturation.clamp_unsigned(element.positive_saturation);
            surface.set_value(FieldId::ConditionPositiveSaturation, positive_sat);
            surface.set_label(
                FieldId::ConditionPositiveSaturation,
                &format!("Positive Saturation: {positive_sat}"),
            );

            let negative_sat =
                FieldId::ConditionNegativeSaturation.clamp_unsigned(element.negative_saturation);
            surface.set_value(FieldId::ConditionNegativeSaturation, negative_sat);
            surface.set_label(
                FieldId::ConditionNegativeSaturation,
                &format!("Negative Saturation: {negative_sat}"),
            );
        }
        None => {}
    }
}
