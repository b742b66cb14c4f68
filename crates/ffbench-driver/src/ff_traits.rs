//! Force-feedback driver traits
//!
//! The workbench consumes a driver exclusively through [`FfDriver`],
//! [`FfDevice`], and [`FfEffect`] trait objects. Releasing a live effect's
//! hardware resource is tied to dropping its [`FfEffect`] handle.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{DeviceInfo, DriverResult};
use ffbench_effects::{
    AxisOffset, CoordinateSpec, EffectKind, EffectParameters, EffectTemplate, ParameterFlags,
};

/// Broad device category used when enumerating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    All,
    GameController,
}

/// Device enumeration filter.
///
/// # Examples
///
/// ```
/// use ffbench_driver::DeviceFilter;
///
/// let filter = DeviceFilter::game_controllers().attached_only().force_feedback();
/// assert!(filter.attached_only);
/// assert!(filter.force_feedback);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFilter {
    pub class: DeviceClass,
    pub attached_only: bool,
    pub force_feedback: bool,
}

impl DeviceFilter {
    pub fn all() -> Self {
        Self {
            class: DeviceClass::All,
            attached_only: false,
            force_feedback: false,
        }
    }

    pub fn game_controllers() -> Self {
        Self {
            class: DeviceClass::GameController,
            ..Self::all()
        }
    }

    pub fn attached_only(mut self) -> Self {
        self.attached_only = true;
        self
    }

    pub fn force_feedback(mut self) -> Self {
        self.force_feedback = true;
        self
    }
}

/// Which axis objects to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisObjectFilter {
    AllAxes,
    /// Only axes backed by a force actuator.
    Actuators,
}

/// Device data format to install before acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFormat {
    Joystick,
    Keyboard,
    Mouse,
}

bitflags! {
    /// Access mode requested for the session.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CooperativeLevel: u32 {
        const EXCLUSIVE = 0x0000_0001;
        const NONEXCLUSIVE = 0x0000_0002;
        const FOREGROUND = 0x0000_0004;
        const BACKGROUND = 0x0000_0008;
    }
}

/// Opaque host window the cooperative level is tied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

impl WindowHandle {
    /// Headless sessions that never gain focus.
    pub const NONE: WindowHandle = WindowHandle(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Driver-assigned identifier for one enumerated effect type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectTypeId(pub u64);

/// One entry in a device's advertised effect enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectMetadata {
    /// Driver-reported display name.
    pub name: String,
    pub kind: EffectKind,
    /// Parameter categories the device statically supports for this type.
    pub static_params: ParameterFlags,
    pub type_id: EffectTypeId,
}

impl EffectMetadata {
    pub fn new(name: impl Into<String>, kind: EffectKind, static_params: ParameterFlags) -> Self {
        Self {
            name: name.into(),
            kind,
            static_params,
            type_id: EffectTypeId::default(),
        }
    }

    pub fn with_type_id(mut self, type_id: EffectTypeId) -> Self {
        self.type_id = type_id;
        self
    }
}

/// Entry point into a force-feedback driver.
pub trait FfDriver: Send + Sync {
    /// Enumerates devices matching the filter. Each returned handle owns an
    /// independent session with the same underlying device.
    fn devices(&self, filter: DeviceFilter) -> DriverResult<Vec<Box<dyn FfDevice>>>;
}

/// One enumerated device.
pub trait FfDevice: Send + Sync {
    fn info(&self) -> &DeviceInfo;

    /// Data-format offsets of the device's axis objects.
    fn axis_objects(&self, filter: AxisObjectFilter) -> DriverResult<Vec<AxisOffset>>;

    /// Toggles the device's auto-center spring.
    fn set_auto_center(&mut self, enabled: bool) -> DriverResult<()>;

    fn set_data_format(&mut self, format: DataFormat) -> DriverResult<()>;

    fn set_cooperative_level(
        &mut self,
        window: WindowHandle,
        level: CooperativeLevel,
    ) -> DriverResult<()>;

    /// The effect types this device advertises.
    fn effects(&self) -> DriverResult<Vec<EffectMetadata>>;

    /// Creates a live effect from a template. The effect's hardware
    /// resource is released when the returned handle is dropped.
    fn create_effect(
        &mut self,
        type_id: EffectTypeId,
        template: &EffectTemplate,
    ) -> DriverResult<Box<dyn FfEffect>>;

    fn acquire(&mut self) -> DriverResult<()>;

    fn unacquire(&mut self) -> DriverResult<()>;
}

/// One live effect object on a device.
pub trait FfEffect: Send + Sync {
    /// Reads the authoritative parameter state. `coordinates` selects how
    /// the direction vector and axis list are expressed.
    fn parameters(&self, coordinates: CoordinateSpec) -> DriverResult<EffectParameters>;

    /// Writes the parameter categories named in `flags` from `params`.
    fn set_parameters(
        &mut self,
        params: &EffectParameters,
        flags: ParameterFlags,
    ) -> DriverResult<()>;

    fn start(&mut self, iterations: u32) -> DriverResult<()>;

    fn stop(&mut self) -> DriverResult<()>;

    /// Removes the effect from the device without dropping the handle.
    fn unload(&mut self) -> DriverResult<()>;
}

pub mod mock {
    //! Scriptable in-memory driver for tests and demos.
    //!
    //! `MockDevice` is built up-front with axes, an effect enumeration, and
    //! failure injection, then handed to a [`MockDriver`]. A probe taken
    //! before the hand-off shares the device state, so tests can observe
    //! calls and inject faults while the workbench owns the device.

    use super::*;
    use crate::DriverError;
    use ffbench_effects::TypeSpecific;
    use std::sync::{Arc, Mutex};

    /// One recorded device-level call, in invocation order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum DeviceCall {
        AutoCenter(bool),
        DataFormat(DataFormat),
        CooperativeLevel(WindowHandle, CooperativeLevel),
        Acquire,
        Unacquire,
    }

    /// One recorded `set_parameters` call, including rejected attempts.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct WriteRecord {
        pub flags: ParameterFlags,
        pub params: EffectParameters,
    }

    #[derive(Debug)]
    struct EffectState {
        kind: EffectKind,
        params: EffectParameters,
        playing: bool,
        start_count: u32,
        stop_count: u32,
        unload_count: u32,
        released: bool,
        reject_mask: ParameterFlags,
        reported_condition_elements: Option<usize>,
        writes: Vec<WriteRecord>,
        reads: Vec<CoordinateSpec>,
    }

    #[derive(Debug)]
    struct DeviceState {
        auto_center: bool,
        acquired: bool,
        lost: bool,
        data_format: Option<DataFormat>,
        cooperative: Option<(WindowHandle, CooperativeLevel)>,
        calls: Vec<DeviceCall>,
        fail_auto_center: bool,
        fail_data_format: bool,
        fail_cooperative_level: bool,
        fail_acquire: bool,
        effects: Vec<Arc<Mutex<EffectState>>>,
    }

    impl DeviceState {
        fn new() -> Self {
            Self {
                auto_center: true,
                acquired: false,
                lost: false,
                data_format: None,
                cooperative: None,
                calls: Vec::new(),
                fail_auto_center: false,
                fail_data_format: false,
                fail_cooperative_level: false,
                fail_acquire: false,
                effects: Vec::new(),
            }
        }
    }

    /// Simulated device. `Clone` shares the underlying state, mirroring how
    /// a driver hands out multiple handles to one physical device.
    #[derive(Debug, Clone)]
    pub struct MockDevice {
        info: DeviceInfo,
        attached: bool,
        force_feedback: bool,
        axes: Vec<(AxisOffset, bool)>,
        catalog: Vec<EffectMetadata>,
        reject_mask: ParameterFlags,
        reported_condition_elements: Option<usize>,
        state: Arc<Mutex<DeviceState>>,
    }

    impl MockDevice {
        pub fn new(name: impl Into<String>) -> Self {
            let name = name.into();
            Self {
                info: DeviceInfo::new(0, 0, format!("mock://{name}")).with_product_name(name),
                attached: true,
                force_feedback: true,
                axes: Vec::new(),
                catalog: Vec::new(),
                reject_mask: ParameterFlags::empty(),
                reported_condition_elements: None,
                state: Arc::new(Mutex::new(DeviceState::new())),
            }
        }

        pub fn with_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
            self.info.vendor_id = vendor_id;
            self.info.product_id = product_id;
            self
        }

        /// Adds axis objects as `(offset, is_actuator)` pairs.
        pub fn with_axes(mut self, axes: &[(u32, bool)]) -> Self {
            self.axes
                .extend(axes.iter().map(|&(offset, actuator)| (AxisOffset(offset), actuator)));
            self
        }

        /// Adds actuator-backed axes at the given offsets.
        pub fn with_actuator_axes(mut self, offsets: &[u32]) -> Self {
            self.axes
                .extend(offsets.iter().map(|&offset| (AxisOffset(offset), true)));
            self
        }

        /// Registers an enumerable effect type. Type ids are assigned in
        /// registration order.
        pub fn with_effect(mut self, metadata: EffectMetadata) -> Self {
            let type_id = EffectTypeId(self.catalog.len() as u64);
            self.catalog.push(metadata.with_type_id(type_id));
            self
        }

        pub fn detached(mut self) -> Self {
            self.attached = false;
            self
        }

        pub fn without_force_feedback(mut self) -> Self {
            self.force_feedback = false;
            self
        }

        /// Effects created on this device reject writes whose flags
        /// intersect `mask`.
        pub fn rejecting_writes(mut self, mask: ParameterFlags) -> Self {
            self.reject_mask = mask;
            self
        }

        /// Condition reads report only the first `count` elements,
        /// simulating drivers that share one block across axes.
        pub fn reporting_condition_elements(mut self, count: usize) -> Self {
            self.reported_condition_elements = Some(count);
            self
        }

        pub fn failing_auto_center(self) -> Self {
            self.lock().fail_auto_center = true;
            self
        }

        pub fn failing_data_format(self) -> Self {
            self.lock().fail_data_format = true;
            self
        }

        pub fn failing_cooperative_level(self) -> Self {
            self.lock().fail_cooperative_level = true;
            self
        }

        pub fn failing_acquire(self) -> Self {
            self.lock().fail_acquire = true;
            self
        }

        /// A probe sharing this device's state.
        pub fn probe(&self) -> MockDeviceProbe {
            MockDeviceProbe {
                state: Arc::clone(&self.state),
            }
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, DeviceState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        fn check_present(&self) -> DriverResult<()> {
            if self.lock().lost {
                Err(DriverError::DeviceLost)
            } else {
                Ok(())
            }
        }
    }

    impl FfDevice for MockDevice {
        fn info(&self) -> &DeviceInfo {
            &self.info
        }

        fn axis_objects(&self, filter: AxisObjectFilter) -> DriverResult<Vec<AxisOffset>> {
            self.check_present()?;
            Ok(self
                .axes
                .iter()
                .filter(|&&(_, actuator)| match filter {
                    AxisObjectFilter::AllAxes => true,
                    AxisObjectFilter::Actuators => actuator,
                })
                .map(|&(offset, _)| offset)
                .collect())
        }

        fn set_auto_center(&mut self, enabled: bool) -> DriverResult<()> {
            self.check_present()?;
            let mut state = self.lock();
            state.calls.push(DeviceCall::AutoCenter(enabled));
            if state.fail_auto_center {
                return Err(DriverError::backend("auto-center property refused"));
            }
            state.auto_center = enabled;
            Ok(())
        }

        fn set_data_format(&mut self, format: DataFormat) -> DriverResult<()> {
            self.check_present()?;
            let mut state = self.lock();
            state.calls.push(DeviceCall::DataFormat(format));
            if state.fail_data_format {
                return Err(DriverError::backend("data format refused"));
            }
            state.data_format = Some(format);
            Ok(())
        }

        fn set_cooperative_level(
            &mut self,
            window: WindowHandle,
            level: CooperativeLevel,
        ) -> DriverResult<()> {
            self.check_present()?;
            let mut state = self.lock();
            state.calls.push(DeviceCall::CooperativeLevel(window, level));
            if state.fail_cooperative_level {
                return Err(DriverError::backend("cooperative level refused"));
            }
            state.cooperative = Some((window, level));
            Ok(())
        }

        fn effects(&self) -> DriverResult<Vec<EffectMetadata>> {
            self.check_present()?;
            Ok(self.catalog.clone())
        }

        fn create_effect(
            &mut self,
            type_id: EffectTypeId,
            template: &EffectTemplate,
        ) -> DriverResult<Box<dyn FfEffect>> {
            self.check_present()?;
            let metadata = self
                .catalog
                .iter()
                .find(|m| m.type_id == type_id)
                .ok_or_else(|| {
                    DriverError::backend(format!("unknown effect type id {}", type_id.0))
                })?;

            let params = EffectParameters {
                duration: template.duration,
                gain: template.gain,
                sample_period_us: template.sample_period_us,
                direction: template.direction.clone(),
                uses_envelope: false,
                envelope: Default::default(),
                type_specific: TypeSpecific::zeroed(metadata.kind, template.axes.len()),
            };

            let effect = Arc::new(Mutex::new(EffectState {
                kind: metadata.kind,
                params,
                playing: false,
                start_count: 0,
                stop_count: 0,
                unload_count: 0,
                released: false,
                reject_mask: self.reject_mask,
                reported_condition_elements: self.reported_condition_elements,
                writes: Vec::new(),
                reads: Vec::new(),
            }));
            self.lock().effects.push(Arc::clone(&effect));

            Ok(Box::new(MockEffect {
                device: Arc::clone(&self.state),
                effect,
            }))
        }

        fn acquire(&mut self) -> DriverResult<()> {
            self.check_present()?;
            let mut state = self.lock();
            state.calls.push(DeviceCall::Acquire);
            if state.fail_acquire {
                return Err(DriverError::backend("exclusive access denied"));
            }
            state.acquired = true;
            Ok(())
        }

        fn unacquire(&mut self) -> DriverResult<()> {
            self.check_present()?;
            let mut state = self.lock();
            state.calls.push(DeviceCall::Unacquire);
            state.acquired = false;
            Ok(())
        }
    }

    pub struct MockEffect {
        device: Arc<Mutex<DeviceState>>,
        effect: Arc<Mutex<EffectState>>,
    }

    impl MockEffect {
        fn device(&self) -> std::sync::MutexGuard<'_, DeviceState> {
            self.device.lock().unwrap_or_else(|e| e.into_inner())
        }

        fn state(&self) -> std::sync::MutexGuard<'_, EffectState> {
            self.effect.lock().unwrap_or_else(|e| e.into_inner())
        }

        fn check_present(&self) -> DriverResult<()> {
            if self.device().lost {
                Err(DriverError::DeviceLost)
            } else {
                Ok(())
            }
        }
    }

    impl FfEffect for MockEffect {
        fn parameters(&self, coordinates: CoordinateSpec) -> DriverResult<EffectParameters> {
            self.check_present()?;
            let mut state = self.state();
            state.reads.push(coordinates);

            let mut params = state.params.clone();
            if let Some(count) = state.reported_condition_elements
                && let Some(TypeSpecific::Condition(elements)) = &mut params.type_specific
            {
                elements.truncate(count);
            }
            Ok(params)
        }

        fn set_parameters(
            &mut self,
            params: &EffectParameters,
            flags: ParameterFlags,
        ) -> DriverResult<()> {
            self.check_present()?;
            let mut state = self.state();
            state.writes.push(WriteRecord {
                flags,
                params: params.clone(),
            });

            if state.reject_mask.intersects(flags) {
                return Err(DriverError::rejected(format!(
                    "flags {:#x} refused",
                    flags.bits()
                )));
            }

            if flags.contains(ParameterFlags::DURATION) {
                state.params.duration = params.duration;
            }
            if flags.contains(ParameterFlags::GAIN) {
                state.params.gain = params.gain;
            }
            if flags.contains(ParameterFlags::SAMPLE_PERIOD) {
                state.params.sample_period_us = params.sample_period_us;
            }
            if flags.contains(ParameterFlags::DIRECTION) {
                state.params.direction = params.direction.clone();
            }
            if flags.contains(ParameterFlags::ENVELOPE) {
                state.params.uses_envelope = params.uses_envelope;
                state.params.envelope = params.envelope;
            }
            if flags.contains(ParameterFlags::TYPE_SPECIFIC_PARAMS)
                && let Some(block) = &params.type_specific
                && block.kind() == state.kind
            {
                state.params.type_specific = Some(block.clone());
            }
            if flags.contains(ParameterFlags::START) {
                state.playing = true;
            }
            Ok(())
        }

        fn start(&mut self, iterations: u32) -> DriverResult<()> {
            self.check_present()?;
            if !self.device().acquired {
                return Err(DriverError::NotAcquired);
            }
            let mut state = self.state();
            state.playing = true;
            state.start_count = state.start_count.saturating_add(iterations.min(1));
            Ok(())
        }

        fn stop(&mut self) -> DriverResult<()> {
            self.check_present()?;
            let mut state = self.state();
            state.playing = false;
            state.stop_count += 1;
            Ok(())
        }

        fn unload(&mut self) -> DriverResult<()> {
            self.check_present()?;
            let mut state = self.state();
            state.playing = false;
            state.unload_count += 1;
            Ok(())
        }
    }

    impl Drop for MockEffect {
        fn drop(&mut self) {
            let mut state = self.state();
            state.playing = false;
            state.released = true;
        }
    }

    /// Observation and fault-injection handle for one device.
    #[derive(Clone)]
    pub struct MockDeviceProbe {
        state: Arc<Mutex<DeviceState>>,
    }

    impl MockDeviceProbe {
        fn lock(&self) -> std::sync::MutexGuard<'_, DeviceState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        pub fn auto_center(&self) -> bool {
            self.lock().auto_center
        }

        pub fn acquired(&self) -> bool {
            self.lock().acquired
        }

        pub fn data_format(&self) -> Option<DataFormat> {
            self.lock().data_format
        }

        pub fn cooperative_level(&self) -> Option<(WindowHandle, CooperativeLevel)> {
            self.lock().cooperative
        }

        pub fn calls(&self) -> Vec<DeviceCall> {
            self.lock().calls.clone()
        }

        /// Simulates the device going away mid-session.
        pub fn mark_lost(&self) {
            self.lock().lost = true;
        }

        pub fn effect_count(&self) -> usize {
            self.lock().effects.len()
        }

        /// Probe for the `index`-th created effect, in creation order.
        pub fn effect(&self, index: usize) -> Option<MockEffectProbe> {
            self.lock().effects.get(index).map(|e| MockEffectProbe {
                effect: Arc::clone(e),
            })
        }
    }

    /// Observation and fault-injection handle for one live effect.
    #[derive(Clone)]
    pub struct MockEffectProbe {
        effect: Arc<Mutex<EffectState>>,
    }

    impl MockEffectProbe {
        fn lock(&self) -> std::sync::MutexGuard<'_, EffectState> {
            self.effect.lock().unwrap_or_else(|e| e.into_inner())
        }

        pub fn params(&self) -> EffectParameters {
            self.lock().params.clone()
        }

        /// Overwrites the driver-side state, bypassing the write path.
        pub fn set_params(&self, params: EffectParameters) {
            self.lock().params = params;
        }

        pub fn set_reject_mask(&self, mask: ParameterFlags) {
            self.lock().reject_mask = mask;
        }

        pub fn writes(&self) -> Vec<WriteRecord> {
            self.lock().writes.clone()
        }

        pub fn reads(&self) -> Vec<CoordinateSpec> {
            self.lock().reads.clone()
        }

        pub fn playing(&self) -> bool {
            self.lock().playing
        }

        pub fn start_count(&self) -> u32 {
            self.lock().start_count
        }

        pub fn stop_count(&self) -> u32 {
            self.lock().stop_count
        }

        pub fn unload_count(&self) -> u32 {
            self.lock().unload_count
        }

        pub fn released(&self) -> bool {
            self.lock().released
        }
    }

    /// Simulated driver over a fixed set of devices.
    #[derive(Default)]
    pub struct MockDriver {
        devices: Vec<MockDevice>,
    }

    impl MockDriver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_device(mut self, device: MockDevice) -> Self {
            self.devices.push(device);
            self
        }

        pub fn add_device(&mut self, device: MockDevice) {
            self.devices.push(device);
        }

        pub fn device_count(&self) -> usize {
            self.devices.len()
        }
    }

    impl FfDriver for MockDriver {
        fn devices(&self, filter: DeviceFilter) -> DriverResult<Vec<Box<dyn FfDevice>>> {
            Ok(self
                .devices
                .iter()
                .filter(|d| !filter.attached_only || d.attached)
                .filter(|d| !filter.force_feedback || d.force_feedback)
                .map(|d| Box::new(d.clone()) as Box<dyn FfDevice>)
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffbench_effects::{EffectDuration, TypeSpecific, generic_template};
    use mock::{DeviceCall, MockDevice, MockDriver};

    fn constant_metadata() -> EffectMetadata {
        EffectMetadata::new(
            "Constant Force",
            EffectKind::ConstantForce,
            ParameterFlags::STATIC_MASK,
        )
    }

    #[test]
    fn test_metadata_serializes_flat_ids_and_bit_flags() {
        let metadata = constant_metadata().with_type_id(EffectTypeId(3));
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["name"], "Constant Force");
        assert_eq!(value["type_id"], 3);
        assert_eq!(value["static_params"], ParameterFlags::STATIC_MASK.bits());
    }

    #[test]
    fn test_filter_skips_detached_and_passive_devices() {
        let driver = MockDriver::new()
            .with_device(MockDevice::new("unplugged").with_actuator_axes(&[0]).detached())
            .with_device(MockDevice::new("rumbleless").without_force_feedback())
            .with_device(MockDevice::new("wheel").with_actuator_axes(&[0, 4]));

        let filter = DeviceFilter::game_controllers().attached_only().force_feedback();
        let devices = driver.devices(filter).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].info().display_name(), "wheel");
    }

    #[test]
    fn test_axis_object_filter() {
        let device = MockDevice::new("wheel").with_axes(&[(0, true), (4, false), (8, true)]);
        let all = device.axis_objects(AxisObjectFilter::AllAxes).unwrap();
        let actuators = device.axis_objects(AxisObjectFilter::Actuators).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(actuators, vec![AxisOffset(0), AxisOffset(8)]);
    }

    #[test]
    fn test_device_call_recording() {
        let mut device = MockDevice::new("wheel").with_actuator_axes(&[0]);
        let probe = device.probe();

        device.set_auto_center(false).unwrap();
        device.set_data_format(DataFormat::Joystick).unwrap();
        device
            .set_cooperative_level(
                WindowHandle::new(42),
                CooperativeLevel::EXCLUSIVE | CooperativeLevel::FOREGROUND,
            )
            .unwrap();

        assert_eq!(
            probe.calls(),
            vec![
                DeviceCall::AutoCenter(false),
                DeviceCall::DataFormat(DataFormat::Joystick),
                DeviceCall::CooperativeLevel(
                    WindowHandle::new(42),
                    CooperativeLevel::EXCLUSIVE | CooperativeLevel::FOREGROUND,
                ),
            ]
        );
        assert!(!probe.auto_center());
    }

    #[test]
    fn test_created_effect_seeds_from_template() {
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0, 4])
            .with_effect(constant_metadata());
        let probe = device.probe();

        let metadata = device.effects().unwrap();
        let template =
            generic_template(&[AxisOffset(0), AxisOffset(4)], EffectKind::ConstantForce).unwrap();
        let _effect = device.create_effect(metadata[0].type_id, &template).unwrap();

        let effect_probe = probe.effect(0).unwrap();
        let params = effect_probe.params();
        assert!(params.duration.is_infinite());
        assert_eq!(params.gain, 10_000);
        assert_eq!(params.direction, vec![0, 0]);
        assert_eq!(
            params.type_specific,
            Some(TypeSpecific::Constant { magnitude: 0 })
        );
    }

    #[test]
    fn test_write_respects_flags() {
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0])
            .with_effect(constant_metadata());
        let probe = device.probe();

        let metadata = device.effects().unwrap();
        let template = generic_template(&[AxisOffset(0)], EffectKind::ConstantForce).unwrap();
        let mut effect = device.create_effect(metadata[0].type_id, &template).unwrap();

        let edited = EffectParameters::new()
            .with_duration(EffectDuration::Micros(500_000))
            .with_gain(1_234)
            .with_type_specific(TypeSpecific::Constant { magnitude: 9_000 });
        effect
            .set_parameters(&edited, ParameterFlags::GAIN | ParameterFlags::START)
            .unwrap();

        let stored = probe.effect(0).unwrap().params();
        // Only the gain category was named, so duration and the block keep
        // their created values.
        assert_eq!(stored.gain, 1_234);
        assert!(stored.duration.is_infinite());
        assert_eq!(
            stored.type_specific,
            Some(TypeSpecific::Constant { magnitude: 0 })
        );
    }

    #[test]
    fn test_rejection_records_the_attempt() {
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0])
            .with_effect(constant_metadata())
            .rejecting_writes(ParameterFlags::GAIN);
        let probe = device.probe();

        let metadata = device.effects().unwrap();
        let template = generic_template(&[AxisOffset(0)], EffectKind::ConstantForce).unwrap();
        let mut effect = device.create_effect(metadata[0].type_id, &template).unwrap();

        let edited = EffectParameters::new().with_gain(5);
        let err = effect
            .set_parameters(&edited, ParameterFlags::GAIN)
            .unwrap_err();
        assert!(err.is_rejection());

        let effect_probe = probe.effect(0).unwrap();
        assert_eq!(effect_probe.writes().len(), 1);
        assert_eq!(effect_probe.params().gain, 10_000, "rejected write must not land");
    }

    #[test]
    fn test_condition_reads_can_be_truncated() {
        let spring = EffectMetadata::new(
            "Spring",
            EffectKind::Condition,
            ParameterFlags::STATIC_MASK,
        );
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0, 4])
            .with_effect(spring)
            .reporting_condition_elements(1);

        let metadata = device.effects().unwrap();
        let template =
            generic_template(&[AxisOffset(0), AxisOffset(4)], EffectKind::Condition).unwrap();
        let effect = device.create_effect(metadata[0].type_id, &template).unwrap();

        let params = effect.parameters(CoordinateSpec::CARTESIAN).unwrap();
        match params.type_specific {
            Some(TypeSpecific::Condition(elements)) => assert_eq!(elements.len(), 1),
            other => panic!("expected condition block, got {other:?}"),
        }
    }

    #[test]
    fn test_start_requires_acquisition() {
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0])
            .with_effect(constant_metadata());

        let metadata = device.effects().unwrap();
        let template = generic_template(&[AxisOffset(0)], EffectKind::ConstantForce).unwrap();
        let mut effect = device.create_effect(metadata[0].type_id, &template).unwrap();

        assert_eq!(effect.start(1).unwrap_err(), DriverError::NotAcquired);

        device.acquire().unwrap();
        effect.start(1).unwrap();
    }

    #[test]
    fn test_device_loss_propagates_to_effects() {
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0])
            .with_effect(constant_metadata());
        let probe = device.probe();

        let metadata = device.effects().unwrap();
        let template = generic_template(&[AxisOffset(0)], EffectKind::ConstantForce).unwrap();
        let mut effect = device.create_effect(metadata[0].type_id, &template).unwrap();

        probe.mark_lost();
        assert_eq!(
            effect.parameters(CoordinateSpec::CARTESIAN).unwrap_err(),
            DriverError::DeviceLost
        );
        assert_eq!(
            effect
                .set_parameters(&EffectParameters::new(), ParameterFlags::GAIN)
                .unwrap_err(),
            DriverError::DeviceLost
        );
        assert_eq!(device.acquire().unwrap_err(), DriverError::DeviceLost);
    }

    #[test]
    fn test_drop_releases_the_effect() {
        let mut device = MockDevice::new("wheel")
            .with_actuator_axes(&[0])
            .with_effect(constant_metadata());
        let probe = device.probe();

        let metadata = device.effects().unwrap();
        let template = generic_template(&[AxisOffset(0)], EffectKind::ConstantForce).unwrap();
        let effect = device.create_effect(metadata[0].type_id, &template).unwrap();

        let effect_probe = probe.effect(0).unwrap();
        assert!(!effect_probe.released());
        drop(effect);
        assert!(effect_probe.released());
    }
}
