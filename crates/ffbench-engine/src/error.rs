//! Session setup failures.
//!
//! Errors raised while an interactive session is being established. Once a
//! [`Workbench`](crate::workbench::Workbench) is running, failures surface as
//! [`DriverError`] instead.

use ffbench_driver::DriverError;

/// Mandatory device configuration step, recorded so a failure names the
/// exact point in the sequence that refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStep {
    /// Disabling the device's auto-centering spring.
    AutoCenter,
    /// Selecting the joystick data format.
    DataFormat,
    /// Requesting exclusive foreground cooperative access.
    CooperativeLevel,
}

impl std::fmt::Display for ConfigStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AutoCenter => "auto-center",
            Self::DataFormat => "data format",
            Self::CooperativeLevel => "cooperative level",
        };
        f.write_str(name)
    }
}

/// Why a session could not be established.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// No attached device exposed a force-feedback actuator axis.
    #[error("no attached device exposes a force-feedback actuator axis")]
    NoSuitableDevice,

    /// An accepted device refused one of the mandatory configuration steps.
    #[error("device configuration failed at {step}: {source}")]
    DeviceConfig {
        /// The step that refused.
        step: ConfigStep,
        /// The driver's refusal.
        #[source]
        source: DriverError,
    },

    /// Every enumerated effect type was filtered out or unusable.
    #[error("device reports no usable effect types")]
    EmptyCatalog,

    /// A driver call outside the configuration sequence failed.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl SetupError {
    /// Wraps a driver refusal with the configuration step it happened in.
    pub fn config(step: ConfigStep, source: DriverError) -> Self {
        Self::DeviceConfig { step, source }
    }
}
