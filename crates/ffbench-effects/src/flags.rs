//! Parameter and coordinate flag sets
//!
//! Bit values mirror the conventional force-feedback driver ABI so that
//! logged flag words line up with what a bus trace would show.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Which parameter categories a write request carries, and which
    /// categories a device statically advertises for an effect type.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParameterFlags: u32 {
        /// Total playback duration.
        const DURATION = 0x0000_0001;
        /// Sample period.
        const SAMPLE_PERIOD = 0x0000_0002;
        /// Overall effect gain.
        const GAIN = 0x0000_0004;
        /// Direction vector.
        const DIRECTION = 0x0000_0040;
        /// Attack/fade envelope.
        const ENVELOPE = 0x0000_0080;
        /// The type-specific parameter block.
        const TYPE_SPECIFIC_PARAMS = 0x0000_0100;
        /// Restart the effect as part of the write.
        const START = 0x2000_0000;
    }
}

bitflags! {
    /// How a direction vector and axis list are interpreted by the driver.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CoordinateSpec: u32 {
        /// Axes are addressed by object id.
        const OBJECT_IDS = 0x0000_0001;
        /// Axes are addressed by data-format offset.
        const OBJECT_OFFSETS = 0x0000_0002;
        /// Direction components are cartesian.
        const CARTESIAN = 0x0000_0010;
        /// Direction components are polar.
        const POLAR = 0x0000_0020;
        /// Direction components are spherical.
        const SPHERICAL = 0x0000_0040;
    }
}

impl ParameterFlags {
    /// The categories a descriptor can statically advertise. START is a
    /// write-request modifier, never a capability.
    pub const STATIC_MASK: Self = Self::DURATION
        .union(Self::SAMPLE_PERIOD)
        .union(Self::GAIN)
        .union(Self::DIRECTION)
        .union(Self::ENVELOPE)
        .union(Self::TYPE_SPECIFIC_PARAMS);
}

impl Serialize for ParameterFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for ParameterFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Self::from_bits_retain)
    }
}

impl Serialize for CoordinateSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for CoordinateSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Self::from_bits_retain)
    }
}
