//! Compass-octant direction codec
//!
//! Directions are exchanged with the driver as cartesian component vectors
//! where each component is one of `-2, -1, 0, 1, 2`. The workbench edits
//! directions as one of eight compass octants; this module is the total
//! mapping between the two.

use serde::{Deserialize, Serialize};

/// One of eight compass direction classes.
///
/// `East` is the canonical fallback: an all-zero or otherwise unmapped
/// vector decodes to `East`, matching the default a freshly created effect
/// reports.
///
/// # Examples
///
/// ```
/// use ffbench_effects::Octant;
///
/// assert_eq!(Octant::from_vector(&[0, -2]), Octant::North);
/// assert_eq!(Octant::from_vector(&[0, 0]), Octant::East);
/// assert_eq!(Octant::NorthWest.vector(2), vec![-1, -1]);
///
/// // Single-axis devices only see the first component.
/// assert_eq!(Octant::West.vector(1), vec![-2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Octant {
    North,
    NorthEast,
    #[default]
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Octant {
    /// All eight octants, clockwise from north.
    pub const ALL: [Octant; 8] = [
        Octant::North,
        Octant::NorthEast,
        Octant::East,
        Octant::SouthEast,
        Octant::South,
        Octant::SouthWest,
        Octant::West,
        Octant::NorthWest,
    ];

    /// Classifies a device-reported direction vector.
    ///
    /// Total over every input: vectors outside the eight canonical patterns
    /// (including all-zero and empty vectors) classify as `East`. A
    /// single-component vector can only reach `East` or `West`.
    pub fn from_vector(direction: &[i32]) -> Self {
        match *direction {
            [x] => {
                if x == -2 {
                    Octant::West
                } else {
                    Octant::East
                }
            }
            [x, y, ..] => Self::from_plane(x, y),
            [] => Octant::East,
        }
    }

    fn from_plane(x: i32, y: i32) -> Self {
        match (x, y) {
            (0, -2) => Octant::North,
            (1, -1) => Octant::NorthEast,
            (2, 0) => Octant::East,
            (1, 1) => Octant::SouthEast,
            (0, 2) => Octant::South,
            (-1, 1) => Octant::SouthWest,
            (-2, 0) => Octant::West,
            (-1, -1) => Octant::NorthWest,
            _ => Octant::East,
        }
    }

    /// The canonical two-component pattern for this octant.
    pub fn plane_components(self) -> (i32, i32) {
        match self {
            Octant::North => (0, -2),
            Octant::NorthEast => (1, -1),
            Octant::East => (2, 0),
            Octant::SouthEast => (1, 1),
            Octant::South => (0, 2),
            Octant::SouthWest => (-1, 1),
            Octant::West => (-2, 0),
            Octant::NorthWest => (-1, -1),
        }
    }

    /// Encodes this octant as a direction vector sized to the device's axis
    /// count (capped at two components).
    pub fn vector(self, axis_count: usize) -> Vec<i32> {
        let (x, y) = self.plane_components();
        let mut v = vec![x, y];
        v.truncate(axis_count.min(2));
        v
    }
}
