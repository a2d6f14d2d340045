//! Pose math.
//!
//! The world is Y-up: gravity acts along -Y and the "ground plane" for
//! displacement measurements is the XZ plane.

use nalgebra::{Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A position plus a unit-quaternion rotation. Immutable value type.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// World-space position.
    pub position: Point3<f64>,
    /// World-space rotation.
    pub rotation: UnitQuaternion<f64>,
}

impl Pose {
    /// Creates a pose from a position and rotation.
    pub fn new(position: Point3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { position, rotation }
    }

    /// Creates an unrotated pose at the given position.
    pub fn at(position: Point3<f64>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Creates a pose rotated by `yaw_degrees` about the world up axis.
    pub fn from_yaw_degrees(position: Point3<f64>, yaw_degrees: f64) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::from_axis_angle(
                &Vector3::y_axis(),
                yaw_degrees.to_radians(),
            ),
        }
    }

    /// The pose's local up axis expressed in world space.
    pub fn up_axis(&self) -> Vector3<f64> {
        self.rotation * Vector3::y()
    }

    /// Angle in degrees between the local up axis and world up.
    ///
    /// Zero for any pure yaw rotation; grows as the pose pitches or rolls
    /// away from vertical.
    pub fn tilt_degrees(&self) -> f64 {
        self.up_axis().y.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Ground-plane (XZ) distance to another pose's position.
    pub fn ground_distance(&self, other: &Pose) -> f64 {
        ground_plane_distance(&self.position, &other.position)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Point3::origin())
    }
}

/// Euclidean distance between two points projected onto the ground (XZ)
/// plane, ignoring the vertical axis.
pub fn ground_plane_distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}
