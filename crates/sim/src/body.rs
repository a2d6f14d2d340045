//! Rigid cube bodies and state snapshots.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use stackwise_core::{ground_plane_distance, Pose};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// State of one rigid cubic body.
///
/// Bodies are uniform-density cubes; `half_extent` is half the edge length.
/// The mass is taken as 1.0 for every body, so mass never appears in the
/// contact math explicitly.
#[derive(Debug, Clone)]
pub struct Body {
    /// Center-of-mass position.
    pub position: Point3<f64>,
    /// Orientation.
    pub rotation: UnitQuaternion<f64>,
    /// Linear velocity.
    pub velocity: Vector3<f64>,
    /// Angular velocity (world frame, radians/s).
    pub angular_velocity: Vector3<f64>,
    /// Half the cube edge length.
    pub half_extent: f64,
    /// Kinematic bodies ignore forces and contacts (used by freeze).
    pub kinematic: bool,
    /// Set by the integrator once a supported body slows below the rest
    /// threshold.
    pub at_rest: bool,
    /// True while the body is resting on the ground or another body.
    pub supported: bool,
}

impl Body {
    /// Creates an unrotated cube at the origin.
    pub fn cube(half_extent: f64) -> Self {
        Self::at_pose(&Pose::default(), half_extent)
    }

    /// Creates a cube at the given pose with zero velocities.
    pub fn at_pose(pose: &Pose, half_extent: f64) -> Self {
        Self {
            position: pose.position,
            rotation: pose.rotation,
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            half_extent,
            kinematic: false,
            at_rest: false,
            supported: false,
        }
    }

    /// Fully reinitializes a (possibly pooled) body at a new pose.
    pub fn reset(&mut self, pose: &Pose, half_extent: f64) {
        self.position = pose.position;
        self.rotation = pose.rotation;
        self.velocity = Vector3::zeros();
        self.angular_velocity = Vector3::zeros();
        self.half_extent = half_extent;
        self.kinematic = false;
        self.at_rest = false;
        self.supported = false;
    }

    /// The body's current pose.
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    /// Captures position, rotation and both velocities.
    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            position: self.position,
            rotation: self.rotation,
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
        }
    }

    /// Restores a captured state, waking the body.
    pub fn restore(&mut self, snapshot: &BodySnapshot) {
        self.position = snapshot.position;
        self.rotation = snapshot.rotation;
        self.velocity = snapshot.velocity;
        self.angular_velocity = snapshot.angular_velocity;
        self.at_rest = false;
        self.supported = false;
    }

    /// Angle in degrees between the body's local up axis and world up.
    pub fn tilt_degrees(&self) -> f64 {
        self.pose().tilt_degrees()
    }

    /// Ground-plane distance travelled from a captured initial state.
    pub fn horizontal_displacement_from(&self, snapshot: &BodySnapshot) -> f64 {
        ground_plane_distance(&self.position, &snapshot.position)
    }

    /// World-space axis-aligned bounding box of the rotated cube.
    ///
    /// The extent along each world axis is `h * sum_j |R_ij|` - the
    /// projection of all three local half-axes.
    pub fn aabb(&self) -> (Point3<f64>, Point3<f64>) {
        let rotation = self.rotation.to_rotation_matrix();
        let m = rotation.matrix();
        let h = self.half_extent;
        let mut extent = Vector3::zeros();
        for i in 0..3 {
            extent[i] = h * (m[(i, 0)].abs() + m[(i, 1)].abs() + m[(i, 2)].abs());
        }
        (self.position - extent, self.position + extent)
    }

    /// Y coordinate of the highest point of the body.
    pub fn top(&self) -> f64 {
        self.aabb().1.y
    }

    /// Y coordinate of the lowest point of the body.
    pub fn bottom(&self) -> f64 {
        self.aabb().0.y
    }
}

/// Position, rotation and velocities of one body at a point in time.
///
/// Captured before each evaluation round so that every candidate is trialled
/// against an identical, unperturbed starting condition.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodySnapshot {
    /// Captured position.
    pub position: Point3<f64>,
    /// Captured rotation.
    pub rotation: UnitQuaternion<f64>,
    /// Captured linear velocity.
    pub velocity: Vector3<f64>,
    /// Captured angular velocity.
    pub angular_velocity: Vector3<f64>,
}
