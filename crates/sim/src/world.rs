//! A self-contained rigid-cube physics world.
//!
//! The same type serves two roles: the host owns a *live* world whose bodies
//! are visible, and the placement orchestrator exclusively owns a *scratch*
//! world where speculative simulations run without visible side effects.
//!
//! The model is deliberately simple: uniform unit-mass cubes over an
//! infinite ground plane at y = 0, semi-implicit Euler integration,
//! AABB-based contact resolution with mass-weighted minimum-overlap
//! separation, and a contact torque that tips bodies whose center of mass
//! overhangs their support. Advancing a world is single-threaded and
//! deterministic for identical inputs.

use nalgebra::{Unit, Vector3};

use crate::body::Body;
use stackwise_core::Config;

/// Opaque handle to a body slot in a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(usize);

/// A physics world hosting rigid cube bodies above a ground plane.
///
/// Body slots form an arena with a free list: removing a body frees its slot
/// for reuse, and handles are never invalidated by unrelated removals.
#[derive(Debug)]
pub struct World {
    slots: Vec<Option<Body>>,
    free: Vec<usize>,
    gravity: f64,
    friction: f64,
    restitution: f64,
    rest_velocity_threshold: f64,
    solver_iterations: usize,
}

impl World {
    /// Creates an empty world using the physics parameters of `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            gravity: config.gravity,
            friction: config.friction,
            restitution: config.restitution,
            rest_velocity_threshold: config.rest_velocity_threshold,
            solver_iterations: config.solver_iterations.max(1),
        }
    }

    /// Inserts a body, returning its handle.
    pub fn insert(&mut self, body: Body) -> BodyId {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(body);
            BodyId(index)
        } else {
            self.slots.push(Some(body));
            BodyId(self.slots.len() - 1)
        }
    }

    /// Removes a body, returning it if the handle was live.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let body = self.slots.get_mut(id.0).and_then(Option::take);
        if body.is_some() {
            self.free.push(id.0);
        }
        body
    }

    /// Borrows a body.
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Mutably borrows a body.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Sets a body's kinematic flag, waking it when it becomes dynamic.
    pub fn set_kinematic(&mut self, id: BodyId, kinematic: bool) {
        if let Some(body) = self.body_mut(id) {
            body.kinematic = kinematic;
            if !kinematic {
                body.at_rest = false;
            }
        }
    }

    /// Number of live bodies.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// True if the world has no bodies.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over live bodies in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|b| (BodyId(i), b)))
    }

    /// Advances the simulation by one fixed time step.
    pub fn advance(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        self.integrate(dt);
        self.resolve_ground_contacts();
        for iteration in 0..self.solver_iterations {
            self.resolve_body_contacts(dt, iteration == 0);
        }
        self.detect_rest();
    }

    /// Advances by `ceil(duration / dt)` fixed steps, truncating the last
    /// step so total simulated time equals `duration` exactly.
    pub fn advance_for(&mut self, duration: f64, dt: f64) {
        if duration <= 0.0 || dt <= 0.0 {
            return;
        }
        let mut remaining = duration;
        while remaining > 0.0 {
            let step = remaining.min(dt);
            self.advance(step);
            remaining -= step;
        }
    }

    fn integrate(&mut self, dt: f64) {
        for slot in &mut self.slots {
            let Some(body) = slot.as_mut() else { continue };
            if body.kinematic || body.at_rest {
                body.supported = body.at_rest;
                continue;
            }
            body.supported = false;
            body.velocity.y -= self.gravity * dt;
            body.position += body.velocity * dt;

            let spin = body.angular_velocity * dt;
            if spin.norm_squared() > 1e-18 {
                body.rotation =
                    nalgebra::UnitQuaternion::from_scaled_axis(spin) * body.rotation;
            }
        }
    }

    fn resolve_ground_contacts(&mut self) {
        for slot in &mut self.slots {
            let Some(body) = slot.as_mut() else { continue };
            if body.kinematic {
                continue;
            }
            let penetration = -body.bottom();
            if penetration <= 0.0 {
                continue;
            }
            body.position.y += penetration;
            if body.velocity.y < 0.0 {
                let bounce = -body.velocity.y * self.restitution;
                body.velocity.y = if bounce < self.rest_velocity_threshold {
                    0.0
                } else {
                    bounce
                };
            }
            body.velocity.x *= 1.0 - self.friction;
            body.velocity.z *= 1.0 - self.friction;
            body.angular_velocity *= 1.0 - self.friction;
            body.supported = true;
        }
    }

    /// One iteration of pairwise minimum-overlap separation.
    ///
    /// Contact torque is applied only on the first iteration of a step so
    /// repeated solver passes do not multiply it.
    fn resolve_body_contacts(&mut self, dt: f64, apply_torque: bool) {
        let n = self.slots.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = self.slots.split_at_mut(j);
                let (Some(a), Some(b)) = (head[i].as_mut(), tail[0].as_mut()) else {
                    continue;
                };
                if a.kinematic && b.kinematic {
                    continue;
                }
                Self::resolve_pair(
                    a,
                    b,
                    dt,
                    apply_torque,
                    self.gravity,
                    self.restitution,
                    self.friction,
                    self.rest_velocity_threshold,
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_pair(
        a: &mut Body,
        b: &mut Body,
        dt: f64,
        apply_torque: bool,
        gravity: f64,
        restitution: f64,
        friction: f64,
        rest_velocity_threshold: f64,
    ) {
        let (a_min, a_max) = a.aabb();
        let (b_min, b_max) = b.aabb();

        let overlap_x = a_max.x.min(b_max.x) - a_min.x.max(b_min.x);
        let overlap_y = a_max.y.min(b_max.y) - a_min.y.max(b_min.y);
        let overlap_z = a_max.z.min(b_max.z) - a_min.z.max(b_min.z);
        if overlap_x <= 0.0 || overlap_y <= 0.0 || overlap_z <= 0.0 {
            return;
        }

        let min_overlap = overlap_x.min(overlap_y).min(overlap_z);

        // Kinematic bodies never move; the dynamic partner absorbs the
        // whole correction. Equal unit masses otherwise.
        let (ratio_a, ratio_b) = if a.kinematic {
            (0.0, 1.0)
        } else if b.kinematic {
            (1.0, 0.0)
        } else {
            (0.5, 0.5)
        };

        if min_overlap == overlap_y {
            // Vertical contact: the upper body rests on the lower one.
            let (upper, lower, upper_ratio, lower_ratio) = if a.position.y >= b.position.y {
                (a, b, ratio_a, ratio_b)
            } else {
                (b, a, ratio_b, ratio_a)
            };
            upper.position.y += min_overlap * upper_ratio;
            lower.position.y -= min_overlap * lower_ratio;

            let v_upper = upper.velocity.y;
            let v_lower = lower.velocity.y;
            if v_upper < v_lower {
                // Approaching: exchange vertical velocity with restitution.
                let bounce = v_lower + (v_lower - v_upper) * restitution;
                upper.velocity.y = if bounce.abs() < rest_velocity_threshold {
                    v_lower
                } else {
                    bounce
                };
                if !lower.kinematic && !lower.at_rest {
                    lower.velocity.y += (v_upper - v_lower) * 0.5 * restitution;
                }
            }
            upper.velocity.x *= 1.0 - friction;
            upper.velocity.z *= 1.0 - friction;
            upper.supported = lower.supported || lower.kinematic || lower.at_rest;

            if apply_torque && !upper.kinematic {
                Self::apply_support_torque(
                    upper,
                    (a_min.x.max(b_min.x), a_min.z.max(b_min.z)),
                    (a_max.x.min(b_max.x), a_max.z.min(b_max.z)),
                    gravity,
                    dt,
                );
            }
        } else if min_overlap == overlap_x {
            let direction = if a.position.x <= b.position.x { -1.0 } else { 1.0 };
            a.position.x += direction * min_overlap * ratio_a;
            b.position.x -= direction * min_overlap * ratio_b;
        } else {
            let direction = if a.position.z <= b.position.z { -1.0 } else { 1.0 };
            a.position.z += direction * min_overlap * ratio_a;
            b.position.z -= direction * min_overlap * ratio_b;
        }
    }

    /// Tips a supported body whose center of mass overhangs the support
    /// footprint; damps spin when it is well supported.
    ///
    /// The footprint is the ground-plane rectangle shared by the two
    /// bodies' bounding boxes. Gravity acting on the overhang lever arm
    /// produces an angular acceleration about the footprint edge
    /// (I = 2/3 h^2 for a unit-mass cube).
    fn apply_support_torque(
        upper: &mut Body,
        support_min: (f64, f64),
        support_max: (f64, f64),
        gravity: f64,
        dt: f64,
    ) {
        let cx = upper.position.x;
        let cz = upper.position.z;
        let nearest_x = cx.clamp(support_min.0, support_max.0);
        let nearest_z = cz.clamp(support_min.1, support_max.1);
        let lever = Vector3::new(cx - nearest_x, 0.0, cz - nearest_z);

        if lever.norm_squared() < 1e-12 {
            // Center of mass inside the support region: settle spin.
            upper.angular_velocity *= 0.9;
            return;
        }

        let inertia = 2.0 / 3.0 * upper.half_extent * upper.half_extent;
        let gravity_force = Vector3::new(0.0, -gravity, 0.0);
        let torque = lever.cross(&gravity_force);
        if let Some(axis) = Unit::try_new(torque, 1e-12) {
            upper.angular_velocity += axis.into_inner() * (torque.norm() / inertia) * dt;
        }
    }

    fn detect_rest(&mut self) {
        for slot in &mut self.slots {
            let Some(body) = slot.as_mut() else { continue };
            if body.kinematic || body.at_rest || !body.supported {
                continue;
            }
            if body.velocity.norm() < self.rest_velocity_threshold
                && body.angular_velocity.norm() < self.rest_velocity_threshold
            {
                body.velocity = Vector3::zeros();
                body.angular_velocity = Vector3::zeros();
                body.at_rest = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use stackwise_core::Pose;

    fn test_world() -> World {
        World::new(&Config::default())
    }

    #[test]
    fn test_insert_remove_reuses_slots() {
        let mut world = test_world();
        let a = world.insert(Body::cube(0.5));
        let b = world.insert(Body::cube(0.5));
        assert_eq!(world.len(), 2);

        assert!(world.remove(a).is_some());
        assert_eq!(world.len(), 1);
        assert!(world.remove(a).is_none());

        let c = world.insert(Body::cube(0.5));
        assert_eq!(world.len(), 2);
        // Freed slot is reused.
        assert_eq!(a, c);
        assert!(world.body(b).is_some());
    }

    #[test]
    fn test_dropped_cube_lands_on_ground() {
        let mut world = test_world();
        let pose = Pose::at(Point3::new(0.0, 2.0, 0.0));
        let id = world.insert(Body::at_pose(&pose, 0.5));

        world.advance_for(1.5, 0.02);

        let body = world.body(id).expect("body exists");
        // Resting with its bottom on the ground plane.
        assert!((body.position.y - 0.5).abs() < 0.05, "y = {}", body.position.y);
        assert!(body.at_rest);
        // No lateral drift during a straight drop.
        assert!(body.position.x.abs() < 1e-9);
        assert!(body.position.z.abs() < 1e-9);
        assert!(body.tilt_degrees() < 1e-9);
    }

    #[test]
    fn test_advance_is_deterministic() {
        let run = || {
            let mut world = test_world();
            let id = world.insert(Body::at_pose(&Pose::at(Point3::new(0.2, 3.0, -0.1)), 0.5));
            world.insert(Body::at_pose(&Pose::at(Point3::new(0.0, 0.5, 0.0)), 0.5));
            world.advance_for(1.5, 0.02);
            world.body(id).map(|b| (b.position, b.rotation)).expect("body")
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_advance_for_truncates_last_step() {
        // 0.05 / 0.02 -> steps of 0.02, 0.02, 0.01; simulated time must be
        // exactly the duration, not a multiple of dt.
        let mut a = test_world();
        let ia = a.insert(Body::at_pose(&Pose::at(Point3::new(0.0, 5.0, 0.0)), 0.5));
        a.advance_for(0.05, 0.02);

        let mut b = test_world();
        let ib = b.insert(Body::at_pose(&Pose::at(Point3::new(0.0, 5.0, 0.0)), 0.5));
        b.advance(0.02);
        b.advance(0.02);
        b.advance(0.01);

        let pa = a.body(ia).expect("a").position;
        let pb = b.body(ib).expect("b").position;
        assert!((pa.y - pb.y).abs() < 1e-12);
    }

    #[test]
    fn test_cube_stacks_on_cube() {
        let mut world = test_world();
        let base = world.insert(Body::at_pose(&Pose::at(Point3::new(0.0, 0.5, 0.0)), 0.5));
        let top = world.insert(Body::at_pose(&Pose::at(Point3::new(0.0, 2.5, 0.0)), 0.5));

        world.advance_for(2.0, 0.02);

        let base_body = world.body(base).expect("base");
        let top_body = world.body(top).expect("top");
        assert!((base_body.position.y - 0.5).abs() < 0.05);
        // Top cube comes to rest on the base cube, around y = 1.5.
        assert!(
            (top_body.position.y - 1.5).abs() < 0.1,
            "top y = {}",
            top_body.position.y
        );
        assert!(top_body.supported || top_body.at_rest);
    }

    #[test]
    fn test_overhanging_cube_tips() {
        let mut world = test_world();
        world.insert(Body::at_pose(&Pose::at(Point3::new(0.0, 0.5, 0.0)), 0.5));
        // Center of mass 0.9 to the side: only a sliver of support.
        let top = world.insert(Body::at_pose(&Pose::at(Point3::new(0.9, 1.6, 0.0)), 0.5));

        world.advance_for(1.5, 0.02);

        let top_body = world.body(top).expect("top");
        let moved = top_body.position.x - 0.9;
        // The overhanging cube must have tilted or slid off, not balanced.
        assert!(
            top_body.tilt_degrees() > 1.0 || moved.abs() > 0.05,
            "tilt = {}, slide = {}",
            top_body.tilt_degrees(),
            moved
        );
    }

    #[test]
    fn test_kinematic_body_does_not_fall() {
        let mut world = test_world();
        let id = world.insert(Body::at_pose(&Pose::at(Point3::new(0.0, 3.0, 0.0)), 0.5));
        world.set_kinematic(id, true);

        world.advance_for(1.0, 0.02);

        let body = world.body(id).expect("body");
        assert!((body.position.y - 3.0).abs() < 1e-12);
    }
}
