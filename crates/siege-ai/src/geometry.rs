//! Formation geometry: spawn points, basis vectors, slot offsets and
//! orbit points. Plain vector math, no entity state.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use siege_core::constants::*;
use siege_core::enums::FormationRole;

/// Orthonormal frame looking from a point toward the defender.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormationBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl FormationBasis {
    /// Basis whose `forward` points from `from` to the origin.
    /// Returns `None` when `from` is the origin.
    pub fn toward_origin(from: Vec3) -> Option<Self> {
        let forward = (-from).try_normalize()?;
        let right = forward
            .cross(Vec3::Y)
            .try_normalize()
            .or_else(|| forward.cross(Vec3::X).try_normalize())?;
        let up = right.cross(forward);
        Some(Self { forward, right, up })
    }

    /// Map `(right, up, forward)` local coordinates into world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.right * local.x + self.up * local.y + self.forward * local.z
    }
}

/// Uniformly distributed point on a sphere of `radius` around the defender.
pub fn random_sphere_point<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    // Archimedes: uniform height + uniform azimuth is uniform on the sphere.
    let y: f32 = rng.gen_range(-1.0..=1.0);
    let azimuth: f32 = rng.gen_range(0.0..TAU);
    let ring = (1.0 - y * y).max(0.0).sqrt();
    Vec3::new(ring * azimuth.cos(), y, ring * azimuth.sin()) * radius
}

/// V-formation slots: leader, two near wingmen, two far wingmen.
/// Offsets are local `(right, up, forward)`; wingmen trail the leader.
pub fn v_formation_slots() -> [(FormationRole, Vec3); 5] {
    let s = V_FORMATION_SPACING;
    [
        (FormationRole::Leader, Vec3::ZERO),
        (FormationRole::NearWing, Vec3::new(-s, 0.0, -s)),
        (FormationRole::NearWing, Vec3::new(s, 0.0, -s)),
        (FormationRole::FarWing, Vec3::new(-2.0 * s, 0.0, -2.0 * s)),
        (FormationRole::FarWing, Vec3::new(2.0 * s, 0.0, -2.0 * s)),
    ]
}

/// Lateral offsets for the ships of one pincer group, centered on zero.
pub fn pincer_group_offsets(count: usize) -> Vec<Vec3> {
    let half = (count as f32 - 1.0) / 2.0;
    (0..count)
        .map(|i| Vec3::new((i as f32 - half) * PINCER_GROUP_SPACING, 0.0, 0.0))
        .collect()
}

/// A direction perpendicular to `position`, for strafe runs.
pub fn perpendicular(position: Vec3) -> Option<Vec3> {
    position
        .cross(Vec3::Y)
        .try_normalize()
        .or_else(|| position.cross(Vec3::X).try_normalize())
}

/// Point on an escort's orbit around `anchor`, in the plane facing the defender.
pub fn escort_orbit_point(anchor: Vec3, angle: f32) -> Vec3 {
    let (right, up) = match FormationBasis::toward_origin(anchor) {
        Some(basis) => (basis.right, basis.up),
        None => (Vec3::X, Vec3::Y),
    };
    anchor + (right * angle.cos() + up * angle.sin()) * ESCORT_ORBIT_RADIUS
}

/// Point on a horizontal orbit around the defender.
pub fn orbit_point(angle: f32, radius: f32, height: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), height, radius * angle.sin())
}

/// Frame-rate independent exponential approach of `current` toward `target`.
pub fn smooth_toward(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    let t = 1.0 - (-rate * dt).exp();
    current.lerp(target, t)
}

/// Evenly spaced starting angles for `count` orbiting ships.
pub fn phased_angles(count: usize, offset: f32) -> Vec<f32> {
    (0..count)
        .map(|i| (offset + TAU * i as f32 / count.max(1) as f32).rem_euclid(TAU))
        .collect()
}
