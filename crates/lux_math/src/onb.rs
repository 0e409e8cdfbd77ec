//! Orthonormal basis built around a single direction.

use crate::Vec3;

/// Local `{u, v, w}` frame whose `w` axis follows a given normal.
///
/// Sampling routines draw directions in this local frame (with `+z` as the
/// preferred axis) and carry them to world space with [`Onb::transform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    /// `n` does not need to be unit length.
    pub fn new(n: Vec3) -> Self {
        let w = n.normalize();
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = w.cross(v);
        Self { u, v, w }
    }

    /// Map local basis coordinates to world space.
    #[inline]
    pub fn transform(&self, local: Vec3) -> Vec3 {
        local.x * self.u + local.y * self.v + local.z * self.w
    }
}
