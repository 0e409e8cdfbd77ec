// Rigid transforms for placing primitives.
//
// Primitives are intersected in object space: the incoming ray is carried
// into the object's frame, tested against the untransformed shape, and the
// resulting point and normal are carried back.

use glam::{Mat3, Vec3};

use crate::{Aabb, Ray};

/// Extension trait for Mat3 to provide ray-tracing specific helpers.
pub trait Mat3Ext {
    /// Rotation from per-axis angles in degrees, applied about x, then y,
    /// then z (`Rz * Ry * Rx`).
    fn from_rotation_degrees(degrees: Vec3) -> Self;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat3Ext for Mat3 {
    fn from_rotation_degrees(degrees: Vec3) -> Self {
        Mat3::from_rotation_z(degrees.z.to_radians())
            * Mat3::from_rotation_y(degrees.y.to_radians())
            * Mat3::from_rotation_x(degrees.x.to_radians())
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let corners = aabb.corners().map(|corner| *self * corner);
        Aabb::from_point_set(&corners)
    }
}

/// Translation plus per-axis rotation attached to a primitive.
///
/// `rotation` is given in degrees and describes the world-to-object rotation
/// `R`; rays enter object space as `O' = R (O - offset)`, `D' = R D`, and
/// hits leave it as `p = Rᵀ p' + offset`, `n = Rᵀ n'`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub offset: Vec3,
    pub rotation: Vec3,
    to_object: Mat3,
    to_world: Mat3,
}

impl RigidTransform {
    pub fn new(offset: Vec3, rotation_degrees: Vec3) -> Self {
        let to_object = Mat3::from_rotation_degrees(rotation_degrees);
        Self {
            offset,
            rotation: rotation_degrees,
            to_object,
            to_world: to_object.transpose(),
        }
    }

    pub fn translation(offset: Vec3) -> Self {
        Self::new(offset, Vec3::ZERO)
    }

    pub fn is_identity(&self) -> bool {
        self.offset == Vec3::ZERO && self.rotation == Vec3::ZERO
    }

    /// Carry a world-space ray into object space. `t` is preserved.
    pub fn ray_to_object(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.to_object * (ray.origin - self.offset),
            self.to_object * ray.direction,
            ray.time,
        )
    }

    pub fn point_to_object(&self, p: Vec3) -> Vec3 {
        self.to_object * (p - self.offset)
    }

    pub fn vector_to_object(&self, v: Vec3) -> Vec3 {
        self.to_object * v
    }

    pub fn point_to_world(&self, p: Vec3) -> Vec3 {
        self.to_world * p + self.offset
    }

    /// Directions and normals; rotation only, so lengths are preserved.
    pub fn vector_to_world(&self, v: Vec3) -> Vec3 {
        self.to_world * v
    }

    pub fn aabb_to_world(&self, aabb: &Aabb) -> Aabb {
        self.to_world.transform_aabb(aabb).translate(self.offset)
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO)
    }
}
