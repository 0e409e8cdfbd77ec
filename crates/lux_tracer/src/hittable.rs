//! Hittable trait and HitRecord for ray-object intersection.

use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::MaterialId;

/// Record of a ray-object intersection.
///
/// A fresh record is produced by every successful test; failed tests produce
/// nothing, so a record is never observed half-written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Index into the scene's material table
    pub material: MaterialId,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
}

impl HitRecord {
    /// Build a record, orienting the normal against the incoming ray.
    ///
    /// `outward_normal` is expected to be unit length.
    pub fn new(
        ray: &Ray,
        t: f32,
        p: Vec3,
        outward_normal: Vec3,
        material: MaterialId,
        (u, v): (f32, f32),
    ) -> Self {
        let mut rec = Self {
            p,
            normal: outward_normal,
            t,
            front_face: true,
            material,
            u,
            v,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection of `ray` with this object inside `ray_t`.
    ///
    /// The generator is only consumed by stochastic surfaces (participating
    /// media); solid geometry ignores it.
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}
