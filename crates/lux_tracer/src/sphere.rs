//! Sphere primitive for ray tracing.
//!
//! A sphere moves linearly from `center` (time 0) to `center2` (time 1);
//! when the two are equal it is static.

use std::f32::consts::PI;

use lux_math::{Aabb, Interval, Onb, Ray, Vec3};
use rand::RngCore;

use crate::{
    hittable::{HitRecord, Hittable},
    sampling::{random_to_sphere, random_unit_vector},
    MaterialId,
};

/// Lower bound of the `t` range used when probing a light from a surface.
pub(crate) const LIGHT_QUERY_T_MIN: f32 = 0.001;

/// Center of a (possibly moving) sphere at ray `time`.
///
/// Equal endpoints short-circuit to `center`, so static spheres are exact
/// for every `time`.
#[inline]
pub fn sphere_center(center: Vec3, center2: Vec3, time: f32) -> Vec3 {
    if center == center2 {
        return center;
    }
    center * (1.0 - time) + center2 * time
}

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub center2: Vec3,
    pub radius: f32,
    pub material: MaterialId,
}

impl Sphere {
    /// Create a static sphere.
    pub fn new(center: Vec3, radius: f32, material: MaterialId) -> Self {
        Self::moving(center, center, radius, material)
    }

    /// Create a sphere that travels from `center` to `center2` over the
    /// shutter interval.
    pub fn moving(center: Vec3, center2: Vec3, radius: f32, material: MaterialId) -> Self {
        Self {
            center,
            center2,
            radius,
            material,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.center != self.center2
    }

    pub fn center_at(&self, time: f32) -> Vec3 {
        sphere_center(self.center, self.center2, time)
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }

    /// Deterministic ray/sphere test.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let center = self.center_at(ray.time);
        let oc = center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let outward_normal = (p - center) / self.radius;
        Some(HitRecord::new(
            ray,
            root,
            p,
            outward_normal,
            self.material,
            Self::get_sphere_uv(outward_normal),
        ))
    }

    /// Solid-angle density of [`Sphere::random_direction`] for `direction`
    /// leaving `origin`; zero when the direction misses the sphere.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3, time: f32) -> f32 {
        let toward_light = Ray::new(origin, direction, time);
        if self
            .intersect(&toward_light, Interval::new(LIGHT_QUERY_T_MIN, f32::INFINITY))
            .is_none()
        {
            return 0.0;
        }

        let distance_squared = (self.center_at(time) - origin).length_squared();
        let radius_squared = self.radius * self.radius;
        if distance_squared <= radius_squared {
            return 1.0 / (4.0 * PI);
        }

        let cos_theta_max = (1.0 - radius_squared / distance_squared).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);
        1.0 / solid_angle
    }

    /// Direction from `origin` toward a uniformly chosen point of the
    /// sphere's visible cone.
    pub fn random_direction(&self, origin: Vec3, time: f32, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center_at(time) - origin;
        let distance_squared = direction.length_squared();
        if distance_squared <= self.radius * self.radius {
            return random_unit_vector(rng);
        }

        let uvw = Onb::new(direction);
        uvw.transform(random_to_sphere(rng, self.radius, distance_squared))
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord> {
        self.intersect(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius.abs());
        let box0 = Aabb::from_points(self.center - rvec, self.center + rvec);
        if !self.is_moving() {
            return box0;
        }
        let box1 = Aabb::from_points(self.center2 - rvec, self.center2 + rvec);
        Aabb::surrounding(&box0, &box1)
    }
}
