//! Constant-density participating medium.
//!
//! A ray entering the boundary travels an exponentially distributed distance
//! before scattering; if that distance exceeds the chord through the
//! boundary it passes straight through.

use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{
    hittable::{HitRecord, Hittable},
    quad::{box_quads, Quad},
    sampling::gen_f32,
    MaterialId,
    Sphere,
};

/// Gap between the entry hit and the search for the exit hit.
const EXIT_SEARCH_OFFSET: f32 = 1e-4;

/// Closed shape enclosing a medium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediumBoundary {
    Sphere(Sphere),
    Cuboid([Quad; 6]),
}

impl MediumBoundary {
    /// Box boundary spanned by two corners.
    pub fn cuboid(a: Vec3, b: Vec3) -> Self {
        MediumBoundary::Cuboid(box_quads(a, b, 0))
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match self {
            MediumBoundary::Sphere(sphere) => sphere.intersect(ray, ray_t),
            MediumBoundary::Cuboid(faces) => {
                let mut closest: Option<HitRecord> = None;
                for face in faces {
                    let max = closest.map_or(ray_t.max, |rec| rec.t);
                    if let Some(rec) = face.intersect(ray, ray_t.with_max(max)) {
                        closest = Some(rec);
                    }
                }
                closest
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            MediumBoundary::Sphere(sphere) => sphere.bounding_box(),
            MediumBoundary::Cuboid(faces) => faces
                .iter()
                .fold(Aabb::EMPTY, |acc, face| Aabb::surrounding(&acc, &face.bounding_box())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantMedium {
    pub boundary: MediumBoundary,
    pub material: MaterialId,
    density: f32,
    neg_inv_density: f32,
}

impl ConstantMedium {
    /// `density` is the inverse mean free path; it must be positive.
    pub fn new(boundary: MediumBoundary, density: f32, material: MaterialId) -> Self {
        Self {
            boundary,
            material,
            density,
            neg_inv_density: -1.0 / density,
        }
    }

    pub fn density(&self) -> f32 {
        self.density
    }
}

impl Hittable for ConstantMedium {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord> {
        let entry = self.boundary.intersect(ray, Interval::UNIVERSE)?;
        let exit = self
            .boundary
            .intersect(ray, Interval::new(entry.t + EXIT_SEARCH_OFFSET, f32::INFINITY))?;

        let t_enter = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }
        let t_enter = t_enter.max(0.0);

        let ray_length = ray.direction.length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f32(rng).ln();
        if hit_distance > distance_inside_boundary {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        Some(HitRecord {
            p: ray.at(t),
            // Arbitrary: isotropic scattering ignores the normal
            normal: Vec3::X,
            t,
            front_face: true,
            material: self.material,
            u: 0.0,
            v: 0.0,
        })
    }

    fn bounding_box(&self) -> Aabb {
        self.boundary.bounding_box()
    }
}
