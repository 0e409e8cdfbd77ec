//! Parallelogram primitive.
//!
//! A quad is spanned by a corner `q` and two edge vectors `u`, `v`. Its
//! front face is the side `u × v` points to.

use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{
    hittable::{HitRecord, Hittable},
    sampling::gen_f32,
    sphere::LIGHT_QUERY_T_MIN,
    MaterialId,
};

/// Denominators below this are treated as a ray parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub q: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    pub material: MaterialId,
    normal: Vec3,
    d: f32,
    w: Vec3,
    area: f32,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: MaterialId) -> Self {
        let n = u.cross(v);
        let normal = n.normalize_or_zero();
        let n_dot_n = n.dot(n);
        let w = if n_dot_n > 0.0 { n / n_dot_n } else { Vec3::ZERO };

        Self {
            q,
            u,
            v,
            material,
            normal,
            d: normal.dot(q),
            w,
            area: n.length(),
        }
    }

    /// Unit plane normal `normalize(u × v)`.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// `|u × v|`; zero for a degenerate quad.
    pub fn area(&self) -> f32 {
        self.area
    }

    /// Deterministic ray/quad test.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let denom = self.normal.dot(ray.direction);

        // No hit if the ray is parallel to the plane.
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin)) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        // Planar coordinates of the hit point relative to q
        let intersection = ray.at(t);
        let planar_hitpt_vector = intersection - self.q;
        let alpha = self.w.dot(planar_hitpt_vector.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hitpt_vector));

        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return None;
        }

        Some(HitRecord::new(
            ray,
            t,
            intersection,
            self.normal,
            self.material,
            (alpha, beta),
        ))
    }

    /// Solid-angle density of [`Quad::random_direction`] for `direction`
    /// leaving `origin`; zero when the direction misses the quad.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let toward_light = Ray::new(origin, direction, 0.0);
        let Some(rec) =
            self.intersect(&toward_light, Interval::new(LIGHT_QUERY_T_MIN, f32::INFINITY))
        else {
            return 0.0;
        };

        let distance_squared = rec.t * rec.t * direction.length_squared();
        let cosine = (direction.dot(rec.normal) / direction.length()).abs();
        distance_squared / (cosine * self.area)
    }

    /// Direction from `origin` to a uniformly chosen point of the quad.
    pub fn random_direction(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let p = self.q + gen_f32(rng) * self.u + gen_f32(rng) * self.v;
        p - origin
    }
}

impl Hittable for Quad {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord> {
        self.intersect(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        let diagonal1 = Aabb::from_points(self.q, self.q + self.u + self.v);
        let diagonal2 = Aabb::from_points(self.q + self.u, self.q + self.v);
        Aabb::surrounding(&diagonal1, &diagonal2)
    }
}

/// The six faces of the axis-aligned box spanned by corners `a` and `b`,
/// all with outward-facing normals.
pub fn box_quads(a: Vec3, b: Vec3, material: MaterialId) -> [Quad; 6] {
    let min = a.min(b);
    let max = a.max(b);

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    [
        Quad::new(Vec3::new(min.x, min.y, max.z), dx, dy, material), // front
        Quad::new(Vec3::new(max.x, min.y, max.z), -dz, dy, material), // right
        Quad::new(Vec3::new(max.x, min.y, min.z), -dx, dy, material), // back
        Quad::new(Vec3::new(min.x, min.y, min.z), dz, dy, material), // left
        Quad::new(Vec3::new(min.x, max.y, max.z), dx, -dz, material), // top
        Quad::new(Vec3::new(min.x, min.y, min.z), dx, dz, material), // bottom
    ]
}
