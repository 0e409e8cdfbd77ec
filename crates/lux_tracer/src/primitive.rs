//! Scene primitives: a tagged shape plus an optional rigid transform.

use lux_math::{Aabb, Interval, Ray, RigidTransform, Vec3};
use rand::RngCore;

use crate::{
    hittable::{HitRecord, Hittable},
    medium::ConstantMedium,
    quad::Quad,
    sampling::random_unit_vector,
    sphere::Sphere,
    MaterialId,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Quad(Quad),
    Medium(ConstantMedium),
}

impl Shape {
    pub fn material(&self) -> MaterialId {
        match self {
            Shape::Sphere(sphere) => sphere.material,
            Shape::Quad(quad) => quad.material,
            Shape::Medium(medium) => medium.material,
        }
    }

    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord> {
        match self {
            Shape::Sphere(sphere) => sphere.intersect(ray, ray_t),
            Shape::Quad(quad) => quad.intersect(ray, ray_t),
            Shape::Medium(medium) => medium.hit(ray, ray_t, rng),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Shape::Sphere(sphere) => sphere.bounding_box(),
            Shape::Quad(quad) => quad.bounding_box(),
            Shape::Medium(medium) => medium.bounding_box(),
        }
    }
}

/// An immutable scene element. Primitives live in a flat array owned by the
/// scene and are referenced by index from the BVH and the light list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    transform: Option<RigidTransform>,
    bbox: Aabb,
}

impl Primitive {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            transform: None,
            bbox: shape.bounding_box(),
        }
    }

    /// Attach a translation/rotation. An identity transform is dropped.
    pub fn with_transform(mut self, transform: RigidTransform) -> Self {
        if transform.is_identity() {
            self.transform = None;
            self.bbox = self.shape.bounding_box();
        } else {
            self.transform = Some(transform);
            self.bbox = transform.aabb_to_world(&self.shape.bounding_box());
        }
        self
    }

    pub fn transform(&self) -> Option<&RigidTransform> {
        self.transform.as_ref()
    }

    pub fn material(&self) -> MaterialId {
        self.shape.material()
    }

    /// Whether this primitive can be importance-sampled as a light.
    pub fn is_samplable(&self) -> bool {
        matches!(self.shape, Shape::Sphere(_) | Shape::Quad(_))
    }

    /// Density (per unit solid angle) of [`Primitive::random_direction`].
    ///
    /// Rotation preserves solid angle, so transformed lights are evaluated in
    /// object space.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3, time: f32) -> f32 {
        let (origin, direction) = match &self.transform {
            Some(xf) => (xf.point_to_object(origin), xf.vector_to_object(direction)),
            None => (origin, direction),
        };
        match &self.shape {
            Shape::Sphere(sphere) => sphere.pdf_value(origin, direction, time),
            Shape::Quad(quad) => quad.pdf_value(origin, direction),
            Shape::Medium(_) => 0.0,
        }
    }

    /// Direction from `origin` toward a random point of this primitive.
    pub fn random_direction(&self, origin: Vec3, time: f32, rng: &mut dyn RngCore) -> Vec3 {
        let local_origin = match &self.transform {
            Some(xf) => xf.point_to_object(origin),
            None => origin,
        };
        let local = match &self.shape {
            Shape::Sphere(sphere) => sphere.random_direction(local_origin, time, rng),
            Shape::Quad(quad) => quad.random_direction(local_origin, rng),
            Shape::Medium(_) => random_unit_vector(rng),
        };
        match &self.transform {
            Some(xf) => xf.vector_to_world(local),
            None => local,
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::new(Shape::Sphere(sphere))
    }
}

impl From<Quad> for Primitive {
    fn from(quad: Quad) -> Self {
        Primitive::new(Shape::Quad(quad))
    }
}

impl From<ConstantMedium> for Primitive {
    fn from(medium: ConstantMedium) -> Self {
        Primitive::new(Shape::Medium(medium))
    }
}

impl Hittable for Primitive {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord> {
        let Some(xf) = &self.transform else {
            return self.shape.hit(ray, ray_t, rng);
        };

        let local_ray = xf.ray_to_object(ray);
        let mut rec = self.shape.hit(&local_ray, ray_t, rng)?;
        rec.p = xf.point_to_world(rec.p);
        rec.normal = xf.vector_to_world(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
