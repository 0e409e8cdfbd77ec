//! Probability densities over outgoing directions.
//!
//! All values are per unit solid angle. Directions passed to `value` need not
//! be normalized.

use std::f32::consts::PI;

use lux_math::{Onb, Vec3};
use rand::RngCore;

use crate::{
    primitive::Primitive,
    sampling::{gen_f32, random_cosine_direction, random_unit_vector},
};

/// A material's own sampling distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialPdf {
    /// Cosine-weighted about the basis' `w` axis (the surface normal).
    Cosine(Onb),
    /// Uniform over the whole sphere.
    Uniform,
}

impl MaterialPdf {
    pub fn cosine(normal: Vec3) -> Self {
        MaterialPdf::Cosine(Onb::new(normal))
    }

    pub fn value(&self, direction: Vec3) -> f32 {
        match self {
            MaterialPdf::Cosine(uvw) => {
                let cosine_theta = direction.normalize_or_zero().dot(uvw.w);
                (cosine_theta / PI).max(0.0)
            }
            MaterialPdf::Uniform => 1.0 / (4.0 * PI),
        }
    }

    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            MaterialPdf::Cosine(uvw) => uvw.transform(random_cosine_direction(rng)),
            MaterialPdf::Uniform => random_unit_vector(rng),
        }
    }
}

/// Uniform choice among the scene's lights, seen from one point.
#[derive(Debug, Clone, Copy)]
pub struct LightsPdf<'a> {
    primitives: &'a [Primitive],
    lights: &'a [usize],
    origin: Vec3,
    time: f32,
}

impl<'a> LightsPdf<'a> {
    /// `None` when there is nothing to sample.
    pub fn new(
        primitives: &'a [Primitive],
        lights: &'a [usize],
        origin: Vec3,
        time: f32,
    ) -> Option<Self> {
        if lights.is_empty() {
            return None;
        }
        Some(Self {
            primitives,
            lights,
            origin,
            time,
        })
    }

    /// Average of the individual light densities.
    pub fn value(&self, direction: Vec3) -> f32 {
        let sum: f32 = self
            .lights
            .iter()
            .map(|&i| self.primitives[i].pdf_value(self.origin, direction, self.time))
            .sum();
        sum / self.lights.len() as f32
    }

    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        let count = self.lights.len();
        let pick = ((gen_f32(rng) * count as f32) as usize).min(count - 1);
        self.primitives[self.lights[pick]].random_direction(self.origin, self.time, rng)
    }
}

/// Two-component mixture of light sampling and material sampling.
///
/// `weight` is the probability of sampling the lights. Without lights the
/// mixture degenerates to the material pdf.
#[derive(Debug, Clone, Copy)]
pub struct MixturePdf<'a> {
    lights: Option<LightsPdf<'a>>,
    material: MaterialPdf,
    weight: f32,
}

impl<'a> MixturePdf<'a> {
    pub fn new(lights: Option<LightsPdf<'a>>, material: MaterialPdf, weight: f32) -> Self {
        let weight = if lights.is_some() {
            weight.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            lights,
            material,
            weight,
        }
    }

    pub fn value(&self, direction: Vec3) -> f32 {
        let material = self.material.value(direction);
        match &self.lights {
            Some(lights) if self.weight > 0.0 => {
                self.weight * lights.value(direction) + (1.0 - self.weight) * material
            }
            _ => material,
        }
    }

    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        match &self.lights {
            Some(lights) if gen_f32(rng) < self.weight => lights.generate(rng),
            _ => self.material.generate(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Quad, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cosine_pdf_non_negative() {
        let pdf = MaterialPdf::cosine(Vec3::Y);
        let mut rng = StdRng::seed_from_u64(31);
        for _ in 0..1000 {
            let d = random_unit_vector(&mut rng);
            assert!(pdf.value(d) >= 0.0);
        }
        assert_eq!(pdf.value(-Vec3::Y), 0.0);
        assert!((pdf.value(Vec3::Y) - 1.0 / PI).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_pdf_integrates_to_one() {
        // Monte Carlo over the sphere with uniform directions:
        // ∫ p dω ≈ 4π · mean(p)
        let pdf = MaterialPdf::cosine(Vec3::new(0.3, 0.8, -0.2));
        let mut rng = StdRng::seed_from_u64(32);
        let n = 200_000;
        let sum: f32 = (0..n).map(|_| pdf.value(random_unit_vector(&mut rng))).sum();
        let integral = 4.0 * PI * sum / n as f32;
        assert!((integral - 1.0).abs() < 0.02, "integral = {integral}");
    }

    #[test]
    fn test_cosine_pdf_generates_upper_hemisphere() {
        let normal = Vec3::new(-1.0, 2.0, 0.5).normalize();
        let pdf = MaterialPdf::cosine(normal);
        let mut rng = StdRng::seed_from_u64(33);
        for _ in 0..1000 {
            assert!(pdf.generate(&mut rng).dot(normal) >= -1e-5);
        }
    }

    #[test]
    fn test_uniform_pdf() {
        let pdf = MaterialPdf::Uniform;
        assert!((pdf.value(Vec3::X) * 4.0 * PI - 1.0).abs() < 1e-6);
        assert!((pdf.value(-Vec3::Z) * 4.0 * PI - 1.0).abs() < 1e-6);
    }

    fn two_lights() -> Vec<Primitive> {
        vec![
            Primitive::from(Quad::new(
                Vec3::new(-1.0, 2.0, -1.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 2.0),
                0,
            )),
            Primitive::from(Sphere::new(Vec3::new(0.0, -4.0, 0.0), 1.0, 0)),
        ]
    }

    #[test]
    fn test_lights_pdf_averages() {
        let primitives = two_lights();
        let lights = [0, 1];
        let pdf = LightsPdf::new(&primitives, &lights, Vec3::ZERO, 0.0).unwrap();

        let up = pdf.value(Vec3::Y);
        assert!((up - 0.5 * primitives[0].pdf_value(Vec3::ZERO, Vec3::Y, 0.0)).abs() < 1e-6);

        let down = pdf.value(-Vec3::Y);
        assert!((down - 0.5 * primitives[1].pdf_value(Vec3::ZERO, -Vec3::Y, 0.0)).abs() < 1e-6);

        assert!(LightsPdf::new(&primitives, &[], Vec3::ZERO, 0.0).is_none());
    }

    #[test]
    fn test_lights_pdf_generates_toward_lights() {
        let primitives = two_lights();
        let lights = [0, 1];
        let pdf = LightsPdf::new(&primitives, &lights, Vec3::ZERO, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(34);

        let mut ups = 0;
        for _ in 0..1000 {
            let d = pdf.generate(&mut rng);
            if d.y > 0.0 {
                ups += 1;
            }
            assert!(pdf.value(d) >= 0.0);
        }
        assert!((400..600).contains(&ups), "ups = {ups}");
    }

    #[test]
    fn test_mixture_value_is_weighted_sum() {
        let primitives = two_lights();
        let lights = [0];
        let light_pdf = LightsPdf::new(&primitives, &lights, Vec3::ZERO, 0.0);
        let material = MaterialPdf::cosine(Vec3::Y);
        let mixture = MixturePdf::new(light_pdf, material, 0.25);

        let d = Vec3::new(0.1, 1.0, 0.2);
        let expected = 0.25 * light_pdf.unwrap().value(d) + 0.75 * material.value(d);
        assert!((mixture.value(d) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_mixture_without_lights_is_material() {
        let material = MaterialPdf::cosine(Vec3::Y);
        let mixture = MixturePdf::new(None, material, 0.5);
        let d = Vec3::new(0.3, 0.9, 0.0);
        assert_eq!(mixture.value(d), material.value(d));

        let mut rng = StdRng::seed_from_u64(35);
        for _ in 0..100 {
            assert!(mixture.generate(&mut rng).y >= -1e-5);
        }
    }
}
