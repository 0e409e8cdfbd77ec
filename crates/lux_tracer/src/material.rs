//! Surface and volume scattering models.

use std::f32::consts::PI;

use lux_math::{reflect, refract, Ray};
use rand::RngCore;

use crate::{
    hittable::HitRecord,
    pdf::MaterialPdf,
    sampling::{gen_f32, random_unit_vector},
    texture::Texture,
    Color, TextureId,
};

/// Material table entry. Colors come from the scene's texture table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Ideal diffuse reflector.
    Lambertian { texture: TextureId },
    /// Mirror reflection perturbed within a sphere of radius `fuzz`.
    Metal { texture: TextureId, fuzz: f32 },
    /// Clear glass-like refractor.
    Dielectric { refraction_index: f32 },
    /// Phase function of a constant medium; `density` is the inverse mean
    /// free path of the medium using it.
    Isotropic { texture: TextureId, density: f32 },
    /// Emitter; emits `texture * intensity` from its front face.
    DiffuseLight { texture: TextureId, intensity: f32 },
}

/// How the next direction is chosen after a scatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScatterKind {
    /// Deterministic outgoing ray; importance sampling is skipped.
    Specular(Ray),
    /// Direction drawn by the integrator, weighted by this pdf.
    Sampled(MaterialPdf),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterRecord {
    pub attenuation: Color,
    pub kind: ScatterKind,
}

impl Material {
    pub fn lambertian(texture: TextureId) -> Self {
        Material::Lambertian { texture }
    }

    pub fn metal(texture: TextureId, fuzz: f32) -> Self {
        Material::Metal {
            texture,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn dielectric(refraction_index: f32) -> Self {
        Material::Dielectric { refraction_index }
    }

    pub fn isotropic(texture: TextureId, density: f32) -> Self {
        Material::Isotropic { texture, density }
    }

    pub fn diffuse_light(texture: TextureId, intensity: f32) -> Self {
        Material::DiffuseLight { texture, intensity }
    }

    /// Texture slot this material reads, if any.
    pub fn texture(&self) -> Option<TextureId> {
        match *self {
            Material::Lambertian { texture }
            | Material::Metal { texture, .. }
            | Material::Isotropic { texture, .. }
            | Material::DiffuseLight { texture, .. } => Some(texture),
            Material::Dielectric { .. } => None,
        }
    }

    pub fn is_emissive(&self) -> bool {
        matches!(self, Material::DiffuseLight { .. })
    }

    /// Scatter an incoming ray at `rec`.
    ///
    /// Returns `None` if the ray is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        textures: &[Texture],
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        match *self {
            Material::Lambertian { texture } => Some(ScatterRecord {
                attenuation: textures[texture].value(rec.u, rec.v, rec.p),
                kind: ScatterKind::Sampled(MaterialPdf::cosine(rec.normal)),
            }),

            Material::Metal { texture, fuzz } => {
                let reflected = reflect(ray_in.direction.normalize(), rec.normal);
                let scattered = reflected + fuzz * random_unit_vector(rng);

                // Fuzz pushed the ray below the surface
                if scattered.dot(rec.normal) <= 0.0 {
                    return None;
                }

                Some(ScatterRecord {
                    attenuation: textures[texture].value(rec.u, rec.v, rec.p),
                    kind: ScatterKind::Specular(Ray::new(rec.p, scattered, ray_in.time)),
                })
            }

            Material::Dielectric { refraction_index } => {
                let ri = if rec.front_face {
                    1.0 / refraction_index
                } else {
                    refraction_index
                };

                let unit_direction = ray_in.direction.normalize();
                let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                let cannot_refract = ri * sin_theta > 1.0;
                let direction = if cannot_refract || reflectance(cos_theta, ri) > gen_f32(rng) {
                    reflect(unit_direction, rec.normal)
                } else {
                    refract(unit_direction, rec.normal, ri)
                };

                Some(ScatterRecord {
                    attenuation: Color::ONE,
                    kind: ScatterKind::Specular(Ray::new(rec.p, direction, ray_in.time)),
                })
            }

            Material::Isotropic { texture, .. } => Some(ScatterRecord {
                attenuation: textures[texture].value(rec.u, rec.v, rec.p),
                kind: ScatterKind::Sampled(MaterialPdf::Uniform),
            }),

            Material::DiffuseLight { .. } => None,
        }
    }

    /// Density of this material's own scattering distribution in
    /// `scattered`'s direction. Zero for materials that never sample.
    pub fn scattering_pdf(&self, rec: &HitRecord, scattered: &Ray) -> f32 {
        match self {
            Material::Lambertian { .. } => {
                let cos_theta = rec.normal.dot(scattered.direction.normalize_or_zero());
                (cos_theta / PI).max(0.0)
            }
            Material::Isotropic { .. } => 1.0 / (4.0 * PI),
            _ => 0.0,
        }
    }

    /// Light emitted toward the incoming ray at `rec`.
    pub fn emitted(&self, rec: &HitRecord, textures: &[Texture]) -> Color {
        match *self {
            Material::DiffuseLight { texture, intensity } if rec.front_face => {
                textures[texture].value(rec.u, rec.v, rec.p) * intensity
            }
            _ => Color::ZERO,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::Lambertian { texture: 0 }
    }
}

/// Schlick's approximation for reflectance.
#[inline]
pub fn reflectance(cosine: f32, refraction_index: f32) -> f32 {
    let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
