//! Scene and render configuration errors.
//!
//! Every variant is detected once, before tracing starts. Per-sample
//! geometric edge cases are never errors.

use thiserror::Error;

use crate::{MaterialId, TextureId};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("primitive {primitive} references material {material}, but only {count} materials exist")]
    MaterialOutOfRange {
        primitive: usize,
        material: MaterialId,
        count: usize,
    },

    #[error("material {material} references texture {texture}, but only {count} textures exist")]
    TextureOutOfRange {
        material: MaterialId,
        texture: TextureId,
        count: usize,
    },

    #[error("checker texture {texture} has invalid scale {scale}")]
    InvalidCheckerScale { texture: TextureId, scale: f32 },

    #[error("primitive {primitive} is a sphere with invalid radius {radius}")]
    InvalidRadius { primitive: usize, radius: f32 },

    #[error("primitive {primitive} is a degenerate quad (zero area)")]
    DegenerateQuad { primitive: usize },

    #[error("medium {primitive} uses material {material}, which is not isotropic")]
    MediumMaterialNotIsotropic {
        primitive: usize,
        material: MaterialId,
    },

    #[error("medium {primitive} has non-positive density {density}")]
    InvalidDensity { primitive: usize, density: f32 },

    #[error("medium {primitive} has density {medium}, but its material {material} has density {expected}")]
    MediumDensityMismatch {
        primitive: usize,
        material: MaterialId,
        medium: f32,
        expected: f32,
    },

    #[error("light index {light} is out of range ({count} primitives)")]
    LightOutOfRange { light: usize, count: usize },

    #[error("primitive {primitive} cannot be sampled as a light (only spheres and quads can)")]
    LightNotSamplable { primitive: usize },

    #[error("light sampling weight {weight} is positive but the scene has no lights")]
    NoLights { weight: f32 },

    #[error("light sampling weight {0} is outside [0, 1]")]
    InvalidLightWeight(f32),

    #[error("invalid render size {width}x{height} with {samples} samples per pixel")]
    InvalidRenderSize { width: u32, height: u32, samples: u32 },
}

pub type SceneResult<T> = Result<T, SceneError>;
