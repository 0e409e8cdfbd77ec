//! Lux - CPU Monte Carlo path tracing
//!
//! A path tracer built around a flattened, stackless BVH and a mixture of
//! light sampling and material sampling at every diffuse bounce.
//!
//! Scenes are flat tables (primitives, materials, textures, light indices)
//! assembled with [`SceneBuilder`] and validated once. Rendering accumulates
//! one sample per pixel per pass with [`render_progressive`]; a dispatcher
//! of its own can instead drive [`trace_pixel`] directly.

mod bvh;
mod camera;
mod error;
mod hittable;
mod integrator;
mod material;
mod medium;
mod pdf;
mod primitive;
mod quad;
mod renderer;
mod sampling;
mod scene;
pub mod scenes;
mod sphere;
mod texture;

/// Index into a scene's material table.
pub type MaterialId = usize;
/// Index into a scene's texture table.
pub type TextureId = usize;
/// Linear RGB radiance or reflectance.
pub type Color = Vec3;

pub use bvh::{build_bvh, bvh_bytes, bvh_depth, hit_bvh, BvhNode, ROPE_END};
pub use camera::{CameraFrame, CameraSettings};
pub use error::{SceneError, SceneResult};
pub use hittable::{HitRecord, Hittable};
pub use integrator::{trace_path, trace_pixel, PathResult, PathState, SHADOW_EPSILON};
pub use material::{reflectance, Material, ScatterKind, ScatterRecord};
pub use medium::{ConstantMedium, MediumBoundary};
pub use pdf::{LightsPdf, MaterialPdf, MixturePdf};
pub use primitive::{Primitive, Shape};
pub use quad::{box_quads, Quad};
pub use renderer::{
    color_to_rgba, linear_to_gamma, render_progressive, Accumulator, RenderSettings,
};
pub use sampling::{gen_f32, gen_range_f32};
pub use scene::{Scene, SceneBuilder};
pub use sphere::{sphere_center, Sphere};
pub use texture::Texture;

/// Re-export the math types the public API is written in
pub use lux_math::{Aabb, Interval, Ray, RigidTransform, Vec3};
