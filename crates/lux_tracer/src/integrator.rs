//! Iterative path integrator with mixture light sampling.
//!
//! Each path is a bounded loop: query the scene, add emission, scatter, and
//! either follow a specular ray or draw the next direction from the mixture
//! of light sampling and the material's own distribution.

use lux_math::{near_zero, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{
    camera::CameraFrame,
    material::ScatterKind,
    pdf::MixturePdf,
    scene::Scene,
    Color,
};

/// Minimum hit distance; keeps a bounce from re-hitting its own surface.
pub const SHADOW_EPSILON: f32 = 0.001;

/// Where a path is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    Tracing,
    /// Escaped the scene; the background was added.
    Miss,
    /// The last hit did not scatter, or the sampled direction had no density.
    Absorbed,
    /// Reached `max_depth` bounces.
    DepthLimit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathResult {
    pub radiance: Color,
    pub state: PathState,
    /// Surface or volume interactions along the path.
    pub bounces: u32,
}

/// Trace one path starting with `ray`.
///
/// `light_weight` is the probability of sampling the lights at each
/// non-specular bounce.
pub fn trace_path(
    ray: Ray,
    scene: &Scene,
    light_weight: f32,
    max_depth: u32,
    rng: &mut dyn RngCore,
) -> PathResult {
    let mut ray = ray;
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut depth = 0;
    let mut state = PathState::Tracing;

    while state == PathState::Tracing {
        if depth >= max_depth {
            state = PathState::DepthLimit;
            break;
        }

        let Some(rec) = scene.hit_scene(&ray, Interval::new(SHADOW_EPSILON, f32::INFINITY), rng)
        else {
            radiance += throughput * scene.background;
            state = PathState::Miss;
            break;
        };

        let material = scene.material(rec.material);
        radiance += throughput * material.emitted(&rec, scene.textures());

        let Some(srec) = material.scatter(&ray, &rec, scene.textures(), rng) else {
            state = PathState::Absorbed;
            break;
        };

        match srec.kind {
            ScatterKind::Specular(next) => {
                throughput *= srec.attenuation;
                ray = next;
            }
            ScatterKind::Sampled(material_pdf) => {
                let mixture = MixturePdf::new(
                    scene.lights_pdf(rec.p, ray.time),
                    material_pdf,
                    light_weight,
                );

                let direction = nonzero_direction(mixture.generate(rng), rec.normal);
                let scattered = Ray::new(rec.p, direction, ray.time);

                let pdf = mixture.value(direction);
                if pdf.is_nan() || pdf <= 0.0 {
                    state = PathState::Absorbed;
                    break;
                }

                let scattering_pdf = material.scattering_pdf(&rec, &scattered);
                throughput *= srec.attenuation * scattering_pdf / pdf;
                ray = scattered;
            }
        }

        depth += 1;

        // Nothing further along this path can contribute
        if throughput == Color::ZERO {
            state = PathState::Absorbed;
        }
    }

    PathResult {
        radiance,
        state,
        bounces: depth,
    }
}

/// A degenerate sampled direction falls back to the surface normal.
fn nonzero_direction(direction: Vec3, normal: Vec3) -> Vec3 {
    if near_zero(direction) {
        normal
    } else {
        direction
    }
}

/// One radiance sample for pixel (x, y).
pub fn trace_pixel(
    x: u32,
    y: u32,
    camera: &CameraFrame,
    scene: &Scene,
    light_weight: f32,
    rng: &mut dyn RngCore,
) -> Color {
    let ray = camera.get_ray(x, y, rng);
    let radiance = trace_path(ray, scene, light_weight, camera.max_depth, rng).radiance;

    // A NaN sample would poison the pixel for the rest of the render
    if radiance.is_nan() {
        log::trace!("Dropping NaN sample at pixel ({x}, {y})");
        return Color::ZERO;
    }
    radiance
}
