//! Progressive multi-threaded renderer.
//!
//! Implements sample accumulation with:
//! - One sample per pixel per pass, rows spread over rayon's pool
//! - Reproducible per-pixel seeding independent of thread scheduling
//! - Coarse cancellation between passes
//! - Gamma correction for 8-bit output

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    camera::{CameraFrame, CameraSettings},
    error::SceneResult,
    integrator::trace_pixel,
    scene::Scene,
    Color,
};

/// Render configuration, loadable from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Number of accumulation passes
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Probability of sampling the lights at a diffuse bounce
    pub light_sample_weight: f32,
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            samples_per_pixel: 100,
            max_depth: 50,
            light_sample_weight: 0.5,
            seed: 0,
        }
    }
}

/// Seed for one pixel of one pass.
fn sample_seed(seed: u64, pass: u32, pixel: usize) -> u64 {
    seed ^ (u64::from(pass) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (pixel as u64 + 1).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}

/// Running per-pixel radiance sums.
#[derive(Debug, Clone)]
pub struct Accumulator {
    width: u32,
    height: u32,
    sums: Vec<Color>,
    samples: u32,
}

impl Accumulator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sums: vec![Color::ZERO; width as usize * height as usize],
            samples: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples accumulated per pixel so far.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn sums(&self) -> &[Color] {
        &self.sums
    }

    /// Drop everything accumulated, e.g. after a camera change.
    pub fn clear(&mut self) {
        self.sums.fill(Color::ZERO);
        self.samples = 0;
    }

    /// Add one sample to every pixel.
    ///
    /// Each row is an independent task that owns its slice of the buffer;
    /// the call returns only when every row is done.
    pub fn accumulate_pass(
        &mut self,
        scene: &Scene,
        camera: &CameraFrame,
        settings: &RenderSettings,
    ) {
        let width = self.width as usize;
        if width == 0 {
            return;
        }
        let pass = self.samples;
        let weight = settings.light_sample_weight;

        self.sums
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, sum) in row.iter_mut().enumerate() {
                    let pixel = y * width + x;
                    let mut rng = StdRng::seed_from_u64(sample_seed(settings.seed, pass, pixel));
                    *sum += trace_pixel(x as u32, y as u32, camera, scene, weight, &mut rng);
                }
            });

        self.samples += 1;
    }

    /// Mean radiance per pixel.
    pub fn normalized(&self) -> Vec<Color> {
        if self.samples == 0 {
            return vec![Color::ZERO; self.sums.len()];
        }
        let scale = 1.0 / self.samples as f32;
        self.sums.iter().map(|sum| *sum * scale).collect()
    }

    /// Gamma-corrected 8-bit RGBA, row-major from the top-left pixel.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.sums.len() * 4);
        for color in self.normalized() {
            bytes.extend_from_slice(&color_to_rgba(color));
        }
        bytes
    }
}

/// Render `settings.samples_per_pixel` passes into a fresh accumulator.
///
/// `cancel` is checked before every pass; once set, the partial result is
/// returned and [`Accumulator::samples`] tells how many passes finished.
pub fn render_progressive(
    scene: &Scene,
    camera: &CameraSettings,
    settings: &RenderSettings,
    cancel: &AtomicBool,
) -> SceneResult<Accumulator> {
    scene.validate_for(settings)?;

    let frame = camera.frame(settings.width, settings.height, settings.max_depth);
    let mut accumulator = Accumulator::new(settings.width, settings.height);
    let total = settings.samples_per_pixel;
    let report_every = (total / 10).max(1);
    let start = Instant::now();

    log::info!(
        "Rendering {}x{} at {} spp (max depth {}, light weight {})",
        settings.width,
        settings.height,
        total,
        settings.max_depth,
        settings.light_sample_weight
    );

    for pass in 0..total {
        if cancel.load(Ordering::Relaxed) {
            log::info!("Render cancelled after {pass}/{total} passes");
            return Ok(accumulator);
        }

        accumulator.accumulate_pass(scene, &frame, settings);

        let done = pass + 1;
        if done % report_every == 0 || done == total {
            log::info!(
                "Pass {done}/{total} ({:.1}s elapsed)",
                start.elapsed().as_secs_f32()
            );
        } else {
            log::debug!("Pass {done}/{total}");
        }
    }

    log::info!("Render finished in {:.2}s", start.elapsed().as_secs_f32());
    Ok(accumulator)
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let to_byte = |c: f32| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SceneBuilder, SceneError};
    use lux_math::Vec3;

    fn lit_sphere_scene() -> Scene {
        let mut builder = SceneBuilder::new().background(Color::splat(0.1));
        let gray = builder.lambertian(Color::splat(0.5));
        let lamp = builder.diffuse_light(Color::ONE, 4.0);
        builder.add_sphere(Vec3::new(0.0, 0.0, -2.0), 0.5, gray);
        let light = builder.add_sphere(Vec3::new(0.0, 2.0, -2.0), 0.5, lamp);
        builder.mark_light(light);
        builder.build().unwrap()
    }

    fn small_settings() -> RenderSettings {
        RenderSettings {
            width: 8,
            height: 6,
            samples_per_pixel: 4,
            max_depth: 5,
            light_sample_weight: 0.5,
            seed: 99,
        }
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_color_to_rgba_clamps() {
        assert_eq!(color_to_rgba(Color::ZERO), [0, 0, 0, 255]);
        assert_eq!(color_to_rgba(Color::splat(10.0)), [255, 255, 255, 255]);
        assert_eq!(color_to_rgba(Color::new(0.25, -1.0, 1.0)), [128, 0, 255, 255]);
    }

    #[test]
    fn test_render_settings_json_defaults() {
        let settings: RenderSettings = serde_json::from_str(r#"{ "width": 64 }"#).unwrap();
        assert_eq!(settings.width, 64);
        assert_eq!(settings.height, RenderSettings::default().height);
        assert_eq!(settings.light_sample_weight, 0.5);

        let json = serde_json::to_string(&small_settings()).unwrap();
        let back: RenderSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, small_settings());
    }

    #[test]
    fn test_render_progressive_accumulates_all_passes() {
        let scene = lit_sphere_scene();
        let cancel = AtomicBool::new(false);
        let camera = CameraSettings::default();

        let image = render_progressive(&scene, &camera, &small_settings(), &cancel).unwrap();
        assert_eq!(image.samples(), 4);
        assert_eq!(image.normalized().len(), 48);
        assert_eq!(image.to_rgba8().len(), 48 * 4);
        assert!(image.normalized().iter().all(|c| c.is_finite() && c.min_element() >= 0.0));
        // Center pixels see the sphere, which is lit by the lamp or the sky
        assert!(image.normalized().iter().any(|c| c.x > 0.0));
    }

    #[test]
    fn test_render_is_reproducible() {
        let scene = lit_sphere_scene();
        let cancel = AtomicBool::new(false);
        let camera = CameraSettings::default();

        let a = render_progressive(&scene, &camera, &small_settings(), &cancel).unwrap();
        let b = render_progressive(&scene, &camera, &small_settings(), &cancel).unwrap();
        assert_eq!(a.sums(), b.sums());

        let reseeded = RenderSettings {
            seed: 100,
            ..small_settings()
        };
        let c = render_progressive(&scene, &camera, &reseeded, &cancel).unwrap();
        assert_ne!(a.sums(), c.sums());
    }

    #[test]
    fn test_render_cancelled_before_first_pass() {
        let scene = lit_sphere_scene();
        let cancel = AtomicBool::new(true);

        let image =
            render_progressive(&scene, &CameraSettings::default(), &small_settings(), &cancel)
                .unwrap();
        assert_eq!(image.samples(), 0);
        assert!(image.normalized().iter().all(|c| *c == Color::ZERO));
    }

    #[test]
    fn test_render_rejects_invalid_settings() {
        let scene = lit_sphere_scene();
        let cancel = AtomicBool::new(false);
        let settings = RenderSettings {
            light_sample_weight: -0.1,
            ..small_settings()
        };

        let result = render_progressive(&scene, &CameraSettings::default(), &settings, &cancel);
        assert!(matches!(result, Err(SceneError::InvalidLightWeight(_))));
    }

    #[test]
    fn test_render_rejects_oversized_image() {
        let scene = lit_sphere_scene();
        let cancel = AtomicBool::new(false);
        let settings = RenderSettings {
            width: 70_000,
            height: 70_000,
            ..small_settings()
        };

        let result = render_progressive(&scene, &CameraSettings::default(), &settings, &cancel);
        assert!(matches!(
            result,
            Err(SceneError::InvalidRenderSize {
                width: 70_000,
                height: 70_000,
                ..
            })
        ));
    }

    #[test]
    fn test_accumulator_pixel_count() {
        let acc = Accumulator::new(70_000, 0);
        assert!(acc.sums().is_empty());
        assert_eq!(Accumulator::new(3, 5).sums().len(), 15);
    }

    #[test]
    fn test_accumulator_clear() {
        let scene = lit_sphere_scene();
        let settings = small_settings();
        let frame =
            CameraSettings::default().frame(settings.width, settings.height, settings.max_depth);
        let mut acc = Accumulator::new(settings.width, settings.height);

        acc.accumulate_pass(&scene, &frame, &settings);
        acc.accumulate_pass(&scene, &frame, &settings);
        assert_eq!(acc.samples(), 2);

        acc.clear();
        assert_eq!(acc.samples(), 0);
        assert!(acc.sums().iter().all(|c| *c == Color::ZERO));
    }
}
