use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use lux_tracer::{render_progressive, scenes, CameraSettings, RenderSettings};
use serde_json::{json, Value};

/// Render a built-in scene with the lux path tracer and save it as PNG.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Scene selector
    #[arg(long, value_enum, default_value_t)]
    scene: SceneChoice,

    /// Where the rendered image is written
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// JSON file with render settings; missing fields take their defaults
    #[arg(long)]
    settings: Option<PathBuf>,

    /// JSON file with camera settings, replacing the scene's own view
    #[arg(long)]
    camera: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Samples per pixel (one accumulation pass each)
    #[arg(long = "spp")]
    samples_per_pixel: Option<u32>,

    #[arg(long)]
    max_depth: Option<u32>,

    /// Probability of sampling the lights at a diffuse bounce, in [0, 1]
    #[arg(long)]
    light_weight: Option<f32>,

    /// Given a seed, the output only depends on the scene and settings
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SceneChoice {
    QuickSpheres,
    RandomSpheres,
    CheckeredSpheres,
    SimpleLight,
    #[default]
    CornellBox,
    CornellSmoke,
}

impl SceneChoice {
    fn name(self) -> &'static str {
        match self {
            SceneChoice::QuickSpheres => "quick-spheres",
            SceneChoice::RandomSpheres => "random-spheres",
            SceneChoice::CheckeredSpheres => "checkered-spheres",
            SceneChoice::SimpleLight => "simple-light",
            SceneChoice::CornellBox => "cornell-box",
            SceneChoice::CornellSmoke => "cornell-smoke",
        }
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Settings precedence: defaults, then the scene's suggested light weight,
/// then the settings file, then individual flags.
fn resolve_settings(args: &Args, scene_light_weight: f32) -> Result<RenderSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let file: Value = load_json(path)?;
            settings_from_json(file, scene_light_weight)
                .with_context(|| format!("Invalid render settings in {}", path.display()))?
        }
        None => RenderSettings {
            light_sample_weight: scene_light_weight,
            ..RenderSettings::default()
        },
    };

    if let Some(width) = args.width {
        settings.width = width;
    }
    if let Some(height) = args.height {
        settings.height = height;
    }
    if let Some(spp) = args.samples_per_pixel {
        settings.samples_per_pixel = spp;
    }
    if let Some(max_depth) = args.max_depth {
        settings.max_depth = max_depth;
    }
    if let Some(weight) = args.light_weight {
        settings.light_sample_weight = weight;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }

    Ok(settings)
}

/// Settings from a JSON object, using the scene's light weight when the
/// object does not set one.
fn settings_from_json(mut value: Value, scene_light_weight: f32) -> Result<RenderSettings> {
    if let Some(fields) = value.as_object_mut() {
        fields
            .entry("light_sample_weight")
            .or_insert_with(|| json!(scene_light_weight));
    }
    Ok(serde_json::from_value(value)?)
}

fn save_png(path: &Path, width: u32, height: u32, rgba: Vec<u8>) -> Result<()> {
    let image = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| anyhow!("Pixel buffer does not match {width}x{height}"))?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_default();

    log::info!("Building scene '{}'", args.scene.name());
    let start = Instant::now();
    let demo = scenes::by_name(args.scene.name(), seed)
        .ok_or_else(|| anyhow!("Unknown scene '{}'", args.scene.name()))?
        .context("Failed to build scene")?;
    log::info!("Scene built in {:?}", start.elapsed());

    let settings = resolve_settings(&args, demo.light_sample_weight)?;
    let camera: CameraSettings = match &args.camera {
        Some(path) => load_json(path)?,
        None => demo.camera,
    };

    let cancel = AtomicBool::new(false);
    let image = render_progressive(&demo.scene, &camera, &settings, &cancel)
        .context("Invalid render configuration")?;

    save_png(&args.output, image.width(), image.height(), image.to_rgba8())?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["lux"]).unwrap();
        assert_eq!(args.scene, SceneChoice::CornellBox);
        assert_eq!(args.output, PathBuf::from("output.png"));
    }

    #[test]
    fn test_scene_names_are_known() {
        for choice in SceneChoice::value_variants() {
            assert!(scenes::SCENE_NAMES.contains(&choice.name()));
        }
    }

    #[test]
    fn test_flags_override_scene_suggestion() {
        let args = Args::try_parse_from([
            "lux",
            "--scene",
            "quick-spheres",
            "--width",
            "64",
            "--spp",
            "3",
            "--seed",
            "5",
        ])
        .unwrap();
        let settings = resolve_settings(&args, 0.0).unwrap();

        assert_eq!(settings.width, 64);
        assert_eq!(settings.height, RenderSettings::default().height);
        assert_eq!(settings.samples_per_pixel, 3);
        assert_eq!(settings.seed, 5);
        assert_eq!(settings.light_sample_weight, 0.0);

        let args = Args::try_parse_from(["lux", "--light-weight", "0.25"]).unwrap();
        let settings = resolve_settings(&args, 0.5).unwrap();
        assert_eq!(settings.light_sample_weight, 0.25);
    }

    #[test]
    fn test_settings_file_keeps_scene_light_weight() {
        let settings = settings_from_json(json!({ "width": 64 }), 0.0).unwrap();
        assert_eq!(settings.width, 64);
        assert_eq!(settings.light_sample_weight, 0.0);
        assert_eq!(settings.samples_per_pixel, RenderSettings::default().samples_per_pixel);

        let settings =
            settings_from_json(json!({ "width": 64, "light_sample_weight": 0.75 }), 0.0).unwrap();
        assert_eq!(settings.light_sample_weight, 0.75);

        assert!(settings_from_json(json!({ "width": "wide" }), 0.0).is_err());
    }

    #[test]
    fn test_settings_file_then_flags() {
        let path = std::env::temp_dir().join(format!("lux-settings-{}.json", std::process::id()));
        fs::write(&path, r#"{ "width": 32, "seed": 3 }"#).unwrap();

        let args = Args::try_parse_from([
            OsString::from("lux"),
            "--settings".into(),
            path.clone().into_os_string(),
            "--seed".into(),
            "9".into(),
        ])
        .unwrap();
        let settings = resolve_settings(&args, 0.0);
        fs::remove_file(&path).unwrap();
        let settings = settings.unwrap();

        assert_eq!(settings.width, 32);
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.light_sample_weight, 0.0);
    }
}
