//! Simple path tracer example.
//!
//! Renders the built-in Cornell box and saves it in PPM format.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::atomic::AtomicBool;

use lux_tracer::{render_progressive, scenes, Accumulator, RenderSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Lux Path Tracer - Simple Example");
    println!("================================");

    let start = std::time::Instant::now();
    let demo = scenes::cornell_box()?;
    println!(
        "Scene built in {:?} ({} primitives, {} BVH nodes)",
        start.elapsed(),
        demo.scene.primitives().len(),
        demo.scene.bvh().len()
    );

    let settings = RenderSettings {
        width: 300,
        height: 300,
        samples_per_pixel: 32,
        max_depth: 10,
        light_sample_weight: demo.light_sample_weight,
        seed: 1,
    };

    println!(
        "Rendering {}x{} @ {} spp...",
        settings.width, settings.height, settings.samples_per_pixel
    );

    let start = std::time::Instant::now();
    let cancel = AtomicBool::new(false);
    let image = render_progressive(&demo.scene, &demo.camera, &settings, &cancel)?;
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.ppm";
    save_ppm(&image, filename)?;
    println!("Saved to {}", filename);
    Ok(())
}

fn save_ppm(image: &Accumulator, filename: &str) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(filename)?);
    writeln!(out, "P3\n{} {}\n255", image.width(), image.height())?;
    for rgba in image.to_rgba8().chunks_exact(4) {
        writeln!(out, "{} {} {}", rgba[0], rgba[1], rgba[2])?;
    }
    Ok(())
}
