//! Built-in demo scenes.

use lux_math::{RigidTransform, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    camera::CameraSettings,
    error::SceneResult,
    material::Material,
    medium::MediumBoundary,
    sampling::{gen_f32, gen_range_f32},
    scene::{Scene, SceneBuilder},
    texture::Texture,
    Color, MaterialId,
};

const SKY: Color = Color::new(0.70, 0.80, 1.00);

/// A ready-to-render scene with the view and light weight it was set up for.
#[derive(Debug, Clone)]
pub struct DemoScene {
    pub name: &'static str,
    pub scene: Scene,
    pub camera: CameraSettings,
    /// Suggested mixture weight; zero for scenes lit only by the sky.
    pub light_sample_weight: f32,
}

/// Names accepted by [`by_name`].
pub const SCENE_NAMES: [&str; 6] = [
    "quick-spheres",
    "random-spheres",
    "checkered-spheres",
    "simple-light",
    "cornell-box",
    "cornell-smoke",
];

/// Look up a built-in scene. `seed` drives the randomized layouts.
pub fn by_name(name: &str, seed: u64) -> Option<SceneResult<DemoScene>> {
    let scene = match name {
        "quick-spheres" => quick_spheres(),
        "random-spheres" => random_spheres(seed),
        "checkered-spheres" => checkered_spheres(),
        "simple-light" => simple_light(),
        "cornell-box" => cornell_box(),
        "cornell-smoke" => cornell_smoke(),
        _ => return None,
    };
    Some(scene)
}

/// Ground, a diffuse center sphere, a hollow glass sphere and a fuzzy metal
/// sphere under a sky.
pub fn quick_spheres() -> SceneResult<DemoScene> {
    let mut builder = SceneBuilder::new().background(SKY);

    let ground = builder.lambertian(Color::new(0.8, 0.8, 0.0));
    let center = builder.lambertian(Color::new(0.1, 0.2, 0.5));
    let glass = builder.add_material(Material::dielectric(1.5));
    let bubble = builder.add_material(Material::dielectric(1.0 / 1.5));
    let gold = builder.add_texture(Texture::solid(Color::new(0.8, 0.6, 0.2)));
    let metal = builder.add_material(Material::metal(gold, 1.0));

    builder.add_sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, ground);
    builder.add_sphere(Vec3::new(0.0, 0.0, -1.2), 0.5, center);
    builder.add_sphere(Vec3::new(-1.0, 0.0, -1.0), 0.5, glass);
    builder.add_sphere(Vec3::new(-1.0, 0.0, -1.0), 0.4, bubble);
    builder.add_sphere(Vec3::new(1.0, 0.0, -1.0), 0.5, metal);

    Ok(DemoScene {
        name: "quick-spheres",
        scene: builder.build()?,
        camera: CameraSettings::default()
            .with_position(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(20.0, 0.0, 3.4),
        light_sample_weight: 0.0,
    })
}

/// Field of small random spheres around three large ones. Diffuse spheres
/// bounce during the shutter interval.
pub fn random_spheres(seed: u64) -> SceneResult<DemoScene> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = SceneBuilder::new().background(SKY);

    let checker = builder.add_texture(Texture::checker(
        0.32,
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    ));
    let ground = builder.add_material(Material::lambertian(checker));
    builder.add_sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground);

    let glass = builder.add_material(Material::dielectric(1.5));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(&mut rng);
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(&mut rng),
                0.2,
                b as f32 + 0.9 * gen_f32(&mut rng),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = Color::new(gen_f32(&mut rng), gen_f32(&mut rng), gen_f32(&mut rng))
                    * Color::new(gen_f32(&mut rng), gen_f32(&mut rng), gen_f32(&mut rng));
                let material = builder.lambertian(albedo);
                let center2 = center + Vec3::new(0.0, gen_range_f32(&mut rng, 0.0, 0.5), 0.0);
                builder.add_moving_sphere(center, center2, 0.2, material);
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    gen_range_f32(&mut rng, 0.5, 1.0),
                    gen_range_f32(&mut rng, 0.5, 1.0),
                    gen_range_f32(&mut rng, 0.5, 1.0),
                );
                let fuzz = gen_range_f32(&mut rng, 0.0, 0.5);
                let texture = builder.add_texture(Texture::solid(albedo));
                let material = builder.add_material(Material::metal(texture, fuzz));
                builder.add_sphere(center, 0.2, material);
            } else {
                builder.add_sphere(center, 0.2, glass);
            }
        }
    }

    let brown = builder.lambertian(Color::new(0.4, 0.2, 0.1));
    let steel = builder.add_texture(Texture::solid(Color::new(0.7, 0.6, 0.5)));
    let mirror = builder.add_material(Material::metal(steel, 0.0));

    builder.add_sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, glass);
    builder.add_sphere(Vec3::new(-4.0, 1.0, 0.0), 1.0, brown);
    builder.add_sphere(Vec3::new(4.0, 1.0, 0.0), 1.0, mirror);

    Ok(DemoScene {
        name: "random-spheres",
        scene: builder.build()?,
        camera: CameraSettings::default()
            .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
            .with_lens(20.0, 0.6, 10.0),
        light_sample_weight: 0.0,
    })
}

/// Two large checkered spheres touching at the origin.
pub fn checkered_spheres() -> SceneResult<DemoScene> {
    let mut builder = SceneBuilder::new().background(SKY);

    let checker = builder.add_texture(Texture::checker(
        0.32,
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    ));
    let material = builder.add_material(Material::lambertian(checker));

    builder.add_sphere(Vec3::new(0.0, -10.0, 0.0), 10.0, material);
    builder.add_sphere(Vec3::new(0.0, 10.0, 0.0), 10.0, material);

    Ok(DemoScene {
        name: "checkered-spheres",
        scene: builder.build()?,
        camera: CameraSettings::default()
            .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
            .with_lens(20.0, 0.0, 10.0),
        light_sample_weight: 0.0,
    })
}

/// A sphere on a checkered ground lit by a quad and a spherical lamp.
pub fn simple_light() -> SceneResult<DemoScene> {
    let mut builder = SceneBuilder::new().background(Color::ZERO);

    let checker = builder.add_texture(Texture::checker(
        1.0,
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    ));
    let ground = builder.add_material(Material::lambertian(checker));
    let orange = builder.lambertian(Color::new(0.8, 0.45, 0.2));
    let lamp = builder.diffuse_light(Color::ONE, 4.0);

    builder.add_sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground);
    builder.add_sphere(Vec3::new(0.0, 2.0, 0.0), 2.0, orange);

    let panel = builder.add_quad(
        Vec3::new(3.0, 1.0, -2.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
        lamp,
    );
    let bulb = builder.add_sphere(Vec3::new(0.0, 7.0, 0.0), 2.0, lamp);
    builder.mark_light(panel);
    builder.mark_light(bulb);

    Ok(DemoScene {
        name: "simple-light",
        scene: builder.build()?,
        camera: CameraSettings::default()
            .with_position(Vec3::new(26.0, 3.0, 6.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
            .with_lens(20.0, 0.0, 10.0),
        light_sample_weight: 0.5,
    })
}

/// The five walls of the 555-unit box; the open side faces -z. Returns the
/// white wall material for the contents.
fn cornell_walls(builder: &mut SceneBuilder) -> MaterialId {
    let red = builder.lambertian(Color::new(0.65, 0.05, 0.05));
    let white = builder.lambertian(Color::splat(0.73));
    let green = builder.lambertian(Color::new(0.12, 0.45, 0.15));

    builder.add_quad(
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        green,
    );
    builder.add_quad(
        Vec3::ZERO,
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        red,
    );
    builder.add_quad(
        Vec3::ZERO,
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        white,
    );
    builder.add_quad(
        Vec3::new(555.0, 555.0, 555.0),
        Vec3::new(-555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -555.0),
        white,
    );
    builder.add_quad(
        Vec3::new(0.0, 0.0, 555.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        white,
    );

    white
}

fn cornell_camera() -> CameraSettings {
    CameraSettings::default()
        .with_position(
            Vec3::new(278.0, 278.0, -800.0),
            Vec3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0)
}

/// Classic Cornell box with two rotated blocks and a ceiling light.
pub fn cornell_box() -> SceneResult<DemoScene> {
    let mut builder = SceneBuilder::new().background(Color::ZERO);
    let white = cornell_walls(&mut builder);

    let lamp = builder.diffuse_light(Color::ONE, 15.0);
    let light = builder.add_quad(
        Vec3::new(343.0, 554.0, 332.0),
        Vec3::new(-130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -105.0),
        lamp,
    );
    builder.mark_light(light);

    builder.add_box(
        Vec3::ZERO,
        Vec3::new(165.0, 330.0, 165.0),
        white,
        RigidTransform::new(Vec3::new(265.0, 0.0, 295.0), Vec3::new(0.0, 15.0, 0.0)),
    );
    builder.add_box(
        Vec3::ZERO,
        Vec3::splat(165.0),
        white,
        RigidTransform::new(Vec3::new(130.0, 0.0, 65.0), Vec3::new(0.0, -18.0, 0.0)),
    );

    Ok(DemoScene {
        name: "cornell-box",
        scene: builder.build()?,
        camera: cornell_camera(),
        light_sample_weight: 0.5,
    })
}

/// Cornell box whose blocks are replaced by dark and light smoke.
pub fn cornell_smoke() -> SceneResult<DemoScene> {
    let mut builder = SceneBuilder::new().background(Color::ZERO);
    cornell_walls(&mut builder);

    let lamp = builder.diffuse_light(Color::ONE, 7.0);
    let light = builder.add_quad(
        Vec3::new(113.0, 554.0, 127.0),
        Vec3::new(330.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 305.0),
        lamp,
    );
    builder.mark_light(light);

    let black = builder.add_texture(Texture::solid(Color::ZERO));
    let white = builder.add_texture(Texture::solid(Color::ONE));
    let dark_smoke = builder.add_material(Material::isotropic(black, 0.01));
    let light_smoke = builder.add_material(Material::isotropic(white, 0.01));

    builder.add_medium(
        MediumBoundary::cuboid(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0)),
        dark_smoke,
        RigidTransform::new(Vec3::new(265.0, 0.0, 295.0), Vec3::new(0.0, 15.0, 0.0)),
    );
    builder.add_medium(
        MediumBoundary::cuboid(Vec3::ZERO, Vec3::splat(165.0)),
        light_smoke,
        RigidTransform::new(Vec3::new(130.0, 0.0, 65.0), Vec3::new(0.0, -18.0, 0.0)),
    );

    Ok(DemoScene {
        name: "cornell-smoke",
        scene: builder.build()?,
        camera: cornell_camera(),
        light_sample_weight: 0.5,
    })
}
