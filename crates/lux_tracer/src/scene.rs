//! Scene aggregate: flat primitive, material and texture tables, the light
//! subset and the BVH over the primitives.
//!
//! A [`Scene`] is validated and indexed once at construction and is never
//! mutated afterwards, so it can be shared by reference across render
//! threads.

use std::ops::Range;

use lux_math::{Interval, Ray, RigidTransform, Vec3};
use rand::RngCore;

use crate::{
    bvh::{build_bvh, hit_bvh, BvhNode},
    error::{SceneError, SceneResult},
    hittable::HitRecord,
    material::Material,
    medium::{ConstantMedium, MediumBoundary},
    pdf::LightsPdf,
    primitive::{Primitive, Shape},
    quad::{box_quads, Quad},
    renderer::RenderSettings,
    sphere::Sphere,
    texture::Texture,
    Color, MaterialId, TextureId,
};

#[derive(Debug, Clone)]
pub struct Scene {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
    textures: Vec<Texture>,
    lights: Vec<usize>,
    bvh: Vec<BvhNode>,
    /// Radiance returned by rays that escape the scene.
    pub background: Color,
}

impl Scene {
    /// Validate already-resolved scene tables and build the BVH.
    pub fn new(
        primitives: Vec<Primitive>,
        materials: Vec<Material>,
        textures: Vec<Texture>,
        lights: Vec<usize>,
        background: Color,
    ) -> SceneResult<Self> {
        validate_textures(&textures)?;
        validate_materials(&materials, textures.len())?;
        validate_primitives(&primitives, &materials)?;
        validate_lights(&lights, &primitives)?;

        let bvh = build_bvh(&primitives);

        log::info!(
            "Scene ready: {} primitives, {} materials, {} textures, {} lights, {} BVH nodes",
            primitives.len(),
            materials.len(),
            textures.len(),
            lights.len(),
            bvh.len()
        );

        Ok(Self {
            primitives,
            materials,
            textures,
            lights,
            bvh,
            background,
        })
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn lights(&self) -> &[usize] {
        &self.lights
    }

    pub fn bvh(&self) -> &[BvhNode] {
        &self.bvh
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id]
    }

    /// Nearest hit of `ray` in the scene.
    pub fn hit_scene(
        &self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        hit_bvh(&self.bvh, &self.primitives, ray, ray_t, rng)
    }

    /// Light-sampling density seen from `origin`; `None` without lights.
    pub fn lights_pdf(&self, origin: Vec3, time: f32) -> Option<LightsPdf<'_>> {
        LightsPdf::new(&self.primitives, &self.lights, origin, time)
    }

    /// Check render settings against this scene before any tracing.
    pub fn validate_for(&self, settings: &RenderSettings) -> SceneResult<()> {
        let pixels = settings.width.checked_mul(settings.height);
        if matches!(pixels, None | Some(0)) || settings.samples_per_pixel == 0 {
            return Err(SceneError::InvalidRenderSize {
                width: settings.width,
                height: settings.height,
                samples: settings.samples_per_pixel,
            });
        }

        let weight = settings.light_sample_weight;
        if !(0.0..=1.0).contains(&weight) {
            return Err(SceneError::InvalidLightWeight(weight));
        }

        if self.lights.is_empty() {
            if weight > 0.0 {
                return Err(SceneError::NoLights { weight });
            }
            log::warn!("Scene has no lights; only paths that hit an emitter by chance carry light");
        }

        Ok(())
    }
}

fn validate_textures(textures: &[Texture]) -> SceneResult<()> {
    for (index, texture) in textures.iter().enumerate() {
        if let Texture::Checker { scale, .. } = *texture {
            if scale == 0.0 || !scale.is_finite() {
                return Err(SceneError::InvalidCheckerScale {
                    texture: index,
                    scale,
                });
            }
        }
    }
    Ok(())
}

fn validate_materials(materials: &[Material], texture_count: usize) -> SceneResult<()> {
    for (index, material) in materials.iter().enumerate() {
        if let Some(texture) = material.texture() {
            if texture >= texture_count {
                return Err(SceneError::TextureOutOfRange {
                    material: index,
                    texture,
                    count: texture_count,
                });
            }
        }
    }
    Ok(())
}

fn validate_primitives(primitives: &[Primitive], materials: &[Material]) -> SceneResult<()> {
    for (index, primitive) in primitives.iter().enumerate() {
        let material = primitive.material();
        if material >= materials.len() {
            return Err(SceneError::MaterialOutOfRange {
                primitive: index,
                material,
                count: materials.len(),
            });
        }

        match &primitive.shape {
            Shape::Sphere(sphere) => {
                if !sphere.radius.is_finite() || sphere.radius <= 0.0 {
                    return Err(SceneError::InvalidRadius {
                        primitive: index,
                        radius: sphere.radius,
                    });
                }
            }
            Shape::Quad(quad) => {
                if quad.area() <= 0.0 {
                    return Err(SceneError::DegenerateQuad { primitive: index });
                }
            }
            Shape::Medium(medium) => {
                let Material::Isotropic {
                    density: expected, ..
                } = materials[material]
                else {
                    return Err(SceneError::MediumMaterialNotIsotropic {
                        primitive: index,
                        material,
                    });
                };
                let density = medium.density();
                if !(density > 0.0 && density.is_finite()) {
                    return Err(SceneError::InvalidDensity {
                        primitive: index,
                        density,
                    });
                }
                if density != expected {
                    return Err(SceneError::MediumDensityMismatch {
                        primitive: index,
                        material,
                        medium: density,
                        expected,
                    });
                }
            }
        }
    }
    Ok(())
}

fn validate_lights(lights: &[usize], primitives: &[Primitive]) -> SceneResult<()> {
    for &light in lights {
        let Some(primitive) = primitives.get(light) else {
            return Err(SceneError::LightOutOfRange {
                light,
                count: primitives.len(),
            });
        };
        if !primitive.is_samplable() {
            return Err(SceneError::LightNotSamplable { primitive: light });
        }
    }
    Ok(())
}

/// Incremental scene assembly.
///
/// Every `add_*` returns the index of what it added so later entries can
/// refer to it. Nothing is validated until [`SceneBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
    textures: Vec<Texture>,
    lights: Vec<usize>,
    background: Color,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Solid-colored diffuse material.
    pub fn lambertian(&mut self, albedo: Color) -> MaterialId {
        let texture = self.add_texture(Texture::solid(albedo));
        self.add_material(Material::lambertian(texture))
    }

    /// Solid-colored emitter.
    pub fn diffuse_light(&mut self, color: Color, intensity: f32) -> MaterialId {
        let texture = self.add_texture(Texture::solid(color));
        self.add_material(Material::diffuse_light(texture, intensity))
    }

    pub fn add_primitive(&mut self, primitive: impl Into<Primitive>) -> usize {
        self.primitives.push(primitive.into());
        self.primitives.len() - 1
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material: MaterialId) -> usize {
        self.add_primitive(Sphere::new(center, radius, material))
    }

    pub fn add_moving_sphere(
        &mut self,
        center: Vec3,
        center2: Vec3,
        radius: f32,
        material: MaterialId,
    ) -> usize {
        self.add_primitive(Sphere::moving(center, center2, radius, material))
    }

    pub fn add_quad(&mut self, q: Vec3, u: Vec3, v: Vec3, material: MaterialId) -> usize {
        self.add_primitive(Quad::new(q, u, v, material))
    }

    /// Six quads of the box spanned by `a` and `b`, all sharing `transform`.
    pub fn add_box(
        &mut self,
        a: Vec3,
        b: Vec3,
        material: MaterialId,
        transform: RigidTransform,
    ) -> Range<usize> {
        let start = self.primitives.len();
        for face in box_quads(a, b, material) {
            self.add_primitive(Primitive::from(face).with_transform(transform));
        }
        start..self.primitives.len()
    }

    /// Constant medium filling `boundary`. The density is read from the
    /// isotropic `material`; any other material is rejected at build time.
    pub fn add_medium(
        &mut self,
        boundary: MediumBoundary,
        material: MaterialId,
        transform: RigidTransform,
    ) -> usize {
        let density = match self.materials.get(material) {
            Some(Material::Isotropic { density, .. }) => *density,
            _ => 0.0,
        };
        let medium = ConstantMedium::new(boundary, density, material);
        self.add_primitive(Primitive::from(medium).with_transform(transform))
    }

    /// Designate an existing primitive as an importance-sampling target.
    pub fn mark_light(&mut self, primitive: usize) {
        self.lights.push(primitive);
    }

    pub fn build(self) -> SceneResult<Scene> {
        Scene::new(
            self.primitives,
            self.materials,
            self.textures,
            self.lights,
            self.background,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_spheres() -> SceneBuilder {
        let mut builder = SceneBuilder::new();
        let gray = builder.lambertian(Color::splat(0.5));
        builder.add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, gray);
        builder.add_sphere(Vec3::new(0.0, 0.0, -3.0), 0.5, gray);
        builder
    }

    #[test]
    fn test_hit_scene_returns_nearest() {
        let scene = two_spheres().build().unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);

        let rec = scene
            .hit_scene(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 0.5).abs() < 1e-5);

        let away = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(scene
            .hit_scene(&away, Interval::new(0.001, f32::INFINITY), &mut rng)
            .is_none());
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = SceneBuilder::new().build().unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        assert!(scene.bvh().is_empty());
        assert!(scene.hit_scene(&ray, Interval::UNIVERSE, &mut rng).is_none());
    }

    #[test]
    fn test_material_out_of_range() {
        let mut builder = SceneBuilder::new();
        builder.add_sphere(Vec3::ZERO, 1.0, 3);
        assert_eq!(
            builder.build().unwrap_err(),
            SceneError::MaterialOutOfRange {
                primitive: 0,
                material: 3,
                count: 0
            }
        );
    }

    #[test]
    fn test_texture_out_of_range() {
        let mut builder = SceneBuilder::new();
        builder.add_material(Material::lambertian(7));
        assert!(matches!(
            builder.build(),
            Err(SceneError::TextureOutOfRange { texture: 7, .. })
        ));
    }

    #[test]
    fn test_zero_checker_scale_rejected() {
        let mut builder = SceneBuilder::new();
        builder.add_texture(Texture::checker(0.0, Color::ONE, Color::ZERO));
        assert!(matches!(
            builder.build(),
            Err(SceneError::InvalidCheckerScale { texture: 0, .. })
        ));
    }

    #[test]
    fn test_degenerate_quad_rejected() {
        let mut builder = SceneBuilder::new();
        let gray = builder.lambertian(Color::splat(0.5));
        builder.add_quad(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, gray);
        assert_eq!(
            builder.build().unwrap_err(),
            SceneError::DegenerateQuad { primitive: 0 }
        );
    }

    #[test]
    fn test_medium_requires_isotropic_material() {
        let mut builder = SceneBuilder::new();
        let gray = builder.lambertian(Color::splat(0.5));
        builder.add_medium(
            MediumBoundary::cuboid(Vec3::ZERO, Vec3::ONE),
            gray,
            RigidTransform::default(),
        );
        assert!(matches!(
            builder.build(),
            Err(SceneError::MediumMaterialNotIsotropic { primitive: 0, .. })
        ));

        let mut builder = SceneBuilder::new();
        let white = builder.add_texture(Texture::solid(Color::ONE));
        let fog = builder.add_material(Material::isotropic(white, 0.0));
        builder.add_medium(
            MediumBoundary::cuboid(Vec3::ZERO, Vec3::ONE),
            fog,
            RigidTransform::default(),
        );
        assert!(matches!(
            builder.build(),
            Err(SceneError::InvalidDensity { primitive: 0, .. })
        ));
    }

    #[test]
    fn test_medium_takes_density_from_material() {
        let mut builder = SceneBuilder::new();
        let white = builder.add_texture(Texture::solid(Color::ONE));
        let fog = builder.add_material(Material::isotropic(white, 0.25));
        let index = builder.add_medium(
            MediumBoundary::cuboid(Vec3::ZERO, Vec3::ONE),
            fog,
            RigidTransform::default(),
        );
        let scene = builder.build().unwrap();

        match &scene.primitives()[index].shape {
            Shape::Medium(medium) => assert_eq!(medium.density(), 0.25),
            other => panic!("expected a medium, got {other:?}"),
        }
    }

    #[test]
    fn test_medium_density_must_match_material() {
        let textures = vec![Texture::solid(Color::ONE)];
        let materials = vec![Material::isotropic(0, 0.01)];
        let boundary = MediumBoundary::Sphere(Sphere::new(Vec3::ZERO, 1.0, 0));

        let mismatched = vec![Primitive::from(ConstantMedium::new(boundary, 100.0, 0))];
        assert_eq!(
            Scene::new(
                mismatched,
                materials.clone(),
                textures.clone(),
                Vec::new(),
                Color::ZERO,
            )
            .unwrap_err(),
            SceneError::MediumDensityMismatch {
                primitive: 0,
                material: 0,
                medium: 100.0,
                expected: 0.01,
            }
        );

        let matched = vec![Primitive::from(ConstantMedium::new(boundary, 0.01, 0))];
        assert!(Scene::new(matched, materials, textures, Vec::new(), Color::ZERO).is_ok());
    }

    #[test]
    fn test_sphere_radius_must_be_positive() {
        for radius in [0.0, -1.0, f32::NAN] {
            let mut builder = SceneBuilder::new();
            let gray = builder.lambertian(Color::splat(0.5));
            builder.add_sphere(Vec3::ZERO, radius, gray);
            assert!(matches!(
                builder.build(),
                Err(SceneError::InvalidRadius { primitive: 0, .. })
            ));
        }
    }

    #[test]
    fn test_light_validation() {
        let mut builder = two_spheres();
        builder.mark_light(5);
        assert_eq!(
            builder.build().unwrap_err(),
            SceneError::LightOutOfRange { light: 5, count: 2 }
        );

        let mut builder = SceneBuilder::new();
        let white = builder.add_texture(Texture::solid(Color::ONE));
        let fog = builder.add_material(Material::isotropic(white, 1.0));
        let medium = builder.add_medium(
            MediumBoundary::Sphere(Sphere::new(Vec3::ZERO, 1.0, fog)),
            fog,
            RigidTransform::default(),
        );
        builder.mark_light(medium);
        assert_eq!(
            builder.build().unwrap_err(),
            SceneError::LightNotSamplable { primitive: 0 }
        );
    }

    #[test]
    fn test_validate_for_light_weight() {
        let scene = two_spheres().build().unwrap();

        let settings = RenderSettings::default();
        assert!(settings.light_sample_weight > 0.0);
        assert!(matches!(
            scene.validate_for(&settings),
            Err(SceneError::NoLights { .. })
        ));

        let unlit = RenderSettings {
            light_sample_weight: 0.0,
            ..RenderSettings::default()
        };
        assert!(scene.validate_for(&unlit).is_ok());

        let out_of_range = RenderSettings {
            light_sample_weight: 1.5,
            ..RenderSettings::default()
        };
        assert_eq!(
            scene.validate_for(&out_of_range),
            Err(SceneError::InvalidLightWeight(1.5))
        );
    }

    #[test]
    fn test_validate_for_render_size() {
        let mut builder = two_spheres();
        let light = builder.diffuse_light(Color::ONE, 1.0);
        let index = builder.add_sphere(Vec3::new(0.0, 5.0, 0.0), 1.0, light);
        builder.mark_light(index);
        let scene = builder.build().unwrap();

        assert!(scene.validate_for(&RenderSettings::default()).is_ok());

        let empty = RenderSettings {
            width: 0,
            ..RenderSettings::default()
        };
        assert!(matches!(
            scene.validate_for(&empty),
            Err(SceneError::InvalidRenderSize { width: 0, .. })
        ));
    }

    #[test]
    fn test_add_box_shares_transform() {
        let mut builder = SceneBuilder::new();
        let gray = builder.lambertian(Color::splat(0.5));
        let xf = RigidTransform::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 15.0, 0.0));
        let faces = builder.add_box(Vec3::ZERO, Vec3::ONE, gray, xf);
        let scene = builder.build().unwrap();

        assert_eq!(faces.len(), 6);
        for index in faces {
            assert_eq!(scene.primitives()[index].transform(), Some(&xf));
        }
    }
}
