//! Color sources sampled by materials.

use lux_math::Vec3;

use crate::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Texture {
    /// Constant color.
    Solid(Color),
    /// 3D checker pattern; cells are `scale` wide along every axis.
    Checker { scale: f32, even: Color, odd: Color },
}

impl Texture {
    pub fn solid(color: Color) -> Self {
        Texture::Solid(color)
    }

    pub fn checker(scale: f32, even: Color, odd: Color) -> Self {
        Texture::Checker { scale, even, odd }
    }

    /// Color at surface coordinates `(u, v)` and world point `p`.
    pub fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        match *self {
            Texture::Solid(color) => color,
            Texture::Checker { scale, even, odd } => {
                // Parity in float: integer cell indices overflow for tiny scales
                let cell = (p / scale).floor();
                if (cell.x + cell.y + cell.z).rem_euclid(2.0) == 0.0 {
                    even
                } else {
                    odd
                }
            }
        }
    }
}

impl Default for Texture {
    fn default() -> Self {
        Texture::Solid(Color::splat(0.5))
    }
}
