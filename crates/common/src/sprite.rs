use crate::types::Transform;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Uniform scale applied to every sprite quad before any per-sprite override.
pub const SPRITE_BASE_SCALE: f32 = 2.5;

/// A transparent decal quad fixed in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpritePlacement {
    pub position: Vec3,
    /// Extra rotation about +Y, applied after the base scale.
    #[serde(default)]
    pub rotate_y_degrees: Option<f32>,
    /// Extra uniform scale, applied after the rotation.
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl SpritePlacement {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotate_y_degrees: None,
            scale: 1.0,
        }
    }

    pub fn rotated(position: Vec3, rotate_y_degrees: f32, scale: f32) -> Self {
        Self {
            position,
            rotate_y_degrees: Some(rotate_y_degrees),
            scale,
        }
    }

    /// Quarter-turned decal on a side wall.
    pub fn side_wall(position: Vec3) -> Self {
        Self::rotated(position, 90.0, 0.6)
    }

    /// Quarter-turned decal, shrunk for the far wall above the billboard.
    pub fn side_wall_small(position: Vec3) -> Self {
        Self::rotated(position, 90.0, 0.15)
    }

    /// `translate(position) * scale(2.5) * [rotate_y * scale(s)]`.
    pub fn transform(&self) -> Transform {
        let base = Transform::IDENTITY
            .translate(self.position)
            .scale_uniform(SPRITE_BASE_SCALE);
        match self.rotate_y_degrees {
            Some(degrees) => base.rotate_y(degrees).scale_uniform(self.scale),
            None if self.scale != 1.0 => base.scale_uniform(self.scale),
            None => base,
        }
    }

    /// Graffiti decals in the alley, in draw order.
    pub fn graffiti() -> Vec<Self> {
        vec![
            Self::at(Vec3::new(-7.5, -1.5, -26.27)),
            Self::at(Vec3::new(-3.3, -1.75, 11.85)),
            Self::side_wall(Vec3::new(21.92, -2.25, -2.5)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_sprite_is_translate_times_base_scale() {
        let sprite = SpritePlacement::at(Vec3::new(-7.5, -1.5, -26.27));
        let corner = sprite.transform().transform_point(Vec3::new(1.0, 0.5, 0.0));
        assert!(corner.abs_diff_eq(Vec3::new(-5.0, -0.25, -26.27), 1e-5));
    }

    #[test]
    fn side_wall_sprite_turns_into_the_z_axis() {
        let sprite = SpritePlacement::side_wall(Vec3::new(21.92, -2.25, -2.5));
        let p = sprite.transform().transform_point(Vec3::X);
        // 2.5 * 0.6 = 1.5 units along -Z after the quarter turn.
        assert!(p.abs_diff_eq(Vec3::new(21.92, -2.25, -4.0), 1e-5));
    }

    #[test]
    fn graffiti_order_is_stable() {
        let list = SpritePlacement::graffiti();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].rotate_y_degrees, None);
        assert_eq!(list[1].rotate_y_degrees, None);
        assert_eq!(list[2].rotate_y_degrees, Some(90.0));
        assert_eq!(list[2].scale, 0.6);
        assert_eq!(SpritePlacement::side_wall_small(Vec3::ZERO).scale, 0.15);
    }
}
