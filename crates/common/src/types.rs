use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Direction of a keyboard-driven camera move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Model transform built from sequential operations.
///
/// Each call post-multiplies the accumulated matrix, so
/// `Transform::IDENTITY.translate(t).scale_uniform(s)` is `T * S`: the scale
/// happens first in object space, then the translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform(Mat4);

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self(Mat4::IDENTITY);

    pub fn translate(self, offset: Vec3) -> Self {
        Self(self.0 * Mat4::from_translation(offset))
    }

    pub fn scale(self, factors: Vec3) -> Self {
        Self(self.0 * Mat4::from_scale(factors))
    }

    pub fn scale_uniform(self, factor: f32) -> Self {
        self.scale(Vec3::splat(factor))
    }

    pub fn rotate_y(self, degrees: f32) -> Self {
        Self(self.0 * Mat4::from_rotation_y(degrees.to_radians()))
    }

    pub fn matrix(&self) -> Mat4 {
        self.0
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.0.transform_point3(point)
    }
}

/// Where a loaded model sits in the world: translated, then scaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPlacement {
    pub translation: Vec3,
    pub scale: Vec3,
}

impl ModelPlacement {
    pub fn new(translation: Vec3, scale: f32) -> Self {
        Self {
            translation,
            scale: Vec3::splat(scale),
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::IDENTITY
            .translate(self.translation)
            .scale(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_points_alone() {
        let p = Vec3::new(1.0, -2.0, 3.0);
        assert_eq!(Transform::IDENTITY.transform_point(p), p);
        assert_eq!(Transform::default(), Transform::IDENTITY);
    }

    #[test]
    fn translate_then_scale_scales_in_object_space() {
        let t = Transform::IDENTITY
            .translate(Vec3::new(0.0, -3.0, 0.0))
            .scale_uniform(0.05);
        let p = t.transform_point(Vec3::new(100.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(5.0, -3.0, 0.0), 1e-5));
    }

    #[test]
    fn rotate_y_quarter_turn() {
        let t = Transform::IDENTITY.rotate_y(90.0);
        let p = t.transform_point(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn placement_matches_manual_composition() {
        let placement = ModelPlacement::new(Vec3::new(11.0, 1.5, -11.75), 0.2);
        let manual = Transform::IDENTITY
            .translate(Vec3::new(11.0, 1.5, -11.75))
            .scale_uniform(0.2);
        assert!(placement.transform().matrix().abs_diff_eq(manual.matrix(), 1e-6));
    }
}
