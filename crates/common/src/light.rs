use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Upper bound on point lights the shading path accepts per frame.
pub const MAX_POINT_LIGHTS: usize = 8;

/// A point light with constant/linear/quadratic distance attenuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    /// A dim street lamp at `position`. Every lamp in the default scene uses
    /// these colors and falloff.
    pub fn lamp(position: Vec3) -> Self {
        Self {
            position,
            ambient: Vec3::splat(0.25),
            diffuse: Vec3::splat(0.7),
            specular: Vec3::splat(0.15),
            constant: 1.0,
            linear: 0.22,
            quadratic: 0.2,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LightSetError {
    #[error("light set is full ({} lights)", MAX_POINT_LIGHTS)]
    Full,
}

/// Lights indexed by slot, at most [`MAX_POINT_LIGHTS`].
///
/// Slot order is preserved: the light pushed first is encoded first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PointLight>", into = "Vec<PointLight>")]
pub struct LightSet {
    lights: Vec<PointLight>,
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, light: PointLight) -> Result<usize, LightSetError> {
        if self.lights.len() >= MAX_POINT_LIGHTS {
            return Err(LightSetError::Full);
        }
        self.lights.push(light);
        Ok(self.lights.len() - 1)
    }

    pub fn get(&self, index: usize) -> Option<&PointLight> {
        self.lights.get(index)
    }

    /// Iterate `(slot, light)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PointLight)> {
        self.lights.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// The eight lamps lighting the alley scene.
    pub fn street_lamps() -> Self {
        let positions = [
            Vec3::new(-5.5, 3.6, 2.65),
            Vec3::new(-21.91, 3.62, 2.65),
            Vec3::new(19.25, 3.62, 3.2),
            Vec3::new(35.15, 3.62, 3.0),
            Vec3::new(34.65, 1.32, -11.75),
            Vec3::new(-5.9, 1.32, -11.75),
            Vec3::new(-19.7, 3.62, -9.35),
            Vec3::new(20.95, 3.62, -9.44),
        ];
        Self {
            lights: positions.into_iter().map(PointLight::lamp).collect(),
        }
    }
}

impl TryFrom<Vec<PointLight>> for LightSet {
    type Error = LightSetError;

    fn try_from(lights: Vec<PointLight>) -> Result<Self, Self::Error> {
        if lights.len() > MAX_POINT_LIGHTS {
            return Err(LightSetError::Full);
        }
        Ok(Self { lights })
    }
}

impl From<LightSet> for Vec<PointLight> {
    fn from(set: LightSet) -> Self {
        set.lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn street_lamps_fill_every_slot() {
        let set = LightSet::street_lamps();
        assert_eq!(set.len(), MAX_POINT_LIGHTS);
        assert_eq!(set.get(0).unwrap().position, Vec3::new(-5.5, 3.6, 2.65));
        assert_eq!(set.get(7).unwrap().position, Vec3::new(20.95, 3.62, -9.44));
        assert!(set.iter().all(|(_, l)| l.linear == 0.22 && l.quadratic == 0.2));
    }

    #[test]
    fn ninth_light_is_rejected() {
        let mut set = LightSet::street_lamps();
        assert_eq!(set.push(PointLight::lamp(Vec3::ZERO)), Err(LightSetError::Full));
        assert_eq!(set.len(), MAX_POINT_LIGHTS);
    }

    #[test]
    fn push_returns_slot_and_iter_preserves_order() {
        let mut set = LightSet::new();
        assert!(set.is_empty());
        assert_eq!(set.push(PointLight::lamp(Vec3::X)).unwrap(), 0);
        assert_eq!(set.push(PointLight::lamp(Vec3::Y)).unwrap(), 1);
        let positions: Vec<_> = set.iter().map(|(i, l)| (i, l.position)).collect();
        assert_eq!(positions, vec![(0, Vec3::X), (1, Vec3::Y)]);
    }

    #[test]
    fn too_many_lights_fail_conversion() {
        let lights = vec![PointLight::lamp(Vec3::ZERO); MAX_POINT_LIGHTS + 1];
        assert!(LightSet::try_from(lights).is_err());
    }
}
