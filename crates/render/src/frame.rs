use crate::camera::FlyCamera;
use glam::{Mat4, Vec3};
use nocturne_common::{LightSet, SpritePlacement, Transform, ViewerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    Back,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthCompare {
    Less,
    LessEqual,
}

/// Fixed-function state that applies to the draws following it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterState {
    pub cull: CullMode,
    pub depth: DepthCompare,
}

impl RasterState {
    pub const OPAQUE: Self = Self {
        cull: CullMode::Back,
        depth: DepthCompare::Less,
    };
    pub const TRANSPARENT: Self = Self {
        cull: CullMode::None,
        depth: DepthCompare::Less,
    };
    /// Passes at the far plane, where the skybox is projected.
    pub const SKYBOX: Self = Self {
        cull: CullMode::None,
        depth: DepthCompare::LessEqual,
    };
}

/// Which loaded model a draw refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelSlot {
    Scene,
    Billboard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear { color: [f32; 4], depth: f32 },
    SetRaster(RasterState),
    /// Every submesh of a model, with its own material.
    DrawModel { slot: ModelSlot, transform: Transform },
    /// The sprite quad with the sprite texture. `index` is the placement's
    /// position in the sprite list.
    DrawSprite { index: usize, transform: Transform },
    /// The skybox cube, using [`FrameParams::skybox_view`].
    DrawSkybox,
}

impl Command {
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Command::DrawModel { .. } | Command::DrawSprite { .. } | Command::DrawSkybox
        )
    }
}

/// Drawable size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1 for a zero-height (minimized) viewport.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Everything about the scene that stays fixed from frame to frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub clear_color: [f32; 4],
    pub shininess: f32,
    pub near: f32,
    pub far: f32,
    pub lights: LightSet,
    pub scene: Transform,
    pub billboard: Transform,
    pub sprites: Vec<SpritePlacement>,
}

impl SceneLayout {
    pub fn from_config(config: &ViewerConfig) -> Self {
        let scene = &config.scene;
        Self {
            clear_color: scene.clear_color,
            shininess: scene.shininess,
            near: config.projection.near,
            far: config.projection.far,
            lights: scene.lights.clone(),
            scene: scene.scene_placement.transform(),
            billboard: scene.billboard_placement.transform(),
            sprites: scene.sprites.clone(),
        }
    }
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

/// Per-frame shader inputs shared by every draw.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameParams {
    pub view: Mat4,
    pub projection: Mat4,
    pub skybox_view: Mat4,
    pub camera_position: Vec3,
    pub shininess: f32,
    pub lights: LightSet,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("frame plan does not start with a clear")]
    MissingClear,
    #[error("draw at command {index} has no raster state")]
    NoRasterState { index: usize },
    #[error("draw at command {index} follows the skybox")]
    DrawAfterSkybox { index: usize },
    #[error("frame ends with depth compare {0:?} instead of Less")]
    DepthNotRestored(Option<DepthCompare>),
}

/// Ordered commands for one frame plus the uniforms they read.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub params: FrameParams,
    pub commands: Vec<Command>,
}

impl FramePlan {
    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw()).count()
    }

    /// Depth comparison in effect after the last command.
    pub fn final_depth(&self) -> Option<DepthCompare> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::SetRaster(state) => Some(state.depth),
            _ => None,
        })
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if !matches!(self.commands.first(), Some(Command::Clear { .. })) {
            return Err(PlanError::MissingClear);
        }

        let mut raster_set = false;
        let mut skybox_drawn = false;
        for (index, command) in self.commands.iter().enumerate() {
            match command {
                Command::SetRaster(_) => raster_set = true,
                Command::DrawSkybox => {
                    if !raster_set {
                        return Err(PlanError::NoRasterState { index });
                    }
                    skybox_drawn = true;
                }
                Command::DrawModel { .. } | Command::DrawSprite { .. } => {
                    if !raster_set {
                        return Err(PlanError::NoRasterState { index });
                    }
                    if skybox_drawn {
                        return Err(PlanError::DrawAfterSkybox { index });
                    }
                }
                Command::Clear { .. } => {}
            }
        }

        match self.final_depth() {
            Some(DepthCompare::Less) => Ok(()),
            other => Err(PlanError::DepthNotRestored(other)),
        }
    }
}

/// Build the frame: clear, opaque models, sprites in list order, then the skybox.
pub fn plan_frame(layout: &SceneLayout, camera: &FlyCamera, viewport: Viewport) -> FramePlan {
    let params = FrameParams {
        view: camera.view_matrix(),
        projection: camera.projection_matrix(viewport.aspect(), layout.near, layout.far),
        skybox_view: camera.skybox_view_matrix(),
        camera_position: camera.position,
        shininess: layout.shininess,
        lights: layout.lights.clone(),
    };

    let mut commands = Vec::with_capacity(layout.sprites.len() + 8);
    commands.push(Command::Clear {
        color: layout.clear_color,
        depth: 1.0,
    });

    commands.push(Command::SetRaster(RasterState::OPAQUE));
    commands.push(Command::DrawModel {
        slot: ModelSlot::Scene,
        transform: layout.scene,
    });
    commands.push(Command::DrawModel {
        slot: ModelSlot::Billboard,
        transform: layout.billboard,
    });

    commands.push(Command::SetRaster(RasterState::TRANSPARENT));
    commands.extend(
        layout
            .sprites
            .iter()
            .enumerate()
            .map(|(index, sprite)| Command::DrawSprite {
                index,
                transform: sprite.transform(),
            }),
    );

    commands.push(Command::SetRaster(RasterState::SKYBOX));
    commands.push(Command::DrawSkybox);
    commands.push(Command::SetRaster(RasterState::TRANSPARENT));

    tracing::trace!(commands = commands.len(), "planned frame");
    FramePlan { params, commands }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_plan() -> FramePlan {
        plan_frame(
            &SceneLayout::default(),
            &FlyCamera::default(),
            Viewport::new(1600, 800),
        )
    }

    #[test]
    fn default_plan_is_valid() {
        let plan = default_plan();
        assert_eq!(plan.validate(), Ok(()));
        // two models, three sprites, one skybox
        assert_eq!(plan.draw_count(), 6);
        assert_eq!(plan.final_depth(), Some(DepthCompare::Less));
    }

    #[test]
    fn skybox_is_the_last_draw() {
        let plan = default_plan();
        let last_draw = plan.commands.iter().rposition(Command::is_draw).unwrap();
        assert_eq!(plan.commands[last_draw], Command::DrawSkybox);
        assert_eq!(
            plan.commands[last_draw - 1],
            Command::SetRaster(RasterState::SKYBOX)
        );
    }

    #[test]
    fn models_are_drawn_culled_and_sprites_are_not() {
        let plan = default_plan();
        let mut raster = None;
        for command in &plan.commands {
            match command {
                Command::SetRaster(state) => raster = Some(*state),
                Command::DrawModel { .. } => assert_eq!(raster, Some(RasterState::OPAQUE)),
                Command::DrawSprite { .. } => assert_eq!(raster, Some(RasterState::TRANSPARENT)),
                _ => {}
            }
        }
    }

    #[test]
    fn sprites_keep_list_order() {
        let plan = default_plan();
        let indices: Vec<usize> = plan
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::DrawSprite { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn model_transforms_come_from_layout() {
        let plan = default_plan();
        let scene = plan.commands.iter().find_map(|c| match c {
            Command::DrawModel {
                slot: ModelSlot::Scene,
                transform,
            } => Some(*transform),
            _ => None,
        });
        let origin = scene.unwrap().transform_point(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.0, -3.0, 0.0), 1e-6));
    }

    #[test]
    fn frame_params_follow_camera() {
        let mut camera = FlyCamera::default();
        camera.process_scroll(5.0);
        let layout = SceneLayout::default();
        let plan = plan_frame(&layout, &camera, Viewport::new(1600, 800));
        assert_eq!(plan.params.camera_position, camera.position);
        assert_eq!(plan.params.view, camera.view_matrix());
        assert_eq!(plan.params.shininess, 32.0);
        assert_eq!(plan.params.lights.len(), 8);
        let expected = Mat4::perspective_rh(40.0_f32.to_radians(), 2.0, 0.1, 100.0);
        assert!(plan.params.projection.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn zero_height_viewport_uses_unit_aspect() {
        assert_eq!(Viewport::new(1600, 0).aspect(), 1.0);
        let plan = plan_frame(
            &SceneLayout::default(),
            &FlyCamera::default(),
            Viewport::new(1600, 0),
        );
        assert!(plan.params.projection.is_finite());
    }

    #[test]
    fn validate_rejects_broken_plans() {
        let mut plan = default_plan();
        plan.commands.remove(0);
        assert_eq!(plan.validate(), Err(PlanError::MissingClear));

        let mut plan = default_plan();
        plan.commands.push(Command::DrawSprite {
            index: 0,
            transform: Transform::IDENTITY,
        });
        assert!(matches!(
            plan.validate(),
            Err(PlanError::DrawAfterSkybox { .. })
        ));

        let mut plan = default_plan();
        plan.commands.pop();
        assert_eq!(
            plan.validate(),
            Err(PlanError::DepthNotRestored(Some(DepthCompare::LessEqual)))
        );

        let plan = FramePlan {
            params: default_plan().params,
            commands: vec![
                Command::Clear {
                    color: [0.0; 4],
                    depth: 1.0,
                },
                Command::DrawSkybox,
            ],
        };
        assert_eq!(plan.validate(), Err(PlanError::NoRasterState { index: 1 }));
    }
}
