use crate::frame::{Command, FramePlan};
use std::fmt::Write;

/// Executes a frame plan. Backends never reorder or skip commands.
pub trait Renderer {
    /// What one rendered frame produces.
    type Output;

    fn render(&mut self, plan: &FramePlan) -> Self::Output;
}

/// Prints a frame plan as one line per command.
///
/// Used by the CLI and in tests to inspect frame structure without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, plan: &FramePlan) -> String {
        self.frames += 1;
        let params = &plan.params;
        let eye = params.camera_position;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({} commands, {} draws) ===",
            self.frames,
            plan.commands.len(),
            plan.draw_count()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) shininess={:.0} lights={}",
            eye.x,
            eye.y,
            eye.z,
            params.shininess,
            params.lights.len()
        );

        for (i, command) in plan.commands.iter().enumerate() {
            let _ = match command {
                Command::Clear { color, depth } => writeln!(
                    out,
                    "  {i:2} clear color=({:.2}, {:.2}, {:.2}, {:.2}) depth={depth:.1}",
                    color[0], color[1], color[2], color[3]
                ),
                Command::SetRaster(state) => writeln!(
                    out,
                    "  {i:2} raster cull={:?} depth={:?}",
                    state.cull, state.depth
                ),
                Command::DrawModel { slot, transform } => {
                    let p = transform.transform_point(glam::Vec3::ZERO);
                    writeln!(
                        out,
                        "  {i:2} draw model {slot:?} at ({:.2}, {:.2}, {:.2})",
                        p.x, p.y, p.z
                    )
                }
                Command::DrawSprite { index, transform } => {
                    let p = transform.transform_point(glam::Vec3::ZERO);
                    writeln!(
                        out,
                        "  {i:2} draw sprite #{index} at ({:.2}, {:.2}, {:.2})",
                        p.x, p.y, p.z
                    )
                }
                Command::DrawSkybox => writeln!(out, "  {i:2} draw skybox"),
            };
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FlyCamera, SceneLayout, Viewport, plan_frame};

    #[test]
    fn debug_renderer_lists_every_command() {
        let plan = plan_frame(
            &SceneLayout::default(),
            &FlyCamera::default(),
            Viewport::new(1600, 800),
        );
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&plan);

        assert!(output.contains("=== Frame 1"));
        assert!(output.contains("eye=(0.00, 0.00, -0.30)"));
        assert!(output.contains("lights=8"));
        assert!(output.contains("draw model Scene at (0.00, -3.00, 0.00)"));
        assert!(output.contains("draw sprite #2 at (21.92, -2.25, -2.50)"));
        assert_eq!(output.lines().count(), plan.commands.len() + 2);
        assert!(output.trim_end().ends_with("raster cull=None depth=Less"));
    }

    #[test]
    fn debug_renderer_counts_frames() {
        let plan = plan_frame(
            &SceneLayout::default(),
            &FlyCamera::default(),
            Viewport::new(800, 600),
        );
        let mut renderer = DebugTextRenderer::new();
        renderer.render(&plan);
        let second = renderer.render(&plan);
        assert_eq!(renderer.frames_rendered(), 2);
        assert!(second.starts_with("=== Frame 2"));
    }
}
