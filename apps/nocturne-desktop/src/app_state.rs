use nocturne_common::ViewerConfig;
use nocturne_input::{Action, InputMapper};
use nocturne_render::{FlyCamera, FramePlan, SceneLayout, Viewport, plan_frame};
use std::time::Instant;

/// Result of one frame step.
#[derive(Debug)]
pub enum Step {
    Exit,
    Render(FramePlan),
}

/// Camera, input and timing for the running viewer.
pub struct AppState {
    pub camera: FlyCamera,
    pub input: InputMapper,
    pub layout: SceneLayout,
    last_frame: Option<Instant>,
    frames: u64,
}

impl AppState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            camera: FlyCamera::from_config(&config.camera),
            input: InputMapper::new(),
            layout: SceneLayout::from_config(config),
            last_frame: None,
            frames: 0,
        }
    }

    /// Seconds since the previous call; zero on the first frame.
    fn elapsed(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last_frame
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        elapsed
    }

    /// Apply actions to the camera. Returns true if exit was requested.
    pub fn apply(&mut self, actions: &[Action]) -> bool {
        let mut exit = false;
        for action in actions {
            match *action {
                Action::Move { direction, elapsed } => {
                    self.camera.process_keyboard(direction, elapsed)
                }
                Action::Look { dx, dy } => self.camera.process_mouse_movement(dx, dy),
                Action::Zoom(y) => self.camera.process_scroll(y),
                Action::Exit => exit = true,
            }
        }
        exit
    }

    /// Advance one frame: time, input, camera, then the frame plan.
    pub fn step(&mut self, now: Instant, viewport: Viewport) -> Step {
        let elapsed = self.elapsed(now);
        let actions = self.input.frame_actions(elapsed);
        if self.apply(&actions) {
            return Step::Exit;
        }
        self.frames += 1;
        Step::Render(plan_frame(&self.layout, &self.camera, viewport))
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use nocturne_input::Key;
    use std::time::Duration;

    const VIEWPORT: Viewport = Viewport {
        width: 1600,
        height: 800,
    };

    #[test]
    fn holding_w_for_one_second_moves_forward() {
        let mut state = AppState::new(&ViewerConfig::default());
        let start = Instant::now();
        assert!(matches!(state.step(start, VIEWPORT), Step::Render(_)));

        state.input.key_event(Key::W, true);
        let Step::Render(plan) = state.step(start + Duration::from_secs(1), VIEWPORT) else {
            panic!("expected a frame");
        };
        assert!(state.camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, -2.8), 1e-4));
        assert_eq!(plan.params.camera_position, state.camera.position);
        assert_eq!(state.frames(), 2);
    }

    #[test]
    fn first_frame_has_no_elapsed_time() {
        let mut state = AppState::new(&ViewerConfig::default());
        state.input.key_event(Key::W, true);
        state.step(Instant::now(), VIEWPORT);
        assert!(state.camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, -0.3), 1e-6));
    }

    #[test]
    fn escape_exits_before_rendering() {
        let mut state = AppState::new(&ViewerConfig::default());
        state.input.key_event(Key::Escape, true);
        assert!(matches!(state.step(Instant::now(), VIEWPORT), Step::Exit));
        assert_eq!(state.frames(), 0);
    }

    #[test]
    fn look_and_zoom_reach_the_camera() {
        let mut state = AppState::new(&ViewerConfig::default());
        let exit = state.apply(&[Action::Look { dx: 0.0, dy: 100.0 }, Action::Zoom(5.0)]);
        assert!(!exit);
        assert_eq!(state.camera.pitch(), 10.0);
        assert_eq!(state.camera.zoom(), 40.0);
    }

    #[test]
    fn config_sets_camera_start() {
        let mut config = ViewerConfig::default();
        config.camera.position = Vec3::new(1.0, 2.0, 3.0);
        config.camera.speed = 5.0;
        let state = AppState::new(&config);
        assert_eq!(state.camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.camera.speed, 5.0);
    }
}
