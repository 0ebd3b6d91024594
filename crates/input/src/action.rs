use nocturne_common::CameraMovement;

/// A high-level command produced from one polled frame of input.
///
/// The application consumes actions, never raw window events, so the camera
/// and exit logic can be driven from tests without a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Move the camera along its basis for `elapsed` seconds.
    Move {
        direction: CameraMovement,
        elapsed: f32,
    },
    /// Rotate the camera by a cursor offset in pixels (y up is positive).
    Look { dx: f32, dy: f32 },
    /// Change field of view by a scroll offset in line steps.
    Zoom(f32),
    /// Close the viewer.
    Exit,
}

impl Action {
    pub fn is_exit(&self) -> bool {
        matches!(self, Action::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_move_carries_elapsed_time() {
        let a = Action::Move {
            direction: CameraMovement::Forward,
            elapsed: 0.016,
        };
        assert!(matches!(a, Action::Move { elapsed, .. } if elapsed == 0.016));
        assert!(!a.is_exit());
    }

    #[test]
    fn action_exit() {
        assert!(Action::Exit.is_exit());
        assert!(!Action::Zoom(1.0).is_exit());
        assert!(!Action::Look { dx: 0.0, dy: 0.0 }.is_exit());
    }
}
