use crate::action::Action;
use nocturne_common::CameraMovement;
use std::collections::BTreeSet;

/// Pixel-delta scroll events (trackpads) per line step.
const PIXELS_PER_SCROLL_LINE: f32 = 100.0;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    S,
    A,
    D,
    Escape,
}

impl Key {
    pub fn movement(self) -> Option<CameraMovement> {
        match self {
            Key::W => Some(CameraMovement::Forward),
            Key::S => Some(CameraMovement::Backward),
            Key::A => Some(CameraMovement::Left),
            Key::D => Some(CameraMovement::Right),
            Key::Escape => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollDelta {
    Lines(f32),
    Pixels(f32),
}

impl ScrollDelta {
    pub fn lines(self) -> f32 {
        match self {
            ScrollDelta::Lines(y) => y,
            ScrollDelta::Pixels(y) => y / PIXELS_PER_SCROLL_LINE,
        }
    }
}

/// Turns cursor positions or raw motion into per-sample look offsets.
#[derive(Debug, Clone, Default)]
pub struct MouseTracker {
    last: Option<(f64, f64)>,
    motion_seeded: bool,
}

impl MouseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset since the previous sample, with y reversed so moving the cursor
    /// up is positive. The first sample only seeds the tracker.
    pub fn on_cursor(&mut self, x: f64, y: f64) -> Option<(f32, f32)> {
        let offset = self
            .last
            .map(|(last_x, last_y)| ((x - last_x) as f32, (last_y - y) as f32));
        self.last = Some((x, y));
        offset
    }

    /// Raw device motion, y reversed like [`on_cursor`](Self::on_cursor).
    /// The first motion sample of a session is dropped.
    pub fn on_motion(&mut self, dx: f64, dy: f64) -> Option<(f32, f32)> {
        if !self.motion_seeded {
            self.motion_seeded = true;
            return None;
        }
        Some((dx as f32, -dy as f32))
    }

    /// Forget the last position. The next sample seeds again.
    pub fn reset(&mut self) {
        self.last = None;
        self.motion_seeded = false;
    }

    pub fn is_seeded(&self) -> bool {
        self.last.is_some()
    }
}

/// Collects raw events between frames and emits [`Action`]s once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    held: BTreeSet<Key>,
    mouse: MouseTracker,
    look: (f32, f32),
    scroll: f32,
    /// Set once raw motion arrives; cursor positions are then ignored.
    raw_motion: bool,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_event(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Absolute cursor position. Only used for look until raw motion is seen,
    /// since a grabbed cursor stops at the window edge.
    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        if self.raw_motion {
            return;
        }
        if let Some((dx, dy)) = self.mouse.on_cursor(x, y) {
            self.look.0 += dx;
            self.look.1 += dy;
        }
    }

    /// Unbounded relative pointer motion.
    pub fn mouse_motion(&mut self, dx: f64, dy: f64) {
        self.raw_motion = true;
        if let Some((dx, dy)) = self.mouse.on_motion(dx, dy) {
            self.look.0 += dx;
            self.look.1 += dy;
        }
    }

    pub fn scrolled(&mut self, delta: ScrollDelta) {
        self.scroll += delta.lines();
    }

    /// Focus was lost: drop held keys and re-seed the cursor on return so
    /// the camera does not jump.
    pub fn focus_lost(&mut self) {
        self.held.clear();
        self.mouse.reset();
        self.look = (0.0, 0.0);
    }

    /// Actions for this frame, in the order exit, moves, look, zoom.
    /// Look and zoom accumulators are drained.
    pub fn frame_actions(&mut self, elapsed: f32) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.held.contains(&Key::Escape) {
            actions.push(Action::Exit);
        }

        for key in [Key::W, Key::S, Key::A, Key::D] {
            if !self.held.contains(&key) {
                continue;
            }
            if let Some(direction) = key.movement() {
                actions.push(Action::Move { direction, elapsed });
            }
        }

        let (dx, dy) = std::mem::take(&mut self.look);
        if dx != 0.0 || dy != 0.0 {
            actions.push(Action::Look { dx, dy });
        }

        let scroll = std::mem::take(&mut self.scroll);
        if scroll != 0.0 {
            actions.push(Action::Zoom(scroll));
        }

        if !actions.is_empty() {
            tracing::trace!(count = actions.len(), "input actions");
        }
        actions
    }
}
