//! Input mapping: raw key, cursor and scroll events become camera actions.
//!
//! # Invariants
//! - The first cursor sample of a session only seeds the tracker.
//! - Key state persists across frames; look and zoom deltas do not.
//! - No window-system types cross this boundary.

pub mod action;
pub mod mapper;

pub use action::Action;
pub use mapper::{InputMapper, Key, MouseTracker, ScrollDelta};
