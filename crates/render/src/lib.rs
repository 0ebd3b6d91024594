//! Renderer-agnostic core of the viewer.
//!
//! # Invariants
//! - The camera basis is always derived from yaw and pitch alone.
//! - A frame is described as a [`FramePlan`] before any backend touches it;
//!   backends execute plans, they never decide draw order.
//! - The skybox is drawn last, with a `LessEqual` depth test, and the frame
//!   ends with the depth test restored to `Less`.

mod camera;
mod frame;
pub mod geometry;
mod renderer;

pub use camera::FlyCamera;
pub use frame::{
    Command, CullMode, DepthCompare, FrameParams, FramePlan, ModelSlot, PlanError, RasterState,
    SceneLayout, Viewport, plan_frame,
};
pub use renderer::{DebugTextRenderer, Renderer};
