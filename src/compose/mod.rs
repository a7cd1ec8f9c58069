//! Caption layout and compositing.
//!
//! [`layout`] turns a source size and captions into a [`RenderPlan`] (display size, font size,
//! wrapped lines and their positions). [`Compositor`] replays that plan onto a
//! [`RenderTarget`](crate::RenderTarget).

/// Replays a [`RenderPlan`] onto a target.
pub mod compositor;
/// Pure caption layout math.
pub mod layout;

pub use compositor::Compositor;
pub use layout::{
    ComposeOpts, RenderPlan, TextBlock, font_size_for, plan_layout, scale_size, stroke_width_for,
    wrap_lines,
};
