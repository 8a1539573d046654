//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, tab bar, status bar and overlays
//! - `input`: keyboard event handling
//! - `styles`: colors and text styles
//! - `tabs`: per-tab content

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
