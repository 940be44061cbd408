//! Presentation for both hosts.
//!
//! - [`html`]: the HTML fragment for a chat message
//! - [`widgets`]: zoom control buttons shared by both hosts
//! - [`style`]: shell colors per palette mode
//! - [`render`]: the ratatui terminal shell

pub mod html;
pub mod style;
pub mod widgets;

mod images;
mod overlays;
mod render;
mod status;

pub use html::{render_html, render_once};
pub use images::create_picker;
pub use render::{
    ShellLayout, diagram_pane_width, hit_test, render, shell_layout, terminal_controls,
};
