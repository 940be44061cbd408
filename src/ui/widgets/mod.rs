//! Widgets shared by the HTML and terminal hosts.

mod button;

pub use button::{Button, ButtonSize, ButtonVariant, Glyph, ZoomAction};

use crate::zoom::Zoom;

/// The three zoom controls in display order: out, in, reset.
pub fn zoom_controls(zoom: Zoom) -> [Button; 3] {
    ZoomAction::ALL.map(|action| Button::new(action).disabled(action.disabled_at(zoom)))
}
