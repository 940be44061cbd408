//! Diagram view state and the terminal previewer's event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`DiagramView`]: state of one inline diagram, usable on its own
//! - [`Model`]: the previewer state wrapping a view
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use effects::{RenderWorker, render_blocking};
pub use model::{
    AttemptId, DIAGRAM_WIDTH_PERCENT, DiagramImage, DiagramView, Model, RenderRequest,
    RenderStatus, ToastLevel, ViewState, diagram_target_cols,
};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::theme::PaletteMode;
use crate::zoom::Zoom;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: PathBuf,
    watch_enabled: bool,
    palette: PaletteMode,
    zoom: Zoom,
    force_half_cell: bool,
}

impl App {
    /// Create a new application for the given file.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            watch_enabled: false,
            palette: PaletteMode::default(),
            zoom: Zoom::default(),
            force_half_cell: false,
        }
    }

    /// Enable or disable file watching.
    #[must_use]
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Set the initial palette.
    #[must_use]
    pub const fn with_palette(mut self, palette: PaletteMode) -> Self {
        self.palette = palette;
        self
    }

    /// Set the initial zoom.
    #[must_use]
    pub const fn with_zoom(mut self, zoom: Zoom) -> Self {
        self.zoom = zoom;
        self
    }

    /// Skip terminal graphics detection and draw with half-block cells.
    #[must_use]
    pub const fn with_force_half_cell(mut self, enabled: bool) -> Self {
        self.force_half_cell = enabled;
        self
    }
}

#[cfg(test)]
mod tests;
