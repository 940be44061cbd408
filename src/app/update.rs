use crate::app::Model;
use crate::app::model::AttemptId;
use crate::mermaid::{RenderFailure, RenderedDiagram};
use crate::theme::PaletteMode;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Diagram
    /// Diagram source replaced
    ContentChanged(String),
    /// Host theme changed
    ThemeChanged(PaletteMode),
    /// Flip between light and dark palettes
    ToggleTheme,
    /// Zoom in one step
    ZoomIn,
    /// Zoom out one step
    ZoomOut,
    /// Back to 100%
    ResetZoom,
    /// A render attempt completed
    RenderFinished {
        attempt: AttemptId,
        outcome: Result<RenderedDiagram, RenderFailure>,
    },

    // Error panel
    /// Open or close the diagram source disclosure
    ToggleSource,
    /// Copy the diagram source to the clipboard
    CopySource,

    // File watching
    /// File changed externally, reload
    FileChanged,
    /// Force reload file
    ForceReload,
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here.
/// No side effects should occur in this function; the render itself is
/// queued on the view and picked up by the event loop.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::ContentChanged(content) => {
            if model.view.set_source(content) {
                model.source_visible = false;
            }
        }
        Message::ThemeChanged(palette) => {
            model.view.set_palette(palette);
        }
        Message::ToggleTheme => {
            let palette = model.view.palette().toggled();
            model.view.set_palette(palette);
        }
        // The error panel has no zoom controls.
        Message::ZoomIn | Message::ZoomOut | Message::ResetZoom
            if model.view.error_message().is_some() => {}
        Message::ZoomIn => model.view.zoom_in(),
        Message::ZoomOut => model.view.zoom_out(),
        Message::ResetZoom => model.view.reset_zoom(),
        Message::RenderFinished { attempt, outcome } => {
            model.view.finish_attempt(attempt, outcome);
        }

        Message::ToggleSource => {
            if model.view.error_message().is_some() {
                model.source_visible = !model.source_visible;
            }
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        // CopySource/FileChanged/ForceReload: handled in effects
        // Redraw: no state change needed
        Message::CopySource | Message::FileChanged | Message::ForceReload | Message::Redraw => {}

        // Window
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
        }
        // Application
        Message::Quit => {
            model.should_quit = true;
        }
    }
    model
}
