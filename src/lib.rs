// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. zoom::ZoomAction)
    clippy::module_name_repetitions
)]

//! # mermaid-inline
//!
//! An inline Mermaid diagram component with zoom controls.
//!
//! A [`DiagramView`](app::DiagramView) takes Mermaid source and a palette
//! mode, renders it to SVG in the background and shows:
//! - the diagram with zoom out / zoom in / reset controls
//! - a loading overlay while a render is in flight
//! - an error panel with a collapsible copy of the source when rendering fails
//!
//! Results of superseded render attempts are discarded, so a slow render of
//! old content never overwrites a newer one.
//!
//! ## Architecture
//!
//! The terminal host uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal (or to an HTML fragment)
//!
//! ## Modules
//!
//! - [`app`]: Component state, messages and the terminal event loop
//! - [`mermaid`]: Render adapter around the diagram engine
//! - [`markup`]: SVG post-processing (id scoping, zoom)
//! - [`theme`]: Light and dark diagram palettes
//! - [`zoom`]: Zoom steps and limits
//! - [`ui`]: HTML fragment and terminal presentation
//! - [`config`]: Saved defaults
//! - [`watcher`]: File watching

pub mod app;
pub mod config;
pub mod markup;
pub mod mermaid;
pub mod perf;
pub mod theme;
pub mod ui;
pub mod watcher;
pub mod zoom;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, DiagramView, Message, Model, RenderStatus, ViewState};
    pub use crate::mermaid::RenderAdapter;
    pub use crate::theme::PaletteMode;
    pub use crate::ui::{render_html, render_once};
    pub use crate::zoom::Zoom;
}
