use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;

use crate::mermaid::{RenderFailure, RenderId, RenderedDiagram};
use crate::theme::PaletteMode;
use crate::zoom::Zoom;

/// Diagram width as a percentage of the pane at 100% zoom.
///
/// Mermaid SVGs carry their own internal spacing and read best narrower than
/// the full pane; 60 was chosen empirically.
pub const DIAGRAM_WIDTH_PERCENT: u32 = 60;

/// Identifies one render attempt of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the current render attempt stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderStatus {
    /// Nothing to render (initial state, or blank source).
    #[default]
    Idle,
    Rendering {
        attempt: AttemptId,
    },
    Rendered {
        attempt: AttemptId,
        diagram: RenderedDiagram,
    },
    Errored {
        attempt: AttemptId,
        message: String,
    },
}

/// Flat snapshot of the view: `rendered`, `error_message`, `scale`.
///
/// `error_message.is_some()` always implies `!rendered`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub rendered: bool,
    pub error_message: Option<String>,
    pub scale: f32,
}

/// Work the host must run: render `source` in `palette` for `attempt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub attempt: AttemptId,
    pub render_id: RenderId,
    pub source: String,
    pub palette: PaletteMode,
}

/// State of one inline diagram.
///
/// The engine runs only when the source or palette changes. Zoom is a view
/// transform on the last rendered SVG and never triggers a render.
#[derive(Debug, Clone, Default)]
pub struct DiagramView {
    source: String,
    palette: PaletteMode,
    zoom: Zoom,
    class_name: Option<String>,
    status: RenderStatus,
    last_attempt: u64,
    pending: Option<RenderRequest>,
}

impl DiagramView {
    /// Mount a view for `content`. A render request is queued immediately
    /// unless the content is blank.
    pub fn new(content: impl Into<String>, palette: PaletteMode) -> Self {
        let mut view = Self {
            source: content.into(),
            palette,
            ..Self::default()
        };
        view.begin_attempt();
        view
    }

    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub const fn with_zoom(mut self, zoom: Zoom) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub const fn palette(&self) -> PaletteMode {
        self.palette
    }

    pub const fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub const fn status(&self) -> &RenderStatus {
        &self.status
    }

    /// Replace the source. Returns true if it changed (and a render began).
    pub fn set_source(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if content == self.source {
            return false;
        }
        self.source = content;
        self.begin_attempt();
        true
    }

    /// Switch palette. Returns true if it changed (and a render began).
    pub fn set_palette(&mut self, palette: PaletteMode) -> bool {
        if palette == self.palette {
            return false;
        }
        self.palette = palette;
        self.begin_attempt();
        true
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.zoom.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.zoom_out();
    }

    pub const fn reset_zoom(&mut self) {
        self.zoom = Zoom::reset();
    }

    /// Take the queued render request, if any.
    pub const fn take_render_request(&mut self) -> Option<RenderRequest> {
        self.pending.take()
    }

    /// Apply the outcome of an attempt.
    ///
    /// Outcomes for anything but the attempt currently in flight are
    /// superseded and dropped. Returns true if the outcome was applied.
    pub fn finish_attempt(
        &mut self,
        attempt: AttemptId,
        outcome: Result<RenderedDiagram, RenderFailure>,
    ) -> bool {
        let current = match self.status {
            RenderStatus::Rendering { attempt } => Some(attempt),
            _ => None,
        };
        if current != Some(attempt) {
            tracing::debug!(%attempt, current = ?current, "dropping superseded render result");
            crate::perf::log_event(
                "view.attempt.stale",
                format!("attempt={attempt} current={current:?}"),
            );
            return false;
        }
        self.status = match outcome {
            Ok(diagram) => RenderStatus::Rendered { attempt, diagram },
            Err(failure) => RenderStatus::Errored {
                attempt,
                message: failure.message().to_string(),
            },
        };
        true
    }

    pub const fn is_rendered(&self) -> bool {
        matches!(self.status, RenderStatus::Rendered { .. })
    }

    pub const fn is_rendering(&self) -> bool {
        matches!(self.status, RenderStatus::Rendering { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            RenderStatus::Errored { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether the loading overlay is shown: neither rendered nor errored.
    pub const fn shows_loading(&self) -> bool {
        matches!(
            self.status,
            RenderStatus::Idle | RenderStatus::Rendering { .. }
        )
    }

    pub const fn diagram(&self) -> Option<&RenderedDiagram> {
        match &self.status {
            RenderStatus::Rendered { diagram, .. } => Some(diagram),
            _ => None,
        }
    }

    /// Markup for the diagram container. Empty unless rendered.
    pub fn markup(&self) -> String {
        self.diagram()
            .map(|diagram| diagram.markup(self.zoom))
            .unwrap_or_default()
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            rendered: self.is_rendered(),
            error_message: self.error_message().map(ToOwned::to_owned),
            scale: self.zoom.scale(),
        }
    }

    fn begin_attempt(&mut self) {
        if self.source.trim().is_empty() {
            self.status = RenderStatus::Idle;
            self.pending = None;
            return;
        }
        self.last_attempt += 1;
        let attempt = AttemptId(self.last_attempt);
        let render_id = RenderId::next();
        tracing::debug!(%attempt, %render_id, palette = ?self.palette, "render attempt queued");
        self.status = RenderStatus::Rendering { attempt };
        self.pending = Some(RenderRequest {
            attempt,
            render_id,
            source: self.source.clone(),
            palette: self.palette,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Rasterized diagram cached for the terminal.
pub struct DiagramImage {
    pub render_id: RenderId,
    pub zoom: Zoom,
    pub pane_cols: u16,
    pub protocol: StatefulProtocol,
    pub width_cols: u16,
    pub height_rows: u16,
}

/// State of the terminal previewer.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// The diagram being shown
    pub view: DiagramView,
    /// Path to the diagram source file
    pub file_path: PathBuf,
    /// Whether file watching is enabled
    pub watch_enabled: bool,
    /// Whether the error panel's source disclosure is open
    pub source_visible: bool,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Terminal size (columns, rows)
    pub terminal_size: (u16, u16),
    /// Image picker for terminal rendering
    pub picker: Option<Picker>,
    /// Rasterized diagram for the current render and zoom
    pub diagram_image: Option<DiagramImage>,
    toast: Option<Toast>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("view", &self.view)
            .field("watch_enabled", &self.watch_enabled)
            .finish_non_exhaustive()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self {
            view: DiagramView::default(),
            file_path: PathBuf::new(),
            watch_enabled: false,
            source_visible: false,
            help_visible: false,
            should_quit: false,
            terminal_size: (80, 24),
            picker: None,
            diagram_image: None,
            toast: None,
        }
    }
}

impl Model {
    /// Create a model for a diagram loaded from `file_path`.
    pub fn new(file_path: PathBuf, view: DiagramView, terminal_size: (u16, u16)) -> Self {
        Self {
            view,
            file_path,
            terminal_size,
            ..Self::default()
        }
    }

    /// Set the image picker.
    #[must_use]
    pub fn with_picker(mut self, picker: Option<Picker>) -> Self {
        self.picker = picker;
        self
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Re-read the source file. Returns true if the content changed.
    pub(super) fn reload_from_disk(&mut self) -> Result<bool> {
        let content = std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;
        Ok(self.view.set_source(content))
    }

    /// Rasterize the current diagram for a pane `pane_cols` wide.
    ///
    /// Cached per (render, zoom, pane width); a no-op without a picker or a
    /// rendered diagram.
    pub fn prepare_diagram_image(&mut self, pane_cols: u16) {
        let Some(diagram) = self.view.diagram() else {
            self.diagram_image = None;
            return;
        };
        let Some(picker) = &self.picker else { return };
        let zoom = self.view.zoom();
        if self.diagram_image.as_ref().is_some_and(|img| {
            img.render_id == diagram.render_id && img.zoom == zoom && img.pane_cols == pane_cols
        }) {
            return;
        }

        let target_cols = diagram_target_cols(pane_cols, zoom);
        let font_size = picker.font_size();
        let target_width_px = u32::from(target_cols) * u32::from(font_size.0);
        match crate::mermaid::render_to_image(diagram, target_width_px) {
            Ok(img) => {
                let protocol = picker.new_resize_protocol(img);
                let (width_cols, height_rows) = protocol_render_size(&protocol, target_cols);
                crate::perf::log_event(
                    "image.diagram.protocol",
                    format!(
                        "id={} zoom={zoom} width_cols={width_cols} height_rows={height_rows}",
                        diagram.render_id
                    ),
                );
                self.diagram_image = Some(DiagramImage {
                    render_id: diagram.render_id,
                    zoom,
                    pane_cols,
                    protocol,
                    width_cols,
                    height_rows,
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to rasterize diagram");
                self.diagram_image = None;
                self.show_toast(ToastLevel::Warning, format!("Image unavailable: {err}"));
            }
        }
    }
}

/// Target image width in columns for a pane and zoom.
pub fn diagram_target_cols(pane_cols: u16, zoom: Zoom) -> u16 {
    let base = u32::from(pane_cols) * DIAGRAM_WIDTH_PERCENT / 100;
    let scaled = base * u32::from(zoom.percent()) / 100;
    u16::try_from(scaled.max(1)).unwrap_or(u16::MAX)
}

fn protocol_render_size(protocol: &StatefulProtocol, target_width_cols: u16) -> (u16, u16) {
    use ratatui::layout::Rect;
    use ratatui_image::Resize;
    let resize = if matches!(
        protocol.protocol_type(),
        ratatui_image::protocol::StatefulProtocolType::Halfblocks(_)
    ) {
        Resize::Scale(Some(image::imageops::FilterType::CatmullRom))
    } else {
        Resize::Scale(None)
    };
    let area = Rect::new(0, 0, target_width_cols, u16::MAX);
    let rect = protocol.size_for(resize, area);
    (rect.width.max(1), rect.height.max(1))
}
