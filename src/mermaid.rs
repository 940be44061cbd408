//! Mermaid diagram rendering.
//!
//! Renders diagram source text to SVG using `mermaid-rs-renderer` and, for
//! the terminal host, rasterizes the SVG with `resvg`.
//!
//! The engine sits behind [`DiagramEngine`] so the view controller can be
//! driven by any text -> SVG backend. [`RenderAdapter`] owns the engine and
//! runs configure+render under one lock: the engine has a single active
//! configuration, and two views rendering in different themes must not see
//! each other's palette.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use anyhow::Result;
use image::DynamicImage;
use once_cell::sync::Lazy;
use resvg::usvg::fontdb;

use crate::markup;
use crate::theme::{Palette, PaletteMode};
use crate::zoom::Zoom;

/// Message used when the engine fails without saying why.
pub const GENERIC_FAILURE: &str = "Failed to render diagram";

/// The one way a render attempt can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RenderFailure {
    message: String,
}

impl RenderFailure {
    /// Wrap an engine message. Blank messages fall back to [`GENERIC_FAILURE`].
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        };
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Per-attempt identifier written to the SVG root `id`.
///
/// Identifiers are unique across the process so several diagrams can share a
/// page without their element ids colliding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderId(u64);

static NEXT_RENDER_ID: AtomicU64 = AtomicU64::new(1);

impl RenderId {
    pub fn next() -> Self {
        Self(NEXT_RENDER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mermaid-{}", self.0)
    }
}

/// Average glyph advance as a fraction of the font size, used to turn a
/// pixel wrapping width into the engine's character budget.
const AVG_CHAR_WIDTH_EM: f32 = 0.65;

/// Layout parameters handed to the engine on every attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub node_spacing: f32,
    pub rank_spacing: f32,
    /// Space around the whole drawing, in SVG units.
    pub diagram_padding: f32,
    /// Let mindmap, git graph, C4 and pie output shrink to their container.
    pub use_max_width: bool,
    /// Vertical padding inside nodes; horizontal padding is twice this.
    pub padding: f32,
    /// Label width in pixels before text wraps.
    pub wrapping_width: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_spacing: 50.0,
            rank_spacing: 50.0,
            diagram_padding: 8.0,
            use_max_width: true,
            padding: 15.0,
            wrapping_width: 200.0,
        }
    }
}

impl LayoutOptions {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn wrap_chars(self, font_size_px: f32) -> usize {
        let chars = (self.wrapping_width / (font_size_px * AVG_CHAR_WIDTH_EM)).round();
        if chars.is_finite() { chars.max(1.0) as usize } else { 1 }
    }

    fn to_engine_layout(self, font_size_px: f32) -> mermaid_rs_renderer::LayoutConfig {
        let mut config = mermaid_rs_renderer::LayoutConfig {
            node_spacing: self.node_spacing,
            rank_spacing: self.rank_spacing,
            node_padding_x: self.padding * 2.0,
            node_padding_y: self.padding,
            max_label_width_chars: self.wrap_chars(font_size_px),
            ..mermaid_rs_renderer::LayoutConfig::default()
        };
        config.mindmap.use_max_width = self.use_max_width;
        config.gitgraph.use_max_width = self.use_max_width;
        config.c4.use_max_width = self.use_max_width;
        config.pie.use_max_width = self.use_max_width;
        config
    }
}

/// Header keywords the engine can lay out, lowercased.
const DIAGRAM_KEYWORDS: [&str; 24] = [
    "flowchart",
    "graph",
    "sequencediagram",
    "classdiagram",
    "statediagram",
    "erdiagram",
    "pie",
    "mindmap",
    "journey",
    "timeline",
    "gantt",
    "requirementdiagram",
    "gitgraph",
    "c4",
    "sankey",
    "quadrantchart",
    "zenuml",
    "block",
    "packet",
    "kanban",
    "architecture",
    "radar",
    "treemap",
    "xychart",
];

/// Check that the first significant line names a diagram type.
///
/// Blank lines, `%%` comments and directives, and a `---` front matter block
/// are skipped. The engine itself falls back to a flowchart for unknown
/// headers, so free text would otherwise "render".
///
/// # Errors
///
/// Returns a [`RenderFailure`] when no known diagram keyword leads the source.
pub fn detect_diagram_type(source: &str) -> Result<&'static str, RenderFailure> {
    let mut in_front_matter = false;
    for line in source.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if line == "---" {
            in_front_matter = !in_front_matter;
            continue;
        }
        if in_front_matter || line.starts_with("%%") {
            continue;
        }
        let lower = line.to_ascii_lowercase();
        return DIAGRAM_KEYWORDS
            .into_iter()
            .find(|keyword| lower.starts_with(keyword))
            .ok_or_else(|| no_diagram_type(source));
    }
    Err(no_diagram_type(source))
}

fn no_diagram_type(source: &str) -> RenderFailure {
    RenderFailure::new(format!(
        "No diagram type detected matching given configuration for text: {}",
        source.trim()
    ))
}

/// A text -> SVG diagram backend with one active configuration.
pub trait DiagramEngine: Send {
    /// Replace the active palette and layout.
    fn configure(&mut self, palette: PaletteMode, layout: &LayoutOptions);

    /// Render `source` under the active configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderFailure`] describing why the source could not be
    /// rendered.
    fn render_to_markup(&mut self, render_id: RenderId, source: &str)
    -> Result<String, RenderFailure>;
}

/// [`DiagramEngine`] backed by `mermaid-rs-renderer`.
#[derive(Debug, Default)]
pub struct MermaidEngine {
    active: Option<(PaletteMode, LayoutOptions)>,
}

impl MermaidEngine {
    pub const fn new() -> Self {
        Self { active: None }
    }
}

impl DiagramEngine for MermaidEngine {
    fn configure(&mut self, palette: PaletteMode, layout: &LayoutOptions) {
        self.active = Some((palette, *layout));
    }

    fn render_to_markup(
        &mut self,
        render_id: RenderId,
        source: &str,
    ) -> Result<String, RenderFailure> {
        let (palette, layout) = self.active.unwrap_or_default();
        let kind = detect_diagram_type(source)?;
        tracing::trace!(%render_id, kind, "diagram type detected");
        let palette = Palette::for_mode(palette);
        let opts = mermaid_rs_renderer::RenderOptions {
            theme: palette.to_engine_theme(),
            layout: layout.to_engine_layout(palette.font_size_px()),
        };

        // The engine is third-party code; a panic inside it must surface as a
        // failed diagram, not take the host down.
        let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
            mermaid_rs_renderer::render_with_options(source, opts)
        }));
        let svg = match rendered {
            Ok(Ok(svg)) => svg,
            Ok(Err(err)) => return Err(RenderFailure::new(err.to_string())),
            Err(payload) => return Err(RenderFailure::new(panic_message(payload.as_ref()))),
        };
        if !svg.contains("<svg") {
            return Err(RenderFailure::new("renderer produced no SVG output"));
        }
        let svg = markup::repair_font_families(&svg);
        let svg = markup::pad_view_box(&svg, layout.diagram_padding);
        Ok(markup::set_root_attr(&svg, "id", &render_id.to_string()))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default()
}

/// Engine output for one successful attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub render_id: RenderId,
    pub palette: PaletteMode,
    /// Engine SVG with font attributes repaired and the render id applied.
    pub svg: String,
}

impl RenderedDiagram {
    /// Markup ready to be placed in a message, with the zoom transform.
    pub fn markup(&self, zoom: Zoom) -> String {
        markup::inline_markup(&self.svg, zoom)
    }
}

/// Serializes configure+render over a shared engine.
pub struct RenderAdapter<E = MermaidEngine> {
    engine: Arc<Mutex<E>>,
    layout: LayoutOptions,
}

impl<E> Clone for RenderAdapter<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            layout: self.layout,
        }
    }
}

impl<E> fmt::Debug for RenderAdapter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderAdapter")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

static SHARED_ADAPTER: Lazy<RenderAdapter<MermaidEngine>> =
    Lazy::new(|| RenderAdapter::new(MermaidEngine::new()));

impl RenderAdapter<MermaidEngine> {
    /// The process-wide adapter around the Mermaid engine.
    pub fn shared() -> Self {
        SHARED_ADAPTER.clone()
    }
}

impl<E: DiagramEngine> RenderAdapter<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            layout: LayoutOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    pub const fn layout(&self) -> &LayoutOptions {
        &self.layout
    }

    /// Configure the engine for `palette` and render `source`.
    ///
    /// Source is trimmed first. Callers are expected to skip blank sources;
    /// one that slips through is reported as a failure rather than sent to
    /// the engine.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`RenderFailure`].
    pub fn render(
        &self,
        render_id: RenderId,
        source: &str,
        palette: PaletteMode,
    ) -> Result<RenderedDiagram, RenderFailure> {
        let source = source.trim();
        if source.is_empty() {
            return Err(RenderFailure::new("diagram source is empty"));
        }
        let started = Instant::now();
        let result = {
            let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
            engine.configure(palette, &self.layout);
            engine.render_to_markup(render_id, source)
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match result {
            Ok(svg) => {
                tracing::debug!(%render_id, ?palette, bytes = svg.len(), elapsed_ms, "diagram rendered");
                crate::perf::log_event(
                    "mermaid.render.ok",
                    format!("id={render_id} palette={} bytes={} ms={elapsed_ms:.2}", palette.label(), svg.len()),
                );
                Ok(RenderedDiagram {
                    render_id,
                    palette,
                    svg,
                })
            }
            Err(failure) => {
                tracing::debug!(%render_id, ?palette, error = %failure, "diagram render failed");
                crate::perf::log_event(
                    "mermaid.render.error",
                    format!("id={render_id} err={failure}"),
                );
                Err(failure)
            }
        }
    }
}

static FONTDB: Lazy<Arc<fontdb::Database>> = Lazy::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), "loaded system fonts");
    Arc::new(db)
});

/// Rasterize a rendered diagram, filling the palette background first.
///
/// # Errors
///
/// Returns an error if the SVG cannot be parsed or rasterized.
pub fn render_to_image(diagram: &RenderedDiagram, target_width_px: u32) -> Result<DynamicImage> {
    let background = parse_hex_rgb(Palette::for_mode(diagram.palette).background);
    rasterize_svg(&diagram.svg, target_width_px, background)
}

/// Rasterize an SVG string to a `DynamicImage`.
///
/// Scales the SVG so its width matches `target_width_px`, preserving aspect
/// ratio, so the vector is rasterized directly at display resolution.
///
/// # Errors
///
/// Returns an error if the SVG cannot be parsed or the pixmap cannot be
/// allocated.
pub fn rasterize_svg(
    svg: &str,
    target_width_px: u32,
    background: Option<[u8; 3]>,
) -> Result<DynamicImage> {
    let opts = resvg::usvg::Options {
        fontdb: Arc::clone(&FONTDB),
        ..Default::default()
    };

    let tree = resvg::usvg::Tree::from_str(svg, &opts)?;
    let size = tree.size();
    if size.width() <= 0.0 || size.height() <= 0.0 {
        anyhow::bail!("diagram has an empty canvas");
    }

    #[allow(clippy::cast_precision_loss)]
    let scale = target_width_px.max(1) as f32 / size.width();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let width = (size.width() * scale).ceil() as u32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = (size.height() * scale).ceil() as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("failed to create pixmap {width}x{height}"))?;
    if let Some([r, g, b]) = background {
        pixmap.fill(resvg::tiny_skia::Color::from_rgba8(r, g, b, 255));
    }

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let rgba = pixmap.data().to_vec();
    let img_buf = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| anyhow::anyhow!("failed to create image from pixmap data"))?;

    Ok(DynamicImage::ImageRgba8(img_buf))
}

/// Parse `#rrggbb`.
pub fn parse_hex_rgb(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
