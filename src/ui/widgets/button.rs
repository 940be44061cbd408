//! Icon buttons for the zoom controls.
//!
//! A [`Button`] renders to either host: [`Button::to_html`] for the HTML
//! fragment and [`Button::span`] for the terminal. Its [`ZoomAction`] maps to
//! the [`Message`] a click produces.

use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::UnicodeWidthStr;

use crate::app::Message;
use crate::zoom::Zoom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonSize {
    #[default]
    Sm,
    Md,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVariant {
    #[default]
    Ghost,
    Outline,
}

impl ButtonVariant {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ghost => "ghost",
            Self::Outline => "outline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomAction {
    ZoomOut,
    ZoomIn,
    Reset,
}

impl ZoomAction {
    pub const ALL: [Self; 3] = [Self::ZoomOut, Self::ZoomIn, Self::Reset];

    pub const fn message(self) -> Message {
        match self {
            Self::ZoomOut => Message::ZoomOut,
            Self::ZoomIn => Message::ZoomIn,
            Self::Reset => Message::ResetZoom,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ZoomOut => "Zoom out",
            Self::ZoomIn => "Zoom in",
            Self::Reset => "Reset zoom",
        }
    }

    const fn slug(self) -> &'static str {
        match self {
            Self::ZoomOut => "zoom-out",
            Self::ZoomIn => "zoom-in",
            Self::Reset => "reset-zoom",
        }
    }

    pub const fn glyph(self) -> Glyph {
        match self {
            Self::ZoomOut => Glyph::Minus,
            Self::ZoomIn => Glyph::Plus,
            Self::Reset => Glyph::Reset,
        }
    }

    /// Whether this action is unavailable at `zoom`.
    pub const fn disabled_at(self, zoom: Zoom) -> bool {
        match self {
            Self::ZoomOut => !zoom.can_zoom_out(),
            Self::ZoomIn => !zoom.can_zoom_in(),
            Self::Reset => zoom.is_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Minus,
    Plus,
    Reset,
}

impl Glyph {
    const fn text(self) -> &'static str {
        match self {
            Self::Minus => "-",
            Self::Plus => "+",
            Self::Reset => "↺",
        }
    }

    const fn svg_body(self) -> &'static str {
        match self {
            Self::Minus => {
                r#"<circle cx="11" cy="11" r="8"/><line x1="21" x2="16.65" y1="21" y2="16.65"/><line x1="8" x2="14" y1="11" y2="11"/>"#
            }
            Self::Plus => {
                r#"<circle cx="11" cy="11" r="8"/><line x1="21" x2="16.65" y1="21" y2="16.65"/><line x1="11" x2="11" y1="8" y2="14"/><line x1="8" x2="14" y1="11" y2="11"/>"#
            }
            Self::Reset => {
                r#"<path d="M3 12a9 9 0 1 0 9-9 9.75 9.75 0 0 0-6.74 2.74L3 8"/><path d="M3 3v5h5"/>"#
            }
        }
    }

    fn svg(self, size_px: u8) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size_px}" height="{size_px}" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" aria-hidden="true">{}</svg>"#,
            self.svg_body()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub size: ButtonSize,
    pub variant: ButtonVariant,
    pub disabled: bool,
    pub action: ZoomAction,
    pub class_name: Option<String>,
    pub glyph: Glyph,
}

impl Button {
    pub const fn new(action: ZoomAction) -> Self {
        Self {
            size: ButtonSize::Sm,
            variant: ButtonVariant::Ghost,
            disabled: false,
            action,
            class_name: None,
            glyph: action.glyph(),
        }
    }

    #[must_use]
    pub const fn size(mut self, size: ButtonSize) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub const fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub const fn glyph(mut self, glyph: Glyph) -> Self {
        self.glyph = glyph;
        self
    }

    /// Message a click produces, or `None` while disabled.
    pub const fn on_click(&self) -> Option<Message> {
        if self.disabled {
            None
        } else {
            Some(self.action.message())
        }
    }

    pub fn to_html(&self) -> String {
        let (padding, icon_px) = match self.size {
            ButtonSize::Sm => ("0.25rem", 16),
            ButtonSize::Md => ("0.5rem", 20),
        };
        let border = match self.variant {
            ButtonVariant::Ghost => "border: none; background: transparent;",
            ButtonVariant::Outline => "border: 1px solid currentColor; background: transparent;",
        };
        let (cursor, opacity) = if self.disabled {
            ("not-allowed", "0.5")
        } else {
            ("pointer", "1")
        };
        let mut class = format!(
            "mermaid-inline__button mermaid-inline__button--{}",
            self.variant.as_str()
        );
        if let Some(extra) = self.class_name.as_deref().filter(|c| !c.trim().is_empty()) {
            class.push(' ');
            class.push_str(extra.trim());
        }
        let label = self.action.label();
        format!(
            r#"<button type="button" class="{class}" data-action="{action}" aria-label="{label}" title="{label}"{disabled} style="display: inline-flex; align-items: center; justify-content: center; padding: {padding}; border-radius: 0.375rem; {border} color: inherit; cursor: {cursor}; opacity: {opacity};">{icon}</button>"#,
            class = htmlize::escape_attribute(class),
            action = self.action.slug(),
            disabled = if self.disabled { " disabled" } else { "" },
            icon = self.glyph.svg(icon_px),
        )
    }

    /// Terminal text, e.g. `[ + ]`.
    pub fn text(&self) -> String {
        let pad = match self.size {
            ButtonSize::Sm => " ",
            ButtonSize::Md => "  ",
        };
        match self.variant {
            ButtonVariant::Ghost => format!("{pad}{}{pad}", self.glyph.text()),
            ButtonVariant::Outline => format!("[{pad}{}{pad}]", self.glyph.text()),
        }
    }

    /// Display width of [`Button::text`] in terminal columns.
    pub fn width(&self) -> u16 {
        u16::try_from(self.text().width()).unwrap_or(u16::MAX)
    }

    pub fn span(&self, enabled: Style, disabled: Style) -> Span<'static> {
        let style = if self.disabled { disabled } else { enabled };
        Span::styled(self.text(), style)
    }
}
