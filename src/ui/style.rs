//! Colors for the diagram shell.
//!
//! One set of hex colors per palette mode drives both hosts: the HTML
//! fragment uses them verbatim, the terminal maps them to [`Style`]s
//! (indexed colors when truecolor is unavailable).

use ratatui::style::{Color, Modifier, Style};

use crate::theme::PaletteMode;

/// Shell colors around the diagram: container, loading text, error panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellColors {
    pub border: &'static str,
    pub background: &'static str,
    pub muted_text: &'static str,
    pub error_border: &'static str,
    pub error_background: &'static str,
    pub error_text: &'static str,
    pub code_background: &'static str,
}

const LIGHT_SHELL: ShellColors = ShellColors {
    border: "#e5e7eb",
    background: "#ffffff",
    muted_text: "#6b7280",
    error_border: "#fecaca",
    error_background: "#fef2f2",
    error_text: "#b91c1c",
    code_background: "#fee2e2",
};

const DARK_SHELL: ShellColors = ShellColors {
    border: "#374151",
    background: "#1f2937",
    muted_text: "#9ca3af",
    error_border: "#991b1b",
    error_background: "#2a1414",
    error_text: "#f87171",
    code_background: "#3b1a1a",
};

impl ShellColors {
    pub const fn for_mode(mode: PaletteMode) -> &'static Self {
        match mode {
            PaletteMode::Light => &LIGHT_SHELL,
            PaletteMode::Dark => &DARK_SHELL,
        }
    }
}

/// Terminal styles for the shell in one palette mode.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Container border
    pub border: Style,
    /// Container title
    pub title: Style,
    /// Diagram pane background
    pub pane: Style,
    /// Enabled control button
    pub button: Style,
    /// Disabled control button
    pub button_disabled: Style,
    /// Loading overlay text
    pub loading: Style,
    /// Error panel border
    pub error_border: Style,
    /// Error heading and message
    pub error_text: Style,
    /// Disclosure summary line
    pub disclosure: Style,
    /// Source listing inside the disclosure
    pub code: Style,
    /// Status bar background
    pub status_bg: Color,
    /// Status bar foreground
    pub status_fg: Color,
}

impl Theme {
    pub fn for_mode(mode: PaletteMode) -> Self {
        let shell = ShellColors::for_mode(mode);
        let truecolor = supports_truecolor();
        let color = |hex: &str| terminal_color(hex, truecolor);
        Self {
            border: Style::default().fg(color(shell.border)),
            title: Style::default()
                .fg(color(shell.muted_text))
                .add_modifier(Modifier::BOLD),
            pane: Style::default().bg(color(shell.background)),
            button: Style::default()
                .fg(color(crate::theme::Palette::for_mode(mode).primary_text_color))
                .bg(color(shell.border))
                .add_modifier(Modifier::BOLD),
            button_disabled: Style::default()
                .fg(color(shell.muted_text))
                .add_modifier(Modifier::DIM),
            loading: Style::default()
                .fg(color(shell.muted_text))
                .add_modifier(Modifier::ITALIC),
            error_border: Style::default().fg(color(shell.error_border)),
            error_text: Style::default().fg(color(shell.error_text)),
            disclosure: Style::default()
                .fg(color(shell.error_text))
                .add_modifier(Modifier::BOLD),
            code: Style::default()
                .fg(color(shell.error_text))
                .bg(color(shell.code_background)),
            status_bg: if mode.is_dark() {
                Color::Indexed(236)
            } else {
                Color::Indexed(252)
            },
            status_fg: if mode.is_dark() {
                Color::Indexed(252)
            } else {
                Color::Indexed(235)
            },
        }
    }
}

fn terminal_color(hex: &str, truecolor: bool) -> Color {
    let Some([r, g, b]) = crate::mermaid::parse_hex_rgb(hex) else {
        return Color::Reset;
    };
    if truecolor {
        Color::Rgb(r, g, b)
    } else {
        Color::Indexed(rgb_to_xterm_256(r, g, b))
    }
}

/// Whether terminal output should be treated as truecolor-capable.
pub fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("MERMAID_INLINE_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    if std::env::var("TERM_PROGRAM")
        .ok()
        .as_deref()
        .is_some_and(|v| v == "Apple_Terminal")
    {
        return false;
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if let Some(ct) = colorterm {
        let lower = ct.to_ascii_lowercase();
        if lower.contains("truecolor") || lower.contains("24bit") {
            return true;
        }
    }
    if let Some(t) = term {
        let lower = t.to_ascii_lowercase();
        if lower.contains("direct") || lower.contains("truecolor") {
            return true;
        }
    }
    false
}

pub(crate) fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Result is always 0-5, fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    let ri = to_cube(r);
    let gi = to_cube(g);
    let bi = to_cube(b);
    16 + (36 * ri) + (6 * gi) + bi
}
