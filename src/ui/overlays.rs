use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::ui::html::LOADING_LABEL;
use crate::ui::style::Theme;

/// Centre the loading text over `area`.
pub fn render_loading_overlay(theme: &Theme, frame: &mut Frame, area: Rect) {
    let width = u16::try_from(LOADING_LABEL.width()).unwrap_or(u16::MAX);
    let rect = centered_popup_rect(width, 1, area);
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(LOADING_LABEL).style(theme.loading.patch(theme.pane)),
        rect,
    );
}

pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).clamp(20, 60);
    let popup_height = area.height.saturating_sub(4).clamp(8, 24);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::styled("Zoom", section_style));
    lines.push(Line::raw("  + / =               Zoom in"));
    lines.push(Line::raw("  -                   Zoom out"));
    lines.push(Line::raw("  0                   Reset to 100%"));
    lines.push(Line::raw("  Ctrl+wheel, click   Zoom controls"));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Diagram", section_style));
    lines.push(Line::raw("  t                   Toggle light/dark"));
    lines.push(Line::raw("  s / Enter           Show diagram code (on error)"));
    lines.push(Line::raw("  y                   Copy diagram code"));
    lines.push(Line::raw("  r / R               Reload file"));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Other", section_style));
    lines.push(Line::raw("  q / Esc / Ctrl-c    Quit"));
    lines.push(Line::raw("  ? / F1              Toggle help"));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!(
        "  Global: {}",
        crate::config::global_config_path().display()
    )));
    lines.push(Line::raw(format!(
        "  Local override: {}",
        crate::config::local_override_path().display()
    )));
    lines.push(Line::raw(""));
    lines.push(Line::styled("any key closes", dim_style));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub(super) fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
