use ratatui::layout::Position;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{Message, Model};
use crate::ui::html::{ERROR_HEADING, SHOW_SOURCE_LABEL};
use crate::ui::style::Theme;
use crate::ui::widgets::{Button, ButtonVariant, zoom_controls};
use crate::zoom::Zoom;

use super::{images, overlays, status};

/// Gap between control buttons, in columns.
const CONTROL_GAP: u16 = 1;

/// Screen regions of the diagram shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellLayout {
    /// Bordered container (or error panel)
    pub container: Rect,
    /// Zoom out, zoom in, reset; empty rects in the error state
    pub controls: [Rect; 3],
    /// Inside of the container
    pub body: Rect,
    /// Clickable "Show diagram code" row in the error state
    pub disclosure: Option<Rect>,
    pub toast: Option<Rect>,
    pub status: Rect,
}

/// Controls as drawn in the terminal.
pub fn terminal_controls(zoom: Zoom) -> [Button; 3] {
    zoom_controls(zoom).map(|button| button.variant(ButtonVariant::Outline))
}

/// Width available to the diagram for a terminal `total_width` wide.
pub const fn diagram_pane_width(total_width: u16) -> u16 {
    let inner = total_width.saturating_sub(2);
    if inner == 0 { 1 } else { inner }
}

pub fn shell_layout(area: Rect, model: &Model) -> ShellLayout {
    let toast_active = model.active_toast().is_some();
    let footer_rows = 1 + u16::from(toast_active);
    let container = Rect {
        height: area.height.saturating_sub(footer_rows),
        ..area
    };
    let status = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1.min(area.height),
        ..area
    };
    let toast = toast_active.then(|| Rect {
        y: area.y + area.height.saturating_sub(2),
        height: 1.min(area.height),
        ..area
    });
    let body = Rect {
        x: container.x + 1,
        y: container.y + 1,
        width: container.width.saturating_sub(2),
        height: container.height.saturating_sub(2),
    };

    let mut controls = [Rect::default(); 3];
    let mut disclosure = None;
    if let Some(message) = model.view.error_message() {
        let message_rows = u16::try_from(message.lines().count().max(1)).unwrap_or(u16::MAX);
        // heading, message, blank line, then the summary row
        let row = body.y.saturating_add(1).saturating_add(message_rows).saturating_add(1);
        if row < body.bottom() {
            disclosure = Some(Rect::new(body.x, row, body.width, 1));
        }
    } else if container.height > 0 {
        // Buttons sit right-aligned on the top border row.
        let mut right = container.right().saturating_sub(2);
        let buttons = terminal_controls(model.view.zoom());
        for (slot, button) in controls.iter_mut().zip(buttons.iter()).rev() {
            let width = button.width();
            let x = right.saturating_sub(width);
            if x <= container.x {
                break;
            }
            *slot = Rect::new(x, container.y, width, 1);
            right = x.saturating_sub(CONTROL_GAP);
        }
    }

    ShellLayout {
        container,
        controls,
        body,
        disclosure,
        toast,
        status,
    }
}

/// Map a click at (`column`, `row`) to the message it triggers.
pub fn hit_test(model: &Model, column: u16, row: u16) -> Option<Message> {
    let area = Rect::new(0, 0, model.terminal_size.0, model.terminal_size.1);
    let layout = shell_layout(area, model);
    let pos = Position::new(column, row);
    if layout.disclosure.is_some_and(|rect| rect.contains(pos)) {
        return Some(Message::ToggleSource);
    }
    if model.view.error_message().is_some() {
        return None;
    }
    let buttons = terminal_controls(model.view.zoom());
    buttons
        .iter()
        .zip(layout.controls)
        .find(|(_, rect)| rect.contains(pos))
        .and_then(|(button, _)| button.on_click())
}

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let theme = Theme::for_mode(model.view.palette());
    let layout = shell_layout(area, model);

    if model.view.error_message().is_some() {
        render_error_panel(model, &theme, frame, &layout);
    } else {
        render_container(model, &theme, frame, &layout);
    }

    if let Some(toast_area) = layout.toast {
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, &theme, frame, layout.status);

    if model.help_visible {
        overlays::render_help_overlay(frame, area);
    }
}

fn render_container(model: &mut Model, theme: &Theme, frame: &mut Frame, layout: &ShellLayout) {
    let block = Block::default()
        .title(" Mermaid diagram ")
        .title_style(theme.title)
        .borders(Borders::ALL)
        .border_style(theme.border)
        .style(theme.pane);
    frame.render_widget(block, layout.container);

    let buttons = terminal_controls(model.view.zoom());
    for (button, rect) in buttons.iter().zip(layout.controls) {
        if rect.width == 0 {
            continue;
        }
        let span = button.span(theme.button, theme.button_disabled);
        frame.render_widget(Paragraph::new(Line::from(span)), rect);
    }

    if model.view.is_rendered() {
        if !images::render_diagram_image(model, frame, layout.body) {
            let note = Paragraph::new("Diagram rendered; terminal graphics unavailable.")
                .style(theme.loading)
                .alignment(Alignment::Center);
            frame.render_widget(note, layout.body);
        }
    } else if model.view.shows_loading() {
        overlays::render_loading_overlay(theme, frame, layout.body);
    }
}

fn render_error_panel(model: &Model, theme: &Theme, frame: &mut Frame, layout: &ShellLayout) {
    let message = model.view.error_message().unwrap_or_default();
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::styled(
        ERROR_HEADING,
        theme.error_text.add_modifier(Modifier::BOLD),
    ));
    for line in message.lines() {
        lines.push(Line::styled(line.to_string(), theme.error_text));
    }
    if message.is_empty() {
        lines.push(Line::raw(""));
    }
    lines.push(Line::raw(""));
    let marker = if model.source_visible { "▾" } else { "▸" };
    lines.push(Line::styled(
        format!("{marker} {SHOW_SOURCE_LABEL}"),
        theme.disclosure,
    ));
    if model.source_visible {
        lines.push(Line::raw(""));
        for line in model.view.source().lines() {
            lines.push(Line::styled(line.to_string(), theme.code));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.error_border)
        .style(theme.pane);
    frame.render_widget(Paragraph::new(lines).block(block), layout.container);
}
