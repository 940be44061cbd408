use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, RenderStatus, ToastLevel};
use crate::ui::style::Theme;

pub fn render_status_bar(model: &Model, theme: &Theme, frame: &mut Frame, area: Rect) {
    let filename = model.file_path.file_name().map_or_else(
        || "untitled".to_string(),
        |s| s.to_string_lossy().to_string(),
    );

    let state = match model.view.status() {
        RenderStatus::Idle => "empty",
        RenderStatus::Rendering { .. } => "rendering",
        RenderStatus::Rendered { .. } => "ok",
        RenderStatus::Errored { .. } => "error",
    };
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };

    let status = format!(
        " {filename}  [{state}]  [{}]  [{}]{watch_indicator}  ?:help",
        model.view.palette().label(),
        model.view.zoom(),
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(theme.status_bg).fg(theme.status_fg));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
