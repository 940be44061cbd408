//! HTML fragment for a chat message.
//!
//! Two shapes: the error panel (heading, message, collapsible source) when the
//! last attempt failed, otherwise the container with zoom controls, the
//! diagram and the loading overlay.

use std::fmt::Write as _;

use htmlize::{escape_attribute, escape_text};

use crate::app::{DiagramView, render_blocking};
use crate::mermaid::RenderAdapter;
use crate::theme::PaletteMode;
use crate::ui::style::ShellColors;
use crate::ui::widgets::zoom_controls;
use crate::zoom::Zoom;

pub const ERROR_HEADING: &str = "Mermaid Diagram Error:";
pub const SHOW_SOURCE_LABEL: &str = "Show diagram code";
pub const LOADING_LABEL: &str = "Rendering diagram...";

/// Render the view as an HTML fragment.
pub fn render_html(view: &DiagramView) -> String {
    let shell = ShellColors::for_mode(view.palette());
    match view.error_message() {
        Some(message) => error_panel(view, shell, message),
        None => container(view, shell),
    }
}

/// Mount a view for `content`, render it with the shared engine and return
/// the settled fragment.
pub fn render_once(
    content: &str,
    palette: PaletteMode,
    zoom: Zoom,
    class_name: Option<&str>,
) -> String {
    let mut view = DiagramView::new(content, palette).with_zoom(zoom);
    if let Some(class_name) = class_name {
        view = view.with_class_name(class_name);
    }
    render_blocking(&mut view, &RenderAdapter::shared());
    render_html(&view)
}

fn class_attr(base: &str, view: &DiagramView) -> String {
    match view.class_name().map(str::trim).filter(|c| !c.is_empty()) {
        Some(extra) => escape_attribute(format!("{base} {extra}")).into_owned(),
        None => base.to_string(),
    }
}

fn error_panel(view: &DiagramView, shell: &ShellColors, message: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="{class}" role="alert" style="border-radius: 0.5rem; border: 1px solid {border}; background: {bg}; padding: 1rem; font-size: 0.875rem; color: {text};">"#,
        class = class_attr("mermaid-inline mermaid-inline--error", view),
        border = shell.error_border,
        bg = shell.error_background,
        text = shell.error_text,
    );
    let _ = write!(
        html,
        r#"<div style="font-weight: 500;">{ERROR_HEADING}</div><div style="margin-top: 0.25rem;">{}</div>"#,
        escape_text(message)
    );
    let _ = write!(
        html,
        r#"<details style="margin-top: 0.5rem;"><summary style="cursor: pointer; font-weight: 500;">{SHOW_SOURCE_LABEL}</summary><pre style="margin-top: 0.5rem; overflow-x: auto; border-radius: 0.25rem; background: {code_bg}; padding: 0.5rem; font-size: 0.75rem; white-space: pre;">{}</pre></details>"#,
        escape_text(view.source()),
        code_bg = shell.code_background,
    );
    html.push_str("</div>");
    html
}

fn container(view: &DiagramView, shell: &ShellColors) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="{class}" data-scale="{scale}" style="position: relative; border-radius: 0.5rem; border: 1px solid {border}; background: {bg}; padding: 1rem;">"#,
        class = class_attr("mermaid-inline", view),
        scale = view.zoom().css_value(),
        border = shell.border,
        bg = shell.background,
    );

    html.push_str(
        r#"<div class="mermaid-inline__controls" style="position: absolute; right: 0.5rem; top: 0.5rem; z-index: 10; display: flex; gap: 0.25rem;">"#,
    );
    for button in zoom_controls(view.zoom()) {
        html.push_str(&button.to_html());
    }
    html.push_str("</div>");

    let _ = write!(
        html,
        r#"<div class="mermaid-inline__diagram" style="display: flex; min-height: 100px; align-items: center; justify-content: center; overflow: auto; transition: transform 0.2s ease-in-out;">{}</div>"#,
        view.markup()
    );

    if view.shows_loading() {
        let _ = write!(
            html,
            r#"<div class="mermaid-inline__loading" style="position: absolute; inset: 0; display: flex; align-items: center; justify-content: center;"><div style="font-size: 0.875rem; color: {muted};">{LOADING_LABEL}</div></div>"#,
            muted = shell.muted_text,
        );
    }
    html.push_str("</div>");
    html
}
