//! End-to-end behaviour of a mounted view against the shared engine.

use mermaid_inline::app::{DiagramView, RenderStatus, render_blocking};
use mermaid_inline::mermaid::{RenderAdapter, RenderId};
use mermaid_inline::theme::PaletteMode;
use mermaid_inline::ui::html::{ERROR_HEADING, LOADING_LABEL, SHOW_SOURCE_LABEL};
use mermaid_inline::ui::{render_html, render_once};
use mermaid_inline::zoom::Zoom;

#[test]
fn test_same_source_and_palette_render_identically_apart_from_id() {
    let adapter = RenderAdapter::shared();
    let source = "graph TD; A-->B";
    let first = adapter
        .render(RenderId::from_raw(9001), source, PaletteMode::Light)
        .unwrap();
    let second = adapter
        .render(RenderId::from_raw(9002), source, PaletteMode::Light)
        .unwrap();
    assert_ne!(first.svg, second.svg);
    assert_eq!(
        first.svg.replace("mermaid-9001", "ID"),
        second.svg.replace("mermaid-9002", "ID")
    );
}

#[test]
fn test_flowchart_renders_markup_naming_both_nodes() {
    let mut view = DiagramView::new("graph TD; A-->B", PaletteMode::Light);
    render_blocking(&mut view, &RenderAdapter::shared());

    let state = view.view_state();
    assert!(state.rendered, "unexpected state: {:?}", view.status());
    assert_eq!(state.error_message, None);
    let markup = view.markup();
    assert!(markup.contains("<svg"));
    assert!(markup.contains(">A<"), "node A missing");
    assert!(markup.contains(">B<"), "node B missing");

    let html = render_html(&view);
    assert!(!html.contains(LOADING_LABEL));
    assert!(!html.contains(ERROR_HEADING));
}

#[test]
fn test_invalid_source_shows_error_panel_with_literal_source() {
    let mut view = DiagramView::new("not a valid diagram !!", PaletteMode::Light);
    render_blocking(&mut view, &RenderAdapter::shared());

    let state = view.view_state();
    assert!(!state.rendered);
    let message = state.error_message.unwrap();
    assert!(message.starts_with("No diagram type detected"), "{message}");
    assert!(view.markup().is_empty());

    let html = render_html(&view);
    assert!(html.contains(ERROR_HEADING));
    assert!(html.contains(SHOW_SOURCE_LABEL));
    assert!(html.contains("not a valid diagram !!"));
}

#[test]
fn test_theme_toggle_rerenders_with_different_colours() {
    let adapter = RenderAdapter::shared();
    let mut view = DiagramView::new("graph TD; A-->B", PaletteMode::Light);
    render_blocking(&mut view, &adapter);
    let light = view.diagram().unwrap().svg.clone();

    assert!(view.set_palette(PaletteMode::Dark));
    assert!(matches!(view.status(), RenderStatus::Rendering { .. }));
    render_blocking(&mut view, &adapter);

    let dark = view.diagram().unwrap();
    assert_eq!(dark.palette, PaletteMode::Dark);
    assert_ne!(light, dark.svg);
}

#[test]
fn test_zoom_keeps_the_rendered_diagram() {
    let adapter = RenderAdapter::shared();
    let mut view = DiagramView::new("graph LR; start-->stop", PaletteMode::Dark);
    render_blocking(&mut view, &adapter);
    let rendered_id = view.diagram().unwrap().render_id;

    view.zoom_in();
    view.zoom_in();
    assert!(view.take_render_request().is_none());
    assert_eq!(view.diagram().unwrap().render_id, rendered_id);
    assert_eq!(view.zoom().percent(), 140);
    assert!(view.markup().contains("scale(1.4)"));
}

#[test]
fn test_blank_source_stays_idle_with_overlay() {
    let html = render_once("   \n ", PaletteMode::Light, Zoom::default(), None);
    assert!(html.contains(LOADING_LABEL));
    assert!(!html.contains(ERROR_HEADING));
    assert!(!html.contains("<svg id="));
}

#[test]
fn test_render_once_applies_class_and_scale() {
    let html = render_once(
        "sequenceDiagram\n  Alice->>Bob: hi",
        PaletteMode::Dark,
        Zoom::MIN,
        Some("chat-diagram"),
    );
    assert!(html.starts_with(r#"<div class="mermaid-inline chat-diagram""#));
    assert!(html.contains(r#"data-scale="0.4""#));
}
