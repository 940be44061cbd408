use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tempfile::tempdir;

use crate::mermaid::{DiagramEngine, LayoutOptions, RenderAdapter, RenderFailure, RenderId};
use crate::theme::PaletteMode;
use crate::zoom::Zoom;

use super::effects::{RenderWorker, render_blocking};
use super::model::{DiagramView, RenderStatus};
use super::{App, Message, Model, ToastLevel, update};

/// Engine double: echoes the source into a tiny SVG, fails on sources
/// containing `!!`, and can hold its first render until released.
#[derive(Default)]
struct FakeEngine {
    palette: Option<PaletteMode>,
    started: Option<Sender<String>>,
    gate: Option<Receiver<()>>,
}

impl DiagramEngine for FakeEngine {
    fn configure(&mut self, palette: PaletteMode, _layout: &LayoutOptions) {
        self.palette = Some(palette);
    }

    fn render_to_markup(
        &mut self,
        render_id: RenderId,
        source: &str,
    ) -> Result<String, RenderFailure> {
        if let Some(started) = &self.started {
            let _ = started.send(source.to_string());
        }
        if let Some(gate) = self.gate.take() {
            let _ = gate.recv_timeout(Duration::from_secs(5));
        }
        if source.contains("!!") {
            return Err(RenderFailure::new(format!("Parse error near `{source}`")));
        }
        let palette = self.palette.map_or("unset", PaletteMode::label);
        Ok(format!(
            r#"<svg id="{render_id}" data-palette="{palette}"><text>{source}</text></svg>"#
        ))
    }
}

fn fake_adapter() -> RenderAdapter<FakeEngine> {
    RenderAdapter::new(FakeEngine::default())
}

fn create_test_model(source: &str) -> Model {
    let view = DiagramView::new(source, PaletteMode::Light);
    Model::new(PathBuf::from("diagram.mmd"), view, (80, 24))
}

fn settle(model: &mut Model, adapter: &RenderAdapter<FakeEngine>) {
    render_blocking(&mut model.view, adapter);
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn test_new_view_queues_render_for_content() {
    let mut view = DiagramView::new("graph TD; A-->B", PaletteMode::Light);
    assert!(view.is_rendering());
    assert!(view.shows_loading());
    let request = view.take_render_request().unwrap();
    assert_eq!(request.source, "graph TD; A-->B");
    assert_eq!(request.palette, PaletteMode::Light);
    assert!(view.take_render_request().is_none());
}

#[test]
fn test_blank_content_stays_idle_without_request() {
    let mut view = DiagramView::new("  \n\t ", PaletteMode::Dark);
    assert_eq!(view.status(), &RenderStatus::Idle);
    assert!(view.take_render_request().is_none());
    let state = view.view_state();
    assert!(!state.rendered);
    assert_eq!(state.error_message, None);
    assert!(view.shows_loading());
    assert_eq!(view.markup(), "");
}

#[test]
fn test_successful_render_exposes_markup() {
    let mut model = create_test_model("graph TD; A-->B");
    settle(&mut model, &fake_adapter());
    let state = model.view.view_state();
    assert!(state.rendered);
    assert_eq!(state.error_message, None);
    assert!((state.scale - 1.0).abs() < f32::EPSILON);
    assert!(!model.view.shows_loading());
    let markup = model.view.markup();
    assert!(markup.contains("A-->B"));
    assert!(markup.contains("max-width: 100%"));
}

#[test]
fn test_failed_render_exposes_message_and_clears_rendered() {
    let mut model = create_test_model("not a valid diagram !!");
    settle(&mut model, &fake_adapter());
    let state = model.view.view_state();
    assert!(!state.rendered);
    assert_eq!(
        state.error_message.as_deref(),
        Some("Parse error near `not a valid diagram !!`")
    );
    assert!(!model.view.shows_loading());
    assert_eq!(model.view.markup(), "");
}

#[test]
fn test_error_then_fix_recovers() {
    let adapter = fake_adapter();
    let mut model = create_test_model("broken !!");
    settle(&mut model, &adapter);
    assert!(model.view.error_message().is_some());

    let mut model = update(model, Message::ContentChanged("graph TD; A-->B".into()));
    assert!(model.view.is_rendering());
    assert!(model.view.shows_loading());
    settle(&mut model, &adapter);
    assert!(model.view.is_rendered());
    assert_eq!(model.view.error_message(), None);
}

#[test]
fn test_superseded_result_is_dropped() {
    let adapter = fake_adapter();
    let mut view = DiagramView::new("graph TD; A-->B", PaletteMode::Light);
    let first = view.take_render_request().unwrap();

    assert!(view.set_source("graph TD; C-->D"));
    let second = view.take_render_request().unwrap();
    assert_ne!(first.attempt, second.attempt);

    let second_outcome = adapter.render(second.render_id, &second.source, second.palette);
    assert!(view.finish_attempt(second.attempt, second_outcome));

    let first_outcome = adapter.render(first.render_id, &first.source, first.palette);
    assert!(!view.finish_attempt(first.attempt, first_outcome));

    assert!(view.markup().contains("C-->D"));
    assert!(!view.markup().contains("A-->B"));
}

#[test]
fn test_result_arriving_after_content_cleared_is_dropped() {
    let adapter = fake_adapter();
    let mut view = DiagramView::new("graph TD; A-->B", PaletteMode::Light);
    let request = view.take_render_request().unwrap();
    assert!(view.set_source(""));
    assert_eq!(view.status(), &RenderStatus::Idle);

    let outcome = adapter.render(request.render_id, &request.source, request.palette);
    assert!(!view.finish_attempt(request.attempt, outcome));
    assert_eq!(view.status(), &RenderStatus::Idle);
}

#[test]
fn test_same_content_does_not_rerender() {
    let mut model = create_test_model("graph TD; A-->B");
    settle(&mut model, &fake_adapter());
    let model = update(model, Message::ContentChanged("graph TD; A-->B".into()));
    assert!(model.view.is_rendered());
    let mut model = model;
    assert!(model.view.take_render_request().is_none());
}

#[test]
fn test_toggle_theme_rerenders_in_new_palette() {
    let adapter = fake_adapter();
    let mut model = create_test_model("graph TD; A-->B");
    settle(&mut model, &adapter);
    assert!(model.view.markup().contains(r#"data-palette="light""#));

    let mut model = update(model, Message::ToggleTheme);
    assert_eq!(model.view.palette(), PaletteMode::Dark);
    assert!(model.view.is_rendering());
    settle(&mut model, &adapter);
    assert!(model.view.markup().contains(r#"data-palette="dark""#));
}

#[test]
fn test_theme_changed_to_same_palette_is_noop() {
    let mut model = create_test_model("graph TD; A-->B");
    settle(&mut model, &fake_adapter());
    let mut model = update(model, Message::ThemeChanged(PaletteMode::Light));
    assert!(model.view.is_rendered());
    assert!(model.view.take_render_request().is_none());
}

#[test]
fn test_zoom_changes_do_not_rerender() {
    let mut model = create_test_model("graph TD; A-->B");
    settle(&mut model, &fake_adapter());
    let id_before = model.view.diagram().unwrap().render_id;

    let mut model = update(model, Message::ZoomIn);
    assert!(model.view.take_render_request().is_none());
    assert_eq!(model.view.diagram().unwrap().render_id, id_before);
    assert!(model.view.markup().contains("transform: scale(1.2)"));
    assert!((model.view.view_state().scale - 1.2).abs() < 1e-6);
}

#[test]
fn test_zoom_clamps_and_resets() {
    let mut model = create_test_model("graph TD; A-->B");
    for _ in 0..10 {
        model = update(model, Message::ZoomOut);
    }
    assert_eq!(model.view.zoom(), Zoom::MIN);
    for _ in 0..20 {
        model = update(model, Message::ZoomIn);
    }
    assert_eq!(model.view.zoom(), Zoom::MAX);
    let model = update(model, Message::ResetZoom);
    assert!(model.view.zoom().is_default());
}

#[test]
fn test_zoom_keys_respect_limits() {
    let mut model = create_test_model("graph TD; A-->B");
    model.view = model.view.clone().with_zoom(Zoom::MAX);
    assert_eq!(App::handle_key(key(KeyCode::Char('+')), &model), None);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('-')), &model),
        Some(Message::ZoomOut)
    );
    model.view = model.view.clone().with_zoom(Zoom::MIN);
    assert_eq!(App::handle_key(key(KeyCode::Char('-')), &model), None);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('0')), &model),
        Some(Message::ResetZoom)
    );
}

#[test]
fn test_source_toggle_only_in_error_state() {
    let adapter = fake_adapter();
    let mut model = create_test_model("graph TD; A-->B");
    settle(&mut model, &adapter);
    assert_eq!(App::handle_key(key(KeyCode::Char('s')), &model), None);
    let model = update(model, Message::ToggleSource);
    assert!(!model.source_visible);

    let mut model = update(model, Message::ContentChanged("oops !!".into()));
    settle(&mut model, &adapter);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('s')), &model),
        Some(Message::ToggleSource)
    );
    let model = update(model, Message::ToggleSource);
    assert!(model.source_visible);
}

#[test]
fn test_zoom_is_ignored_while_error_panel_is_shown() {
    let adapter = fake_adapter();
    let mut model = create_test_model("oops !!");
    settle(&mut model, &adapter);
    assert!(model.view.error_message().is_some());

    for code in ['+', '-', '0'] {
        assert_eq!(App::handle_key(key(KeyCode::Char(code)), &model), None);
    }
    let scroll = MouseEvent {
        kind: MouseEventKind::ScrollUp,
        column: 10,
        row: 10,
        modifiers: KeyModifiers::CONTROL,
    };
    assert_eq!(App::handle_mouse(scroll, &model), None);
    let area = ratatui::layout::Rect::new(0, 0, 80, 24);
    let healthy = create_test_model("graph TD; A-->B");
    let hidden_zoom_in = crate::ui::shell_layout(area, &healthy).controls[1];
    assert_eq!(
        crate::ui::hit_test(&model, hidden_zoom_in.x + 1, hidden_zoom_in.y),
        None
    );

    let model = update(model, Message::ZoomIn);
    let model = update(model, Message::ZoomOut);
    let model = update(model, Message::ZoomOut);
    assert!(model.view.zoom().is_default());
}

#[test]
fn test_help_swallows_next_key() {
    let model = update(create_test_model("graph TD; A-->B"), Message::ToggleHelp);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('q')), &model),
        Some(Message::HideHelp)
    );
    let model = update(model, Message::HideHelp);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('q')), &model),
        Some(Message::Quit)
    );
}

#[test]
fn test_ctrl_scroll_zooms() {
    let model = create_test_model("graph TD; A-->B");
    let scroll = MouseEvent {
        kind: MouseEventKind::ScrollUp,
        column: 10,
        row: 10,
        modifiers: KeyModifiers::CONTROL,
    };
    assert_eq!(App::handle_mouse(scroll, &model), Some(Message::ZoomIn));
    let plain = MouseEvent {
        modifiers: KeyModifiers::NONE,
        ..scroll
    };
    assert_eq!(App::handle_mouse(plain, &model), None);
}

#[test]
fn test_click_on_zoom_in_button() {
    let mut model = create_test_model("graph TD; A-->B");
    settle(&mut model, &fake_adapter());
    let area = ratatui::layout::Rect::new(0, 0, model.terminal_size.0, model.terminal_size.1);
    let layout = crate::ui::shell_layout(area, &model);
    let zoom_in = layout.controls[1];
    let click = MouseEvent {
        kind: MouseEventKind::Up(MouseButton::Left),
        column: zoom_in.x,
        row: zoom_in.y,
        modifiers: KeyModifiers::NONE,
    };
    assert_eq!(App::handle_mouse(click, &model), Some(Message::ZoomIn));
}

#[test]
fn test_reload_from_disk_picks_up_new_source() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("diagram.mmd");
    std::fs::write(&path, "graph TD; A-->B").unwrap();

    let view = DiagramView::new("graph TD; A-->B", PaletteMode::Light);
    let mut model = Model::new(path.clone(), view, (80, 24));
    settle(&mut model, &fake_adapter());

    std::fs::write(&path, "graph TD; X-->Y").unwrap();
    App::handle_message_side_effects(&mut model, &Message::ForceReload);
    assert_eq!(model.view.source(), "graph TD; X-->Y");
    assert!(model.view.is_rendering());
    assert_eq!(
        model.active_toast().map(|(_, level)| level),
        Some(ToastLevel::Info)
    );
}

#[test]
fn test_reload_failure_shows_error_toast() {
    let dir = tempdir().unwrap();
    let view = DiagramView::new("graph TD; A-->B", PaletteMode::Light);
    let mut model = Model::new(dir.path().join("missing.mmd"), view, (80, 24));
    App::handle_message_side_effects(&mut model, &Message::FileChanged);
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("Reload failed"));
    assert_eq!(model.view.source(), "graph TD; A-->B");
}

#[test]
fn test_worker_collapses_queued_requests_to_newest() {
    let (started_tx, started_rx) = mpsc::channel();
    let (gate_tx, gate_rx) = mpsc::channel();
    let engine = FakeEngine {
        started: Some(started_tx),
        gate: Some(gate_rx),
        ..FakeEngine::default()
    };
    let worker = RenderWorker::spawn(RenderAdapter::new(engine)).unwrap();

    let mut model = create_test_model("graph TD; A-->B");
    worker.submit(model.view.take_render_request().unwrap());
    assert_eq!(
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        "graph TD; A-->B"
    );

    model = update(model, Message::ContentChanged("graph TD; B-->C".into()));
    worker.submit(model.view.take_render_request().unwrap());
    model = update(model, Message::ContentChanged("graph TD; C-->D".into()));
    worker.submit(model.view.take_render_request().unwrap());
    gate_tx.send(()).unwrap();

    let first = worker.recv_timeout(Duration::from_secs(5)).unwrap();
    model = update(model, first);
    assert!(model.view.is_rendering(), "stale result must not land");

    let second = worker.recv_timeout(Duration::from_secs(5)).unwrap();
    model = update(model, second);
    assert!(model.view.is_rendered());
    assert!(model.view.markup().contains("C-->D"));

    let rendered: Vec<String> = started_rx.try_iter().collect();
    assert_eq!(rendered, vec!["graph TD; C-->D".to_string()]);
}

#[test]
fn test_quit_sets_flag() {
    let model = update(create_test_model("graph TD; A-->B"), Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_toast_expires() {
    let mut model = create_test_model("graph TD; A-->B");
    model.show_toast(ToastLevel::Info, "hello");
    assert!(!model.expire_toast(std::time::Instant::now()));
    assert!(model.expire_toast(std::time::Instant::now() + Duration::from_secs(5)));
    assert!(model.active_toast().is_none());
}
