use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, Message, Model};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return match mouse.kind {
                MouseEventKind::Up(MouseButton::Left) => Some(Message::HideHelp),
                _ => None,
            };
        }
        let zoom = model.view.zoom();
        let zoomable = model.view.error_message().is_none()
            && mouse.modifiers.contains(KeyModifiers::CONTROL);
        match mouse.kind {
            MouseEventKind::Up(MouseButton::Left) => {
                crate::ui::hit_test(model, mouse.column, mouse.row)
            }
            MouseEventKind::ScrollUp if zoomable && zoom.can_zoom_in() => Some(Message::ZoomIn),
            MouseEventKind::ScrollDown if zoomable && zoom.can_zoom_out() => {
                Some(Message::ZoomOut)
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return Some(Message::HideHelp);
        }

        let zoom = model.view.zoom();
        let errored = model.view.error_message().is_some();
        match key.code {
            // Zoom
            KeyCode::Char('+' | '=' | '-' | '_' | '0') if errored => None,
            KeyCode::Char('+' | '=') => zoom.can_zoom_in().then_some(Message::ZoomIn),
            KeyCode::Char('-' | '_') => zoom.can_zoom_out().then_some(Message::ZoomOut),
            KeyCode::Char('0') => (!zoom.is_default()).then_some(Message::ResetZoom),

            // Diagram
            KeyCode::Char('t') => Some(Message::ToggleTheme),
            KeyCode::Char('s') | KeyCode::Enter if errored => Some(Message::ToggleSource),
            KeyCode::Char('y') => Some(Message::CopySource),

            // File
            KeyCode::Char('r' | 'R') => Some(Message::ForceReload),
            KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),

            // Quit
            KeyCode::Char('q') | KeyCode::Esc => Some(Message::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Message::Quit)
            }

            _ => None,
        }
    }
}
