use std::io::{Write, stdout};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use base64::Engine;

use crate::app::model::{DiagramView, RenderRequest};
use crate::app::{App, Message, Model, ToastLevel};
use crate::mermaid::{DiagramEngine, RenderAdapter};
use crate::watcher::FileWatcher;

/// Runs render requests off the UI thread.
///
/// Requests that queue up while the engine is busy are collapsed to the
/// newest; each completed render is posted back as
/// [`Message::RenderFinished`].
#[derive(Debug)]
pub struct RenderWorker {
    requests: Sender<RenderRequest>,
    results: Receiver<Message>,
}

impl RenderWorker {
    /// Spawn the worker thread around `adapter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn<E>(adapter: RenderAdapter<E>) -> std::io::Result<Self>
    where
        E: DiagramEngine + 'static,
    {
        let (requests, request_rx) = mpsc::channel::<RenderRequest>();
        let (result_tx, results) = mpsc::channel();
        thread::Builder::new()
            .name("mermaid-render".to_string())
            .spawn(move || worker_loop(&adapter, &request_rx, &result_tx))?;
        Ok(Self { requests, results })
    }

    pub fn submit(&self, request: RenderRequest) {
        crate::perf::log_event(
            "render.submit",
            format!("attempt={} id={}", request.attempt, request.render_id),
        );
        if self.requests.send(request).is_err() {
            tracing::warn!("render worker is gone; request dropped");
        }
    }

    /// Next finished render, if one is ready.
    pub fn try_recv(&self) -> Option<Message> {
        match self.results.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next finished render.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Message> {
        self.results.recv_timeout(timeout).ok()
    }
}

fn worker_loop<E: DiagramEngine>(
    adapter: &RenderAdapter<E>,
    requests: &Receiver<RenderRequest>,
    results: &Sender<Message>,
) {
    while let Ok(mut request) = requests.recv() {
        while let Ok(newer) = requests.try_recv() {
            tracing::debug!(skipped = %request.attempt, newer = %newer.attempt, "render request superseded before start");
            request = newer;
        }
        let outcome = adapter.render(request.render_id, &request.source, request.palette);
        let msg = Message::RenderFinished {
            attempt: request.attempt,
            outcome,
        };
        if results.send(msg).is_err() {
            break;
        }
    }
    tracing::debug!("render worker exiting");
}

/// Render on the calling thread until the view has nothing queued.
pub fn render_blocking<E: DiagramEngine>(view: &mut DiagramView, adapter: &RenderAdapter<E>) {
    while let Some(request) = view.take_render_request() {
        let outcome = adapter.render(request.render_id, &request.source, request.palette);
        view.finish_attempt(request.attempt, outcome);
    }
}

impl App {
    pub(super) fn make_file_watcher(path: &Path) -> notify::Result<FileWatcher> {
        FileWatcher::new(path, Duration::from_millis(200))
    }

    pub(super) fn handle_message_side_effects(model: &mut Model, msg: &Message) {
        match msg {
            Message::ForceReload | Message::FileChanged => match model.reload_from_disk() {
                Err(err) => {
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err}"));
                    crate::perf::log_event(
                        "reload.error",
                        format!("failed path={} err={err}", model.file_path.display()),
                    );
                }
                Ok(changed) => {
                    if changed {
                        model.source_visible = false;
                    }
                    if matches!(msg, Message::ForceReload) {
                        model.show_toast(ToastLevel::Info, "Reloaded");
                    }
                }
            },
            Message::CopySource => {
                let source = model.view.source().to_string();
                if source.is_empty() {
                    model.show_toast(ToastLevel::Info, "Nothing to copy");
                    return;
                }
                let lines = source.lines().count();
                match copy_to_clipboard(&source) {
                    Ok(()) => {
                        model.show_toast(ToastLevel::Info, format!("Copied {lines} line(s)"));
                    }
                    Err(err) => model.show_toast(ToastLevel::Error, format!("Copy failed: {err}")),
                }
            }
            Message::ToggleTheme | Message::ThemeChanged(_) => {
                let label = model.view.palette().label();
                model.show_toast(ToastLevel::Info, format!("Theme: {label}"));
            }
            _ => {}
        }
    }
}

fn copy_to_clipboard(text: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        if copy_to_pbcopy(text).is_ok() {
            return Ok(());
        }
    }
    copy_to_clipboard_osc52(text)
}

#[cfg(target_os = "macos")]
fn copy_to_pbcopy(text: &str) -> std::io::Result<()> {
    use std::process::{Command, Stdio};

    let mut child = Command::new("pbcopy").stdin(Stdio::piped()).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other("pbcopy failed"))
    }
}

fn copy_to_clipboard_osc52(text: &str) -> std::io::Result<()> {
    let osc = osc52_sequence(text);
    let mut out = stdout();
    out.write_all(osc.as_bytes())?;
    out.flush()
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}
