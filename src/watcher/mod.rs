//! Live reload of the diagram source file.
//!
//! Uses notify for cross-platform file system events. The parent directory
//! is watched rather than the file so editors that save by rename-over keep
//! triggering reloads.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::event::AccessKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches one diagram file and reports debounced changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl FileWatcher {
    /// Create a watcher for `path`.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the path cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // OS event paths are canonical.
        let target_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;
        tracing::debug!(target = %target_path.display(), root = %watch_root.display(), "watching diagram file");

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target_path,
            target_name,
            debounce,
            pending_since: None,
        })
    }

    /// The canonical path of the file being watched.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Returns true once a change has been quiet for the debounce period.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => relevant += 1,
                Ok(_) => ignored += 1,
                Err(err) => {
                    tracing::warn!(error = %err, "file watcher error");
                    crate::perf::log_event("watcher.error", format!("{err}"));
                }
            }
        }

        if relevant + ignored > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!(
                    "relevant={relevant} ignored={ignored} target={}",
                    self.target_path.display(),
                ),
            );
        }
        if relevant > 0 {
            // Restart the quiet period on every burst.
            self.pending_since = Some(Instant::now());
        }

        match self.pending_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        // Our own reload reads the file; those must not re-trigger it.
        if matches!(
            event.kind,
            EventKind::Access(AccessKind::Open(_) | AccessKind::Read)
        ) {
            return false;
        }
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessMode, ModifyKind};
    use tempfile::tempdir;

    fn event(kind: EventKind, path: PathBuf) -> Event {
        Event {
            kind,
            paths: vec![path],
            attrs: notify::event::EventAttributes::new(),
        }
    }

    #[test]
    fn test_directory_level_event_is_relevant_for_watched_file() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("flow.mmd");
        std::fs::write(&path, "graph TD; A-->B").expect("write");
        let watcher = FileWatcher::new(&path, Duration::from_millis(10)).expect("watcher");

        assert!(watcher.is_relevant(&event(EventKind::Any, canonical_dir)));
    }

    #[test]
    fn test_sibling_file_is_not_relevant() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("flow.mmd");
        std::fs::write(&path, "graph TD; A-->B").expect("write");
        let watcher = FileWatcher::new(&path, Duration::from_millis(10)).expect("watcher");

        let sibling = canonical_dir.join("other.mmd");
        assert!(!watcher.is_relevant(&event(
            EventKind::Modify(ModifyKind::Any),
            sibling
        )));
    }

    #[test]
    fn test_reads_of_the_file_are_ignored() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().canonicalize().expect("canonicalize").join("flow.mmd");
        std::fs::write(&path, "graph TD; A-->B").expect("write");
        let watcher = FileWatcher::new(&path, Duration::from_millis(10)).expect("watcher");

        let open = EventKind::Access(AccessKind::Open(AccessMode::Read));
        assert!(!watcher.is_relevant(&event(open, path.clone())));
        let close_write = EventKind::Access(AccessKind::Close(AccessMode::Write));
        assert!(watcher.is_relevant(&event(close_write, path)));
    }

    #[test]
    fn test_watch_root_for_relative_file_is_dot() {
        let root = watch_root_for(Path::new("flow.mmd"));
        assert_eq!(root, PathBuf::from("."));
    }

    /// Same debounce and poll interval as the event loop.
    #[test]
    fn test_real_modification_with_app_timing() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("flow.mmd");
        std::fs::write(&path, "graph TD; A-->B").expect("write");

        let mut watcher = FileWatcher::new(&path, Duration::from_millis(200)).expect("watcher");

        // Give the backend time to register the watch
        std::thread::sleep(Duration::from_millis(500));

        std::fs::write(&path, "graph TD; A-->C").expect("write");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            if watcher.take_change_ready() {
                detected = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(250));
        }

        assert!(
            detected,
            "watcher should detect modification with real app timing (200ms debounce, 250ms poll)"
        );
    }

    #[test]
    fn test_canonical_event_path_matches_relative_watcher() {
        let dir = tempdir().expect("tempdir");
        let relative_path = dir.path().join("sequence.mmd");
        std::fs::write(&relative_path, "sequenceDiagram\n  A->>B: hi").expect("write");
        let watcher = FileWatcher::new(&relative_path, Duration::from_millis(10)).expect("watcher");

        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        assert!(watcher.is_relevant(&event(EventKind::Any, canonical_dir.clone())));
        assert_eq!(
            watcher.target_path(),
            canonical_dir.join("sequence.mmd").as_path()
        );
    }
}
