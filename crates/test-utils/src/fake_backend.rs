use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use fs_reloader::errors::{ReloaderError, Result};
use fs_reloader::watch::{BackendStreams, OpKind, RawEvent, WatchBackend};

#[derive(Debug)]
struct Senders {
    events: mpsc::UnboundedSender<RawEvent>,
    errors: mpsc::UnboundedSender<notify::Error>,
}

#[derive(Debug, Default)]
struct Shared {
    senders: Option<Senders>,
    registered: Vec<PathBuf>,
    close_calls: usize,
}

/// In-memory backend that behaves like a non-recursive OS watcher:
/// events are only delivered for paths whose parent directory was registered.
///
/// Tests drive it through the [`FakeBackendHandle`]; closing the backend drops
/// the only senders, so both streams end exactly as with the real backend.
#[derive(Debug)]
pub struct FakeBackend {
    shared: Arc<Mutex<Shared>>,
    fail_register: Option<PathBuf>,
    fail_close: bool,
}

/// Test-side view of a [`FakeBackend`].
#[derive(Debug, Clone)]
pub struct FakeBackendHandle {
    shared: Arc<Mutex<Shared>>,
}

impl FakeBackend {
    pub fn new() -> (Self, BackendStreams, FakeBackendHandle) {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (error_tx, errors) = mpsc::unbounded_channel();
        let shared = Arc::new(Mutex::new(Shared {
            senders: Some(Senders {
                events: event_tx,
                errors: error_tx,
            }),
            ..Shared::default()
        }));

        let backend = Self {
            shared: Arc::clone(&shared),
            fail_register: None,
            fail_close: false,
        };
        (backend, BackendStreams { events, errors }, FakeBackendHandle { shared })
    }

    /// Make `register` fail for this directory.
    pub fn failing_register_on(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fail_register = Some(dir.into());
        self
    }

    /// Make `close` report an error (streams still end).
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

impl WatchBackend for FakeBackend {
    fn register(&mut self, dir: &Path) -> Result<()> {
        if self.fail_register.as_deref() == Some(dir) {
            return Err(ReloaderError::Registration {
                path: dir.to_path_buf(),
                source: notify::Error::generic("fake registration failure"),
            });
        }
        self.shared.lock().unwrap().registered.push(dir.to_path_buf());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut shared = self.shared.lock().unwrap();
        shared.close_calls += 1;
        shared.senders = None;
        if self.fail_close {
            return Err(ReloaderError::Backend(notify::Error::generic(
                "fake close failure",
            )));
        }
        Ok(())
    }
}

impl FakeBackendHandle {
    /// Deliver an event if its directory is watched. Returns whether it was
    /// delivered.
    pub fn emit(&self, path: impl Into<PathBuf>, kind: OpKind) -> bool {
        let path = path.into();
        let shared = self.shared.lock().unwrap();
        let watched = path
            .parent()
            .is_some_and(|dir| shared.registered.iter().any(|d| d == dir));
        match (&shared.senders, watched) {
            (Some(senders), true) => senders.events.send(RawEvent::new(path, kind)).is_ok(),
            _ => false,
        }
    }

    pub fn write(&self, path: impl Into<PathBuf>) -> bool {
        self.emit(path, OpKind::Write)
    }

    /// Push an error onto the backend error stream.
    pub fn emit_error(&self, message: &str) -> bool {
        let shared = self.shared.lock().unwrap();
        match &shared.senders {
            Some(senders) => senders.errors.send(notify::Error::generic(message)).is_ok(),
            None => false,
        }
    }

    pub fn registered(&self) -> Vec<PathBuf> {
        self.shared.lock().unwrap().registered.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().unwrap().senders.is_none()
    }

    pub fn close_calls(&self) -> usize {
        self.shared.lock().unwrap().close_calls
    }
}
