// src/watch/watcher.rs

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::types::ReloadRequest;
use crate::watch::backend::{BackendStreams, RawEvent};
use crate::watch::filter::{EventDecision, ReloadFilter};

/// Worker that turns raw backend events into reload requests.
///
/// `reload_tx` is `None` in log-only mode. When present it should be the
/// only sender of a capacity-1 channel: a send blocks until the debouncer
/// has taken the previous request, which throttles this loop to the
/// debouncer's pace without ever losing the "something changed" signal.
#[derive(Debug)]
pub struct EventWatcher {
    streams: BackendStreams,
    filter: ReloadFilter,
    reload_tx: Option<mpsc::Sender<ReloadRequest>>,
}

impl EventWatcher {
    pub fn new(
        streams: BackendStreams,
        filter: ReloadFilter,
        reload_tx: Option<mpsc::Sender<ReloadRequest>>,
    ) -> Self {
        Self {
            streams,
            filter,
            reload_tx,
        }
    }

    /// Spawn the loop on the current Tokio runtime.
    ///
    /// The task ends once either backend stream is closed. The reload sender
    /// is dropped with it, which is what closes the reload channel.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        debug!("event watcher started");

        loop {
            tokio::select! {
                event = self.streams.events.recv() => match event {
                    Some(event) => {
                        if !self.handle_event(event).await {
                            break;
                        }
                    }
                    None => {
                        debug!("event stream closed");
                        break;
                    }
                },
                err = self.streams.errors.recv() => match err {
                    Some(err) => error!("watch backend error: {err}"),
                    None => {
                        debug!("backend error stream closed");
                        break;
                    }
                },
            }
        }

        debug!("event watcher finished");
    }

    /// Returns `false` once the reload channel is gone and there is no
    /// point in continuing.
    async fn handle_event(&mut self, event: RawEvent) -> bool {
        debug!("[Event] {event}");

        match self.filter.decide(&event) {
            EventDecision::NotAWrite => true,
            EventDecision::UnwatchedExtension => {
                info!("modified file: {}", event.path.display());
                true
            }
            EventDecision::Reload => {
                info!("modified file: {}", event.path.display());
                let Some(tx) = self.reload_tx.as_ref() else {
                    return true;
                };
                if tx.send(ReloadRequest).await.is_err() {
                    debug!("reload channel closed; stopping event watcher");
                    return false;
                }
                true
            }
        }
    }
}
