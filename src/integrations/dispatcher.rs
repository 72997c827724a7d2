//! Runs remote requests off the UI loop and reports results as events.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, warn};

use super::remote::RemoteApi;
use crate::domain::actions::ControlAction;
use crate::domain::models::{CatalogResponse, PlayerState, PlayerStatus, PreviewStatus};

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

type Task = Box<dyn FnOnce() + Send + 'static>;

pub trait TaskRunner: Send + Sync {
    fn run(&self, name: &str, task: Task);
}

/// One named OS thread per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRunner;

impl TaskRunner for ThreadRunner {
    fn run(&self, name: &str, task: Task) {
        if let Err(err) = thread::Builder::new()
            .name(format!("avp-{name}"))
            .spawn(task)
        {
            warn!(error = %err, task = name, "failed to spawn request thread");
        }
    }
}

/// Runs the task on the caller's thread before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineRunner;

impl TaskRunner for InlineRunner {
    fn run(&self, _name: &str, task: Task) {
        task();
    }
}

#[derive(Debug)]
pub enum ClientEvent {
    StatusPolled(Result<PlayerStatus>),
    ControlFinished {
        action: ControlAction,
        result: Result<Value>,
    },
    ToggleSettled {
        sent: ControlAction,
        confirmed: Option<PlayerStatus>,
    },
    PlayByNameFinished {
        name: String,
        result: Result<Value>,
    },
    CatalogLoaded(Result<CatalogResponse>),
    ThumbnailLoaded {
        name: String,
        result: Result<Vec<u8>>,
    },
    PreviewStatusLoaded(Result<PreviewStatus>),
    PreviewToggled {
        enabled: bool,
        result: Result<PreviewStatus>,
    },
}

pub struct Dispatcher {
    remote: Arc<dyn RemoteApi>,
    runner: Arc<dyn TaskRunner>,
    events: Sender<ClientEvent>,
    settle_delay: Duration,
}

impl Dispatcher {
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        runner: Arc<dyn TaskRunner>,
        events: Sender<ClientEvent>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            remote,
            runner,
            events,
            settle_delay,
        }
    }

    fn spawn<F>(&self, name: &str, job: F)
    where
        F: FnOnce(&dyn RemoteApi) -> ClientEvent + Send + 'static,
    {
        let remote = Arc::clone(&self.remote);
        let events = self.events.clone();
        self.runner.run(
            name,
            Box::new(move || {
                let event = job(remote.as_ref());
                if events.send(event).is_err() {
                    debug!("event receiver dropped; discarding result");
                }
            }),
        );
    }

    pub fn poll_status(&self) {
        self.spawn("status", |remote| ClientEvent::StatusPolled(remote.status()));
    }

    pub fn control(&self, action: ControlAction) {
        self.spawn("control", move |remote| ClientEvent::ControlFinished {
            action,
            result: remote.control(action),
        });
    }

    /// Reads the live state, sends its opposite, waits for the player to
    /// settle and reads again. `last_known` stands in when the first read fails.
    pub fn toggle_play_pause(&self, last_known: PlayerState) {
        let settle_delay = self.settle_delay;
        self.spawn("toggle", move |remote| {
            let current = match remote.status() {
                Ok(status) => status.state,
                Err(err) => {
                    debug!(error = %err, "toggle pre-read failed; using last known state");
                    last_known
                }
            };
            let sent = if current == PlayerState::Playing {
                ControlAction::Pause
            } else {
                ControlAction::Play
            };

            if let Err(err) = remote.control(sent) {
                warn!(error = %err, action = sent.endpoint(), "toggle request failed");
            }

            thread::sleep(settle_delay);

            let confirmed = match remote.status() {
                Ok(status) => Some(status),
                Err(err) => {
                    warn!(error = %err, "toggle confirmation read failed");
                    None
                }
            };
            ClientEvent::ToggleSettled { sent, confirmed }
        });
    }

    pub fn play_by_name(&self, name: String) {
        self.spawn("play-video", move |remote| {
            let result = remote.play_by_name(&name);
            ClientEvent::PlayByNameFinished { name, result }
        });
    }

    pub fn load_catalog(&self) {
        self.spawn("catalog", |remote| {
            ClientEvent::CatalogLoaded(remote.catalog())
        });
    }

    /// Asks the server to rescan, then reloads the catalog either way.
    pub fn refresh_catalog(&self) {
        self.spawn("catalog-refresh", |remote| {
            if let Err(err) = remote.refresh_catalog() {
                warn!(error = %err, "catalog rescan request failed");
            }
            ClientEvent::CatalogLoaded(remote.catalog())
        });
    }

    pub fn load_thumbnail(&self, name: String) {
        self.spawn("thumbnail", move |remote| {
            let result = remote.thumbnail(&name);
            ClientEvent::ThumbnailLoaded { name, result }
        });
    }

    pub fn load_preview_status(&self) {
        self.spawn("preview-status", |remote| {
            ClientEvent::PreviewStatusLoaded(remote.preview_status())
        });
    }

    pub fn set_preview(&self, enabled: bool) {
        self.spawn("preview-toggle", move |remote| ClientEvent::PreviewToggled {
            enabled,
            result: remote.set_preview(enabled),
        });
    }

    pub fn probe_health(&self) {
        let remote = Arc::clone(&self.remote);
        self.runner.run(
            "health",
            Box::new(move || match remote.health() {
                Ok(()) => debug!("player server health check passed"),
                Err(err) => warn!(error = %err, "player server health check failed"),
            }),
        );
    }

    pub fn stream_url(&self, index_url: &str) -> Result<String> {
        self.remote.stream_url(index_url)
    }
}
