use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};

use crate::domain::actions::{Action, ControlAction};
use crate::domain::catalog::CatalogView;
use crate::domain::indicators::{title_text, PlayPauseButton, StateBadge, VolumeIndicator};
use crate::domain::marquee::{Marquee, ResizeDebounce};
use crate::domain::models::{PlayerState, PlayerStatus, PreviewStatus};
use crate::domain::preview::{PreviewPanel, PreviewPhase};
use crate::domain::schedule::PollSchedule;
use crate::integrations::dispatcher::{
    ClientEvent, Dispatcher, TaskRunner, ThreadRunner, DEFAULT_SETTLE_DELAY,
};
use crate::integrations::remote::{HttpRemote, RemoteApi};
use crate::integrations::stream_player::{StreamPlayer, VlcStreamPlayer};
use crate::storage::config::{LayoutConfig, RuntimeConfig};
use crate::storage::preferences::{LocalPreferences, PreferencesStore};
use crate::ui::render::PaneMetrics;
use crate::ui::Tui;

pub const MARQUEE_STEP: Duration = Duration::from_millis(300);
pub const PREVIEW_VOLUME_STEP: u8 = 5;

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub layout: LayoutConfig,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1_500),
            settle_delay: DEFAULT_SETTLE_DELAY,
            layout: LayoutConfig::default(),
        }
    }
}

/// Header indicators derived from the most recent status read.
#[derive(Debug, Clone)]
pub struct StatusView {
    status: Option<PlayerStatus>,
    state: PlayerState,
    title: Marquee,
    button: PlayPauseButton,
}

impl StatusView {
    fn new() -> Self {
        Self {
            status: None,
            state: PlayerState::Idle,
            title: Marquee::new(title_text(None)),
            button: PlayPauseButton::Play,
        }
    }

    fn apply(&mut self, status: PlayerStatus) {
        self.state = status.state;
        self.button = PlayPauseButton::for_state(status.state);
        self.title.set_text(title_text(Some(&status)));
        self.status = Some(status);
    }

    fn mark_error(&mut self) {
        self.state = PlayerState::Error;
        self.button = PlayPauseButton::for_state(PlayerState::Error);
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn badge(&self) -> StateBadge {
        StateBadge::for_state(self.state)
    }

    pub fn title(&self) -> &Marquee {
        &self.title
    }

    pub fn volume(&self) -> Option<VolumeIndicator> {
        self.status
            .as_ref()
            .map(|s| VolumeIndicator::new(s.volume, s.muted))
    }

    pub fn button(&self) -> PlayPauseButton {
        self.button
    }

    pub fn last_status(&self) -> Option<&PlayerStatus> {
        self.status.as_ref()
    }
}

pub struct App {
    pub running: bool,
    pub status_message: String,
    alert: Option<String>,
    started: bool,
    layout: LayoutConfig,
    status: StatusView,
    schedule: PollSchedule,
    catalog: CatalogView,
    filter_active: bool,
    preview: PreviewPanel,
    preferences: LocalPreferences,
    preferences_store: PreferencesStore,
    player: Box<dyn StreamPlayer>,
    dispatcher: Dispatcher,
    events: Receiver<ClientEvent>,
    resize: ResizeDebounce,
    next_marquee_step: Option<Instant>,
}

impl App {
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        runner: Arc<dyn TaskRunner>,
        player: Box<dyn StreamPlayer>,
        preferences_store: PreferencesStore,
        options: AppOptions,
    ) -> Result<Self> {
        let preferences = preferences_store.load().unwrap_or_else(|err| {
            warn!(error = %format!("{err:#}"), "local preferences unreadable; using defaults");
            LocalPreferences::default()
        });
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(remote, runner, tx, options.settle_delay);

        Ok(Self {
            running: true,
            status_message: "Ready".to_string(),
            alert: None,
            started: false,
            layout: options.layout,
            status: StatusView::new(),
            schedule: PollSchedule::new(options.poll_interval),
            catalog: CatalogView::new(),
            filter_active: false,
            preview: PreviewPanel::default(),
            preferences,
            preferences_store,
            player,
            dispatcher,
            events: rx,
            resize: ResizeDebounce::default(),
            next_marquee_step: None,
        })
    }

    pub fn status_view(&self) -> &StatusView {
        &self.status
    }

    pub fn catalog(&self) -> &CatalogView {
        &self.catalog
    }

    pub fn preview(&self) -> &PreviewPanel {
        &self.preview
    }

    pub fn layout(&self) -> LayoutConfig {
        self.layout
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn preview_volume(&self) -> u8 {
        self.preferences.preview_volume
    }

    pub fn stream_attached(&self) -> bool {
        self.player.attached_url().is_some()
    }

    pub fn filter_active(&self) -> bool {
        self.filter_active
    }

    pub fn poll_schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    /// Loads the catalog, starts polling and picks up the preview state.
    pub fn start(&mut self, now: Instant) {
        if self.started {
            return;
        }
        self.started = true;

        if self.layout.catalog {
            self.dispatcher.load_catalog();
        }
        self.schedule.start(now);
        if self.layout.preview {
            self.dispatcher.load_preview_status();
        }
        self.dispatcher.probe_health();
        self.next_marquee_step = Some(now + MARQUEE_STEP);
        info!("remote client started");
    }

    pub fn stop(&mut self) {
        self.schedule.stop();
        self.teardown_stream();
        self.started = false;
        info!("remote client stopped");
    }

    /// Issues due work: status reads, thumbnail loads, marquee steps and
    /// debounced resizes.
    pub fn tick(&mut self, now: Instant) {
        if self.schedule.due(now) {
            self.dispatcher.poll_status();
        }

        if let Some((cols, rows)) = self.resize.poll(now) {
            self.apply_size(cols, rows);
        }

        if let Some(step) = self.next_marquee_step {
            if now >= step {
                self.status.title.advance();
                self.catalog.advance_titles();
                self.next_marquee_step = Some(now + MARQUEE_STEP);
            }
        }

        if self.layout.catalog {
            for name in self.catalog.take_lazy_loads() {
                self.dispatcher.load_thumbnail(name);
            }
        }
    }

    /// Applies every finished request. Returns how many were applied.
    pub fn pump(&mut self, now: Instant) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event, now);
            applied += 1;
        }
        applied
    }

    pub fn observe_resize(&mut self, cols: u16, rows: u16, now: Instant) {
        self.resize.observe(cols, rows, now);
    }

    pub fn apply_size(&mut self, cols: u16, rows: u16) {
        let metrics = PaneMetrics::compute(cols, rows, self.layout);
        self.status.title.resize(metrics.title_width);
        self.catalog
            .set_viewport(metrics.catalog_rows, metrics.card_title_width);
    }

    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Control(control) => {
                self.dispatcher.control(control);
                self.status_message = format!("Sent {}", control.endpoint());
            }
            Action::TogglePlayPause => {
                self.dispatcher.toggle_play_pause(self.status.state());
                self.status_message = "Toggling playback".to_string();
            }
            Action::PlaySelected => {
                if !self.layout.catalog {
                    return Ok(());
                }
                let name = self
                    .catalog
                    .selected()
                    .map(|card| card.item.name.clone())
                    .ok_or_else(|| anyhow!("no video selected"))?;
                self.play_video(name);
            }
            Action::SelectNext => self.catalog.select_next(),
            Action::SelectPrevious => self.catalog.select_previous(),
            Action::RefreshCatalog => {
                if self.layout.catalog {
                    self.dispatcher.refresh_catalog();
                    self.status_message = "Rescanning videos".to_string();
                }
            }
            Action::OpenFilter => {
                if self.layout.catalog {
                    self.filter_active = true;
                }
            }
            Action::TogglePreview => self.toggle_preview(),
            Action::PreviewVolumeUp => self.adjust_preview_volume(i16::from(PREVIEW_VOLUME_STEP)),
            Action::PreviewVolumeDown => {
                self.adjust_preview_volume(-i16::from(PREVIEW_VOLUME_STEP))
            }
            Action::DismissAlert => self.alert = None,
            Action::Quit => self.quit(),
        }

        Ok(())
    }

    /// Plays a catalog item by name; the next status poll shows the result.
    pub fn play_video(&mut self, name: String) {
        self.status_message = format!("Requested {name}");
        self.dispatcher.play_by_name(name);
    }

    pub fn select_card(&mut self, position: usize) {
        self.catalog.select(position);
    }

    pub fn push_filter_char(&mut self, c: char) {
        let mut filter = self.catalog.filter().to_string();
        filter.push(c);
        self.catalog.set_filter(&filter);
    }

    pub fn backspace_filter(&mut self) {
        let mut filter = self.catalog.filter().to_string();
        filter.pop();
        self.catalog.set_filter(&filter);
    }

    /// Leaves filter input; `keep == false` also clears the filter.
    pub fn close_filter(&mut self, keep: bool) {
        self.filter_active = false;
        if !keep {
            self.catalog.set_filter("");
        }
    }

    pub fn quit(&mut self) {
        self.stop();
        self.running = false;
        self.status_message = "Bye".to_string();
    }

    fn apply_event(&mut self, event: ClientEvent, now: Instant) {
        match event {
            ClientEvent::StatusPolled(result) => {
                self.schedule.complete();
                match result {
                    Ok(status) => self.status.apply(status),
                    Err(err) => {
                        warn!(error = %format!("{err:#}"), "status poll failed");
                        self.status.mark_error();
                    }
                }
            }
            ClientEvent::ControlFinished { action, result } => {
                self.report_control(action, result.map(|_| ()), now);
            }
            ClientEvent::ToggleSettled { sent, confirmed } => match confirmed {
                Some(status) => {
                    debug!(action = sent.endpoint(), state = status.state.label(), "toggle settled");
                    self.status.apply(status);
                    self.status_message = format!("Sent {}", sent.endpoint());
                }
                None => {
                    self.status_message =
                        format!("Sent {}; player state unconfirmed", sent.endpoint());
                }
            },
            ClientEvent::PlayByNameFinished { name, result } => match result {
                Ok(reply) => {
                    debug!(video = %name, reply = %reply, "play-video accepted");
                    self.schedule.restart(now);
                }
                Err(err) => {
                    warn!(video = %name, error = %format!("{err:#}"), "play-video failed");
                    self.status_message = format!("Play {name} failed: {err}");
                }
            },
            ClientEvent::CatalogLoaded(result) => match result {
                Ok(response) => {
                    let items = response.into_items();
                    info!(count = items.len(), "catalog loaded");
                    self.catalog.set_items(items);
                }
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "catalog load failed");
                }
            },
            ClientEvent::ThumbnailLoaded { name, result } => {
                let Some(card) = self.catalog.card_mut(&name) else {
                    return;
                };
                match result {
                    Ok(bytes) => card.thumbnail.loaded(bytes),
                    Err(err) => {
                        debug!(video = %name, error = %err, "thumbnail unavailable");
                        card.thumbnail.failed();
                    }
                }
            }
            ClientEvent::PreviewStatusLoaded(result) => match result {
                Ok(status) => self.sync_preview(&status),
                Err(err) => warn!(error = %format!("{err:#}"), "preview status failed"),
            },
            ClientEvent::PreviewToggled { enabled, result } => {
                if enabled {
                    self.finish_enable(result);
                } else {
                    if let Err(err) = result {
                        warn!(error = %format!("{err:#}"), "preview disable request failed");
                    }
                    if self.preview.phase() == PreviewPhase::Disabling {
                        self.preview.finish_disable();
                    }
                }
            }
        }
    }

    fn report_control(&mut self, action: ControlAction, result: Result<()>, now: Instant) {
        match result {
            Ok(()) => {
                debug!(action = action.endpoint(), "control accepted");
                self.schedule.restart(now);
            }
            Err(err) => {
                warn!(action = action.endpoint(), error = %format!("{err:#}"), "control failed");
                self.status_message = format!("Control {} failed: {err}", action.endpoint());
            }
        }
    }

    fn toggle_preview(&mut self) {
        if !self.layout.preview {
            return;
        }
        match self.preview.phase() {
            PreviewPhase::Disabled => {
                if self.preview.begin_enable() {
                    self.dispatcher.set_preview(true);
                    self.status_message = "Enabling preview".to_string();
                }
            }
            PreviewPhase::Enabled => {
                if self.preview.begin_disable() {
                    self.teardown_stream();
                    self.dispatcher.set_preview(false);
                    self.status_message = "Preview off".to_string();
                }
            }
            phase => debug!(phase = phase.label(), "preview toggle ignored mid-transition"),
        }
    }

    fn finish_enable(&mut self, result: Result<PreviewStatus>) {
        if self.preview.phase() != PreviewPhase::Enabling {
            return;
        }
        let outcome = result.and_then(|status| {
            if !status.enabled {
                return Err(anyhow!("server reports the preview as disabled"));
            }
            match status.stream_url() {
                Some(index_url) => self.attach_stream(index_url).map(Some),
                None => Ok(None),
            }
        });
        match outcome {
            Ok(source) => {
                self.preview.enable_succeeded(source);
                self.status_message = "Preview live".to_string();
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "preview enable failed");
                self.teardown_stream();
                self.preview.enable_failed();
                self.alert = Some(format!("Preview error: {err}"));
            }
        }
    }

    fn sync_preview(&mut self, status: &PreviewStatus) {
        if !self.layout.preview {
            return;
        }
        if matches!(
            self.preview.phase(),
            PreviewPhase::Enabling | PreviewPhase::Disabling
        ) {
            return;
        }

        self.preview.sync(status);
        match status.stream_url() {
            Some(index_url) => match self.attach_stream(index_url) {
                Ok(source) => self.preview.enable_succeeded(Some(source)),
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "preview attach failed");
                    self.preview.clear_source();
                }
            },
            None => self.teardown_stream(),
        }
    }

    /// Starts local playback of the stream; playback-start failures are
    /// logged and otherwise ignored.
    fn attach_stream(&mut self, index_url: &str) -> Result<String> {
        let url = self.dispatcher.stream_url(index_url)?;
        self.player
            .attach(&url)
            .with_context(|| format!("attach preview stream {url}"))?;
        if let Err(err) = self.player.set_volume(self.preferences.preview_volume) {
            debug!(error = %err, "preview volume not applied");
        }
        if let Err(err) = self.player.play() {
            debug!(error = %err, "preview playback did not start");
        }
        Ok(url)
    }

    fn teardown_stream(&mut self) {
        if let Err(err) = self.player.detach() {
            warn!(error = %format!("{err:#}"), "preview teardown failed");
        }
    }

    fn adjust_preview_volume(&mut self, delta: i16) {
        if !self.layout.preview {
            return;
        }
        let volume = (i16::from(self.preferences.preview_volume) + delta).clamp(0, 100) as u8;
        self.preferences.preview_volume = volume;

        if self.stream_attached() {
            if let Err(err) = self.player.set_volume(volume) {
                warn!(error = %format!("{err:#}"), "preview volume change failed");
            }
        }
        if let Err(err) = self.preferences_store.save(&self.preferences) {
            warn!(error = %format!("{err:#}"), "saving preview volume failed");
        }
        self.status_message = if volume == 0 {
            "Preview muted".to_string()
        } else {
            format!("Preview volume {volume}%")
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Tui,
    Status,
    Send(ControlAction),
    Play(String),
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub debug: bool,
    pub config_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub invocation: Invocation,
}

pub fn run(options: RunOptions) -> Result<()> {
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(RuntimeConfig::default_path);
    let mut config = RuntimeConfig::load_from_path(&config_path).context("load runtime config")?;
    if let Some(base_url) = options.base_url {
        config.server.base_url = base_url;
    }

    init_tracing(options.debug, &config.storage.log_path);

    let remote = HttpRemote::new(
        &config.server.base_url,
        config.timeout(),
        config.endpoints.clone(),
    )?;

    match options.invocation {
        Invocation::Tui => run_tui(config, Arc::new(remote)),
        Invocation::Status => {
            let status = remote.status().context("read player status")?;
            println!("{}", status_line(&status));
            Ok(())
        }
        Invocation::Send(action) => {
            let reply = remote
                .control(action)
                .with_context(|| format!("send {}", action.endpoint()))?;
            println!("{reply}");
            Ok(())
        }
        Invocation::Play(name) => {
            let reply = remote
                .play_by_name(&name)
                .with_context(|| format!("play {name}"))?;
            println!("{reply}");
            Ok(())
        }
    }
}

fn run_tui(config: RuntimeConfig, remote: Arc<dyn RemoteApi>) -> Result<()> {
    let player = Box::new(VlcStreamPlayer::new_with_program(config.preview.player.clone()));
    let mut app = App::new(
        remote,
        Arc::new(ThreadRunner),
        player,
        PreferencesStore::new(&config.storage.preferences_path),
        AppOptions {
            poll_interval: config.poll_interval(),
            settle_delay: config.settle_delay(),
            layout: config.layout,
        },
    )?;
    info!(server = %config.server.base_url, "connecting to player server");

    let mut tui = Tui::new(config.layout)?;
    app.start(Instant::now());

    if let Err(err) = tui.run(&mut app) {
        warn!(error = ?err, "tui exited with error");
        app.stop();
        return Err(err);
    }

    app.stop();
    Ok(())
}

/// One-line summary used by the `status` subcommand.
pub fn status_line(status: &PlayerStatus) -> String {
    let badge = StateBadge::for_state(status.state);
    let volume = VolumeIndicator::new(status.volume, status.muted);
    format!(
        "{} {} | {} | {} {}",
        badge.icon,
        badge.label,
        title_text(Some(status)),
        volume.tier.icon(),
        volume.text
    )
}

fn init_tracing(debug: bool, log_path: &Path) {
    let default_filter = if debug {
        "avp_remote=debug"
    } else {
        "avp_remote=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let file = log_path
        .parent()
        .map(fs::create_dir_all)
        .transpose()
        .and_then(|_| OpenOptions::new().create(true).append(true).open(log_path));

    // The terminal belongs to the TUI, so logs never go to stdout.
    match file {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        Err(_) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .try_init();
        }
    }
}
