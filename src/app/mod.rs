pub mod actions;
pub mod events;
pub mod state;

use crate::config::Config;
use crate::content::{ContentClient, Track};
use crate::input;
use crate::lyrics::{LyricsResolver, ProviderChain, ResolvedLyrics};
use crate::player::MpvHandle;
use crate::sync::engine::{active_line_at, SyncState};
use crate::sync::{FrameTicker, RevealStep, SyncEngine, Typewriter};
use crate::tui::{self, TuiTerminal};
use actions::Action;
use events::{Event, NetworkEvent, PlayerEvent};
use state::{AppState, LyricsStatus, Screen, Toast};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const LIST_PAGE: usize = 10;
const LIST_HEIGHT: usize = 20;

pub struct App {
    cfg: Config,
    config_path: std::path::PathBuf,
    state: AppState,
    content: ContentClient,
    resolver: LyricsResolver,
    engine: SyncEngine,
    ticker: FrameTicker,
    reveal_rx: mpsc::Receiver<RevealStep>,
    lyrics_task: Option<JoinHandle<()>>,
    mpv: Option<MpvHandle>,
}

impl App {
    pub fn new(cfg: Config, config_path: std::path::PathBuf) -> anyhow::Result<Self> {
        let content = ContentClient::from_config(&cfg.content)?;
        let chain = ProviderChain::from_config(&cfg.lyrics, &cfg.content.data_dir)?;
        tracing::info!("lyrics providers: {}", chain.provider_names().join(" -> "));

        let (reveal_tx, reveal_rx) = mpsc::channel(64);
        let typewriter =
            Typewriter::new(Duration::from_millis(cfg.lyrics.typewriter_delay_ms), reveal_tx);
        let engine = SyncEngine::new(typewriter, cfg.lyrics.typewriter_enabled);
        let ticker = FrameTicker::new(Duration::from_millis(cfg.sync.frame_interval_ms));

        let mut state = AppState::new();
        state.volume = cfg.player.volume;
        state.typewriter_enabled = cfg.lyrics.typewriter_enabled;

        Ok(Self {
            cfg,
            config_path,
            state,
            content,
            resolver: LyricsResolver::new(chain),
            engine,
            ticker,
            reveal_rx,
            lyrics_task: None,
            mpv: None,
        })
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        input::spawn_input_task(tx.clone(), self.cfg.input.mouse);

        let mpv_log = self.cfg.paths.data_dir.join("mpv.log");
        let device = self.cfg.player.audio_device.as_deref();
        match MpvHandle::spawn(tx.clone(), device, Some(&mpv_log)).await {
            Ok(h) => {
                let _ = h.set_volume(self.state.volume).await;
                self.mpv = Some(h);
            }
            Err(e) => {
                tracing::error!("mpv unavailable: {:#}", e);
                self.state.toast = Some(Toast::error(format!("mpv disabled: {e:#}")));
            }
        }

        self.spawn_load_tracks(&tx);
        tui::draw(terminal, &self.cfg, &mut self.state)?;

        loop {
            let redraw = tokio::select! {
                ev = rx.recv() => {
                    let Some(ev) = ev else { break };
                    self.handle_event(ev, &tx).await;
                    true
                }
                Some(step) = self.reveal_rx.recv() => {
                    self.engine.handle_reveal(step, &mut self.state.lyrics_pane)
                }
                _ = self.ticker.tick() => self.on_frame(),
            };

            if self.state.should_quit {
                break;
            }
            if redraw {
                tui::draw(terminal, &self.cfg, &mut self.state)?;
            }
        }

        self.stop_sync();
        self.save_state_on_quit();
        Ok(())
    }

    async fn handle_event(&mut self, ev: Event, tx: &mpsc::Sender<Event>) {
        match ev {
            Event::Input(input_ev) => {
                if let Some(action) = input::map_input_to_action(&self.state, input_ev) {
                    self.handle_action(action, tx).await;
                }
            }
            Event::Player(pe) => self.handle_player(pe, tx).await,
            Event::Network(ne) => self.handle_network(ne),
        }
    }

    /// One frame while syncing: sample the last reported position
    fn on_frame(&mut self) -> bool {
        if !self.state.is_playing() || self.engine.state() == SyncState::Idle {
            self.stop_sync();
            return false;
        }
        self.engine
            .sample(self.state.position_secs, &mut self.state.lyrics_pane)
            .is_some()
    }

    fn start_sync(&mut self) {
        if !self.state.is_playing() || !self.engine.start() {
            return;
        }
        self.ticker.start();
        self.engine
            .sample(self.state.position_secs, &mut self.state.lyrics_pane);
    }

    fn stop_sync(&mut self) {
        self.engine.stop();
        if self.ticker.is_running() {
            tracing::debug!("frame ticker stopped");
            self.ticker.stop();
        }
        // Show the held line in full while stopped.
        self.state.lyrics_pane.revealed = None;
    }

    fn save_state_on_quit(&mut self) {
        self.cfg.player.volume = self.state.volume;
        self.cfg.lyrics.typewriter_enabled = self.state.typewriter_enabled;
        if let Err(e) = crate::config::save(&self.cfg, Some(&self.config_path)) {
            tracing::warn!("could not save config: {:#}", e);
        }
    }

    async fn handle_action(&mut self, action: Action, tx: &mpsc::Sender<Event>) {
        match action {
            Action::Activate => {
                if self.state.screen != Screen::Tracks {
                    return;
                }
                let Some(index) = self.state.tracks.selected_catalog_index() else {
                    return;
                };
                let catalog = self.state.tracks.all().to_vec();
                self.state.queue.replace(catalog, index);
                if let Some(track) = self.state.queue.current_track().cloned() {
                    self.play_track(track, tx).await;
                }
            }
            Action::PlayNext => {
                if let Some(track) = self.state.queue.advance().cloned() {
                    self.play_track(track, tx).await;
                }
            }
            Action::PlayPrev => {
                if let Some(track) = self.state.queue.go_back().cloned() {
                    self.play_track(track, tx).await;
                }
            }
            Action::SubmitFilter => {
                let query = self.state.filter_input.take().unwrap_or_default();
                self.state.tracks.set_filter(&query);
                self.state.status = format!("{} matching tracks", self.state.tracks.len());
                let content = self.content.clone();
                tokio::spawn(async move { content.log_search(&query).await });
            }
            Action::Refresh => self.spawn_load_tracks(tx),
            Action::TogglePause => {
                if let Some(mpv) = &self.mpv
                    && let Err(e) = mpv.toggle_pause().await
                {
                    self.state.status = format!("mpv error: {e:#}");
                }
            }
            Action::VolumeUp | Action::VolumeDown => {
                let v = if action == Action::VolumeUp {
                    self.state.volume.saturating_add(5).min(100)
                } else {
                    self.state.volume.saturating_sub(5)
                };
                self.state.volume = v;
                if let Some(mpv) = &self.mpv {
                    let _ = mpv.set_volume(v).await;
                }
            }
            Action::SeekForward | Action::SeekBack => {
                let delta = if action == Action::SeekForward { 10.0 } else { -10.0 };
                if let Some(mpv) = &self.mpv {
                    let _ = mpv.seek_relative(delta).await;
                }
            }
            Action::SeekToLine(index) => self.seek_to_line(index).await,
            Action::SeekPrevLine | Action::SeekNextLine => {
                let Some(document) = self.state.lyrics_document() else {
                    return;
                };
                let current = self
                    .engine
                    .active_line()
                    .or_else(|| active_line_at(&document.lines, self.state.position_secs));
                let target = match (action, current) {
                    (Action::SeekNextLine, Some(i)) => i + 1,
                    (Action::SeekNextLine, None) => 0,
                    (_, i) => i.unwrap_or(0).saturating_sub(1),
                };
                if target < document.lines.len() {
                    self.seek_to_line(target).await;
                }
            }
            Action::ToggleTypewriter => {
                let enabled = !self.engine.typewriter_enabled();
                self.engine
                    .set_typewriter_enabled(enabled, &mut self.state.lyrics_pane);
                self.state.typewriter_enabled = enabled;
                self.state.status = format!("Typewriter {}", if enabled { "on" } else { "off" });
            }
            Action::ClearLyricsCache => {
                let dropped = self.resolver.cache_len();
                self.resolver.clear_cache();
                tracing::info!("cleared {} cached lyrics lookups", dropped);
                self.state.toast =
                    Some(Toast::success(format!("Lyrics cache cleared ({dropped})")));
            }
            _ => self.reduce(action),
        }
    }

    /// Pure state updates
    fn reduce(&mut self, action: Action) {
        let tracks = &mut self.state.tracks;
        match action {
            Action::Quit => self.state.should_quit = true,
            Action::NextScreen => self.state.screen = self.state.screen.next(),
            Action::SetScreen(screen) => self.state.screen = screen,
            Action::ListUp => tracks.select_by(-1),
            Action::ListDown => tracks.select_by(1),
            Action::PageUp => tracks.select_by(-(LIST_PAGE as isize)),
            Action::PageDown => tracks.select_by(LIST_PAGE as isize),
            Action::GoTop => tracks.selected = 0,
            Action::GoBottom => tracks.select_last(),
            Action::StartFilter => self.state.filter_input = Some(tracks.filter.clone()),
            Action::FilterChar(c) => {
                if let Some(input) = self.state.filter_input.as_mut() {
                    input.push(c);
                    tracks.set_filter(input);
                }
            }
            Action::FilterBackspace => {
                if let Some(input) = self.state.filter_input.as_mut() {
                    input.pop();
                    tracks.set_filter(input);
                }
            }
            Action::CancelFilter => {
                self.state.filter_input = None;
                tracks.set_filter("");
            }
            Action::ToggleShuffle => {
                self.state.queue.toggle_shuffle();
                let on = self.state.queue.is_shuffle_enabled();
                self.state.status = format!("Shuffle {}", if on { "on" } else { "off" });
            }
            Action::ToggleRepeatMode => {
                let mode = self.state.queue.cycle_repeat();
                self.state.status = format!("Repeat: {}", mode.label());
            }
            Action::LyricsScrollUp | Action::LyricsScrollDown => {
                let delta = if action == Action::LyricsScrollUp { -1 } else { 1 };
                let count = self.state.lyrics_document().map(|d| d.lines.len()).unwrap_or(0);
                self.state.lyrics_pane.scroll_by(delta, count);
            }
            Action::Resize => {}
            // Side-effecting actions are handled in handle_action
            _ => {}
        }
        self.state.tracks.update_scroll(LIST_HEIGHT);
    }

    async fn handle_player(&mut self, pe: PlayerEvent, tx: &mpsc::Sender<Event>) {
        match pe {
            PlayerEvent::Started => {
                self.state.paused = false;
                self.start_sync();
            }
            PlayerEvent::Paused => {
                self.state.paused = true;
                self.stop_sync();
            }
            PlayerEvent::Position { seconds } => self.state.position_secs = seconds,
            PlayerEvent::Duration { seconds } => self.state.duration_secs = seconds,
            PlayerEvent::Ended => {
                self.stop_sync();
                self.state.paused = true;
                self.state.position_secs = 0.0;
                match self.state.queue.on_track_ended().cloned() {
                    Some(next) => self.play_track(next, tx).await,
                    None => self.state.status = "Playback ended".into(),
                }
            }
            PlayerEvent::Error(e) => {
                tracing::warn!("{}", e);
                self.state.status = format!("Player error: {e}");
            }
        }
    }

    fn handle_network(&mut self, ne: NetworkEvent) {
        match ne {
            NetworkEvent::Error(e) => {
                self.state.tracks.loading = false;
                self.state.toast = Some(Toast::error(e.clone()));
                self.state.status = format!("Error: {e} (press F5 to retry)");
            }
            NetworkEvent::TracksLoaded { tracks } => {
                self.state.tracks.set_tracks(tracks);
                self.state.status = if self.state.tracks.is_empty() {
                    "No tracks in the catalog".into()
                } else {
                    format!("{} tracks", self.state.tracks.len())
                };
            }
            NetworkEvent::LyricsResolved { query, result } => {
                self.resolver.store(&query, result.clone());
                let current = self.state.now_playing.as_ref().map(Track::lyrics_query);
                if current.as_ref() == Some(&query) {
                    self.lyrics_task = None;
                    self.apply_lyrics(result);
                }
            }
        }
    }

    async fn play_track(&mut self, track: Track, tx: &mpsc::Sender<Event>) {
        tracing::info!("playing {}", track.display());
        self.stop_sync();
        self.state.position_secs = 0.0;
        self.state.duration_secs = 0.0;
        self.state.now_playing = Some(track.clone());
        self.load_lyrics(&track, tx);

        let Some(mpv) = &self.mpv else {
            self.state.status = "mpv not available".into();
            return;
        };
        let url = self.content.resolve_asset(&track.audio_url);
        match mpv.load_url(&url).await {
            Ok(()) => {
                // mpv reports no pause change when it was already playing
                self.state.paused = false;
                self.state.status = format!("Playing {}", track.display());
                self.start_sync();
            }
            Err(e) => self.state.status = format!("mpv load failed: {e:#}"),
        }
    }

    /// Show the track's lyrics, from the cache or a background resolve
    fn load_lyrics(&mut self, track: &Track, tx: &mpsc::Sender<Event>) {
        if let Some(task) = self.lyrics_task.take() {
            task.abort();
        }
        self.engine.load(None, &mut self.state.lyrics_pane);
        self.state.lyrics_pane.reset();

        let query = track.lyrics_query();
        if let Some(entry) = self.resolver.cached(&query) {
            tracing::debug!("lyrics cache hit for {}", track.display());
            let result = entry.resolved();
            self.apply_lyrics(result);
            return;
        }

        self.state.lyrics = LyricsStatus::Loading;
        let chain = self.resolver.chain();
        let tx = tx.clone();
        self.lyrics_task = Some(tokio::spawn(async move {
            let result = chain.resolve(&query).await;
            let _ = tx
                .send(Event::Network(NetworkEvent::LyricsResolved { query, result }))
                .await;
        }));
    }

    fn apply_lyrics(&mut self, result: Option<ResolvedLyrics>) {
        let Some(resolved) = result else {
            self.state.lyrics = LyricsStatus::NotFound;
            self.engine.load(None, &mut self.state.lyrics_pane);
            return;
        };
        self.state.lyrics = LyricsStatus::Loaded {
            document: resolved.document.clone(),
            source: resolved.source,
        };
        self.engine
            .load(Some(resolved.document), &mut self.state.lyrics_pane);
        self.state.lyrics_pane.reset();
        self.start_sync();
    }

    async fn seek_to_line(&mut self, index: usize) {
        let Some(target) = self.engine.seek_target(index) else {
            return;
        };
        if let Some(mpv) = &self.mpv
            && let Err(e) = mpv.seek_absolute(target).await
        {
            self.state.status = format!("seek failed: {e:#}");
            return;
        }
        self.state.position_secs = target;
        self.engine.sample(target, &mut self.state.lyrics_pane);
    }

    fn spawn_load_tracks(&mut self, tx: &mpsc::Sender<Event>) {
        if self.state.tracks.loading {
            return;
        }
        self.state.tracks.loading = true;
        self.state.status = "Loading tracks...".into();

        let content = self.content.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let ev = match content.load_tracks().await {
                Ok(tracks) => NetworkEvent::TracksLoaded { tracks },
                Err(e) => NetworkEvent::Error(format!("{e:#}")),
            };
            let _ = tx.send(Event::Network(ev)).await;
        });
    }
}
