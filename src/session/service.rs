use crate::api::client::SharedTrailsApi;
use crate::api::models::{ProgressStatus, ProgressUpdate};
use crate::player::adapter::{AdapterSignal, PlayerAdapter};
use crate::player::backend::{RawPlayerEvent, SharedPlayerBackend};
use crate::player::loader::ScriptLoader;
use crate::session::events::{SessionEvent, SessionEventsHandle};
use crate::session::sync::{ItemProgressRecord, ProgressSynchronizer};
use crate::session::watch::{CompletionGate, WatchState};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc as tokio_mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Timing knobs for a lesson session. Tests shrink these to keep wall-clock
/// time down; production uses the defaults.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cadence of the position poll while the lesson is mounted
    pub poll_interval: Duration,
    /// Trailing-debounce window for progress pushes
    pub debounce_window: Duration,
    /// Delay before re-checking that the embed honored a rate change
    pub rate_verify_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            debounce_window: Duration::from_secs(5),
            rate_verify_delay: Duration::from_millis(50),
        }
    }
}

/// Control commands sent to a lesson session
#[derive(Debug, Clone)]
pub enum SessionCommand {
    TogglePlay,
    Play,
    Pause,
    Seek(f64),
    SetVolume(i32),
    ToggleMute,
    SetPlaybackRate(f64),
    ToggleFullscreen,
    MarkComplete,
}

/// Handle to a running lesson session.
///
/// Dropping the last handle closes the command channel and tears the
/// session down: the poll loop stops and any pending debounced push is
/// cancelled without being flushed.
#[derive(Clone)]
pub struct LessonHandle {
    command_tx: tokio_mpsc::UnboundedSender<SessionCommand>,
    events: SessionEventsHandle,
}

impl LessonHandle {
    pub fn toggle_play(&self) {
        let _ = self.command_tx.send(SessionCommand::TogglePlay);
    }

    pub fn play(&self) {
        let _ = self.command_tx.send(SessionCommand::Play);
    }

    pub fn pause(&self) {
        let _ = self.command_tx.send(SessionCommand::Pause);
    }

    pub fn seek(&self, seconds: f64) {
        let _ = self.command_tx.send(SessionCommand::Seek(seconds));
    }

    pub fn set_volume(&self, volume: i32) {
        let _ = self.command_tx.send(SessionCommand::SetVolume(volume));
    }

    pub fn toggle_mute(&self) {
        let _ = self.command_tx.send(SessionCommand::ToggleMute);
    }

    pub fn set_playback_rate(&self, rate: f64) {
        let _ = self.command_tx.send(SessionCommand::SetPlaybackRate(rate));
    }

    pub fn toggle_fullscreen(&self) {
        let _ = self.command_tx.send(SessionCommand::ToggleFullscreen);
    }

    pub fn mark_complete(&self) {
        let _ = self.command_tx.send(SessionCommand::MarkComplete);
    }

    pub fn subscribe_events(&self) -> tokio_mpsc::UnboundedReceiver<SessionEvent> {
        self.events.subscribe_all()
    }
}

/// Result of a spawned progress write, reported back to the session loop
enum PushOutcome {
    Periodic {
        record: Option<ItemProgressRecord>,
    },
    Completion {
        record: Option<ItemProgressRecord>,
        refreshed: Option<crate::api::models::TrailProgress>,
    },
}

/// One mounted lesson: player adapter, watch state and progress
/// synchronizer for a single `(trail, item)` pair.
///
/// Navigation mounts a fresh session per item, so a stale response from a
/// previous item's fetches can never be applied to the new item's state.
pub struct LessonSession {
    api: SharedTrailsApi,
    config: SessionConfig,
    trail_id: i64,
    item_id: i64,
    adapter: PlayerAdapter,
    raw_events: tokio_mpsc::UnboundedReceiver<RawPlayerEvent>,
    raw_events_closed: bool,
    watch: WatchState,
    gate: CompletionGate,
    sync: ProgressSynchronizer,
    last_record: Option<ItemProgressRecord>,
    command_rx: tokio_mpsc::UnboundedReceiver<SessionCommand>,
    events_tx: tokio_mpsc::UnboundedSender<SessionEvent>,
    due_tx: tokio_mpsc::UnboundedSender<()>,
    due_rx: tokio_mpsc::UnboundedReceiver<()>,
    done_tx: tokio_mpsc::UnboundedSender<PushOutcome>,
    done_rx: tokio_mpsc::UnboundedReceiver<PushOutcome>,
}

impl LessonSession {
    pub fn start(
        api: SharedTrailsApi,
        backend: SharedPlayerBackend,
        loader: Arc<ScriptLoader>,
        config: SessionConfig,
        trail_id: i64,
        item_id: i64,
        runtime_handle: tokio::runtime::Handle,
    ) -> LessonHandle {
        let (command_tx, command_rx) = tokio_mpsc::unbounded_channel();
        let (events_tx, events_rx) = tokio_mpsc::unbounded_channel();

        let events_handle = SessionEventsHandle::new(events_rx, runtime_handle.clone());

        let handle = LessonHandle {
            command_tx,
            events: events_handle,
        };

        runtime_handle.spawn(async move {
            let session =
                Self::load(api, backend, loader, config, trail_id, item_id, command_rx, events_tx)
                    .await;
            if let Some(mut session) = session {
                session.run().await;
            }
        });

        handle
    }

    /// Perform the initial fetches and bring up the player. Returns `None`
    /// when the lesson data could not be loaded (the page shell shows the
    /// failure; there is nothing for the session to do without a detail).
    #[allow(clippy::too_many_arguments)]
    async fn load(
        api: SharedTrailsApi,
        backend: SharedPlayerBackend,
        loader: Arc<ScriptLoader>,
        config: SessionConfig,
        trail_id: i64,
        item_id: i64,
        command_rx: tokio_mpsc::UnboundedReceiver<SessionCommand>,
        events_tx: tokio_mpsc::UnboundedSender<SessionEvent>,
    ) -> Option<Self> {
        let _ = events_tx.send(SessionEvent::Loading);

        let (sections, progress, detail) = tokio::join!(
            api.sections_with_items(trail_id),
            api.trail_progress(trail_id),
            api.item_detail(trail_id, item_id),
        );

        let (sections, progress, detail) = match (sections, progress, detail) {
            (Ok(sections), Ok(progress), Ok(detail)) => (sections, progress, detail),
            (sections, progress, detail) => {
                let message = [
                    sections.err().map(|e| e.to_string()),
                    progress.err().map(|e| e.to_string()),
                    detail.err().map(|e| e.to_string()),
                ]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join("; ");
                warn!("Lesson load failed: {}", message);
                let _ = events_tx.send(SessionEvent::LoadFailed { message });
                return None;
            }
        };

        let gate = CompletionGate::new(detail.required_percentage_or_default());

        let raw_events = backend.subscribe_events();
        let mut adapter = PlayerAdapter::new(backend, loader, config.rate_verify_delay);
        if let Err(error) = adapter.initialize(&detail.video_id, 0).await {
            // The embed never came up; controls stay no-ops. The session
            // keeps running so the page still shows sidebar and aggregate.
            PlayerAdapter::log_init_failure(&error);
        }

        info!(trail_id, item_id, video = %detail.video_id, "Lesson session started");
        let _ = events_tx.send(SessionEvent::Loaded {
            sections,
            progress,
            detail,
        });

        let (due_tx, due_rx) = tokio_mpsc::unbounded_channel();
        let (done_tx, done_rx) = tokio_mpsc::unbounded_channel();

        Some(Self {
            api,
            sync: ProgressSynchronizer::new(config.debounce_window),
            config,
            trail_id,
            item_id,
            adapter,
            raw_events,
            raw_events_closed: false,
            watch: WatchState::default(),
            gate,
            last_record: None,
            command_rx,
            events_tx,
            due_tx,
            due_rx,
            done_tx,
            done_rx,
        })
    }

    async fn run(&mut self) {
        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                event = self.raw_events.recv(), if !self.raw_events_closed => match event {
                    Some(event) => self.handle_player_event(event).await,
                    None => self.raw_events_closed = true,
                },
                _ = poll.tick() => self.poll_player().await,
                Some(()) = self.due_rx.recv() => self.issue_periodic_push(),
                Some(outcome) = self.done_rx.recv() => self.handle_push_outcome(outcome),
            }
        }

        // Teardown: drop the armed debounce without flushing it. The last
        // unsynced seconds of watch time are deliberately not persisted.
        self.sync.cancel_pending();
        debug!(last_record = ?self.last_record, "Lesson session stopped");
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::TogglePlay => {
                if self.watch.is_playing {
                    self.adapter.pause().await;
                } else {
                    self.adapter.play().await;
                }
            }
            SessionCommand::Play => self.adapter.play().await,
            SessionCommand::Pause => self.adapter.pause().await,
            SessionCommand::Seek(seconds) => {
                let applied = self.adapter.seek(seconds).await;
                self.apply_position(applied, self.adapter.duration());
            }
            SessionCommand::SetVolume(volume) => {
                let (volume, muted) = self.adapter.set_volume(volume).await;
                self.watch.volume = volume;
                self.watch.muted = muted;
                self.emit_watch();
            }
            SessionCommand::ToggleMute => {
                self.watch.muted = self.adapter.toggle_mute().await;
                self.emit_watch();
            }
            SessionCommand::SetPlaybackRate(rate) => {
                self.watch.playback_rate = self.adapter.set_playback_rate(rate).await;
                self.emit_watch();
            }
            SessionCommand::ToggleFullscreen => {
                self.watch.is_fullscreen = self.adapter.toggle_fullscreen().await;
                self.emit_watch();
            }
            SessionCommand::MarkComplete => self.issue_completion(),
        }
    }

    async fn handle_player_event(&mut self, event: RawPlayerEvent) {
        let Some(signal) = self.adapter.handle_event(event).await else {
            return;
        };
        match signal {
            AdapterSignal::Ready {
                rates,
                volume,
                muted,
                current,
                duration,
            } => {
                self.watch.volume = volume;
                self.watch.muted = muted;
                if duration > 0.0 {
                    self.watch.current = current;
                    self.watch.duration = duration;
                }
                self.emit(SessionEvent::PlayerReady {
                    rates,
                    volume,
                    muted,
                });
                self.emit_watch();
            }
            AdapterSignal::PlayingChanged { playing } => {
                self.watch.is_playing = playing;
                self.emit_watch();
            }
            AdapterSignal::Ended => {
                self.watch.is_playing = false;
                self.watch.current = 0.0;
                self.emit(SessionEvent::Ended);
                self.emit_watch();
            }
        }
    }

    async fn poll_player(&mut self) {
        if let Some((current, duration)) = self.adapter.poll_once().await {
            self.apply_position(current, duration);
        }
    }

    /// Fold a new position into the watch state; only an actual position
    /// change re-arms the debounce.
    fn apply_position(&mut self, current: f64, duration: f64) {
        let changed = (current - self.watch.current).abs() > f64::EPSILON;
        self.watch.current = current;
        if duration > 0.0 {
            self.watch.duration = duration;
        }
        self.emit_watch();
        if changed {
            self.sync.schedule(self.due_tx.clone());
        }
    }

    fn emit_watch(&mut self) {
        let watched_percent = self.watch.watched_percent();
        let can_mark_complete = self.gate.observe(watched_percent);
        self.emit(SessionEvent::WatchUpdated {
            watch: self.watch.clone(),
            watched_percent,
            can_mark_complete,
        });
    }

    /// The debounce window elapsed: push the current position. The write is
    /// not serialized against earlier in-flight writes; the backend owns
    /// ordering.
    fn issue_periodic_push(&mut self) {
        self.sync.begin_push();
        let update = ProgressUpdate {
            status: if self.gate.satisfied() {
                ProgressStatus::Completed
            } else {
                ProgressStatus::InProgress
            },
            progress_value: self.watch.current.floor() as u32,
        };
        self.emit(SessionEvent::Saving { active: true });

        let api = self.api.clone();
        let (trail_id, item_id) = (self.trail_id, self.item_id);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let record = match api.put_item_progress(trail_id, item_id, &update).await {
                Ok(()) => Some(ItemProgressRecord {
                    status: update.status,
                    progress_value: update.progress_value,
                    updated_at: Utc::now(),
                }),
                Err(error) => {
                    // Swallowed: the next debounce cycle retries with
                    // fresher data.
                    debug!("Periodic progress push failed: {}", error);
                    None
                }
            };
            let _ = done_tx.send(PushOutcome::Periodic { record });
        });
    }

    /// Explicit "mark complete": always COMPLETED at the current position
    /// (the UI gates the button; the request itself does not re-validate),
    /// followed by an aggregate re-fetch. The server response replaces the
    /// cached aggregate.
    fn issue_completion(&mut self) {
        self.sync.begin_push();
        let update = ProgressUpdate {
            status: ProgressStatus::Completed,
            progress_value: self.watch.current.floor() as u32,
        };
        self.emit(SessionEvent::Saving { active: true });

        let api = self.api.clone();
        let (trail_id, item_id) = (self.trail_id, self.item_id);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let outcome = match api.put_item_progress(trail_id, item_id, &update).await {
                Ok(()) => {
                    let refreshed = match api.trail_progress(trail_id).await {
                        Ok(progress) => Some(progress),
                        Err(error) => {
                            warn!("Aggregate refresh after completion failed: {}", error);
                            None
                        }
                    };
                    PushOutcome::Completion {
                        record: Some(ItemProgressRecord {
                            status: update.status,
                            progress_value: update.progress_value,
                            updated_at: Utc::now(),
                        }),
                        refreshed,
                    }
                }
                Err(error) => {
                    // Only the transient saving indicator surfaces this.
                    warn!("Completion save failed: {}", error);
                    PushOutcome::Completion {
                        record: None,
                        refreshed: None,
                    }
                }
            };
            let _ = done_tx.send(outcome);
        });
    }

    fn handle_push_outcome(&mut self, outcome: PushOutcome) {
        self.sync.finish_push();
        match outcome {
            PushOutcome::Periodic { record } => {
                if let Some(record) = record {
                    self.last_record = Some(record.clone());
                    self.emit(SessionEvent::ProgressPushed { record });
                }
            }
            PushOutcome::Completion { record, refreshed } => {
                if let Some(record) = record {
                    self.last_record = Some(record.clone());
                    self.emit(SessionEvent::ProgressPushed { record });
                }
                if let Some(progress) = refreshed {
                    self.emit(SessionEvent::AggregateRefreshed { progress });
                }
            }
        }
        self.emit(SessionEvent::Saving {
            active: self.sync.is_saving(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events_tx.send(event);
    }
}
