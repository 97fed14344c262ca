use crate::api::models::{ItemDetail, Section, TrailProgress};
use crate::session::{LessonHandle, LessonSession, SessionConfig, SessionEvent, WatchState};
use crate::ui::embed_player::{pump_embed_requests, EmbedPlayerBackend};
use crate::ui::AppContext;
use dioxus::prelude::*;

/// DOM id of the div the embed player is created in
pub const LESSON_PLAYER_CONTAINER_ID: &str = "lesson-player";

/// Signals the lesson page renders from, fed by the session's event stream
#[derive(Clone)]
pub struct LessonViewState {
    pub handle: LessonHandle,
    pub loading: Signal<bool>,
    pub load_error: Signal<Option<String>>,
    pub sections: Signal<Vec<Section>>,
    pub progress: Signal<Option<TrailProgress>>,
    pub detail: Signal<Option<ItemDetail>>,
    pub watch: Signal<WatchState>,
    pub watched_percent: Signal<f64>,
    pub can_mark_complete: Signal<bool>,
    pub rates: Signal<Vec<f64>>,
    pub saving: Signal<bool>,
}

/// Start a lesson session for `(trail_id, item_id)` and mirror its events
/// into signals.
///
/// The caller must remount (key) its component per item so the hook re-runs
/// on navigation; dropping the old handle tears the old session down.
pub fn use_lesson_session(trail_id: i64, item_id: i64) -> LessonViewState {
    let context = use_context::<AppContext>();

    let mut loading = use_signal(|| true);
    let mut load_error = use_signal(|| None::<String>);
    let mut sections = use_signal(Vec::<Section>::new);
    let mut progress = use_signal(|| None::<TrailProgress>);
    let mut detail = use_signal(|| None::<ItemDetail>);
    let mut watch = use_signal(WatchState::default);
    let mut watched_percent = use_signal(|| 0.0f64);
    let mut can_mark_complete = use_signal(|| false);
    let mut rates = use_signal(Vec::<f64>::new);
    let mut saving = use_signal(|| false);

    let handle = use_hook(move || {
        let (backend, js_rx) = EmbedPlayerBackend::new(LESSON_PLAYER_CONTAINER_ID);
        spawn(pump_embed_requests(backend.clone(), js_rx));

        let player: crate::player::SharedPlayerBackend = backend;
        let handle = LessonSession::start(
            context.api.clone(),
            player,
            context.script_loader.clone(),
            SessionConfig::default(),
            trail_id,
            item_id,
            tokio::runtime::Handle::current(),
        );

        let mut events = handle.subscribe_events();
        spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    SessionEvent::Loading => loading.set(true),
                    SessionEvent::Loaded {
                        sections: loaded_sections,
                        progress: loaded_progress,
                        detail: loaded_detail,
                    } => {
                        sections.set(loaded_sections);
                        progress.set(Some(loaded_progress));
                        detail.set(Some(loaded_detail));
                        loading.set(false);
                    }
                    SessionEvent::LoadFailed { message } => {
                        load_error.set(Some(message));
                        loading.set(false);
                    }
                    SessionEvent::PlayerReady {
                        rates: available, ..
                    } => rates.set(available),
                    SessionEvent::WatchUpdated {
                        watch: new_watch,
                        watched_percent: percent,
                        can_mark_complete: can,
                    } => {
                        watch.set(new_watch);
                        watched_percent.set(percent);
                        can_mark_complete.set(can);
                    }
                    SessionEvent::Saving { active } => saving.set(active),
                    SessionEvent::AggregateRefreshed {
                        progress: refreshed,
                    } => progress.set(Some(refreshed)),
                    SessionEvent::ProgressPushed { .. } | SessionEvent::Ended => {}
                }
            }
        });

        handle
    });

    LessonViewState {
        handle,
        loading,
        load_error,
        sections,
        progress,
        detail,
        watch,
        watched_percent,
        can_mark_complete,
        rates,
        saving,
    }
}
