#![cfg(feature = "test-utils")]

mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};

use crate::support::{make_detail, make_progress, make_sections, tracing_init, ITEM_ID, TRAIL_ID};
use trilha::api::models::{ItemDetail, ProgressStatus};
use trilha::api::SharedTrailsApi;
use trilha::player::{RawPlayerEvent, ScriptLoader, SharedPlayerBackend};
use trilha::session::{LessonHandle, LessonSession, SessionConfig, SessionEvent};
use trilha::test_support::{FakePlayerBackend, RecordingTrailsApi};

const RATES: &[f64] = &[0.5, 1.0, 1.5, 2.0];

/// Short windows so the debounce and poll cadence play out in test time
fn test_config() -> SessionConfig {
    SessionConfig {
        poll_interval: Duration::from_millis(20),
        debounce_window: Duration::from_millis(150),
        rate_verify_delay: Duration::from_millis(10),
    }
}

/// Test helper wiring a session to the recording API and the fake embed
struct SessionTestFixture {
    api: Arc<RecordingTrailsApi>,
    player: Arc<FakePlayerBackend>,
    handle: LessonHandle,
    events: tokio::sync::mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionTestFixture {
    fn new(detail: ItemDetail) -> Self {
        tracing_init();

        let duration = detail.duration_seconds as f64;
        let api = Arc::new(RecordingTrailsApi::new(
            make_sections(),
            make_progress(2, 8),
            detail,
        ));
        let player = Arc::new(FakePlayerBackend::new(duration, RATES.to_vec()));

        let shared_api: SharedTrailsApi = api.clone();
        let shared_player: SharedPlayerBackend = player.clone();
        let handle = LessonSession::start(
            shared_api,
            shared_player,
            Arc::new(ScriptLoader::new()),
            test_config(),
            TRAIL_ID,
            ITEM_ID,
            tokio::runtime::Handle::current(),
        );
        let events = handle.subscribe_events();

        Self {
            api,
            player,
            handle,
            events,
        }
    }

    /// Wait for the first event matching `predicate` within `timeout_duration`
    async fn wait_for_event<F>(
        &mut self,
        predicate: F,
        timeout_duration: Duration,
    ) -> Option<SessionEvent>
    where
        F: Fn(&SessionEvent) -> bool,
    {
        let deadline = Instant::now() + timeout_duration;

        while Instant::now() < deadline {
            match timeout(Duration::from_millis(100), self.events.recv()).await {
                Ok(Some(event)) => {
                    if predicate(&event) {
                        return Some(event);
                    }
                }
                Ok(None) => break,
                Err(_) => continue,
            }
        }

        None
    }

    /// Wait until a watch update reports `current` at the given position
    async fn wait_for_position(&mut self, seconds: f64) -> Option<SessionEvent> {
        self.wait_for_event(
            |event| {
                matches!(
                    event,
                    SessionEvent::WatchUpdated { watch, .. } if (watch.current - seconds).abs() < 0.01
                )
            },
            Duration::from_secs(2),
        )
        .await
    }
}

#[tokio::test]
async fn test_initial_load_emits_sidebar_progress_and_detail() {
    let mut fixture = SessionTestFixture::new(make_detail(572, Some(70)));

    let loaded = fixture
        .wait_for_event(
            |event| matches!(event, SessionEvent::Loaded { .. }),
            Duration::from_secs(2),
        )
        .await
        .expect("session should finish loading");

    let SessionEvent::Loaded {
        sections,
        progress,
        detail,
    } = loaded
    else {
        unreachable!();
    };
    assert_eq!(sections.len(), 1);
    assert_eq!(progress.done, 2);
    assert_eq!(progress.total, 8);
    assert_eq!(detail.id, ITEM_ID);
    assert_eq!(detail.video_id, "T7BCv5BKrls");

    // The embed was created for the item's video
    assert_eq!(fixture.player.create_calls(), 1);
    assert_eq!(fixture.player.loaded_video(), Some("T7BCv5BKrls".to_string()));
}

#[tokio::test]
async fn test_load_failure_surfaces_to_page_shell() {
    tracing_init();
    let api = Arc::new(RecordingTrailsApi::new(
        make_sections(),
        make_progress(0, 8),
        make_detail(572, Some(70)),
    ));
    let player = Arc::new(FakePlayerBackend::new(572.0, RATES.to_vec()));

    // Ask for an item the backend does not know
    let shared_api: SharedTrailsApi = api;
    let shared_player: SharedPlayerBackend = player;
    let handle = LessonSession::start(
        shared_api,
        shared_player,
        Arc::new(ScriptLoader::new()),
        test_config(),
        TRAIL_ID,
        9999,
        tokio::runtime::Handle::current(),
    );
    let mut events = handle.subscribe_events();

    let failed = timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await {
                Some(SessionEvent::LoadFailed { .. }) => break true,
                Some(_) => continue,
                None => break false,
            }
        }
    })
    .await;
    assert_eq!(failed, Ok(true), "load failure must be surfaced");
}

#[tokio::test]
async fn test_debounce_coalesces_rapid_updates_into_one_trailing_push() {
    let mut fixture = SessionTestFixture::new(make_detail(572, Some(70)));

    // A burst of position changes, each within the debounce window
    for seconds in [1.0, 2.0, 3.0, 4.0] {
        fixture.player.set_position(seconds);
        fixture.wait_for_position(seconds).await.expect("poll should pick up the move");
    }

    // Quiescence: exactly one push, carrying the last position
    sleep(Duration::from_millis(400)).await;
    let pushes = fixture.api.pushes();
    assert_eq!(pushes.len(), 1, "burst must collapse into a single trailing push");
    assert_eq!(pushes[0].trail_id, TRAIL_ID);
    assert_eq!(pushes[0].item_id, ITEM_ID);
    assert_eq!(pushes[0].update.progress_value, 4);
    assert_eq!(pushes[0].update.status, ProgressStatus::InProgress);

    // And it stays at one while the position stays still
    sleep(Duration::from_millis(300)).await;
    assert_eq!(fixture.api.pushes().len(), 1);
}

#[tokio::test]
async fn test_gate_opens_exactly_at_required_percentage() {
    let mut fixture = SessionTestFixture::new(make_detail(572, Some(70)));

    // 400/572 = 69.9%: still below the 70% gate
    fixture.player.set_position(400.0);
    let below = fixture.wait_for_position(400.0).await.expect("watch update");
    let SessionEvent::WatchUpdated {
        watched_percent,
        can_mark_complete,
        ..
    } = below
    else {
        unreachable!();
    };
    assert!((watched_percent - 69.93).abs() < 0.1);
    assert!(!can_mark_complete);

    // 401/572 = 70.1%: gate opens
    fixture.player.set_position(401.0);
    let above = fixture.wait_for_position(401.0).await.expect("watch update");
    let SessionEvent::WatchUpdated {
        can_mark_complete, ..
    } = above
    else {
        unreachable!();
    };
    assert!(can_mark_complete);
}

#[tokio::test]
async fn test_explicit_completion_pushes_and_refreshes_aggregate() {
    let mut fixture = SessionTestFixture::new(make_detail(572, Some(70)));

    fixture.player.set_position(401.0);
    fixture.wait_for_position(401.0).await.expect("watch update");

    // The server will report the new aggregate after the completion write
    fixture.api.set_progress(make_progress(3, 8));
    let fetches_before = fixture.api.progress_fetches();

    fixture.handle.mark_complete();

    let refreshed = fixture
        .wait_for_event(
            |event| matches!(event, SessionEvent::AggregateRefreshed { .. }),
            Duration::from_secs(2),
        )
        .await
        .expect("aggregate must be re-fetched after completion");

    let SessionEvent::AggregateRefreshed { progress } = refreshed else {
        unreachable!();
    };
    assert_eq!(progress.done, 3);

    let pushes = fixture.api.pushes();
    let completion = pushes.last().expect("completion push recorded");
    assert_eq!(completion.update.status, ProgressStatus::Completed);
    assert_eq!(completion.update.progress_value, 401);
    assert!(fixture.api.progress_fetches() > fetches_before);
}

#[tokio::test]
async fn test_required_percentage_defaults_to_70_when_absent() {
    let mut fixture = SessionTestFixture::new(make_detail(100, None));

    fixture.player.set_position(69.0);
    let below = fixture.wait_for_position(69.0).await.expect("watch update");
    assert!(matches!(
        below,
        SessionEvent::WatchUpdated {
            can_mark_complete: false,
            ..
        }
    ));

    fixture.player.set_position(71.0);
    let above = fixture.wait_for_position(71.0).await.expect("watch update");
    assert!(matches!(
        above,
        SessionEvent::WatchUpdated {
            can_mark_complete: true,
            ..
        }
    ));
}

#[tokio::test]
async fn test_periodic_push_failures_are_swallowed_and_retried() {
    let mut fixture = SessionTestFixture::new(make_detail(572, Some(70)));

    fixture.api.set_fail_pushes(true);
    fixture.player.set_position(10.0);
    fixture.wait_for_position(10.0).await.expect("watch update");

    sleep(Duration::from_millis(400)).await;
    assert!(fixture.api.pushes().is_empty(), "failed push records nothing");

    // Next cycle succeeds with fresher data; the session never surfaced an error
    fixture.api.set_fail_pushes(false);
    fixture.player.set_position(20.0);
    fixture.wait_for_position(20.0).await.expect("watch update");

    sleep(Duration::from_millis(400)).await;
    let pushes = fixture.api.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].update.progress_value, 20);
}

#[tokio::test]
async fn test_gate_stays_open_after_backward_seek() {
    let mut fixture = SessionTestFixture::new(make_detail(572, Some(70)));

    fixture.player.set_position(401.0);
    fixture.wait_for_position(401.0).await.expect("watch update");

    fixture.handle.seek(10.0);
    let after_seek = fixture.wait_for_position(10.0).await.expect("seek applied");
    let SessionEvent::WatchUpdated {
        can_mark_complete, ..
    } = after_seek
    else {
        unreachable!();
    };
    assert!(can_mark_complete, "completion gate must not close again");

    // Subsequent periodic pushes keep reporting COMPLETED
    sleep(Duration::from_millis(400)).await;
    let pushes = fixture.api.pushes();
    let last = pushes.last().expect("push after seek");
    assert_eq!(last.update.status, ProgressStatus::Completed);
    assert_eq!(last.update.progress_value, 10);
}

#[tokio::test]
async fn test_teardown_cancels_pending_push_without_flush() {
    let mut fixture = SessionTestFixture::new(make_detail(572, Some(70)));

    fixture.player.set_position(42.0);
    fixture.wait_for_position(42.0).await.expect("watch update");

    // Drop the handle while the debounce window is still open
    drop(fixture.handle);
    sleep(Duration::from_millis(500)).await;

    assert!(
        fixture.api.pushes().is_empty(),
        "pending debounced push must be cancelled, not flushed"
    );
}

#[tokio::test]
async fn test_volume_zero_mutes_through_the_session() {
    let mut fixture = SessionTestFixture::new(make_detail(572, Some(70)));
    fixture
        .wait_for_event(
            |event| matches!(event, SessionEvent::Loaded { .. }),
            Duration::from_secs(2),
        )
        .await
        .expect("loaded");

    fixture.handle.set_volume(0);
    let muted = fixture
        .wait_for_event(
            |event| {
                matches!(
                    event,
                    SessionEvent::WatchUpdated { watch, .. } if watch.volume == 0 && watch.muted
                )
            },
            Duration::from_secs(2),
        )
        .await;
    assert!(muted.is_some(), "volume 0 implies muted");

    fixture.handle.set_volume(50);
    let unmuted = fixture
        .wait_for_event(
            |event| {
                matches!(
                    event,
                    SessionEvent::WatchUpdated { watch, .. } if watch.volume == 50 && !watch.muted
                )
            },
            Duration::from_secs(2),
        )
        .await;
    assert!(unmuted.is_some(), "raising volume implies unmuted");
}

#[tokio::test]
async fn test_playback_rate_snaps_through_the_session() {
    let mut fixture = SessionTestFixture::new(make_detail(572, Some(70)));
    fixture
        .wait_for_event(
            |event| matches!(event, SessionEvent::Loaded { .. }),
            Duration::from_secs(2),
        )
        .await
        .expect("loaded");

    // Ready teaches the adapter the supported rates
    fixture.player.emit(RawPlayerEvent::Ready);
    fixture
        .wait_for_event(
            |event| matches!(event, SessionEvent::PlayerReady { .. }),
            Duration::from_secs(2),
        )
        .await
        .expect("player ready");

    fixture.handle.set_playback_rate(1.3);
    let updated = fixture
        .wait_for_event(
            |event| {
                matches!(
                    event,
                    SessionEvent::WatchUpdated { watch, .. } if watch.playback_rate == 1.5
                )
            },
            Duration::from_secs(2),
        )
        .await;
    assert!(updated.is_some(), "1.3 must snap to 1.5");
    assert_eq!(fixture.player.current_rate(), 1.5);
}

#[tokio::test]
async fn test_ended_resets_position_and_stays_put() {
    let mut fixture = SessionTestFixture::new(make_detail(572, Some(70)));
    fixture
        .wait_for_event(
            |event| matches!(event, SessionEvent::Loaded { .. }),
            Duration::from_secs(2),
        )
        .await
        .expect("loaded");

    fixture.handle.play();
    fixture.player.set_position(572.0);
    fixture.wait_for_position(572.0).await.expect("watch update");

    fixture.player.emit(RawPlayerEvent::Ended);
    fixture
        .wait_for_event(
            |event| matches!(event, SessionEvent::Ended),
            Duration::from_secs(2),
        )
        .await
        .expect("ended event");

    fixture.wait_for_position(0.0).await.expect("position reset to 0");
    assert!(!fixture.player.is_playing(), "ended must pause the embed");
    assert_eq!(fixture.player.seeks().last(), Some(&0.0));
}
