#![cfg(feature = "test-utils")]

mod support;

use std::sync::Arc;
use std::time::Duration;

use crate::support::tracing_init;
use trilha::player::{PlayerAdapter, RawPlayerEvent, ScriptLoader, SharedPlayerBackend};
use trilha::test_support::FakePlayerBackend;

const RATES: &[f64] = &[0.5, 1.0, 1.5, 2.0];

fn make_fake(duration: f64) -> Arc<FakePlayerBackend> {
    tracing_init();
    Arc::new(FakePlayerBackend::new(duration, RATES.to_vec()))
}

fn make_adapter(fake: &Arc<FakePlayerBackend>, loader: Arc<ScriptLoader>) -> PlayerAdapter {
    let backend: SharedPlayerBackend = fake.clone();
    PlayerAdapter::new(backend, loader, Duration::from_millis(10))
}

/// Bring an adapter up on `video`: embed created and duration known
async fn ready_adapter(fake: &Arc<FakePlayerBackend>, video: &str) -> PlayerAdapter {
    let mut adapter = make_adapter(fake, Arc::new(ScriptLoader::new()));
    adapter
        .initialize(video, 0)
        .await
        .expect("initialize should succeed");
    adapter
        .handle_event(RawPlayerEvent::Ready)
        .await
        .expect("first ready must produce a signal");
    adapter
}

#[tokio::test]
async fn test_initialize_is_idempotent_for_same_video() {
    let fake = make_fake(572.0);
    let mut adapter = make_adapter(&fake, Arc::new(ScriptLoader::new()));

    adapter.initialize("vid-a", 0).await.unwrap();
    adapter.initialize("vid-a", 0).await.unwrap();

    assert_eq!(fake.create_calls(), 1, "same video must not recreate the embed");
    assert_eq!(fake.cue_calls(), 0);
}

#[tokio::test]
async fn test_initialize_recues_for_different_video() {
    let fake = make_fake(572.0);
    let mut adapter = make_adapter(&fake, Arc::new(ScriptLoader::new()));

    adapter.initialize("vid-a", 0).await.unwrap();
    adapter.initialize("vid-b", 30).await.unwrap();

    assert_eq!(fake.create_calls(), 1, "embed host must be reused");
    assert_eq!(fake.cue_calls(), 1);
    assert_eq!(fake.loaded_video(), Some("vid-b".to_string()));
}

#[tokio::test]
async fn test_script_loads_once_across_player_instances() {
    let fake = make_fake(572.0);
    let loader = Arc::new(ScriptLoader::new());

    let mut first = make_adapter(&fake, loader.clone());
    let mut second = make_adapter(&fake, loader.clone());
    first.initialize("vid-a", 0).await.unwrap();
    second.initialize("vid-b", 0).await.unwrap();

    assert_eq!(fake.api_load_calls(), 1, "script injection must be shared");
    assert!(loader.is_loaded());
}

#[tokio::test]
async fn test_script_load_failure_surfaces_to_initialize() {
    let fake = make_fake(572.0);
    fake.set_fail_api_load(true);
    let mut adapter = make_adapter(&fake, Arc::new(ScriptLoader::new()));

    let result = adapter.initialize("vid-a", 0).await;
    assert!(result.is_err());
    assert_eq!(fake.create_calls(), 0, "no embed without the API script");
}

#[tokio::test]
async fn test_seek_clamps_into_duration() {
    let fake = make_fake(572.0);
    let mut adapter = ready_adapter(&fake, "vid-a").await;

    assert_eq!(adapter.seek(-5.0).await, 0.0);
    assert_eq!(adapter.seek(10_000.0).await, 572.0);
    assert_eq!(adapter.seek(30.0).await, 30.0);
    assert_eq!(fake.seeks(), vec![0.0, 572.0, 30.0]);
}

#[tokio::test]
async fn test_seek_before_duration_known_clamps_to_zero() {
    let fake = make_fake(572.0);
    let mut adapter = make_adapter(&fake, Arc::new(ScriptLoader::new()));
    adapter.initialize("vid-a", 0).await.unwrap();

    // No ready event yet: the adapter has no duration to clamp against
    assert_eq!(adapter.seek(100.0).await, 0.0);
}

#[tokio::test]
async fn test_volume_and_mute_stay_in_sync() {
    let fake = make_fake(572.0);
    let mut adapter = ready_adapter(&fake, "vid-a").await;

    assert_eq!(adapter.set_volume(0).await, (0, true));
    assert_eq!(fake.volume_and_muted(), (0, true));

    assert_eq!(adapter.set_volume(50).await, (50, false));
    assert_eq!(fake.volume_and_muted(), (50, false));
}

#[tokio::test]
async fn test_volume_clamps_to_valid_range() {
    let fake = make_fake(572.0);
    let mut adapter = ready_adapter(&fake, "vid-a").await;

    assert_eq!(adapter.set_volume(150).await, (100, false));
    assert_eq!(adapter.set_volume(-3).await, (0, true));
}

#[tokio::test]
async fn test_playback_rate_snaps_to_nearest_supported() {
    let fake = make_fake(572.0);
    let mut adapter = ready_adapter(&fake, "vid-a").await;

    assert_eq!(adapter.set_playback_rate(1.3).await, 1.5);
    assert_eq!(fake.current_rate(), 1.5);

    // Equidistant between 1.0 and 1.5: first candidate wins
    assert_eq!(adapter.set_playback_rate(1.25).await, 1.0);
    assert_eq!(fake.current_rate(), 1.0);
}

#[tokio::test]
async fn test_playback_rate_reapplied_when_embed_ignores_it() {
    let fake = make_fake(572.0);
    let mut adapter = ready_adapter(&fake, "vid-a").await;

    fake.drop_next_rate_change();
    let applied = adapter.set_playback_rate(2.0).await;

    assert_eq!(applied, 2.0);
    // The first set was swallowed; the post-delay verification re-applied it
    assert_eq!(fake.current_rate(), 2.0);
}

#[tokio::test]
async fn test_ended_pauses_and_resets_position() {
    let fake = make_fake(572.0);
    let mut adapter = ready_adapter(&fake, "vid-a").await;
    adapter.play().await;
    fake.set_position(572.0);
    adapter.poll_once().await.unwrap();

    let signal = adapter.handle_event(RawPlayerEvent::Ended).await;
    assert!(signal.is_some());

    assert!(!fake.is_playing());
    assert_eq!(adapter.current(), 0.0);
    assert_eq!(fake.seeks().last(), Some(&0.0));
}

#[tokio::test]
async fn test_ready_snapshot_emitted_exactly_once() {
    let fake = make_fake(572.0);
    let mut adapter = make_adapter(&fake, Arc::new(ScriptLoader::new()));
    adapter.initialize("vid-a", 0).await.unwrap();

    let first = adapter.handle_event(RawPlayerEvent::Ready).await;
    assert!(first.is_some());
    assert_eq!(adapter.available_rates(), RATES);

    let second = adapter.handle_event(RawPlayerEvent::Ready).await;
    assert!(second.is_none(), "ready snapshot is one-shot");
}

#[tokio::test]
async fn test_controls_before_create_are_noops() {
    let fake = make_fake(572.0);
    let mut adapter = make_adapter(&fake, Arc::new(ScriptLoader::new()));

    // No initialize: every control call is a best-effort no-op
    adapter.play().await;
    adapter.seek(100.0).await;
    assert!(!fake.is_playing());
    assert!(fake.seeks().is_empty());
    assert!(adapter.poll_once().await.is_none());
}

#[tokio::test]
async fn test_poll_reports_position_once_duration_known() {
    let fake = make_fake(572.0);
    let mut adapter = make_adapter(&fake, Arc::new(ScriptLoader::new()));
    adapter.initialize("vid-a", 0).await.unwrap();

    fake.set_position(12.5);
    assert_eq!(adapter.poll_once().await, Some((12.5, 572.0)));
    assert_eq!(adapter.current(), 12.5);
    assert_eq!(adapter.duration(), 572.0);
}
