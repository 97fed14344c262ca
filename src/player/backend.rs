use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc as tokio_mpsc;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Embed API failed to load: {0}")]
    ApiLoad(String),
    #[error("Embed host error: {0}")]
    Host(String),
}

/// Callback-style events surfaced by the underlying embed
#[derive(Debug, Clone, PartialEq)]
pub enum RawPlayerEvent {
    /// Player finished buffering/loading metadata
    Ready,
    PlayingChanged { playing: bool },
    /// Playback reached the end of the video
    Ended,
}

/// Imperative surface of an externally loaded, asynchronously-initialized
/// video player embed.
///
/// Control calls are best-effort: a call against a player that has not been
/// created yet is a no-op on the implementation side, never an error. Only
/// `load_api`/`create`/`cue` can fail, because the session needs to know the
/// embed never came up.
///
/// Implemented by the webview-backed embed in `ui::embed_player` and by
/// `test_support::FakePlayerBackend` for tests.
#[async_trait::async_trait]
pub trait PlayerBackend: Send + Sync {
    /// Load the provider's embed API script. Called at most once per
    /// application lifetime, through [`super::loader::ScriptLoader`].
    async fn load_api(&self) -> Result<(), PlayerError>;

    /// Build the embed for `video_id` inside the host container.
    async fn create(&self, video_id: &str, start_seconds: u32) -> Result<(), PlayerError>;

    /// Re-cue an existing embed to a new video without recreating the host.
    async fn cue(&self, video_id: &str, start_seconds: u32) -> Result<(), PlayerError>;

    async fn play(&self);
    async fn pause(&self);
    async fn seek_to(&self, seconds: f64);
    async fn set_volume(&self, volume: u8);
    async fn set_muted(&self, muted: bool);
    async fn set_playback_rate(&self, rate: f64);

    /// Rate the embed is actually using, if it can be queried.
    async fn playback_rate(&self) -> Option<f64>;

    /// Playback rates the embed supports for the current video.
    async fn available_rates(&self) -> Vec<f64>;

    /// `(current, duration)` in seconds; `None` until the embed can report
    /// a position, and duration stays 0.0 until metadata is known.
    async fn position(&self) -> Option<(f64, f64)>;

    /// `(volume 0..=100, muted)`
    async fn volume_state(&self) -> Option<(u8, bool)>;

    async fn set_fullscreen(&self, fullscreen: bool);

    /// Subscribe to ready/ended/play-state callbacks from the embed.
    fn subscribe_events(&self) -> tokio_mpsc::UnboundedReceiver<RawPlayerEvent>;
}

/// Shared handle to a [`PlayerBackend`] implementation
pub type SharedPlayerBackend = Arc<dyn PlayerBackend>;
