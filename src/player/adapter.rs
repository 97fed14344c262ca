use crate::player::backend::{PlayerError, RawPlayerEvent, SharedPlayerBackend};
use crate::player::loader::ScriptLoader;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Normalized signals the adapter derives from the embed's raw callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterSignal {
    /// Emitted exactly once per created embed, when metadata is available
    Ready {
        rates: Vec<f64>,
        volume: u8,
        muted: bool,
        current: f64,
        duration: f64,
    },
    PlayingChanged {
        playing: bool,
    },
    /// Playback finished; position has been reset to 0 and the embed paused
    Ended,
}

/// Wraps the external embed behind a uniform control surface: idempotent
/// initialization, clamped seeks, volume/mute duality, playback-rate
/// snapping and a pull-based position poll.
pub struct PlayerAdapter {
    backend: SharedPlayerBackend,
    loader: Arc<ScriptLoader>,
    rate_verify_delay: Duration,
    created: bool,
    ready_emitted: bool,
    current_video: Option<String>,
    rates: Vec<f64>,
    current: f64,
    duration: f64,
    volume: u8,
    muted: bool,
    playback_rate: f64,
    fullscreen: bool,
}

impl PlayerAdapter {
    pub fn new(
        backend: SharedPlayerBackend,
        loader: Arc<ScriptLoader>,
        rate_verify_delay: Duration,
    ) -> Self {
        Self {
            backend,
            loader,
            rate_verify_delay,
            created: false,
            ready_emitted: false,
            current_video: None,
            rates: Vec::new(),
            current: 0.0,
            duration: 0.0,
            volume: 100,
            muted: false,
            playback_rate: 1.0,
            fullscreen: false,
        }
    }

    /// Create the embed, or re-cue an existing one. Idempotent: calling with
    /// the same video again is a no-op; a different video re-cues without
    /// recreating the embed host.
    pub async fn initialize(
        &mut self,
        video_id: &str,
        start_seconds: u32,
    ) -> Result<(), PlayerError> {
        self.loader.ensure_loaded(&self.backend).await?;

        if !self.created {
            self.backend.create(video_id, start_seconds).await?;
            self.created = true;
            self.current_video = Some(video_id.to_string());
            self.current = start_seconds as f64;
        } else if self.current_video.as_deref() != Some(video_id) {
            self.backend.cue(video_id, start_seconds).await?;
            // A re-cued video starts paused at the requested position.
            self.backend.pause().await;
            self.current_video = Some(video_id.to_string());
            self.current = start_seconds as f64;
            self.duration = 0.0;
        }
        Ok(())
    }

    /// Pull the latest `(current, duration)` from the embed. Returns `None`
    /// until the duration is known (> 0).
    pub async fn poll_once(&mut self) -> Option<(f64, f64)> {
        let (current, duration) = self.backend.position().await?;
        if duration <= 0.0 {
            return None;
        }
        self.current = current;
        self.duration = duration;
        Some((current, duration))
    }

    /// Fold a raw embed callback into a normalized signal.
    pub async fn handle_event(&mut self, event: RawPlayerEvent) -> Option<AdapterSignal> {
        match event {
            RawPlayerEvent::Ready => {
                if let Some((current, duration)) = self.backend.position().await {
                    self.current = current;
                    self.duration = duration;
                }
                if let Some((volume, muted)) = self.backend.volume_state().await {
                    self.volume = volume;
                    self.muted = muted;
                }
                let rates = self.backend.available_rates().await;
                if !rates.is_empty() {
                    self.rates = rates;
                    // Make sure the starting rate is one the embed supports.
                    if !self.rates.contains(&self.playback_rate) {
                        self.playback_rate = 1.0;
                        self.backend.set_playback_rate(1.0).await;
                    }
                }
                if self.ready_emitted {
                    return None;
                }
                self.ready_emitted = true;
                Some(AdapterSignal::Ready {
                    rates: self.rates.clone(),
                    volume: self.volume,
                    muted: self.muted,
                    current: self.current,
                    duration: self.duration,
                })
            }
            RawPlayerEvent::PlayingChanged { playing } => {
                Some(AdapterSignal::PlayingChanged { playing })
            }
            RawPlayerEvent::Ended => {
                // Pause and rewind so the embed cannot fall through into
                // related-content UI. No auto-advance.
                self.backend.pause().await;
                self.backend.seek_to(0.0).await;
                self.current = 0.0;
                Some(AdapterSignal::Ended)
            }
        }
    }

    pub async fn play(&self) {
        self.backend.play().await;
    }

    pub async fn pause(&self) {
        self.backend.pause().await;
    }

    /// Seek to `seconds`, clamped into `[0, duration]`. Returns the applied
    /// position.
    pub async fn seek(&mut self, seconds: f64) -> f64 {
        let target = seconds.clamp(0.0, self.duration.max(0.0));
        self.backend.seek_to(target).await;
        self.current = target;
        target
    }

    /// Set the volume, clamped into `[0, 100]`. Volume and mute stay in
    /// sync: 0 mutes, anything above 0 unmutes.
    pub async fn set_volume(&mut self, volume: i32) -> (u8, bool) {
        let clamped = volume.clamp(0, 100) as u8;
        self.backend.set_volume(clamped).await;
        self.volume = clamped;
        if clamped == 0 && !self.muted {
            self.muted = true;
            self.backend.set_muted(true).await;
        }
        if clamped > 0 && self.muted {
            self.muted = false;
            self.backend.set_muted(false).await;
        }
        (self.volume, self.muted)
    }

    pub async fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.backend.set_muted(self.muted).await;
        self.muted
    }

    /// Snap `requested` to the nearest supported rate and apply it. Some
    /// embeds apply the rate a tick late, so the adapter re-checks after a
    /// short delay and re-applies if the embed did not honor it.
    pub async fn set_playback_rate(&mut self, requested: f64) -> f64 {
        let target = snap_rate(&self.rates, requested);
        self.backend.set_playback_rate(target).await;
        self.playback_rate = target;

        tokio::time::sleep(self.rate_verify_delay).await;
        match self.backend.playback_rate().await {
            Some(applied) if applied == target => {}
            applied => {
                debug!(?applied, rate = target, "embed did not honor playback rate, re-applying");
                self.backend.set_playback_rate(target).await;
            }
        }
        target
    }

    pub async fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.backend.set_fullscreen(self.fullscreen).await;
        self.fullscreen
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn available_rates(&self) -> &[f64] {
        &self.rates
    }

    /// Log-and-forget helper for initialization failures: the adapter layer
    /// never raises them past the session.
    pub fn log_init_failure(error: &PlayerError) {
        warn!("Player embed failed to initialize: {}", error);
    }
}

/// Nearest supported rate; ties break toward the first candidate in
/// iteration order. Falls back to 1.0 when no rates are known.
pub(crate) fn snap_rate(rates: &[f64], requested: f64) -> f64 {
    let mut best: Option<(f64, f64)> = None;
    for &rate in rates {
        let distance = (rate - requested).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((rate, distance)),
        }
    }
    best.map(|(rate, _)| rate).unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES: &[f64] = &[0.5, 1.0, 1.5, 2.0];

    #[test]
    fn test_snap_rate_picks_nearest() {
        assert_eq!(snap_rate(RATES, 1.3), 1.5);
        assert_eq!(snap_rate(RATES, 0.6), 0.5);
        assert_eq!(snap_rate(RATES, 3.0), 2.0);
    }

    #[test]
    fn test_snap_rate_tie_breaks_toward_first_candidate() {
        // 1.25 is equidistant from 1.0 and 1.5
        assert_eq!(snap_rate(RATES, 1.25), 1.0);
    }

    #[test]
    fn test_snap_rate_exact_match() {
        assert_eq!(snap_rate(RATES, 1.5), 1.5);
    }

    #[test]
    fn test_snap_rate_empty_falls_back_to_normal() {
        assert_eq!(snap_rate(&[], 1.3), 1.0);
    }
}
