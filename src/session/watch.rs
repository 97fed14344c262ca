/// Client-held snapshot of the mounted player, updated on every poll tick
/// and on every control interaction. Discarded when the lesson unmounts.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchState {
    /// Playback position in seconds, `0 <= current <= duration`
    pub current: f64,
    /// Total duration in seconds; only meaningful once the embed is ready
    pub duration: f64,
    pub is_playing: bool,
    /// 0..=100
    pub volume: u8,
    pub muted: bool,
    pub playback_rate: f64,
    pub is_fullscreen: bool,
}

impl Default for WatchState {
    fn default() -> Self {
        Self {
            current: 0.0,
            duration: 0.0,
            is_playing: false,
            volume: 100,
            muted: false,
            playback_rate: 1.0,
            is_fullscreen: false,
        }
    }
}

impl WatchState {
    /// Fraction of the video the learner has reached, capped at 100.
    pub fn watched_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current / self.duration * 100.0).min(100.0)
        } else {
            0.0
        }
    }
}

/// Completion gate over the watched percentage.
///
/// Latched: once the threshold has been crossed the gate stays open for the
/// rest of the session, so a backward seek can never downgrade a completion
/// the learner already earned.
#[derive(Debug, Clone)]
pub struct CompletionGate {
    required: u8,
    satisfied: bool,
}

impl CompletionGate {
    pub fn new(required: u8) -> Self {
        Self {
            required,
            satisfied: false,
        }
    }

    /// Feed the latest watched percentage; returns whether the gate is open.
    pub fn observe(&mut self, watched_percent: f64) -> bool {
        if !self.satisfied && watched_percent >= self.required as f64 {
            self.satisfied = true;
        }
        self.satisfied
    }

    pub fn satisfied(&self) -> bool {
        self.satisfied
    }

    pub fn required(&self) -> u8 {
        self.required
    }
}
