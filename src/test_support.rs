// Test support utilities for both unit and integration tests

use crate::api::client::{ApiError, TrailsApi};
use crate::api::models::{
    Certificate, EnrollResponse, ItemDetail, LoginResponse, ProgressUpdate, Section, Trail,
    TrailProgress, User,
};
use crate::player::backend::{PlayerBackend, PlayerError, RawPlayerEvent};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc as tokio_mpsc;

/// Scripted stand-in for the external video embed.
///
/// Tests drive it directly (`set_position`, `emit`) and assert on the calls
/// the adapter made (`create_calls`, `seeks`, ...). Control calls issued
/// before the player was created are no-ops, like the real embed wrapper.
pub struct FakePlayerBackend {
    state: Mutex<FakePlayerState>,
    subscribers: Mutex<Vec<tokio_mpsc::UnboundedSender<RawPlayerEvent>>>,
}

struct FakePlayerState {
    fail_api_load: bool,
    api_load_calls: u32,
    create_calls: u32,
    cue_calls: u32,
    loaded_video: Option<String>,
    playing: bool,
    position: f64,
    duration: f64,
    volume: u8,
    muted: bool,
    rate: f64,
    rates: Vec<f64>,
    drop_next_rate_change: bool,
    fullscreen: bool,
    seeks: Vec<f64>,
}

impl FakePlayerBackend {
    pub fn new(duration: f64, rates: Vec<f64>) -> Self {
        Self {
            state: Mutex::new(FakePlayerState {
                fail_api_load: false,
                api_load_calls: 0,
                create_calls: 0,
                cue_calls: 0,
                loaded_video: None,
                playing: false,
                position: 0.0,
                duration,
                volume: 100,
                muted: false,
                rate: 1.0,
                rates,
                drop_next_rate_change: false,
                fullscreen: false,
                seeks: Vec::new(),
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Push a raw embed event to every subscriber
    pub fn emit(&self, event: RawPlayerEvent) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Move the playhead (what the next position poll will report)
    pub fn set_position(&self, seconds: f64) {
        self.state.lock().unwrap().position = seconds;
    }

    pub fn set_fail_api_load(&self, fail: bool) {
        self.state.lock().unwrap().fail_api_load = fail;
    }

    /// Swallow the next `set_playback_rate` call, simulating an embed that
    /// applies the rate a tick late
    pub fn drop_next_rate_change(&self) {
        self.state.lock().unwrap().drop_next_rate_change = true;
    }

    pub fn api_load_calls(&self) -> u32 {
        self.state.lock().unwrap().api_load_calls
    }

    pub fn create_calls(&self) -> u32 {
        self.state.lock().unwrap().create_calls
    }

    pub fn cue_calls(&self) -> u32 {
        self.state.lock().unwrap().cue_calls
    }

    pub fn loaded_video(&self) -> Option<String> {
        self.state.lock().unwrap().loaded_video.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    pub fn current_rate(&self) -> f64 {
        self.state.lock().unwrap().rate
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.state.lock().unwrap().seeks.clone()
    }

    pub fn volume_and_muted(&self) -> (u8, bool) {
        let state = self.state.lock().unwrap();
        (state.volume, state.muted)
    }
}

#[async_trait::async_trait]
impl PlayerBackend for FakePlayerBackend {
    async fn load_api(&self) -> Result<(), PlayerError> {
        let mut state = self.state.lock().unwrap();
        state.api_load_calls += 1;
        if state.fail_api_load {
            return Err(PlayerError::ApiLoad("scripted failure".to_string()));
        }
        Ok(())
    }

    async fn create(&self, video_id: &str, start_seconds: u32) -> Result<(), PlayerError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        state.loaded_video = Some(video_id.to_string());
        state.position = start_seconds as f64;
        Ok(())
    }

    async fn cue(&self, video_id: &str, start_seconds: u32) -> Result<(), PlayerError> {
        let mut state = self.state.lock().unwrap();
        state.cue_calls += 1;
        state.loaded_video = Some(video_id.to_string());
        state.position = start_seconds as f64;
        Ok(())
    }

    async fn play(&self) {
        let mut state = self.state.lock().unwrap();
        if state.loaded_video.is_some() {
            state.playing = true;
        }
    }

    async fn pause(&self) {
        let mut state = self.state.lock().unwrap();
        if state.loaded_video.is_some() {
            state.playing = false;
        }
    }

    async fn seek_to(&self, seconds: f64) {
        let mut state = self.state.lock().unwrap();
        if state.loaded_video.is_some() {
            state.position = seconds;
            state.seeks.push(seconds);
        }
    }

    async fn set_volume(&self, volume: u8) {
        self.state.lock().unwrap().volume = volume;
    }

    async fn set_muted(&self, muted: bool) {
        self.state.lock().unwrap().muted = muted;
    }

    async fn set_playback_rate(&self, rate: f64) {
        let mut state = self.state.lock().unwrap();
        if state.drop_next_rate_change {
            state.drop_next_rate_change = false;
            return;
        }
        state.rate = rate;
    }

    async fn playback_rate(&self) -> Option<f64> {
        Some(self.state.lock().unwrap().rate)
    }

    async fn available_rates(&self) -> Vec<f64> {
        self.state.lock().unwrap().rates.clone()
    }

    async fn position(&self) -> Option<(f64, f64)> {
        let state = self.state.lock().unwrap();
        state
            .loaded_video
            .as_ref()
            .map(|_| (state.position, state.duration))
    }

    async fn volume_state(&self) -> Option<(u8, bool)> {
        let state = self.state.lock().unwrap();
        Some((state.volume, state.muted))
    }

    async fn set_fullscreen(&self, fullscreen: bool) {
        self.state.lock().unwrap().fullscreen = fullscreen;
    }

    fn subscribe_events(&self) -> tokio_mpsc::UnboundedReceiver<RawPlayerEvent> {
        let (tx, rx) = tokio_mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }
}

/// One recorded progress PUT
#[derive(Debug, Clone, PartialEq)]
pub struct PushRecord {
    pub trail_id: i64,
    pub item_id: i64,
    pub update: ProgressUpdate,
}

/// Canned-response backend double that records every progress write.
pub struct RecordingTrailsApi {
    sections: Vec<Section>,
    progress: Mutex<TrailProgress>,
    detail: ItemDetail,
    pushes: Mutex<Vec<PushRecord>>,
    progress_fetch_count: AtomicU32,
    fail_pushes: AtomicBool,
}

impl RecordingTrailsApi {
    pub fn new(sections: Vec<Section>, progress: TrailProgress, detail: ItemDetail) -> Self {
        Self {
            sections,
            progress: Mutex::new(progress),
            detail,
            pushes: Mutex::new(Vec::new()),
            progress_fetch_count: AtomicU32::new(0),
            fail_pushes: AtomicBool::new(false),
        }
    }

    /// All progress PUTs received so far, in arrival order
    pub fn pushes(&self) -> Vec<PushRecord> {
        self.pushes.lock().unwrap().clone()
    }

    pub fn progress_fetches(&self) -> u32 {
        self.progress_fetch_count.load(Ordering::SeqCst)
    }

    /// Make subsequent progress PUTs fail
    pub fn set_fail_pushes(&self, fail: bool) {
        self.fail_pushes.store(fail, Ordering::SeqCst);
    }

    /// Replace the aggregate the server will report next
    pub fn set_progress(&self, progress: TrailProgress) {
        *self.progress.lock().unwrap() = progress;
    }
}

#[async_trait::async_trait]
impl TrailsApi for RecordingTrailsApi {
    async fn list_trails(&self) -> Result<Vec<Trail>, ApiError> {
        Ok(Vec::new())
    }

    async fn trail(&self, _trail_id: i64) -> Result<Trail, ApiError> {
        Err(ApiError::NotFound)
    }

    async fn sections_with_items(&self, _trail_id: i64) -> Result<Vec<Section>, ApiError> {
        Ok(self.sections.clone())
    }

    async fn trail_progress(&self, _trail_id: i64) -> Result<TrailProgress, ApiError> {
        self.progress_fetch_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.progress.lock().unwrap().clone())
    }

    async fn item_detail(&self, _trail_id: i64, item_id: i64) -> Result<ItemDetail, ApiError> {
        if item_id == self.detail.id {
            Ok(self.detail.clone())
        } else {
            Err(ApiError::NotFound)
        }
    }

    async fn put_item_progress(
        &self,
        trail_id: i64,
        item_id: i64,
        update: &ProgressUpdate,
    ) -> Result<(), ApiError> {
        if self.fail_pushes.load(Ordering::SeqCst) {
            return Err(ApiError::NotFound);
        }
        self.pushes.lock().unwrap().push(PushRecord {
            trail_id,
            item_id,
            update: update.clone(),
        });
        Ok(())
    }

    async fn enroll(&self, trail_id: i64) -> Result<EnrollResponse, ApiError> {
        Ok(EnrollResponse {
            ok: true,
            trail_id,
            first_item_id: self
                .sections
                .first()
                .and_then(|section| section.items.first())
                .map(|item| item.id),
            progress: Some(self.progress.lock().unwrap().clone()),
        })
    }

    async fn login(&self, email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        Ok(LoginResponse {
            user: Some(User {
                id: "user-1".to_string(),
                username: "learner".to_string(),
                email: email.to_string(),
                role: "STUDENT".to_string(),
                profile_pic_url: None,
                banner_pic_url: None,
            }),
            token: Some("test-token".to_string()),
        })
    }

    async fn me(&self) -> Result<Option<User>, ApiError> {
        Ok(None)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn certificate(&self, _cert_hash: &str) -> Result<Certificate, ApiError> {
        Err(ApiError::NotFound)
    }
}
