use crate::cast::{CastLoadRequest, CastProvider, CastSession};
use crate::error::PlayerError;
use crate::fullscreen::FullscreenCall;
use crate::media::{MediaSource, Preload};
use crate::scheduler::{TaskHandle, TimerEvent, Timers};
use crate::store::KeyValueStore;
use async_trait::async_trait;
use media_player_catalog::{Catalog, CatalogError};
use media_player_models::{Episode, SeriesInfo};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug)]
pub struct MediaState {
    pub src: Option<String>,
    pub preload: Option<Preload>,
    pub paused: bool,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub volume: f64,
    pub muted: bool,
    pub block_autoplay: bool,
    pub calls: Vec<String>,
}

impl Default for MediaState {
    fn default() -> Self {
        Self {
            src: None,
            preload: None,
            paused: true,
            current_time: 0.0,
            duration: None,
            volume: 1.0,
            muted: false,
            block_autoplay: false,
            calls: Vec::new(),
        }
    }
}

/// In-memory media element; clones share state so tests can inspect it
/// after handing one copy to the player.
#[derive(Debug, Clone, Default)]
pub struct FakeMedia {
    state: Arc<Mutex<MediaState>>,
}

impl FakeMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MediaState> {
        self.state.lock().unwrap()
    }

    pub fn set_time(&self, seconds: f64) {
        self.state().current_time = seconds;
    }

    pub fn set_duration(&self, seconds: f64) {
        self.state().duration = Some(seconds);
    }

    pub fn block_autoplay(&self, blocked: bool) {
        self.state().block_autoplay = blocked;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }
}

impl MediaSource for FakeMedia {
    fn set_source(&mut self, url: &str) {
        let mut state = self.state();
        state.src = Some(url.to_string());
        state.current_time = 0.0;
        state.duration = None;
        state.paused = true;
        state.calls.push(format!("src:{}", url));
    }

    fn set_preload(&mut self, preload: Preload) {
        self.state().preload = Some(preload);
    }

    fn load(&mut self) {
        self.state().calls.push("load".to_string());
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        let mut state = self.state();
        if state.block_autoplay {
            state.calls.push("play:rejected".to_string());
            return Err(PlayerError::Media {
                operation: "play",
                reason: "NotAllowedError".to_string(),
            });
        }
        state.paused = false;
        state.calls.push("play".to_string());
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state();
        state.paused = true;
        state.calls.push("pause".to_string());
    }

    fn is_paused(&self) -> bool {
        self.state().paused
    }

    fn current_time(&self) -> f64 {
        self.state().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.state();
        state.current_time = seconds;
        state.calls.push(format!("seek:{}", seconds));
    }

    fn duration(&self) -> Option<f64> {
        self.state().duration
    }

    fn set_volume(&mut self, volume: f64) {
        self.state().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.state().muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.state().muted
    }
}

pub struct ScriptedCall {
    name: String,
    supported: bool,
    succeeds: bool,
    invoked: Arc<AtomicUsize>,
}

impl ScriptedCall {
    fn build(name: &str, supported: bool, succeeds: bool) -> Self {
        Self {
            name: name.to_string(),
            supported,
            succeeds,
            invoked: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn succeeding(name: &str) -> Self {
        Self::build(name, true, true)
    }

    pub fn failing(name: &str) -> Self {
        Self::build(name, true, false)
    }

    pub fn unsupported(name: &str) -> Self {
        Self::build(name, false, false)
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.invoked.clone()
    }
}

impl FullscreenCall for ScriptedCall {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn invoke(&mut self) -> Result<(), String> {
        self.invoked.fetch_add(1, Ordering::SeqCst);
        if self.succeeds {
            Ok(())
        } else {
            Err("TypeError: permission denied".to_string())
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeCastSession {
    pub calls: Mutex<Vec<String>>,
    pub loaded: Mutex<Option<CastLoadRequest>>,
}

impl FakeCastSession {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl CastSession for FakeCastSession {
    fn load_media(&self, request: &CastLoadRequest) -> Result<(), PlayerError> {
        self.record(format!("load:{}@{}", request.content_url, request.start_time));
        *self.loaded.lock().unwrap() = Some(request.clone());
        Ok(())
    }

    fn play(&self) -> Result<(), PlayerError> {
        self.record("play".to_string());
        Ok(())
    }

    fn pause(&self) -> Result<(), PlayerError> {
        self.record("pause".to_string());
        Ok(())
    }

    fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
        self.record(format!("seek:{}", seconds));
        Ok(())
    }

    fn set_volume(&self, volume: f64) -> Result<(), PlayerError> {
        self.record(format!("volume:{}", volume));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeCastProvider {
    pub available: AtomicBool,
    pub requests: AtomicUsize,
    pub ended: Mutex<Vec<bool>>,
}

impl FakeCastProvider {
    pub fn available() -> Self {
        let provider = Self::default();
        provider.available.store(true, Ordering::SeqCst);
        provider
    }
}

impl CastProvider for FakeCastProvider {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn request_session(&self) -> Result<(), PlayerError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn end_session(&self, stop_casting: bool) -> Result<(), PlayerError> {
        self.ended.lock().unwrap().push(stop_casting);
        Ok(())
    }
}

#[derive(Debug)]
struct ScheduledTimer {
    id: u64,
    due: Duration,
    period: Option<Duration>,
    event: TimerEvent,
}

#[derive(Debug, Default)]
struct TimerQueue {
    now: Duration,
    next_id: u64,
    scheduled: Vec<ScheduledTimer>,
}

/// Deterministic clock: nothing fires until `advance` is called.
#[derive(Debug, Clone, Default)]
pub struct ManualTimers {
    queue: Arc<Mutex<TimerQueue>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    fn schedule(&self, delay: Duration, period: Option<Duration>, event: TimerEvent) -> TaskHandle {
        let mut queue = self.queue.lock().unwrap();
        let id = queue.next_id;
        queue.next_id += 1;
        let due = queue.now + delay;
        queue.scheduled.push(ScheduledTimer {
            id,
            due,
            period,
            event,
        });

        let shared = self.queue.clone();
        TaskHandle::new(move || {
            if let Ok(mut queue) = shared.lock() {
                queue.scheduled.retain(|timer| timer.id != id);
            }
        })
    }

    /// Moves the clock forward and returns the events that fired, in order.
    pub fn advance(&self, by: Duration) -> Vec<TimerEvent> {
        let mut queue = self.queue.lock().unwrap();
        let target = queue.now + by;
        let mut fired = Vec::new();

        loop {
            let next = queue
                .scheduled
                .iter()
                .enumerate()
                .filter(|(_, timer)| timer.due <= target)
                .min_by_key(|(_, timer)| (timer.due, timer.id))
                .map(|(index, _)| index);
            let Some(index) = next else { break };

            let due = queue.scheduled[index].due;
            queue.now = due;
            let event = queue.scheduled[index].event;
            fired.push(event);
            match queue.scheduled[index].period {
                Some(period) => queue.scheduled[index].due = due + period,
                None => {
                    queue.scheduled.remove(index);
                }
            }
        }

        queue.now = target;
        fired
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().scheduled.len()
    }
}

impl Timers for ManualTimers {
    fn once(&self, delay: Duration, event: TimerEvent) -> TaskHandle {
        self.schedule(delay, None, event)
    }

    fn repeating(&self, period: Duration, event: TimerEvent) -> TaskHandle {
        self.schedule(period, Some(period), event)
    }
}

/// Memory store that keeps every value written, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Episode `s{season}e{number}` of series "show", 45 minutes long.
pub fn sample_episode(season: u32, number: u32) -> Episode {
    Episode {
        id: format!("s{}e{}", season, number),
        series_id: "show".to_string(),
        season_number: season,
        episode_number: number,
        title: format!("Episode {}", number),
        description: None,
        video_url: format!("https://cdn.example/show/{}/{}.mp4", season, number),
        duration: Some(45.0),
        available: true,
    }
}

/// Catalog answering from memory, or failing every request.
pub struct StaticCatalog {
    pub episodes: Vec<Episode>,
    pub title: String,
    pub fail: bool,
}

impl StaticCatalog {
    pub fn new(episodes: Vec<Episode>, title: &str) -> Self {
        Self {
            episodes,
            title: title.to_string(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            episodes: Vec::new(),
            title: String::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn episodes(&self, series_id: &str) -> Result<Vec<Episode>, CatalogError> {
        if self.fail {
            return Err(CatalogError::InvalidUrl(series_id.to_string()));
        }
        Ok(self.episodes.clone())
    }

    async fn series(&self, series_id: &str) -> Result<SeriesInfo, CatalogError> {
        if self.fail {
            return Err(CatalogError::InvalidUrl(series_id.to_string()));
        }
        Ok(SeriesInfo {
            id: series_id.to_string(),
            title: self.title.clone(),
            ..SeriesInfo::default()
        })
    }
}
