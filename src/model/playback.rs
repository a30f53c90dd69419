//! Playback state machine
//!
//! `PlayerState` is the single authoritative model of what is playing.
//! Every transport operation mutates it synchronously and returns the
//! instruction the audio output must carry out; asynchronous output
//! callbacks are applied through the `apply_*` methods, which discard
//! anything tagged with a stale generation so the latest explicit user
//! intent always wins.

use rand::Rng;

use crate::error::PlaybackError;

use super::queue::{advance, Advance, AdvanceTrigger};
use super::track::Track;
use super::types::RepeatMode;

pub const DEFAULT_VOLUME: f32 = 0.7;

/// Pressing previous after this many seconds restarts the current track
/// instead of moving to the prior index.
const PREVIOUS_RESTART_THRESHOLD: f64 = 3.0;

/// Instruction to load a stream and start it from time 0
#[derive(Clone, Debug, PartialEq)]
pub struct LoadRequest {
    pub url: String,
    pub generation: u64,
    /// Effective output volume (0.0 while muted)
    pub volume: f32,
}

/// Instruction to reposition the current stream
#[derive(Clone, Debug, PartialEq)]
pub struct SeekRequest {
    pub seconds: f64,
    pub generation: u64,
}

/// What the audio output must do after a synchronous state transition
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    Load(LoadRequest),
    Seek(SeekRequest),
    Resume,
    Pause,
    /// Output halts; queue and current track are kept
    Stopped,
    None,
}

/// Authoritative in-memory playback model, one per process
pub struct PlayerState {
    queue: Vec<Track>,
    current_index: usize,
    is_playing: bool,
    volume: f32,
    is_muted: bool,
    last_audible_volume: f32,
    repeat: RepeatMode,
    shuffle: bool,
    elapsed: f64,
    duration: Option<f64>,
    generation: u64,
}

/// Read-only projection of `PlayerState` handed to the UI surfaces
#[derive(Clone, Debug)]
pub struct PlaybackSnapshot {
    pub track: Option<Track>,
    pub queue: Vec<Track>,
    pub queue_position: usize,
    pub is_playing: bool,
    pub elapsed: f64,
    pub duration: Option<f64>,
    pub volume: f32,
    pub is_muted: bool,
    pub repeat: RepeatMode,
    pub shuffle: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            current_index: 0,
            is_playing: false,
            volume: DEFAULT_VOLUME,
            is_muted: false,
            last_audible_volume: DEFAULT_VOLUME,
            repeat: RepeatMode::Off,
            shuffle: false,
            elapsed: 0.0,
            duration: None,
            generation: 0,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.queue.get(self.current_index)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Volume actually sent to the output; 0.0 while muted
    pub fn effective_volume(&self) -> f32 {
        if self.is_muted { 0.0 } else { self.volume }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            track: self.current_track().cloned(),
            queue: self.queue.clone(),
            queue_position: self.current_index,
            is_playing: self.is_playing,
            elapsed: self.elapsed,
            duration: self.duration,
            volume: self.volume,
            is_muted: self.is_muted,
            repeat: self.repeat,
            shuffle: self.shuffle,
        }
    }

    // ========================================================================
    // Transport operations
    // ========================================================================

    /// Start playing `track`, replacing the queue with `context` when given.
    ///
    /// A track without a stream URL is rejected up front and the state is
    /// left untouched.
    pub fn begin(
        &mut self,
        track: Track,
        context: Vec<Track>,
    ) -> Result<StateChange, PlaybackError> {
        let url = track
            .stream_url()
            .ok_or_else(|| PlaybackError::NoStreamAvailable(track.name.clone()))?
            .to_string();

        if context.is_empty() {
            self.queue = vec![track];
            self.current_index = 0;
        } else {
            match context.iter().position(|t| t.id == track.id) {
                Some(index) => {
                    self.queue = context;
                    self.current_index = index;
                }
                None => {
                    // Keep the requested track both audible and current by
                    // queueing it ahead of the mismatched context
                    tracing::warn!(track_id = %track.id, "Track missing from its context queue, playing it ahead of the queue");
                    let mut queue = context;
                    queue.insert(0, track);
                    self.queue = queue;
                    self.current_index = 0;
                }
            }
        }

        self.elapsed = 0.0;
        self.duration = self.current_track().and_then(|t| t.duration);
        self.is_playing = true;
        self.generation += 1;

        Ok(StateChange::Load(LoadRequest {
            url,
            generation: self.generation,
            volume: self.effective_volume(),
        }))
    }

    /// Flip play/pause; no-op without a current track.
    ///
    /// Resuming at position 0 (after `stop` or a natural end of queue)
    /// reloads the stream rather than resuming, since the output holds
    /// nothing to resume in that case.
    pub fn toggle(&mut self) -> StateChange {
        if self.current_track().is_none() {
            return StateChange::None;
        }
        if self.is_playing {
            self.is_playing = false;
            return StateChange::Pause;
        }
        if self.elapsed == 0.0 {
            match self.load_index(self.current_index) {
                Ok(change) => change,
                Err(_) => StateChange::None,
            }
        } else {
            self.is_playing = true;
            StateChange::Resume
        }
    }

    /// Halt output and rewind, without unloading the queue or track.
    pub fn stop(&mut self) -> StateChange {
        self.is_playing = false;
        self.elapsed = 0.0;
        // Callbacks from the halted stream may still be in flight
        self.generation += 1;
        StateChange::Stopped
    }

    /// Reposition within the current track, clamped to the known duration.
    ///
    /// The elapsed time is updated optimistically; the output catches up
    /// asynchronously.
    pub fn seek(&mut self, seconds: f64) -> StateChange {
        if self.current_track().is_none() {
            return StateChange::None;
        }
        let upper = self.duration.unwrap_or(f64::INFINITY);
        let clamped = seconds.clamp(0.0, upper);
        self.elapsed = clamped;
        self.generation += 1;
        StateChange::Seek(SeekRequest {
            seconds: clamped,
            generation: self.generation,
        })
    }

    /// Set the volume, clamped to [0, 1]. Zero mutes; any positive value
    /// unmutes and becomes the restore point for the next unmute.
    pub fn set_volume(&mut self, volume: f32) {
        let v = volume.clamp(0.0, 1.0);
        self.volume = v;
        self.is_muted = v == 0.0;
        if v > 0.0 {
            self.last_audible_volume = v;
        }
    }

    /// Mute preserving the pre-mute volume, or restore it.
    pub fn toggle_mute(&mut self) {
        if self.is_muted {
            self.is_muted = false;
            self.volume = self.last_audible_volume;
        } else {
            if self.volume > 0.0 {
                self.last_audible_volume = self.volume;
            }
            self.is_muted = true;
        }
    }

    pub fn cycle_repeat(&mut self) {
        self.repeat = self.repeat.next();
    }

    /// Shuffle affects only advance selection; the stored queue order is
    /// kept so toggling shuffle off returns to the original order.
    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    /// Skip to the next track per the advance policy.
    pub fn next(&mut self, rng: &mut impl Rng) -> Result<StateChange, PlaybackError> {
        let decision = advance(
            AdvanceTrigger::ExplicitNext,
            self.repeat,
            self.shuffle,
            self.current_index,
            self.queue.len(),
            rng,
        );
        self.resolve(decision)
    }

    /// Skip backwards, or restart the current track when more than a few
    /// seconds have already played.
    pub fn previous(&mut self, rng: &mut impl Rng) -> Result<StateChange, PlaybackError> {
        if self.current_track().is_some() && self.elapsed > PREVIOUS_RESTART_THRESHOLD {
            return Ok(self.seek(0.0));
        }
        let decision = advance(
            AdvanceTrigger::ExplicitPrevious,
            self.repeat,
            self.shuffle,
            self.current_index,
            self.queue.len(),
            rng,
        );
        self.resolve(decision)
    }

    /// Jump straight to a queue entry (selection in the queue panel).
    pub fn play_from_queue(&mut self, index: usize) -> Result<StateChange, PlaybackError> {
        if index >= self.queue.len() {
            return Ok(StateChange::None);
        }
        self.load_index(index)
    }

    // ========================================================================
    // Asynchronous output callbacks
    // ========================================================================

    /// Stream metadata loaded; the stream's duration overrides the
    /// catalog's nominal one.
    pub fn apply_duration(&mut self, generation: u64, seconds: f64) {
        if generation != self.generation {
            tracing::trace!(generation, current = self.generation, "Discarding stale duration callback");
            return;
        }
        self.duration = Some(seconds);
        if self.elapsed > seconds {
            self.elapsed = seconds;
        }
    }

    /// Periodic position report from the output.
    pub fn apply_position(&mut self, generation: u64, seconds: f64) {
        if generation != self.generation {
            tracing::trace!(generation, current = self.generation, "Discarding stale position callback");
            return;
        }
        self.elapsed = match self.duration {
            Some(d) => seconds.min(d),
            None => seconds,
        };
    }

    /// The current stream played to completion. Decides what plays next
    /// per repeat/shuffle policy.
    pub fn apply_ended(
        &mut self,
        generation: u64,
        rng: &mut impl Rng,
    ) -> Result<StateChange, PlaybackError> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "Discarding stale end-of-track callback");
            return Ok(StateChange::None);
        }
        let decision = advance(
            AdvanceTrigger::TrackEnded,
            self.repeat,
            self.shuffle,
            self.current_index,
            self.queue.len(),
            rng,
        );
        self.resolve(decision)
    }

    /// The stream failed to load or decode. Rolls back to a consistent
    /// not-playing state; returns whether the failure was current.
    pub fn apply_failed(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "Discarding stale failure callback");
            return false;
        }
        self.is_playing = false;
        true
    }

    // ========================================================================

    fn resolve(&mut self, decision: Advance) -> Result<StateChange, PlaybackError> {
        match decision {
            Advance::Stay => Ok(StateChange::None),
            Advance::Stop => {
                self.is_playing = false;
                self.elapsed = 0.0;
                self.generation += 1;
                Ok(StateChange::Stopped)
            }
            Advance::Play(index) => self.load_index(index),
        }
    }

    /// Make `index` current and emit the load for it.
    fn load_index(&mut self, index: usize) -> Result<StateChange, PlaybackError> {
        let Some(track) = self.queue.get(index) else {
            // Contract violation: the advance policy only produces indices
            // within bounds. Abort the operation rather than surface it.
            tracing::error!(index, queue_len = self.queue.len(), "Advance produced an out-of-bounds index");
            return Ok(StateChange::None);
        };

        let name = track.name.clone();
        let Some(url) = track.stream_url().map(str::to_string) else {
            self.is_playing = false;
            self.generation += 1;
            return Err(PlaybackError::NoStreamAvailable(name));
        };

        self.current_index = index;
        self.elapsed = 0.0;
        self.duration = self.current_track().and_then(|t| t.duration);
        self.is_playing = true;
        self.generation += 1;

        Ok(StateChange::Load(LoadRequest {
            url,
            generation: self.generation,
            volume: self.effective_volume(),
        }))
    }
}

#[cfg(test)]
impl PlayerState {
    fn is_playing(&self) -> bool {
        self.is_playing
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn is_muted(&self) -> bool {
        self.is_muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::track::StreamSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Track {}", id),
            artists: vec!["Artist".into()],
            images: vec![],
            streams: vec![StreamSource {
                quality: "320kbps".into(),
                url: format!("https://cdn/{}", id),
            }],
            duration: Some(200.0),
        }
    }

    fn silent_track(id: &str) -> Track {
        Track { streams: vec![], ..track(id) }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn three_track_state() -> PlayerState {
        let mut state = PlayerState::new();
        let queue = vec![track("a"), track("b"), track("c")];
        state.begin(track("a"), queue).unwrap();
        state
    }

    #[test]
    fn begin_replaces_queue_and_positions_on_track() {
        let mut state = PlayerState::new();
        let queue = vec![track("a"), track("b"), track("c")];
        let change = state.begin(track("b"), queue).unwrap();

        assert!(matches!(change, StateChange::Load(_)));
        assert!(state.is_playing());
        assert_eq!(state.snapshot().queue_position, 1);
        assert_eq!(state.current_track().unwrap().id, "b");
        assert_eq!(state.snapshot().queue.len(), 3);
    }

    #[test]
    fn begin_without_context_makes_singleton_queue() {
        let mut state = PlayerState::new();
        state.begin(track("solo"), vec![]).unwrap();
        let snap = state.snapshot();
        assert_eq!(snap.queue.len(), 1);
        assert_eq!(snap.queue_position, 0);
        assert_eq!(snap.track.unwrap().id, "solo");
    }

    #[test]
    fn begin_with_mismatched_context_keeps_requested_track_current() {
        let mut state = PlayerState::new();
        let queue = vec![track("x"), track("y")];
        let change = state.begin(track("stranger"), queue).unwrap();

        // The loaded audio and the displayed current track are the same one
        match change {
            StateChange::Load(req) => assert!(req.url.ends_with("/stranger")),
            other => panic!("expected Load, got {:?}", other),
        }
        let snap = state.snapshot();
        assert_eq!(snap.queue_position, 0);
        assert_eq!(snap.track.unwrap().id, "stranger");
        assert_eq!(snap.queue.len(), 3);
    }

    #[test]
    fn begin_rejects_track_without_stream() {
        let mut state = three_track_state();
        let before = state.snapshot();

        let err = state.begin(silent_track("mute"), vec![]).unwrap_err();
        assert!(matches!(err, PlaybackError::NoStreamAvailable(_)));

        let after = state.snapshot();
        assert_eq!(after.queue.len(), before.queue.len());
        assert_eq!(after.queue_position, before.queue_position);
        assert_eq!(after.is_playing, before.is_playing);
        assert_eq!(after.track.unwrap().id, before.track.unwrap().id);
    }

    #[test]
    fn current_track_matches_queue_index_throughout() {
        let mut state = three_track_state();
        let mut rng = rng();
        for _ in 0..20 {
            state.next(&mut rng).unwrap();
            let snap = state.snapshot();
            assert!(snap.queue_position < snap.queue.len());
            assert_eq!(
                snap.track.unwrap().id,
                snap.queue[snap.queue_position].id
            );
        }
    }

    #[test]
    fn toggle_without_track_is_silent_noop() {
        let mut state = PlayerState::new();
        assert_eq!(state.toggle(), StateChange::None);
        assert!(!state.is_playing());
    }

    #[test]
    fn toggle_flips_between_resume_and_pause() {
        let mut state = three_track_state();
        state.apply_position(state.generation(), 12.0);
        assert_eq!(state.toggle(), StateChange::Pause);
        assert!(!state.is_playing());
        assert_eq!(state.toggle(), StateChange::Resume);
        assert!(state.is_playing());
    }

    #[test]
    fn toggle_after_stop_reloads_from_the_start() {
        let mut state = three_track_state();
        state.apply_position(state.generation(), 40.0);
        state.stop();

        match state.toggle() {
            StateChange::Load(req) => assert!(req.url.ends_with("/a")),
            other => panic!("expected Load, got {:?}", other),
        }
        assert!(state.is_playing());
        assert_eq!(state.snapshot().elapsed, 0.0);
    }

    #[test]
    fn stop_discards_callbacks_queued_before_it() {
        let mut state = three_track_state();
        let stale = state.generation();
        state.apply_position(stale, 30.0);
        state.stop();

        // A position report queued before the stop must not undo the rewind
        state.apply_position(stale, 42.0);
        assert_eq!(state.snapshot().elapsed, 0.0);

        // And the next toggle reloads instead of resuming a dropped sink
        match state.toggle() {
            StateChange::Load(req) => assert!(req.url.ends_with("/a")),
            other => panic!("expected a fresh Load, got {:?}", other),
        }
        assert!(state.is_playing());
    }

    #[test]
    fn stop_is_idempotent_and_keeps_queue() {
        let mut state = three_track_state();
        state.apply_position(state.generation(), 42.0);

        state.stop();
        let first = state.snapshot();
        state.stop();
        let second = state.snapshot();

        assert!(!first.is_playing);
        assert_eq!(first.elapsed, 0.0);
        assert_eq!(first.queue.len(), 3);
        assert_eq!(second.is_playing, first.is_playing);
        assert_eq!(second.elapsed, first.elapsed);
        assert_eq!(second.queue_position, first.queue_position);
        assert_eq!(second.track.unwrap().id, first.track.unwrap().id);
    }

    #[test]
    fn seek_clamps_to_duration_and_updates_optimistically() {
        let mut state = three_track_state();
        state.apply_duration(state.generation(), 100.0);

        match state.seek(500.0) {
            StateChange::Seek(req) => assert_eq!(req.seconds, 100.0),
            other => panic!("expected Seek, got {:?}", other),
        }
        assert_eq!(state.snapshot().elapsed, 100.0);

        match state.seek(-3.0) {
            StateChange::Seek(req) => assert_eq!(req.seconds, 0.0),
            other => panic!("expected Seek, got {:?}", other),
        }
    }

    #[test]
    fn seek_invalidates_pending_callbacks() {
        let mut state = three_track_state();
        let stale = state.generation();
        state.seek(30.0);

        // A position report queued before the seek must not rewind it
        state.apply_position(stale, 5.0);
        assert_eq!(state.snapshot().elapsed, 30.0);
    }

    #[test]
    fn mute_round_trip_restores_exact_volume() {
        let mut state = three_track_state();
        state.set_volume(0.6);

        state.toggle_mute();
        assert!(state.is_muted());
        assert_eq!(state.effective_volume(), 0.0);

        state.toggle_mute();
        assert!(!state.is_muted());
        assert_eq!(state.volume(), 0.6);
        assert_eq!(state.effective_volume(), 0.6);
    }

    #[test]
    fn zero_volume_mutes_and_positive_volume_unmutes() {
        let mut state = three_track_state();
        state.set_volume(0.8);
        state.set_volume(0.0);
        assert!(state.is_muted());

        state.toggle_mute();
        assert_eq!(state.volume(), 0.8);

        state.toggle_mute();
        assert!(state.is_muted());
        state.set_volume(0.3);
        assert!(!state.is_muted());
        assert_eq!(state.volume(), 0.3);
    }

    #[test]
    fn volume_is_clamped_to_unit_range() {
        let mut state = three_track_state();
        state.set_volume(3.5);
        assert_eq!(state.volume(), 1.0);
        state.set_volume(-1.0);
        assert_eq!(state.volume(), 0.0);
        assert!(state.is_muted());
    }

    #[test]
    fn repeat_one_replays_current_track_on_end() {
        let mut state = three_track_state();
        state.cycle_repeat(); // all
        state.cycle_repeat(); // one
        state.apply_position(state.generation(), 199.0);

        let change = state.apply_ended(state.generation(), &mut rng()).unwrap();
        match change {
            StateChange::Load(req) => assert!(req.url.ends_with("/a")),
            other => panic!("expected Load, got {:?}", other),
        }
        let snap = state.snapshot();
        assert_eq!(snap.queue_position, 0);
        assert_eq!(snap.elapsed, 0.0);
        assert!(snap.is_playing);
    }

    #[test]
    fn repeat_all_wraps_to_first_track_on_end() {
        let mut state = three_track_state();
        state.cycle_repeat(); // all
        let mut rng = rng();
        state.next(&mut rng).unwrap();
        state.next(&mut rng).unwrap();
        assert_eq!(state.snapshot().queue_position, 2);

        state.apply_ended(state.generation(), &mut rng).unwrap();
        let snap = state.snapshot();
        assert_eq!(snap.queue_position, 0);
        assert!(snap.is_playing);
    }

    #[test]
    fn repeat_off_stops_after_last_track() {
        let mut state = three_track_state();
        let mut rng = rng();
        state.next(&mut rng).unwrap();
        state.next(&mut rng).unwrap();
        assert_eq!(state.snapshot().queue_position, 2);

        let stale = state.generation();
        let change = state.apply_ended(stale, &mut rng).unwrap();
        assert_eq!(change, StateChange::Stopped);
        let snap = state.snapshot();
        assert!(!snap.is_playing);
        assert_eq!(snap.queue_position, 2);

        // End-of-queue stop also invalidates callbacks still in flight
        state.apply_position(stale, 7.0);
        assert_eq!(state.snapshot().elapsed, 0.0);
    }

    #[test]
    fn previous_restarts_after_threshold() {
        let mut state = three_track_state();
        let mut rng = rng();
        state.next(&mut rng).unwrap();
        state.apply_position(state.generation(), 5.0);

        let change = state.previous(&mut rng).unwrap();
        match change {
            StateChange::Seek(req) => assert_eq!(req.seconds, 0.0),
            other => panic!("expected Seek, got {:?}", other),
        }
        assert_eq!(state.snapshot().queue_position, 1);
    }

    #[test]
    fn previous_moves_back_early_in_track_and_wraps() {
        let mut state = three_track_state();
        let mut rng = rng();
        state.apply_position(state.generation(), 1.0);

        let change = state.previous(&mut rng).unwrap();
        assert!(matches!(change, StateChange::Load(_)));
        // From index 0 previous wraps to the last index
        assert_eq!(state.snapshot().queue_position, 2);
    }

    #[test]
    fn explicit_next_wraps_regardless_of_repeat() {
        let mut state = three_track_state();
        let mut rng = rng();
        state.next(&mut rng).unwrap();
        state.next(&mut rng).unwrap();
        state.next(&mut rng).unwrap();
        assert_eq!(state.snapshot().queue_position, 0);
    }

    #[test]
    fn stale_ended_callback_is_discarded() {
        let mut state = three_track_state();
        let stale = state.generation();
        let mut rng = rng();
        // User skipped before the queued end-of-track fired
        state.next(&mut rng).unwrap();

        let change = state.apply_ended(stale, &mut rng).unwrap();
        assert_eq!(change, StateChange::None);
        assert_eq!(state.snapshot().queue_position, 1);
    }

    #[test]
    fn failed_stream_rolls_back_to_not_playing() {
        let mut state = three_track_state();
        assert!(state.is_playing());

        assert!(state.apply_failed(state.generation()));
        assert!(!state.is_playing());

        // A stale failure from a replaced load changes nothing
        let mut rng = rng();
        state.next(&mut rng).unwrap();
        assert!(!state.apply_failed(0));
        assert!(state.is_playing());
    }

    #[test]
    fn duration_from_stream_overrides_nominal_and_clamps_elapsed() {
        let mut state = three_track_state();
        let generation = state.generation();
        state.apply_position(generation, 150.0);
        state.apply_duration(generation, 120.0);

        let snap = state.snapshot();
        assert_eq!(snap.duration, Some(120.0));
        assert_eq!(snap.elapsed, 120.0);

        // Later positions never exceed the known duration
        state.apply_position(generation, 500.0);
        assert_eq!(state.snapshot().elapsed, 120.0);
    }
}
