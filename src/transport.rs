// Shared transport state - the only thing the UI and playback threads both touch
//
// Every field is its own atomic. There is no lock spanning two fields, so a
// reader can see a half-applied change (e.g. `skip_next` already cleared but
// the index not yet moved). Both loops re-read everything each tick, so such
// combinations last at most one poll interval.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// `f64` stored as its bit pattern.
#[derive(Debug, Default)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

#[derive(Debug)]
pub struct TransportState {
    paused: AtomicBool,
    finished: AtomicBool,
    quit: AtomicBool,
    skip_next: AtomicBool,
    skip_prev: AtomicBool,
    /// Bumped by every `request_seek`.
    seek_generation: AtomicU64,
    /// Highest generation the playback side has dealt with.
    seek_applied: AtomicU64,
    seek_target: AtomicF64,
    progress: AtomicF64,
    current_index: AtomicUsize,
    duration_ms: AtomicU64,
}

impl Default for TransportState {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportState {
    /// Not paused, not finished, index 0.
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            quit: AtomicBool::new(false),
            skip_next: AtomicBool::new(false),
            skip_prev: AtomicBool::new(false),
            seek_generation: AtomicU64::new(0),
            seek_applied: AtomicU64::new(0),
            seek_target: AtomicF64::new(0.0),
            progress: AtomicF64::new(0.0),
            current_index: AtomicUsize::new(0),
            duration_ms: AtomicU64::new(0),
        }
    }

    // --- pause ---

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    /// Flip `paused` and return the new value.
    pub fn toggle_paused(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::AcqRel)
    }

    // --- finished ---

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn set_finished(&self, finished: bool) {
        self.finished.store(finished, Ordering::Release);
    }

    // --- quit (one way) ---

    pub fn should_quit(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::Release);
    }

    // --- skips ---

    pub fn request_skip_next(&self) {
        self.skip_next.store(true, Ordering::Release);
    }

    pub fn request_skip_prev(&self) {
        self.skip_prev.store(true, Ordering::Release);
    }

    /// Read and clear the next-track signal.
    pub fn take_skip_next(&self) -> bool {
        self.skip_next.swap(false, Ordering::AcqRel)
    }

    /// Read and clear the previous-track signal.
    pub fn take_skip_prev(&self) -> bool {
        self.skip_prev.swap(false, Ordering::AcqRel)
    }

    pub fn skip_pending(&self) -> bool {
        self.skip_next.load(Ordering::Acquire) || self.skip_prev.load(Ordering::Acquire)
    }

    // --- seek ---

    /// Post a seek. The target is written before the generation moves, so
    /// whoever sees the new generation also sees this target or a later one.
    pub fn request_seek(&self, percent: f64) {
        self.seek_target.store(percent);
        self.seek_generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn seek_requested(&self) -> bool {
        self.seek_generation.load(Ordering::Acquire) > self.seek_applied.load(Ordering::Acquire)
    }

    pub fn seek_target(&self) -> f64 {
        self.seek_target.load()
    }

    /// The outstanding seek as `(target, generation)`, if any.
    pub fn pending_seek(&self) -> Option<(f64, u64)> {
        let generation = self.seek_generation.load(Ordering::Acquire);
        if generation <= self.seek_applied.load(Ordering::Acquire) {
            return None;
        }
        Some((self.seek_target.load(), generation))
    }

    /// Mark the seek taken from `pending_seek` as handled. Returns `false`
    /// when a newer request arrived meanwhile; that one stays pending.
    pub fn finish_seek(&self, generation: u64) -> bool {
        self.seek_applied.fetch_max(generation, Ordering::AcqRel);
        !self.seek_requested()
    }

    /// Drop whatever seek is outstanding.
    pub fn clear_seek(&self) {
        let generation = self.seek_generation.load(Ordering::Acquire);
        self.seek_applied.fetch_max(generation, Ordering::AcqRel);
    }

    // --- position ---

    /// Elapsed share of the current track, 0.0..=100.0.
    pub fn progress(&self) -> f64 {
        self.progress.load()
    }

    pub fn set_progress(&self, percent: f64) {
        self.progress.store(percent.clamp(0.0, 100.0));
    }

    pub fn current_index(&self) -> usize {
        self.current_index.load(Ordering::Acquire)
    }

    pub fn set_current_index(&self, index: usize) {
        self.current_index.store(index, Ordering::Release);
    }

    /// Length of the loaded track in milliseconds, 0 when nothing is loaded.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms.load(Ordering::Acquire)
    }

    pub fn set_duration_ms(&self, ms: u64) {
        self.duration_ms.store(ms, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_defaults() {
        let state = TransportState::new();
        assert!(!state.is_paused());
        assert!(!state.is_finished());
        assert!(!state.should_quit());
        assert!(!state.seek_requested());
        assert!(!state.skip_pending());
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.progress(), 0.0);
    }

    #[test]
    fn test_toggle_returns_new_value() {
        let state = TransportState::new();
        assert!(state.toggle_paused());
        assert!(state.is_paused());
        assert!(!state.toggle_paused());
        assert!(!state.is_paused());
    }

    #[test]
    fn test_skip_signals_are_one_shot() {
        let state = TransportState::new();
        state.request_skip_next();
        assert!(state.take_skip_next());
        assert!(!state.take_skip_next());
        assert!(!state.take_skip_prev());
    }

    #[test]
    fn test_progress_is_clamped() {
        let state = TransportState::new();
        state.set_progress(150.0);
        assert_eq!(state.progress(), 100.0);
        state.set_progress(-3.0);
        assert_eq!(state.progress(), 0.0);
    }

    #[test]
    fn test_seek_target_visible_once_flag_is() {
        let state = Arc::new(TransportState::new());
        let writer = {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for i in 0..1000 {
                    state.request_seek(f64::from(i % 100));
                }
            })
        };

        // Whatever combination is observed, a raised flag always comes with
        // a target some writer actually stored.
        for _ in 0..1000 {
            if state.seek_requested() {
                let target = state.seek_target();
                assert!((0.0..100.0).contains(&target));
                assert_eq!(target.fract(), 0.0);
            }
        }
        writer.join().unwrap();
        assert!(state.seek_requested());
    }

    #[test]
    fn test_newer_seek_survives_finishing_an_older_one() {
        let state = TransportState::new();
        state.request_seek(20.0);
        let (target, generation) = state.pending_seek().unwrap();
        assert_eq!(target, 20.0);

        state.request_seek(60.0);
        assert!(!state.finish_seek(generation));
        assert!(state.seek_requested());

        let (target, generation) = state.pending_seek().unwrap();
        assert_eq!(target, 60.0);
        assert!(state.finish_seek(generation));
        assert!(state.pending_seek().is_none());
    }

    #[test]
    fn test_clear_seek_drops_pending_request() {
        let state = TransportState::new();
        state.request_seek(10.0);
        state.request_seek(30.0);
        state.clear_seek();
        assert!(!state.seek_requested());
        assert!(state.pending_seek().is_none());
    }

    #[test]
    fn test_quit_is_sticky() {
        let state = TransportState::new();
        state.request_quit();
        state.set_paused(true);
        state.set_finished(true);
        assert!(state.should_quit());
    }
}
