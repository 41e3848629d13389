use crate::error::EngineError;
use std::path::Path;
use std::time::Duration;

/// What the engine learned about a freshly loaded track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedTrack {
    /// Track length in PCM frames.
    pub total_frames: u64,
    pub sample_rate: u32,
}

impl LoadedTrack {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.total_frames as f64 / f64::from(self.sample_rate))
    }
}

/// The audio backend as seen by the playback controller.
///
/// One track at most is loaded at a time. The controller is the only caller,
/// always from the playback thread, so implementations need not be `Send`.
pub trait PlaybackEngine {
    /// Open the output device. Failure here disables playback for good.
    fn init(&mut self) -> Result<(), EngineError>;

    /// Prepare `path` for playback, stopped at frame 0.
    fn load(&mut self, path: &Path) -> Result<LoadedTrack, EngineError>;

    fn start(&mut self) -> Result<(), EngineError>;

    /// Stop output while keeping the cursor where it is.
    fn stop(&mut self) -> Result<(), EngineError>;

    fn is_playing(&self) -> bool;

    fn seek_to_frame(&mut self, frame: u64) -> Result<(), EngineError>;

    fn cursor_frame(&self) -> Result<u64, EngineError>;

    /// Stop and drop the loaded track, if any.
    fn unload(&mut self);

    /// Release the device. Called once when the playback thread exits.
    fn shutdown(&mut self);
}
