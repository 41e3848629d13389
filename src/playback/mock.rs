// Scripted engine for driving the controller without an audio device

use super::engine::{LoadedTrack, PlaybackEngine};
use crate::error::EngineError;
use crate::transport::TransportState;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const SAMPLE_RATE: u32 = 1_000;

#[derive(Debug, Default)]
pub struct MockEngine {
    tracks: HashMap<PathBuf, Option<u64>>,
    fail_init: bool,
    fail_seek: bool,
    shutdown_delay: Option<Duration>,
    shut_down: bool,
    loaded: Option<(PathBuf, u64)>,
    playing: bool,
    cursor: u64,
    starts: usize,
    stops: usize,
    unloads: usize,
    load_attempts: usize,
    seeks: Vec<u64>,
    /// Seek posted from inside `seek_to_frame(frame)`, as a UI racing the controller would.
    seek_during: Option<(u64, Arc<TransportState>, f64)>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playable(mut self, path: &str, total_frames: u64) -> Self {
        self.tracks.insert(PathBuf::from(path), Some(total_frames));
        self
    }

    pub fn unplayable(mut self, path: &str) -> Self {
        self.tracks.insert(PathBuf::from(path), None);
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_seeks(mut self) -> Self {
        self.fail_seek = true;
        self
    }

    /// Make `shutdown` block, like a wedged device.
    pub fn slow_shutdown(mut self, delay: Duration) -> Self {
        self.shutdown_delay = Some(delay);
        self
    }

    /// While seeking to `frame`, post a new seek to `percent` on `transport`.
    pub fn post_seek_during(&mut self, frame: u64, transport: Arc<TransportState>, percent: f64) {
        self.seek_during = Some((frame, transport, percent));
    }

    /// Let `frames` of audio play out. Reaching the end drains the output.
    pub fn advance(&mut self, frames: u64) {
        let Some(total) = self.total_frames() else { return };
        if !self.playing {
            return;
        }
        self.cursor = (self.cursor + frames).min(total);
        if self.cursor >= total {
            self.playing = false;
        }
    }

    /// Output stops on its own, e.g. a device hiccup.
    pub fn stop_output(&mut self) {
        self.playing = false;
    }

    fn total_frames(&self) -> Option<u64> {
        self.loaded.as_ref().map(|(_, total)| *total)
    }

    pub fn loaded_path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|(path, _)| path.as_path())
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn starts(&self) -> usize {
        self.starts
    }

    pub fn stops(&self) -> usize {
        self.stops
    }

    pub fn unloads(&self) -> usize {
        self.unloads
    }

    pub fn load_attempts(&self) -> usize {
        self.load_attempts
    }

    pub fn seeks(&self) -> &[u64] {
        &self.seeks
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl PlaybackEngine for MockEngine {
    fn init(&mut self) -> Result<(), EngineError> {
        if self.fail_init {
            return Err(EngineError::Init("no device".to_string()));
        }
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<LoadedTrack, EngineError> {
        self.unload();
        self.load_attempts += 1;

        match self.tracks.get(path).copied().flatten() {
            Some(total_frames) => {
                self.loaded = Some((path.to_path_buf(), total_frames));
                self.cursor = 0;
                Ok(LoadedTrack {
                    total_frames,
                    sample_rate: SAMPLE_RATE,
                })
            }
            None => Err(EngineError::Decode {
                path: path.to_path_buf(),
                reason: "unsupported".to_string(),
            }),
        }
    }

    fn start(&mut self) -> Result<(), EngineError> {
        if self.loaded.is_none() {
            return Err(EngineError::NoTrack);
        }
        self.starts += 1;
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        if self.loaded.is_none() {
            return Err(EngineError::NoTrack);
        }
        self.stops += 1;
        self.playing = false;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn seek_to_frame(&mut self, frame: u64) -> Result<(), EngineError> {
        let Some(total) = self.total_frames() else {
            return Err(EngineError::NoTrack);
        };
        if self.fail_seek {
            return Err(EngineError::Seek {
                frame,
                reason: "not seekable".to_string(),
            });
        }
        self.seeks.push(frame);
        if self.seek_during.as_ref().is_some_and(|(at, _, _)| *at == frame) {
            if let Some((_, transport, percent)) = self.seek_during.take() {
                transport.request_seek(percent);
            }
        }
        self.cursor = frame.min(total);
        if self.cursor >= total {
            self.playing = false;
        }
        Ok(())
    }

    fn cursor_frame(&self) -> Result<u64, EngineError> {
        if self.loaded.is_none() {
            return Err(EngineError::NoTrack);
        }
        Ok(self.cursor)
    }

    fn unload(&mut self) {
        if self.loaded.take().is_some() {
            self.unloads += 1;
        }
        self.playing = false;
        self.cursor = 0;
    }

    fn shutdown(&mut self) {
        if let Some(delay) = self.shutdown_delay {
            std::thread::sleep(delay);
        }
        self.unload();
        self.shut_down = true;
    }
}
