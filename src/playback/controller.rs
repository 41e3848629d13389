use super::engine::{LoadedTrack, PlaybackEngine};
use crate::config::PlaybackConfig;
use crate::source::Playlist;
use crate::transport::TransportState;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Timing knobs for the controller loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub tick: Duration,
    pub paused_tick: Duration,
    pub guard_frames: u64,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&PlaybackConfig::default())
    }
}

impl From<&PlaybackConfig> for ControllerSettings {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            tick: config.tick(),
            paused_tick: config.paused_tick(),
            guard_frames: config.guard_frames,
        }
    }
}

/// Keeps exactly one track loaded and moving, driven by the transport flags.
///
/// Owns the engine outright; nothing else ever calls into it.
pub struct PlaybackController<E: PlaybackEngine> {
    engine: E,
    playlist: Arc<Playlist>,
    transport: Arc<TransportState>,
    settings: ControllerSettings,
    current: Option<LoadedTrack>,
    failures_in_a_row: usize,
}

impl<E: PlaybackEngine> PlaybackController<E> {
    pub fn new(
        engine: E,
        playlist: Arc<Playlist>,
        transport: Arc<TransportState>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            engine,
            playlist,
            transport,
            settings,
            current: None,
            failures_in_a_row: 0,
        }
    }

    /// Open the device. On failure playback is over for this process:
    /// `finished` is raised and the caller should only idle.
    pub fn init_engine(&mut self) -> bool {
        match self.engine.init() {
            Ok(()) => true,
            Err(e) => {
                error!("Audio engine unavailable: {}", e);
                self.transport.set_finished(true);
                false
            }
        }
    }

    /// Thread body: init, tick until `quit`, then release the engine.
    ///
    /// Waits with `park_timeout`, so an `unpark` on this thread cuts the
    /// current wait short.
    pub fn run(mut self) {
        let ready = self.init_engine();

        while !self.transport.should_quit() {
            let wait = if ready {
                self.tick()
            } else {
                self.settings.paused_tick
            };
            thread::park_timeout(wait);
        }

        self.release();
        info!("Audio exit");
    }

    /// One pass of the control loop. Returns how long to wait before the next.
    pub fn tick(&mut self) -> Duration {
        self.apply_skips();

        if self.current.is_none() {
            self.load_current();
        }

        let Some(track) = self.current else {
            return self.idle_wait();
        };

        if let Some((percent, generation)) = self.transport.pending_seek() {
            self.apply_seek(track, percent, generation);
        }

        if self.transport.is_paused() {
            if self.engine.is_playing() {
                if let Err(e) = self.engine.stop() {
                    warn!("Failed to stop output: {}", e);
                }
            }
            return self.settings.paused_tick;
        }

        if !self.engine.is_playing() {
            if self.reached_end(track) {
                info!("Finished {}", self.playlist.label(self.transport.current_index()));
                self.unload_current();
                self.advance_index();
                return self.settings.tick;
            }

            if let Err(e) = self.engine.start() {
                warn!("Cannot start {}: {}", self.playlist.label(self.transport.current_index()), e);
                self.unload_current();
                self.advance_index();
                return self.settings.tick;
            }
        }

        if self.engine.is_playing() {
            match self.engine.cursor_frame() {
                Ok(cursor) => self.transport.set_progress(frame_to_percent(cursor, track.total_frames)),
                Err(e) => debug!("No cursor: {}", e),
            }
        }

        self.settings.tick
    }

    /// Stop and drop whatever is loaded, then release the device.
    pub fn release(&mut self) {
        self.unload_current();
        self.engine.shutdown();
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn apply_skips(&mut self) {
        let next = self.transport.take_skip_next();
        let prev = self.transport.take_skip_prev();
        if !next && !prev {
            return;
        }

        self.unload_current();
        self.failures_in_a_row = 0;

        let mut index = self.transport.current_index();
        if next {
            index = self.playlist.next_index(index);
        }
        if prev {
            index = self.playlist.prev_index(index);
        }
        self.transport.set_current_index(index);
        self.transport.set_progress(0.0);
        debug!("Skipped to track {}", index);
    }

    fn load_current(&mut self) {
        if self.playlist.is_empty() {
            return;
        }

        let index = self.transport.current_index() % self.playlist.len();
        let Some(path) = self.playlist.get(index) else {
            return;
        };
        let path = path.to_path_buf();

        match self.engine.load(&path) {
            Ok(track) => {
                self.failures_in_a_row = 0;
                self.transport.set_current_index(index);
                self.transport.set_finished(false);
                self.transport.set_progress(0.0);
                self.transport
                    .set_duration_ms(track.duration().as_millis().min(u128::from(u64::MAX)) as u64);
                if let Err(e) = self.engine.seek_to_frame(0) {
                    debug!("Rewind after load failed: {}", e);
                }
                self.current = Some(track);
                log_loaded(index, self.playlist.len(), &path, track);
            }
            Err(e) => {
                warn!("Skipping unplayable track {}: {}", path.display(), e);
                self.failures_in_a_row += 1;
                self.advance_index();

                if self.failures_in_a_row >= self.playlist.len() && !self.transport.is_finished() {
                    warn!("None of the {} tracks could be loaded", self.playlist.len());
                    self.transport.set_finished(true);
                }
            }
        }
    }

    fn apply_seek(&mut self, track: LoadedTrack, percent: f64, generation: u64) {
        let frame = percent_to_frame(percent, track.total_frames);

        match self.engine.seek_to_frame(frame) {
            Ok(()) => self.transport.set_progress(percent),
            Err(e) => warn!("Seek to {:.1}% failed: {}", percent, e),
        }
        if !self.transport.finish_seek(generation) {
            debug!("Newer seek posted while seeking to {:.1}%", percent);
        }
    }

    fn reached_end(&self, track: LoadedTrack) -> bool {
        match self.engine.cursor_frame() {
            Ok(cursor) => cursor.saturating_add(self.settings.guard_frames) >= track.total_frames,
            Err(e) => {
                debug!("No cursor: {}", e);
                false
            }
        }
    }

    fn advance_index(&mut self) {
        let next = self.playlist.next_index(self.transport.current_index());
        self.transport.set_current_index(next);
        self.transport.set_progress(0.0);
    }

    fn unload_current(&mut self) {
        if self.current.take().is_some() {
            self.engine.unload();
            self.transport.set_duration_ms(0);
        }
    }

    fn idle_wait(&self) -> Duration {
        if self.transport.is_finished() {
            self.settings.paused_tick
        } else {
            self.settings.tick
        }
    }
}

fn log_loaded(index: usize, len: usize, path: &Path, track: LoadedTrack) {
    info!(
        "Now playing [{}/{}] {} ({:.1}s)",
        index + 1,
        len,
        path.display(),
        track.duration().as_secs_f64()
    );
}

/// Frame for a seek target. Out-of-range or NaN targets are pinned to the track.
pub fn percent_to_frame(percent: f64, total_frames: u64) -> u64 {
    let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
    let frame = (percent / 100.0 * total_frames as f64).round() as u64;
    frame.min(total_frames)
}

pub fn frame_to_percent(frame: u64, total_frames: u64) -> f64 {
    if total_frames == 0 {
        return 0.0;
    }
    (frame as f64 / total_frames as f64 * 100.0).clamp(0.0, 100.0)
}
