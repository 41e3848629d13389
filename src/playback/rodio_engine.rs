use super::engine::{LoadedTrack, PlaybackEngine};
use crate::error::EngineError;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Output device plus the stream handle sinks are created from.
/// `OutputStream` must outlive every sink, and it is not `Send`.
struct Device {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

struct Loaded {
    sink: Sink,
    track: LoadedTrack,
}

/// rodio-backed engine. Frames are derived from the sink position and the
/// decoder's sample rate.
pub struct RodioEngine {
    device: Option<Device>,
    loaded: Option<Loaded>,
    volume: f32,
}

impl RodioEngine {
    pub fn new(volume: f32) -> Self {
        Self {
            device: None,
            loaded: None,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    fn loaded(&self) -> Result<&Loaded, EngineError> {
        self.loaded.as_ref().ok_or(EngineError::NoTrack)
    }
}

impl PlaybackEngine for RodioEngine {
    fn init(&mut self) -> Result<(), EngineError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| EngineError::Init(e.to_string()))?;
        self.device = Some(Device {
            _stream: stream,
            handle,
        });
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<LoadedTrack, EngineError> {
        self.unload();

        let device = self.device.as_ref().ok_or(EngineError::NotInitialized)?;

        let file = File::open(path).map_err(|source| EngineError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let source = Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let sample_rate = source.sample_rate();
        let duration = match source.total_duration() {
            Some(duration) => duration,
            None => probe_duration(path).ok_or_else(|| EngineError::UnknownLength(path.to_path_buf()))?,
        };
        let track = LoadedTrack {
            total_frames: duration_to_frames(duration, sample_rate),
            sample_rate,
        };

        let sink = Sink::try_new(&device.handle).map_err(|e| EngineError::Sink(e.to_string()))?;
        sink.set_volume(self.volume);
        // Loaded tracks start stopped; the controller decides when to play.
        sink.pause();
        sink.append(source);

        debug!(
            "Loaded {} ({} frames @ {} Hz)",
            path.display(),
            track.total_frames,
            track.sample_rate
        );

        self.loaded = Some(Loaded { sink, track });
        Ok(track)
    }

    fn start(&mut self) -> Result<(), EngineError> {
        self.loaded()?.sink.play();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.loaded()?.sink.pause();
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.loaded
            .as_ref()
            .map(|loaded| !loaded.sink.is_paused() && !loaded.sink.empty())
            .unwrap_or(false)
    }

    fn seek_to_frame(&mut self, frame: u64) -> Result<(), EngineError> {
        let loaded = self.loaded()?;
        let position = frames_to_duration(frame, loaded.track.sample_rate);
        loaded.sink.try_seek(position).map_err(|e| EngineError::Seek {
            frame,
            reason: e.to_string(),
        })
    }

    fn cursor_frame(&self) -> Result<u64, EngineError> {
        let loaded = self.loaded()?;
        // A drained sink has consumed the whole source.
        if loaded.sink.empty() {
            return Ok(loaded.track.total_frames);
        }
        let frame = duration_to_frames(loaded.sink.get_pos(), loaded.track.sample_rate);
        Ok(frame.min(loaded.track.total_frames))
    }

    fn unload(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            loaded.sink.stop();
        }
    }

    fn shutdown(&mut self) {
        self.unload();
        self.device = None;
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn duration_to_frames(duration: Duration, sample_rate: u32) -> u64 {
    (duration.as_secs_f64() * f64::from(sample_rate)).round() as u64
}

fn frames_to_duration(frames: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(frames as f64 / f64::from(sample_rate))
}

#[cfg(feature = "probe")]
fn probe_duration(path: &Path) -> Option<Duration> {
    super::probe::probe_duration(path)
}

#[cfg(not(feature = "probe"))]
fn probe_duration(_path: &Path) -> Option<Duration> {
    None
}
