// Playback - the controller loop and the engine it drives
// The engine lives and dies on the playback thread; everything else talks through TransportState

pub mod controller; // per-tick transport logic
pub mod engine;     // engine boundary trait
pub mod worker;     // playback thread + bounded shutdown

#[cfg(feature = "probe")]
pub mod probe;
#[cfg(feature = "audio")]
pub mod rodio_engine;

#[cfg(test)]
pub(crate) mod mock;

pub use controller::{ControllerSettings, PlaybackController};
pub use engine::{LoadedTrack, PlaybackEngine};
pub use worker::PlaybackWorker;

#[cfg(feature = "audio")]
pub use rodio_engine::RodioEngine;
