// playdeck library - terminal playlist player
// The playback loop and the UI only ever meet in TransportState

pub mod config;    // settings with defaults, optional TOML file
pub mod error;     // engine + track source errors
pub mod logging;   // tracing subscriber setup
pub mod playback;  // engine trait, controller loop, playback thread
pub mod source;    // CLI track validation -> Playlist
pub mod transport; // shared flags between the UI and playback threads

#[cfg(feature = "tui")]
pub mod ui;        // terminal interface

pub use config::Config;
pub use error::{EngineError, SourceError};
pub use playback::{ControllerSettings, LoadedTrack, PlaybackController, PlaybackEngine, PlaybackWorker};
pub use source::{Mode, Playlist};
pub use transport::TransportState;
