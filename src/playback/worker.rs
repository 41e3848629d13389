// Playback thread lifecycle - spawn the controller, stop it without hanging forever

use super::controller::{ControllerSettings, PlaybackController};
use super::engine::PlaybackEngine;
use crate::source::Playlist;
use crate::transport::TransportState;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle, Thread};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const JOIN_POLL: Duration = Duration::from_millis(5);

pub struct PlaybackWorker {
    transport: Arc<TransportState>,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackWorker {
    /// Start the playback thread.
    ///
    /// The engine is built on the new thread, so it never has to be `Send`
    /// and never leaves the thread that drives it.
    pub fn spawn<E, F>(
        make_engine: F,
        playlist: Arc<Playlist>,
        transport: Arc<TransportState>,
        settings: ControllerSettings,
    ) -> io::Result<Self>
    where
        E: PlaybackEngine,
        F: FnOnce() -> E + Send + 'static,
    {
        let thread_transport = Arc::clone(&transport);
        let handle = thread::Builder::new()
            .name("playback".to_string())
            .spawn(move || {
                PlaybackController::new(make_engine(), playlist, thread_transport, settings).run();
            })?;

        Ok(Self {
            transport,
            thread: Some(handle),
        })
    }

    /// Handle for cutting the playback thread's current wait short.
    pub fn waker(&self) -> Option<Thread> {
        self.thread.as_ref().map(|handle| handle.thread().clone())
    }

    /// Raise `quit` and wait up to `timeout` for the thread to release the
    /// engine. Returns `false` if it had to be left behind.
    pub fn shutdown(mut self, timeout: Duration) -> bool {
        self.transport.request_quit();

        let Some(handle) = self.thread.take() else {
            return true;
        };
        handle.thread().unpark();

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("Playback thread still busy after {:?}, detaching it", timeout);
                return false;
            }
            thread::sleep(JOIN_POLL);
        }

        if handle.join().is_err() {
            error!("Playback thread panicked");
        } else {
            info!("Playback thread stopped");
        }
        true
    }
}

impl Drop for PlaybackWorker {
    fn drop(&mut self) {
        self.transport.request_quit();
        if let Some(handle) = &self.thread {
            handle.thread().unpark();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::mock::MockEngine;

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    fn playlist() -> Arc<Playlist> {
        Arc::new(Playlist::new(vec!["a.mp3".into(), "b.mp3".into()]))
    }

    #[test]
    fn test_worker_loads_and_stops_cleanly() {
        let transport = Arc::new(TransportState::new());
        let worker = PlaybackWorker::spawn(
            || MockEngine::new().playable("a.mp3", 50_000).playable("b.mp3", 50_000),
            playlist(),
            Arc::clone(&transport),
            ControllerSettings::default(),
        )
        .unwrap();

        assert!(wait_for(|| transport.duration_ms() > 0));

        transport.request_skip_next();
        assert!(wait_for(|| transport.current_index() == 1 && !transport.skip_pending()));

        assert!(worker.shutdown(Duration::from_secs(2)));
        assert!(transport.should_quit());
        assert_eq!(transport.duration_ms(), 0);
    }

    #[test]
    fn test_init_failure_leaves_finished_and_still_stops() {
        let transport = Arc::new(TransportState::new());
        let worker = PlaybackWorker::spawn(
            || MockEngine::new().failing_init(),
            playlist(),
            Arc::clone(&transport),
            ControllerSettings::default(),
        )
        .unwrap();

        assert!(wait_for(|| transport.is_finished()));
        assert!(worker.shutdown(Duration::from_secs(2)));
    }

    #[test]
    fn test_shutdown_is_bounded_when_engine_hangs() {
        let transport = Arc::new(TransportState::new());
        let worker = PlaybackWorker::spawn(
            || {
                MockEngine::new()
                    .playable("a.mp3", 50_000)
                    .slow_shutdown(Duration::from_secs(3))
            },
            playlist(),
            Arc::clone(&transport),
            ControllerSettings::default(),
        )
        .unwrap();

        assert!(wait_for(|| transport.duration_ms() > 0));

        let started = Instant::now();
        assert!(!worker.shutdown(Duration::from_millis(100)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_waker_wakes_a_paused_loop() {
        let transport = Arc::new(TransportState::new());
        transport.set_paused(true);
        let settings = ControllerSettings {
            paused_tick: Duration::from_secs(60),
            ..ControllerSettings::default()
        };
        let worker = PlaybackWorker::spawn(
            || MockEngine::new().playable("a.mp3", 50_000).playable("b.mp3", 50_000),
            playlist(),
            Arc::clone(&transport),
            settings,
        )
        .unwrap();

        assert!(wait_for(|| transport.duration_ms() > 0));
        transport.request_skip_next();
        if let Some(waker) = worker.waker() {
            waker.unpark();
        }
        assert!(wait_for(|| transport.current_index() == 1));
        assert!(worker.shutdown(Duration::from_secs(2)));
    }
}
