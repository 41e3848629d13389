use crate::transport::TransportState;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// How long the input reader blocks before re-checking `quit`.
const INPUT_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Raw terminal input (keys, mouse, resize).
    Input(Event),
    /// Repaint request; carries no data.
    Redraw,
}

/// Single queue feeding the UI loop. Anything holding a `sender()` can post
/// a redraw from any thread.
pub struct EventHandler {
    event_sender: mpsc::UnboundedSender<AppEvent>,
    event_receiver: mpsc::UnboundedReceiver<AppEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        Self {
            event_sender,
            event_receiver,
            tasks: Vec::new(),
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.event_sender.clone()
    }

    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.event_receiver.recv().await
    }

    /// Whatever is already queued, without waiting.
    pub fn try_next_event(&mut self) -> Option<AppEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Forward terminal input until `quit` is raised.
    ///
    /// crossterm's poll/read block, so this runs on the blocking pool.
    pub fn spawn_input_reader(&mut self, transport: Arc<TransportState>) {
        let sender = self.sender();
        let task = tokio::task::spawn_blocking(move || {
            forward_input(&transport, &sender, event::poll, event::read);
            debug!("Input reader exit");
        });
        self.tasks.push(task);
    }

    /// Post a redraw every `interval` until `quit` is raised. Never touches
    /// playback state.
    pub fn spawn_redraw_ticker(&mut self, interval: Duration, transport: Arc<TransportState>) {
        let sender = self.sender();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            while !transport.should_quit() {
                ticker.tick().await;
                if sender.send(AppEvent::Redraw).is_err() {
                    break;
                }
            }
            info!("UI exit");
        });
        self.tasks.push(task);
    }

    /// Wait for the background tasks, giving up after `timeout`.
    pub async fn shutdown(self, timeout: Duration) {
        let deadline = Instant::now() + timeout;

        for task in self.tasks {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("UI task failed: {}", e),
                Err(_) => warn!("UI task still running after {:?}, leaving it", timeout),
            }
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Input loop behind `spawn_input_reader`.
///
/// Without input the quit keys can never arrive, so a failing terminal ends
/// the session instead of leaving it running.
fn forward_input<P, R>(
    transport: &TransportState,
    sender: &mpsc::UnboundedSender<AppEvent>,
    mut poll: P,
    mut read: R,
) where
    P: FnMut(Duration) -> io::Result<bool>,
    R: FnMut() -> io::Result<Event>,
{
    while !transport.should_quit() {
        match poll(INPUT_POLL) {
            Ok(true) => match read() {
                Ok(event) => {
                    if sender.send(AppEvent::Input(event)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read terminal input, quitting: {}", e);
                    transport.request_quit();
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                error!("Failed to poll terminal input, quitting: {}", e);
                transport.request_quit();
                break;
            }
        }
    }
}

/// Keys that end the session.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
