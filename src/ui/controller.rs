// Turns key presses and clicks into transport intents
// Never touches the engine; the playback thread picks the intents up on its next tick

use super::view::HitMap;
use crate::config::UiConfig;
use crate::transport::TransportState;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use std::sync::Arc;
use std::thread::Thread;
use tracing::debug;

pub struct UiController {
    transport: Arc<TransportState>,
    /// UI-local seek slider, 0..=100.
    slider: f64,
    seek_step: f64,
    drag_threshold: f64,
    waker: Option<Thread>,
}

impl UiController {
    pub fn new(transport: Arc<TransportState>, config: &UiConfig) -> Self {
        Self {
            transport,
            slider: 0.0,
            seek_step: config.seek_step,
            drag_threshold: config.drag_threshold,
            waker: None,
        }
    }

    /// Unpark this thread after every intent so the playback loop reacts
    /// without waiting out its tick.
    pub fn with_waker(mut self, waker: Option<Thread>) -> Self {
        self.waker = waker;
        self
    }

    pub fn slider(&self) -> f64 {
        self.slider
    }

    /// Follow reported progress unless a seek is still in flight; while it
    /// is, the slider is the authority.
    pub fn sync(&mut self) {
        if !self.transport.seek_requested() {
            self.slider = self.transport.progress();
        }
    }

    pub fn button_label(&self) -> &'static str {
        if self.transport.is_finished() {
            "Finished"
        } else if self.transport.is_paused() {
            "Play "
        } else {
            "Pause"
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.transport.is_finished() {
            return;
        }
        let paused = self.transport.toggle_paused();
        debug!("Pause toggled, paused = {}", paused);
        self.wake();
    }

    pub fn previous(&mut self) {
        self.reset_for_skip();
        self.transport.request_skip_prev();
        self.wake();
    }

    pub fn next(&mut self) {
        self.reset_for_skip();
        self.transport.request_skip_next();
        self.wake();
    }

    /// Move the slider by `delta` percent and seek there.
    pub fn nudge(&mut self, delta: f64) {
        self.slider = (self.slider + delta).clamp(0.0, 100.0);
        self.transport.request_seek(self.slider);
        self.wake();
    }

    /// Slider dragged to `value`. Only a real move away from reported
    /// progress becomes a seek.
    pub fn drag_to(&mut self, value: f64) {
        self.slider = value.clamp(0.0, 100.0);
        if (self.slider - self.transport.progress()).abs() > self.drag_threshold {
            self.transport.request_seek(self.slider);
            self.wake();
        }
    }

    /// Returns whether the key was one of ours.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        match key.code {
            KeyCode::Char(' ') => self.toggle_pause(),
            KeyCode::Left => self.previous(),
            KeyCode::Right => self.next(),
            KeyCode::Up => self.nudge(self.seek_step),
            KeyCode::Down => self.nudge(-self.seek_step),
            _ => return false,
        }
        true
    }

    /// Returns whether the mouse event landed on a control.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, hits: &HitMap) -> bool {
        let (column, row) = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if HitMap::contains(hits.previous, column, row) {
                    self.previous();
                } else if HitMap::contains(hits.pause, column, row) {
                    self.toggle_pause();
                } else if HitMap::contains(hits.next, column, row) {
                    self.next();
                } else if HitMap::contains(hits.slider, column, row) {
                    self.drag_to(hits.slider_percent(column));
                } else {
                    return false;
                }
                true
            }
            MouseEventKind::Drag(MouseButton::Left) if HitMap::contains(hits.slider, column, row) => {
                self.drag_to(hits.slider_percent(column));
                true
            }
            _ => false,
        }
    }

    fn reset_for_skip(&mut self) {
        self.transport.clear_seek();
        self.transport.set_paused(false);
        self.transport.set_progress(0.0);
        self.slider = 0.0;
    }

    fn wake(&self) {
        if let Some(waker) = &self.waker {
            waker.unpark();
        }
    }
}
