use super::controller::UiController;
use super::events::{is_quit_key, AppEvent, EventHandler};
use super::view::{self, HitMap, PlayerView};
use super::TerminalSession;
use crate::config::Config;
use crate::source::Playlist;
use crate::transport::TransportState;
use anyhow::Result;
use crossterm::event::Event;
use std::sync::Arc;
use std::thread::Thread;
use std::time::Duration;
use tracing::{debug, info};

pub struct App {
    terminal: TerminalSession,
    events: EventHandler,
    controller: UiController,
    playlist: Arc<Playlist>,
    transport: Arc<TransportState>,
    redraw_interval: Duration,
    hits: HitMap,
}

impl App {
    pub fn new(
        config: &Config,
        playlist: Arc<Playlist>,
        transport: Arc<TransportState>,
        waker: Option<Thread>,
    ) -> Result<Self> {
        let terminal = TerminalSession::new()?;
        let controller = UiController::new(Arc::clone(&transport), &config.ui).with_waker(waker);

        Ok(Self {
            terminal,
            events: EventHandler::new(),
            controller,
            playlist,
            transport,
            redraw_interval: config.ui.redraw_interval(),
            hits: HitMap::default(),
        })
    }

    /// Drive the UI until a quit key or someone else raises `quit`.
    pub async fn run(&mut self) -> Result<()> {
        self.events.spawn_input_reader(Arc::clone(&self.transport));
        self.events
            .spawn_redraw_ticker(self.redraw_interval, Arc::clone(&self.transport));

        self.draw()?;
        while !self.transport.should_quit() {
            let Some(event) = self.events.next_event().await else {
                break;
            };
            let mut redraw = self.handle_event(event);

            // Collapse a burst (mouse drags, ticker catch-up) into one frame.
            while let Some(event) = self.events.try_next_event() {
                redraw |= self.handle_event(event);
            }

            if redraw && !self.transport.should_quit() {
                self.draw()?;
            }
        }

        debug!("UI loop done");
        Ok(())
    }

    /// Returns whether the screen needs repainting.
    fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Redraw => true,
            AppEvent::Input(Event::Key(key)) => {
                if is_quit_key(&key) {
                    info!("Quit requested from keyboard");
                    self.transport.request_quit();
                    return false;
                }
                self.controller.handle_key(key)
            }
            AppEvent::Input(Event::Mouse(mouse)) => self.controller.handle_mouse(mouse, &self.hits),
            AppEvent::Input(Event::Resize(_, _)) => true,
            AppEvent::Input(_) => false,
        }
    }

    fn draw(&mut self) -> Result<()> {
        self.controller.sync();

        let view = PlayerView {
            playlist: &self.playlist,
            transport: &self.transport,
            slider: self.controller.slider(),
            button_label: self.controller.button_label(),
        };
        let mut hits = self.hits;
        self.terminal.draw(|f| hits = view::render(f, &view))?;
        self.hits = hits;

        Ok(())
    }

    /// Stop the background tasks and give the terminal back.
    pub async fn shutdown(self, timeout: Duration) {
        self.transport.request_quit();
        let Self { terminal, events, .. } = self;
        drop(terminal);
        events.shutdown(timeout).await;
    }
}
