// Terminal UI - progress, transport buttons and the seek slider
// Built with ratatui; input comes from crossterm on a background reader

mod app;            // event loop tying input, redraws and the transport together
pub mod controller; // key/mouse -> transport intents
pub mod events;     // input reader + redraw ticker
pub mod view;       // rendering and clickable regions

pub use app::App;
pub use controller::UiController;
pub use events::{AppEvent, EventHandler};
pub use view::{HitMap, PlayerView};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

/// Raw mode + alternate screen + mouse capture for as long as it lives.
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    _restore: RestoreGuard,
}

/// Put the terminal back even if drawing panicked halfway.
struct RestoreGuard;

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture, cursor::Show);
    }
}

impl TerminalSession {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let restore = RestoreGuard;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;

        Ok(Self {
            terminal,
            _restore: restore,
        })
    }

    pub fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

/// Keeps stderr pointed at /dev/null until dropped.
///
/// ALSA and friends print straight to fd 2, which tears up the TUI.
#[cfg(unix)]
pub struct StderrSilencer {
    saved: libc::c_int,
}

#[cfg(unix)]
impl StderrSilencer {
    pub fn new() -> Result<Self> {
        // SAFETY: plain fd juggling on descriptors this function owns; every
        // error path closes what it opened.
        unsafe {
            let null_fd = libc::open(b"/dev/null\0".as_ptr() as *const libc::c_char, libc::O_WRONLY);
            if null_fd == -1 {
                return Err(anyhow::anyhow!("Failed to open /dev/null"));
            }

            let saved = libc::dup(libc::STDERR_FILENO);
            if saved == -1 {
                libc::close(null_fd);
                return Err(anyhow::anyhow!("Failed to back up stderr"));
            }

            if libc::dup2(null_fd, libc::STDERR_FILENO) == -1 {
                libc::close(null_fd);
                libc::close(saved);
                return Err(anyhow::anyhow!("Failed to redirect stderr"));
            }

            libc::close(null_fd);
            Ok(Self { saved })
        }
    }
}

#[cfg(unix)]
impl Drop for StderrSilencer {
    fn drop(&mut self) {
        // SAFETY: `saved` came from dup() in `new` and is closed exactly once.
        unsafe {
            libc::dup2(self.saved, libc::STDERR_FILENO);
            libc::close(self.saved);
        }
    }
}
