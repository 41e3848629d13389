use crate::source::Playlist;
use crate::transport::TransportState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};

/// Screen regions that react to the mouse, as laid out by the last draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitMap {
    pub previous: Rect,
    pub pause: Rect,
    pub next: Rect,
    /// Inner area of the seek slider; column 0 is 0%, the last column 100%.
    pub slider: Rect,
}

impl HitMap {
    pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
        column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
    }

    /// Slider percentage under `column`, clamped to the slider.
    pub fn slider_percent(&self, column: u16) -> f64 {
        let rect = self.slider;
        if rect.width <= 1 {
            return 0.0;
        }
        let offset = column.saturating_sub(rect.x).min(rect.width - 1);
        f64::from(offset) * 100.0 / f64::from(rect.width - 1)
    }
}

/// Everything one frame needs.
pub struct PlayerView<'a> {
    pub playlist: &'a Playlist,
    pub transport: &'a TransportState,
    pub slider: f64,
    pub button_label: &'static str,
}

pub fn render(f: &mut Frame, view: &PlayerView) -> HitMap {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(" playdeck ")
        .title_alignment(Alignment::Center);
    let inner = outer.inner(f.area());
    f.render_widget(outer, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Track label
            Constraint::Length(3), // Buttons + progress text
            Constraint::Length(3), // Progress gauge
            Constraint::Length(3), // Seek slider
            Constraint::Min(0),    // Track list
            Constraint::Length(1), // Key help
        ])
        .split(inner);

    render_track_label(f, chunks[0], view);
    let (previous, pause, next) = render_controls(f, chunks[1], view);
    render_progress(f, chunks[2], view.transport);
    let slider = render_slider(f, chunks[3], view.slider);
    render_track_list(f, chunks[4], view);
    render_help(f, chunks[5]);

    HitMap {
        previous,
        pause,
        next,
        slider,
    }
}

fn render_track_label(f: &mut Frame, area: Rect, view: &PlayerView) {
    let text = if view.playlist.is_empty() {
        "No tracks".to_string()
    } else {
        let index = view.transport.current_index();
        format!("♪ [{}/{}] {}", index + 1, view.playlist.len(), view.playlist.label(index))
    };

    let label = Paragraph::new(text).style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(label, area);
}

fn render_controls(f: &mut Frame, area: Rect, view: &PlayerView) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(8),  // Prev
            Constraint::Length(12), // Pause / Play / Finished
            Constraint::Length(8),  // Next
            Constraint::Min(0),     // Progress text
        ])
        .split(area);

    let finished = view.transport.is_finished();
    let pause_color = if finished { Color::DarkGray } else { Color::Yellow };

    f.render_widget(button("Prev", Color::White), chunks[0]);
    f.render_widget(button(view.button_label, pause_color), chunks[1]);
    f.render_widget(button("Next", Color::White), chunks[2]);

    let progress = Paragraph::new(Line::from(vec![
        Span::raw("Progress: "),
        Span::styled(
            format!("{:.3}%", view.transport.progress()),
            Style::default().fg(Color::Green),
        ),
    ]))
    .alignment(Alignment::Right)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(progress, chunks[3]);

    (chunks[0], chunks[1], chunks[2])
}

fn button(label: &str, color: Color) -> Paragraph<'_> {
    Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL))
}

fn render_progress(f: &mut Frame, area: Rect, transport: &TransportState) {
    let percent = transport.progress();
    let total_ms = transport.duration_ms();
    let elapsed_ms = (percent / 100.0 * total_ms as f64) as u64;

    let label = if total_ms > 0 {
        format!("{} / {}", format_time(elapsed_ms), format_time(total_ms))
    } else {
        "--:-- / --:--".to_string()
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, area);
}

fn render_slider(f: &mut Frame, area: Rect, value: f64) -> Rect {
    let block = Block::default().borders(Borders::ALL).title("Seek (↑/↓ or drag)");
    let inner = block.inner(area);

    let slider = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio((value / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.1}%", value));
    f.render_widget(slider, area);

    inner
}

fn render_track_list(f: &mut Frame, area: Rect, view: &PlayerView) {
    let current = view.transport.current_index();

    let items: Vec<ListItem> = view
        .playlist
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let is_current = i == current;
            let prefix = if is_current { "♪ " } else { "  " };
            let style = if is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{}{:>3}. {}", prefix, i + 1, path.display())).style(style)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Playlist"));
    f.render_widget(list, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new("Space pause · ←/→ prev/next · ↑/↓ seek · q quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, area);
}

/// `m:ss` from milliseconds.
pub fn format_time(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
