//! Panels drawn by the terminal UI

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;

use super::{Phase, Progress};
use crate::ingest::IngestSummary;

const MAX_LOG_ENTRIES: usize = 200;

/// Current phase plus a line of context (region, checkpoint)
pub struct StatusPanel {
    phase: Phase,
    info: String,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Preparing,
            info: String::new(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (indicator, color) = match self.phase {
            Phase::Preparing => ("◐", Color::Yellow),
            Phase::Traversing => ("↓", Color::Cyan),
            Phase::Complete => ("✓", Color::Green),
        };
        let phase_style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} ", indicator), phase_style),
                Span::styled(self.phase.to_string(), phase_style),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::raw("   "),
                Span::styled(&self.info, Style::default().fg(Color::Gray)),
            ]),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Route Tracker ")
            .title_bottom(" q to stop after this location ")
            .border_style(Style::default().fg(Color::Blue));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Gauge over the current region's locations
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue));

        let Some(progress) = &self.progress else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let label = format!(
            "{}: location {}/{}",
            progress.label, progress.current, progress.total
        );

        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio().min(1.0))
            .label(label);

        frame.render_widget(gauge, area);
    }
}

/// Running totals for the whole run
pub struct TallyPanel {
    summary: IngestSummary,
}

impl TallyPanel {
    pub fn new() -> Self {
        Self {
            summary: IngestSummary::default(),
        }
    }

    pub fn set(&mut self, summary: &IngestSummary) {
        self.summary = summary.clone();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let s = &self.summary;
        let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        let dim = Style::default().fg(Color::DarkGray);

        let lines = vec![
            Line::from(vec![
                Span::styled("  routes ", dim),
                Span::styled(s.routes_created.to_string(), value),
                Span::styled("   encounters ", dim),
                Span::styled(s.encounters_created.to_string(), value),
                Span::styled("   empty ", dim),
                Span::styled(s.areas_rolled_back.to_string(), value),
                Span::styled("   duplicate ", dim),
                Span::styled(s.duplicate_areas.to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("  skipped locations ", dim),
                Span::styled(s.locations_failed.to_string(), Style::default().fg(Color::Red)),
                Span::styled("   skipped areas ", dim),
                Span::styled(s.areas_failed.to_string(), Style::default().fg(Color::Red)),
                Span::styled("   checkpoint ", dim),
                Span::styled(s.checkpoint.to_string(), value),
            ]),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Totals ")
            .border_style(Style::default().fg(Color::Blue));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Scrolling activity log; newest entry highlighted
pub struct LogPanel {
    entries: Vec<String>,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
        if self.entries.len() > MAX_LOG_ENTRIES {
            self.entries.remove(0);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Activity ")
            .border_style(Style::default().fg(Color::Blue));

        let visible = area.height.saturating_sub(2) as usize;
        let start = self.entries.len().saturating_sub(visible);
        let last = self.entries.len().saturating_sub(1);

        let items: Vec<ListItem> = self.entries[start..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let color = if start + i == last {
                    Color::White
                } else {
                    Color::DarkGray
                };
                ListItem::new(Span::styled(format!(" {}", entry), Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}
