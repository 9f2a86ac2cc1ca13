//! Terminal UI for ingestion runs, built on ratatui
//!
//! Shows the current phase and region, progress through the region's
//! locations, running totals, and a scrolling activity log.

mod components;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use crate::ingest::IngestSummary;
use components::{LogPanel, ProgressPanel, StatusPanel, TallyPanel};

/// Ingestion phases shown in the status panel
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Preparing,
    Traversing,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Preparing => write!(f, "Preparing database"),
            Phase::Traversing => write!(f, "Fetching encounters"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Locations handled within the current region
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Progress sink for the traversal. Lets the engine run under the TUI or silently.
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn set_tally(&mut self, summary: &IngestSummary);
    fn log(&mut self, message: impl Into<String>);

    /// Whether the user asked to stop. Checked between locations only.
    fn interrupted(&mut self) -> bool {
        false
    }
}

/// Full-screen terminal implementation
pub struct UiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: StatusPanel,
    progress: ProgressPanel,
    tally: TallyPanel,
    log: LogPanel,
    should_quit: bool,
}

impl UiApp {
    /// Enter the alternate screen and take over the terminal
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            status: StatusPanel::new(),
            progress: ProgressPanel::new(),
            tally: TallyPanel::new(),
            log: LogPanel::new(),
            should_quit: false,
        })
    }

    // Raw mode swallows SIGINT, so Ctrl+C arrives as a key event.
    fn poll_quit(&mut self) {
        while event::poll(Duration::from_millis(0)).unwrap_or(false) {
            if let Ok(CrosstermEvent::Key(KeyEvent {
                code, modifiers, ..
            })) = event::read()
            {
                let ctrl_c = code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL);
                if code == KeyCode::Char('q') || ctrl_c {
                    self.should_quit = true;
                }
            }
        }
    }

    fn draw(&mut self) -> Result<()> {
        let status = &self.status;
        let progress = &self.progress;
        let tally = &self.tally;
        let log = &self.log;

        self.terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(5), // Status
                    Constraint::Length(3), // Location progress
                    Constraint::Length(4), // Totals
                    Constraint::Min(5),    // Activity
                ])
                .split(frame.area());

            status.render(frame, chunks[0]);
            progress.render(frame, chunks[1]);
            tally.render(frame, chunks[2]);
            log.render(frame, chunks[3]);
        })?;

        Ok(())
    }

    /// Show the final summary, wait for a key, then restore the terminal
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.set_phase(Phase::Complete);
        self.progress.clear();
        self.log(summary);
        self.log("Press any key to exit...");
        self.draw()?;

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let CrosstermEvent::Key(_) = event::read()? {
                    break;
                }
            }
        }

        self.restore()
    }

    /// Restore the terminal without waiting
    pub fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.status.set_phase(phase);
        self.draw().ok();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.status.set_info(info);
        self.draw().ok();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.progress
            .set_progress(Progress::new(current, total, label));
        self.draw().ok();
    }

    fn set_tally(&mut self, summary: &IngestSummary) {
        self.tally.set(summary);
        self.draw().ok();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.add(message);
        self.draw().ok();
    }

    fn interrupted(&mut self) -> bool {
        self.poll_quit();
        self.should_quit
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}

/// No-op implementation for tests and plain log output
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn set_tally(&mut self, _summary: &IngestSummary) {}
    fn log(&mut self, _message: impl Into<String>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio() {
        assert_eq!(Progress::new(0, 0, "Kanto").ratio(), 0.0);
        assert_eq!(Progress::new(5, 10, "Kanto").ratio(), 0.5);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Traversing.to_string(), "Fetching encounters");
    }
}
