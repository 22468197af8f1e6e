use std::io;
use std::panic;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::Event;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::warn;

use crate::frame_loop::{FrameId, FrameScheduler};
use crate::game::Snapshot;
use crate::input::poll_event;
use crate::renderer;

/// Input wait while no frame is scheduled.
pub const IDLE_POLL: Duration = Duration::from_millis(250);

/// Screen and input side of one game session.
///
/// Holds raw mode and the alternate screen until dropped.
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        let terminal = execute!(stdout, EnterAlternateScreen, Hide)
            .and_then(|()| Terminal::new(CrosstermBackend::new(stdout)))
            .inspect_err(|_| restore_terminal())?;

        Ok(Self { terminal })
    }

    /// Draws one snapshot.
    pub fn draw(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        self.terminal
            .draw(|frame| renderer::render(frame, snapshot))
            .map(|_| ())
    }

    /// Waits for the next terminal event, but never past the pacer's
    /// pending frame deadline.
    pub fn next_event(&self, pacer: &FramePacer) -> io::Result<Option<Event>> {
        poll_event(input_timeout(pacer, Instant::now()))
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Restores the terminal before the default panic message is printed.
pub fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        default_hook(panic_info);
    }));
}

fn input_timeout(pacer: &FramePacer, now: Instant) -> Duration {
    pacer.time_until_due(now).unwrap_or(IDLE_POLL)
}

fn restore_terminal() {
    // Both steps run even if the first one fails.
    let raw = disable_raw_mode();
    let mut stdout = io::stdout();
    let screen = execute!(stdout, Show, LeaveAlternateScreen);
    if let Err(error) = raw.and(screen) {
        warn!(%error, "terminal restore failed");
    }
}

/// Wall-clock frame source with a fixed period.
///
/// Only one frame is outstanding at a time; scheduling replaces it.
#[derive(Debug)]
pub struct FramePacer {
    period: Duration,
    next_id: u64,
    pending: Option<(FrameId, Instant)>,
}

impl FramePacer {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_id: 0,
            pending: None,
        }
    }

    /// Time left until the pending frame is due, or `None` when idle.
    #[must_use]
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|(_, deadline)| deadline.saturating_duration_since(now))
    }

    /// Takes the pending frame if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<FrameId> {
        match self.pending {
            Some((id, deadline)) if deadline <= now => {
                self.pending = None;
                Some(id)
            }
            _ => None,
        }
    }

    fn schedule_at(&mut self, now: Instant) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        self.pending = Some((id, now + self.period));
        id
    }
}

impl FrameScheduler for FramePacer {
    fn schedule(&mut self) -> FrameId {
        self.schedule_at(Instant::now())
    }

    fn cancel(&mut self, id: FrameId) {
        if matches!(self.pending, Some((pending, _)) if pending == id) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::frame_loop::FrameScheduler;

    use super::{FramePacer, IDLE_POLL, input_timeout};

    const PERIOD: Duration = Duration::from_millis(16);

    #[test]
    fn idle_pacer_has_no_deadline() {
        let pacer = FramePacer::new(PERIOD);

        assert_eq!(pacer.time_until_due(Instant::now()), None);
    }

    #[test]
    fn frame_becomes_due_after_one_period() {
        let base = Instant::now();
        let mut pacer = FramePacer::new(PERIOD);
        let id = pacer.schedule_at(base);

        assert_eq!(pacer.take_due(base + Duration::from_millis(5)), None);
        assert_eq!(
            pacer.time_until_due(base + Duration::from_millis(5)),
            Some(Duration::from_millis(11))
        );
        assert_eq!(pacer.take_due(base + PERIOD), Some(id));
        assert_eq!(pacer.take_due(base + PERIOD * 2), None);
    }

    #[test]
    fn cancel_only_drops_matching_frame() {
        let base = Instant::now();
        let mut pacer = FramePacer::new(PERIOD);
        let first = pacer.schedule_at(base);
        let second = pacer.schedule_at(base);

        pacer.cancel(first);
        assert_eq!(pacer.take_due(base + PERIOD), Some(second));

        let third = pacer.schedule_at(base);
        pacer.cancel(third);
        pacer.cancel(third);
        assert_eq!(pacer.take_due(base + PERIOD), None);
    }

    #[test]
    fn input_wait_ends_at_the_frame_deadline() {
        let base = Instant::now();
        let mut pacer = FramePacer::new(PERIOD);

        assert_eq!(input_timeout(&pacer, base), IDLE_POLL);

        pacer.schedule_at(base);
        assert_eq!(
            input_timeout(&pacer, base + Duration::from_millis(10)),
            Duration::from_millis(6)
        );
        assert_eq!(input_timeout(&pacer, base + PERIOD * 3), Duration::ZERO);
    }
}
