use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::config::PALETTE;
use crate::game::{GameStatus, Snapshot};

/// Narrowest row that still fits the score of a long round.
pub const HUD_MIN_WIDTH: u16 = 24;

/// Renders the single status row above the board.
///
/// The score always gets its full width; the details column is dropped when
/// the rest of the row cannot hold it.
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, snapshot: &Snapshot) {
    let score = score_line(snapshot.score);
    let score_width = u16::try_from(score.width()).unwrap_or(u16::MAX);

    let [score_area, rest] =
        Layout::horizontal([Constraint::Length(score_width), Constraint::Min(0)]).areas(area);
    frame.render_widget(Paragraph::new(score), score_area);

    let details = detail_text(snapshot);
    // One column of gap between score and details.
    if details.width() < usize::from(rest.width) {
        frame.render_widget(
            Paragraph::new(details)
                .alignment(Alignment::Right)
                .style(Style::new().fg(PALETTE.muted)),
            rest,
        );
    }
}

fn score_line(score: u32) -> Line<'static> {
    Line::from(vec![
        Span::styled("Score: ", Style::new().fg(PALETTE.muted)),
        Span::styled(
            score.to_string(),
            Style::new().fg(PALETTE.text).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn detail_text(snapshot: &Snapshot) -> String {
    let state = match snapshot.status {
        GameStatus::NotStarted => "ready",
        GameStatus::Running => "running",
        GameStatus::Ended => "ended",
    };

    format!(
        "len {} · {}x{} · {state}",
        snapshot.snake.len(),
        snapshot.grid.width,
        snapshot.grid.height
    )
}
