use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::config::PALETTE;
use crate::game::EndReason;

const POPUP_WIDTH: u16 = 34;
const POPUP_HEIGHT: u16 = 9;

/// Keys that start or restart a round, as mapped to `GameInput::Confirm`.
const CONFIRM_KEYS: &str = "[Enter]/[Space]/[R]";

/// Keys that leave the game, as mapped to `GameInput::Quit`.
const QUIT_KEYS: &str = "[Q]/[Esc]";

/// Draws the start screen as a centered popup.
pub fn render_start_menu(frame: &mut Frame<'_>, area: Rect) {
    let popup = centered_popup(area, POPUP_WIDTH, POPUP_HEIGHT);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from("SNAKE").style(
            Style::new()
                .fg(PALETTE.snake_head)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from(format!("{CONFIRM_KEYS} Start")),
        Line::from(format!("{QUIT_KEYS} Quit")),
        Line::from(""),
        Line::from("Arrows or WASD to steer").style(Style::new().fg(PALETTE.muted)),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" start ")),
        popup,
    );
}

/// Draws the game-over screen as a centered popup.
pub fn render_game_over_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    score: u32,
    end_reason: Option<EndReason>,
) {
    let popup = centered_popup(area, POPUP_WIDTH, POPUP_HEIGHT);
    frame.render_widget(Clear, popup);

    let (title, title_color) = match end_reason {
        Some(EndReason::BoardFull) => ("BOARD CLEARED", PALETTE.snake_head),
        _ => ("GAME OVER", PALETTE.fruit),
    };
    let lines = vec![
        Line::from(title).style(Style::new().fg(title_color).add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from(format!("Final score: {score}")),
        Line::from(match end_reason {
            Some(EndReason::BoundaryViolation) => "Cause: hit wall",
            Some(EndReason::SelfCollision) => "Cause: hit yourself",
            Some(EndReason::BoardFull) => "No room left for fruit",
            None => "",
        })
        .style(Style::new().fg(PALETTE.muted)),
        Line::from(""),
        Line::from(format!("{CONFIRM_KEYS} Play again")),
        Line::from(format!("{QUIT_KEYS} Quit")),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" game over ")),
        popup,
    );
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let [mid] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [center] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(mid);

    center
}
