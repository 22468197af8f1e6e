use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::config::{GLYPH_CELL, GLYPH_FRUIT, GridSize, PALETTE};
use crate::game::{GameStatus, Snapshot};
use crate::snake::Position;
use crate::ui::hud::{HUD_MIN_WIDTH, render_hud};
use crate::ui::menu::{render_game_over_menu, render_start_menu};

/// Terminal columns used for one board cell.
const CELL_COLUMNS: u16 = 2;

/// Renders the full game frame from a read-only snapshot.
pub fn render(frame: &mut Frame<'_>, snapshot: &Snapshot) {
    let area = frame.area();
    let (board_width, board_height) = board_extent(snapshot.grid);
    let total_height = board_height.saturating_add(1);

    if area.width < board_width || area.height < total_height {
        render_too_small(frame, area, board_width, total_height);
        return;
    }

    let [stack] = Layout::vertical([Constraint::Length(total_height)])
        .flex(Flex::Center)
        .areas(area);
    let [hud_row, board_row] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(board_height)]).areas(stack);

    // Small boards get a HUD row wider than the board itself.
    let hud_width = board_width.max(HUD_MIN_WIDTH).min(area.width);
    let [hud_area] = Layout::horizontal([Constraint::Length(hud_width)])
        .flex(Flex::Center)
        .areas(hud_row);
    let [board_area] = Layout::horizontal([Constraint::Length(board_width)])
        .flex(Flex::Center)
        .areas(board_row);

    render_hud(frame, hud_area, snapshot);

    let block = Block::bordered().border_style(Style::new().fg(PALETTE.border));
    let inner = block.inner(board_area);
    frame.render_widget(block, board_area);

    render_board(frame, inner, snapshot.grid);
    if let Some(fruit) = snapshot.fruit {
        render_fruit(frame, inner, snapshot.grid, fruit);
    }
    render_snake(frame, inner, snapshot);

    match snapshot.status {
        GameStatus::NotStarted => render_start_menu(frame, area),
        GameStatus::Ended => {
            render_game_over_menu(frame, area, snapshot.score, snapshot.end_reason);
        }
        GameStatus::Running => {}
    }
}

/// Outer size of the bordered board in terminal cells.
#[must_use]
pub fn board_extent(grid: GridSize) -> (u16, u16) {
    (
        grid.width.saturating_mul(CELL_COLUMNS).saturating_add(2),
        grid.height.saturating_add(2),
    )
}

fn render_board(frame: &mut Frame<'_>, inner: Rect, grid: GridSize) {
    let buffer = frame.buffer_mut();
    for y in 0..i32::from(grid.height) {
        for x in 0..i32::from(grid.width) {
            let Some((tx, ty)) = logical_to_terminal(inner, grid, Position { x, y }) else {
                continue;
            };
            let tint = if (x + y) % 2 == 0 {
                PALETTE.board
            } else {
                PALETTE.grid
            };
            buffer.set_string(tx, ty, "  ", Style::new().bg(tint));
        }
    }
}

fn render_fruit(frame: &mut Frame<'_>, inner: Rect, grid: GridSize, fruit: Position) {
    let Some((x, y)) = logical_to_terminal(inner, grid, fruit) else {
        return;
    };

    frame
        .buffer_mut()
        .set_string(x, y, GLYPH_FRUIT, Style::new().fg(PALETTE.fruit).bg(PALETTE.board));
}

fn render_snake(frame: &mut Frame<'_>, inner: Rect, snapshot: &Snapshot) {
    let buffer = frame.buffer_mut();
    for (index, segment) in snapshot.snake.iter().enumerate() {
        let Some((x, y)) = logical_to_terminal(inner, snapshot.grid, *segment) else {
            continue;
        };

        let style = if index == 0 {
            Style::new()
                .fg(PALETTE.snake_head)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::new().fg(PALETTE.snake_body)
        };
        buffer.set_string(x, y, GLYPH_CELL, style);
    }
}

fn render_too_small(frame: &mut Frame<'_>, area: Rect, width: u16, height: u16) {
    let message = vec![
        Line::from("Terminal too small"),
        Line::from(format!("need {width}x{height}, have {}x{}", area.width, area.height)),
    ];
    frame.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::new().fg(PALETTE.muted)),
        area,
    );
}

fn logical_to_terminal(inner: Rect, bounds: GridSize, position: Position) -> Option<(u16, u16)> {
    if !position.is_within_bounds(bounds) {
        return None;
    }

    let x_offset = u16::try_from(position.x).ok()?.saturating_mul(CELL_COLUMNS);
    let y_offset = u16::try_from(position.y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x >= inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}
