//! Layout and drawing: menu, board, sidebar, pause, quit menu, game over.

use crate::app::{MenuState, MenuTab, QuitOption, Screen};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};
use tetris2048::game::{GameState, WIN_TILE};
use tetris2048::theme::Theme;
use tetris2048::tile::{Rgb, Tile};

/// Terminal columns per board cell; wide enough for "2048".
const CELL_WIDTH: u16 = 4;
const SIDEBAR_WIDTH: u16 = 24;
/// Length of the row-clear flash.
const CLEAR_FLASH_MS: u32 = 350;

/// Everything a frame needs from the app.
pub struct View<'a> {
    pub screen: Screen,
    pub state: &'a GameState,
    pub theme: &'a Theme,
    pub paused: bool,
    /// Best score including the game in progress.
    pub best: u32,
    pub new_record: bool,
    pub menu: &'a MenuState,
    pub quit_selected: QuitOption,
}

/// Flash that fades the board back from the highlight colour after rows clear.
pub fn clear_flash_effect(theme: &Theme) -> Effect {
    fx::fade_from(theme.highlight, theme.highlight, (CLEAR_FLASH_MS, Interpolation::QuadOut))
}

const fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

/// Tile value centred in a cell; large values shorten to "16k".
fn tile_label(value: u32) -> String {
    let text = if value >= 10_000 {
        format!("{}k", value / 1024)
    } else {
        value.to_string()
    };
    format!("{text:^width$}", width = CELL_WIDTH as usize)
}

fn tile_style(tile: Tile) -> Style {
    let colors = tile.colors();
    Style::default()
        .fg(rgb(colors.foreground))
        .bg(rgb(colors.background))
        .bold()
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Draw the current screen. While a row-clear flash is running it is rendered over the
/// board and `effect_time` tracks its frame delta.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    clear_effect: &mut Option<Effect>,
    effect_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    match view.screen {
        Screen::Menu => draw_menu(frame, view, area, now),
        Screen::Playing => {
            let board = draw_game(frame, view, area);
            if let Some(effect) = clear_effect {
                let delta = effect_time.map_or(std::time::Duration::ZERO, |t| now.saturating_duration_since(t));
                *effect_time = Some(now);
                let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
                frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
            }
            if view.paused {
                draw_pause_overlay(frame, view.theme, area);
            }
        }
        Screen::QuitMenu => {
            draw_game(frame, view, area);
            draw_quit_menu(frame, view.theme, view.quit_selected);
        }
        Screen::GameOver => {
            draw_game(frame, view, area);
            draw_game_over(frame, view, area);
        }
    }
}

fn draw_menu(frame: &mut Frame, view: &View, area: Rect, now: Instant) {
    let theme = view.theme;
    let menu = view.menu;
    let popup = centered(area, 44, 20);

    let highlight = Style::default().fg(theme.bg).bg(theme.title).bold();
    let selected = Style::default().fg(theme.title).bold();
    let normal = Style::default().fg(theme.inactive_fg);
    let pick = |tab: MenuTab, chosen: bool| {
        if menu.current_tab == tab && chosen {
            highlight
        } else if chosen {
            selected
        } else {
            normal
        }
    };

    let difficulty_tabs: Vec<Span> = [
        tetris2048::Difficulty::Easy,
        tetris2048::Difficulty::Medium,
        tetris2048::Difficulty::Hard,
    ]
    .into_iter()
    .flat_map(|d| {
        [
            Span::styled(format!(" {} ", d.label()), pick(MenuTab::Difficulty, menu.selected_difficulty == d)),
            Span::from(" "),
        ]
    })
    .collect();
    let animation_tabs = vec![
        Span::styled(" ON ", pick(MenuTab::Animations, menu.animations)),
        Span::from("  "),
        Span::styled(" OFF ", pick(MenuTab::Animations, !menu.animations)),
    ];
    let start = Span::styled(
        " [ START ] ",
        if menu.current_tab == MenuTab::Start { highlight } else { Style::default().fg(theme.main_fg) },
    );
    let heading = |s: &'static str| Line::from(Span::styled(s, Style::default().fg(theme.div_line)));

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Tetris ", Style::default().fg(theme.main_fg).bold()),
            Span::styled(tile_label(WIN_TILE), tile_style(Tile::new(WIN_TILE))),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!("Best: {}", view.best), Style::default().fg(theme.main_fg))),
        Line::from(""),
        heading(" ─ DIFFICULTY ─ "),
        Line::from(difficulty_tabs),
        Line::from(""),
        heading(" ─ ANIMATIONS ─ "),
        Line::from(animation_tabs),
        Line::from(""),
        Line::from(""),
        Line::from(start),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ↕ ", Style::default().fg(theme.highlight)),
            Span::from("NAVIGATE  "),
            Span::styled(" ↔ ", Style::default().fg(theme.highlight)),
            Span::from("CHANGE  "),
            Span::styled(" ENTER ", Style::default().fg(theme.highlight)),
            Span::from("PLAY"),
        ]),
        Line::from(""),
        Line::from(Span::styled(" [Q] QUIT ", Style::default().fg(theme.inactive_fg))),
    ];

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );

    // Slide in from below, ease-out cubic.
    let t = (now.saturating_duration_since(menu.opened).as_secs_f32() / 0.5).min(1.0);
    let offset = ((1.0 - t).powi(3) * 8.0) as u16;
    let mut slid = popup;
    slid.y = (slid.y + offset).min(area.bottom().saturating_sub(slid.height));
    p.render(slid, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Paused ", Style::default().fg(theme.bg).bg(theme.title))),
        Line::from(""),
        Line::from(Span::styled(" P Resume    Q Quit ", Style::default().fg(theme.main_fg))),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let state = view.state;
    let fg = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Game Over ", Style::default().fg(Color::White).bg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", state.score()), fg)),
        Line::from(Span::styled(format!(" Best: {} ", view.best), fg)),
        Line::from(Span::styled(format!(" Rows: {}  Merges: {} ", state.rows_cleared, state.merges), fg)),
        Line::from(Span::styled(format!(" Max tile: {} ", state.max_tile_value()), fg)),
    ];
    if state.reached_2048 {
        lines.push(Line::from(Span::styled(
            format!(" Reached {WIN_TILE}! "),
            tile_style(Tile::new(WIN_TILE)),
        )));
    }
    if view.new_record {
        lines.push(Line::from(Span::styled(" New record! ", Style::default().fg(theme.title).bold())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" R Restart  Enter Menu  Q Quit ", fg)));

    let popup = centered(area, 36, lines.len() as u16 + 2);
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Tetris 2048 ", theme.title)),
        )
        .render(popup, frame.buffer_mut());
}

/// Board plus sidebar, centred. Returns the board's inner rect.
fn draw_game(frame: &mut Frame, view: &View, area: Rect) -> Rect {
    let grid = &view.state.grid;
    let board_w = grid.cols() as u16 * CELL_WIDTH + 2;
    let board_h = grid.rows() as u16 + 2;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(board_w + SIDEBAR_WIDTH),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(board_h), Constraint::Fill(1)])
        .split(horiz[1]);
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_w), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    let board = draw_board(frame, view, parts[0]);
    draw_sidebar(frame, view, parts[1]);
    board
}

fn draw_board(frame: &mut Frame, view: &View, area: Rect) -> Rect {
    let theme = view.theme;
    let state = view.state;
    let grid = &state.grid;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Tetris 2048 ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    // Board row 0 is the floor, drawn on the bottom line.
    let rows = grid.rows();
    let cell_rect = |row: usize, col: usize| -> Option<(u16, u16)> {
        let x = inner.x + col as u16 * CELL_WIDTH;
        let y = inner.y + (rows - 1 - row) as u16;
        (x + CELL_WIDTH <= inner.right() && y < inner.bottom()).then_some((x, y))
    };
    let in_grid = |row: i32, col: i32| -> Option<(usize, usize)> {
        let (r, c) = (usize::try_from(row).ok()?, usize::try_from(col).ok()?);
        (r < grid.rows() && c < grid.cols()).then_some((r, c))
    };

    let buf = frame.buffer_mut();
    let empty = Style::default().fg(theme.div_line).bg(theme.bg);
    for row in 0..rows {
        for col in 0..grid.cols() {
            let Some((x, y)) = cell_rect(row, col) else {
                continue;
            };
            match grid.get(row, col).tile() {
                Some(tile) => buf.set_string(x, y, tile_label(tile.value()), tile_style(tile)),
                None => buf.set_string(x, y, " ·  ", empty),
            };
        }
    }

    if let (Some(ghost), false) = (state.ghost(), state.is_game_over()) {
        let style = Style::default().fg(theme.ghost).bg(theme.bg);
        for (row, col, _) in ghost.tiles() {
            if let Some((x, y)) = in_grid(row, col).and_then(|(r, c)| cell_rect(r, c)) {
                buf.set_string(x, y, "░░░░", style);
            }
        }
    }
    if let Some(piece) = &state.piece {
        for (row, col, tile) in piece.tiles() {
            if let Some((x, y)) = in_grid(row, col).and_then(|(r, c)| cell_rect(r, c)) {
                buf.set_string(x, y, tile_label(tile.value()), tile_style(tile));
            }
        }
    }

    let popup_style = Style::default().fg(theme.highlight).bg(theme.bg).bold();
    for popup in &state.popups {
        if let Some((x, y)) = cell_rect(popup.row.min(rows - 1), popup.col) {
            let label = format!("+{}", popup.amount);
            let room = inner.right().saturating_sub(x) as usize;
            buf.set_stringn(x, y, label, room, popup_style);
        }
    }
    inner
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let state = view.state;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);
    let bordered = || Block::default().borders(Borders::ALL).border_style(border_style);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Next
            Constraint::Length(1),
            Constraint::Length(9), // Stats
            Constraint::Length(1),
            Constraint::Length(4), // Progress to 2048
        ])
        .split(area);

    let next_block = bordered().title(Span::styled("Next", title_style));
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    draw_next_preview(frame, state, next_inner);

    let stat = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    let stats = Text::from(vec![
        stat("Score: ", state.score().to_string()),
        stat("Best: ", view.best.to_string()),
        stat("Rows: ", state.rows_cleared.to_string()),
        stat("Merges: ", state.merges.to_string()),
        stat("Max tile: ", state.max_tile_value().to_string()),
        stat("Pieces: ", state.pieces_locked.to_string()),
        stat("Speed: ", state.difficulty.label().to_string()),
    ]);
    let stats_block = bordered();
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    Paragraph::new(stats).render(stats_inner, frame.buffer_mut());

    let goal_block = bordered().title(Span::styled(format!("Goal {WIN_TILE}"), title_style));
    let goal_inner = goal_block.inner(chunks[4]);
    goal_block.render(chunks[4], frame.buffer_mut());
    if state.reached_2048 {
        Paragraph::new(Line::from(Span::styled(tile_label(WIN_TILE), tile_style(Tile::new(WIN_TILE)))))
            .alignment(Alignment::Center)
            .render(goal_inner, frame.buffer_mut());
    } else {
        Gauge::default()
            .ratio(goal_ratio(state.max_tile_value()))
            .gauge_style(Style::default().fg(theme.highlight))
            .render(goal_inner, frame.buffer_mut());
    }
}

/// Progress of the largest tile toward [`WIN_TILE`], by exponent.
fn goal_ratio(max_tile: u32) -> f64 {
    if max_tile == 0 {
        return 0.0;
    }
    (f64::from(max_tile.trailing_zeros()) / f64::from(WIN_TILE.trailing_zeros())).min(1.0)
}

fn draw_next_preview(frame: &mut Frame, state: &GameState, area: Rect) {
    let preview = state.next.preview();
    let width = preview.first().map_or(0, Vec::len) as u16 * CELL_WIDTH;
    let off_x = area.width.saturating_sub(width) / 2;
    let off_y = area.height.saturating_sub(preview.len() as u16) / 2;
    let buf = frame.buffer_mut();
    for (i, line) in preview.iter().enumerate() {
        for (j, &value) in line.iter().enumerate() {
            if value == 0 {
                continue;
            }
            let x = area.x + off_x + j as u16 * CELL_WIDTH;
            let y = area.y + off_y + i as u16;
            if x + CELL_WIDTH <= area.right() && y < area.bottom() {
                let tile = Tile::new(value);
                buf.set_string(x, y, tile_label(value), tile_style(tile));
            }
        }
    }
}

fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title).bg(theme.bg))
        .title(" Quit? ");
    Clear.render(quit_rect, frame.buffer_mut());
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::MainMenu, " Main Menu "),
        (QuitOption::Exit, " Exit "),
    ];
    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default().fg(theme.bg).bg(theme.title).bold()
        } else {
            Style::default().fg(theme.title)
        };
        let x = inner.x + inner.width.saturating_sub(label.len() as u16) / 2;
        let y = inner.y + 1 + i as u16 * 2;
        if y < inner.bottom() {
            frame.buffer_mut().set_string(x, y, label, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_fit_a_cell() {
        assert_eq!(tile_label(2), " 2  ");
        assert_eq!(tile_label(2048), "2048");
        assert_eq!(tile_label(16384), "16k ");
        assert_eq!(tile_label(131_072).len(), CELL_WIDTH as usize);
    }

    #[test]
    fn goal_tracks_exponent() {
        assert!(goal_ratio(0).abs() < f64::EPSILON);
        assert!((goal_ratio(2048) - 1.0).abs() < f64::EPSILON);
        assert!((goal_ratio(32) - 5.0 / 11.0).abs() < 1e-9);
        assert!((goal_ratio(8192) - 1.0).abs() < f64::EPSILON);
    }
}
