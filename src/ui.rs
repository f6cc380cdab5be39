//! Layout and drawing: start menu, board, HUD, pause, settings, quit menu, game over.

use crate::app::{GameOverOption, QuitOption, Screen, SettingsField, SettingsForm, StartOption};
use crate::game::{CellKind, GameState, NextLadder};
use crate::settings::{Settings, SpeedTier};
use crate::theme::{Theme, blend};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each grid cell is two terminal columns so the board looks square.
const CELL_WIDTH: u16 = 2;
/// Score, floor and next-ladder lines above the board.
const HUD_HEIGHT: u16 = 3;
const HUD_MIN_WIDTH: u16 = 30;

/// Duration of the floor-change fade (TachyonFX) in ms.
const CLIMB_FADE_MS: u32 = 600;
/// Period of the red border pulse while in grace.
const GRACE_PULSE_MS: u64 = 250;

/// Everything the renderer needs for one frame.
pub struct View<'a> {
    pub screen: Screen,
    pub state: &'a GameState,
    pub theme: &'a Theme,
    pub paused: bool,
    pub best: u32,
    pub new_high_score: bool,
    pub floor_label: &'a str,
    pub start_selected: StartOption,
    pub quit_selected: QuitOption,
    pub game_over_selected: GameOverOption,
    pub form: &'a SettingsForm,
    /// Screen drawn under the settings overlay.
    pub settings_from: Screen,
    /// Settings in effect for this run.
    pub settings: Settings,
    /// Milliseconds since launch; drives pulses.
    pub anim_ms: u64,
}

/// Largest square grid that fits the terminal with border and HUD.
pub fn grid_size_for_terminal(term_cols: u16, term_rows: u16) -> u16 {
    let by_width = term_cols.saturating_sub(2) / CELL_WIDTH;
    let by_height = term_rows.saturating_sub(2 + HUD_HEIGHT);
    by_width.min(by_height)
}

/// Fade in from the new floor's background after a climb.
pub fn climb_effect(bg: Color) -> Effect {
    fx::fade_from(bg, bg, (CLIMB_FADE_MS, Interpolation::QuadOut))
}

pub fn next_ladder_text(next: NextLadder) -> String {
    match next {
        NextLadder::Spawned => "Spawned".to_string(),
        NextLadder::Target(score) => score.to_string(),
        NextLadder::Unbounded => "∞".to_string(),
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// HUD and board (with border) rects, centred as one column.
fn play_layout(area: Rect, grid_size: u16) -> (Rect, Rect) {
    let board_w = grid_size * CELL_WIDTH + 2;
    let board_h = grid_size + 2;
    let column = centered(area, board_w.max(HUD_MIN_WIDTH), HUD_HEIGHT + board_h);
    let hud = Rect {
        height: HUD_HEIGHT.min(column.height),
        ..column
    };
    let board = Rect {
        x: column.x + column.width.saturating_sub(board_w) / 2,
        y: column.y + hud.height,
        width: board_w.min(column.width),
        height: board_h.min(column.height.saturating_sub(hud.height)),
    };
    (hud, board)
}

/// Draw the current screen. While a climb fade is running, processes it and
/// updates `climb_effect_time`.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    climb_effect: &mut Option<Effect>,
    climb_effect_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    Block::default()
        .style(Style::default().bg(view.theme.bg))
        .render(area, frame.buffer_mut());
    match view.screen {
        Screen::Start => draw_start(frame, view, area),
        Screen::Settings => {
            if view.settings_from == Screen::GameOver {
                draw_game(frame, view, area);
                draw_game_over(frame, view, area);
            } else {
                draw_start(frame, view, area);
            }
            draw_settings(frame, view, area);
        }
        Screen::Playing => {
            let board = draw_game(frame, view, area);
            if let Some(effect) = climb_effect {
                let delta = climb_effect_time
                    .map(|t| now.saturating_duration_since(t))
                    .unwrap_or_default();
                let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
                *climb_effect_time = Some(now);
                frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
            }
            if view.paused {
                draw_pause_overlay(frame, view, area);
            }
        }
        Screen::QuitMenu => {
            draw_game(frame, view, area);
            draw_quit_menu(frame, view, area);
        }
        Screen::GameOver => {
            draw_game(frame, view, area);
            draw_game_over(frame, view, area);
        }
    }
}

fn popup_block(theme: &Theme, title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(theme.title).bold(),
        ))
}

fn option_style(theme: &Theme, selected: bool) -> Style {
    if selected {
        Style::default().fg(theme.bg).bg(theme.title).bold()
    } else {
        Style::default().fg(theme.main_fg)
    }
}

fn draw_start(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let popup = centered(area, 40, 16);
    let threshold = match view.settings.ladder_threshold {
        0 => "off".to_string(),
        t => format!("every {}", t),
    };
    let options = [
        (StartOption::Play, " Play "),
        (StartOption::Settings, " Settings "),
        (StartOption::Quit, " Quit "),
    ];
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Ladder ", Style::default().fg(theme.ladder).bold()),
            Span::styled(" Snake ", Style::default().fg(theme.snake_head).bold()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("Best: {}", view.best),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!("Ladders {} · {}", threshold, view.settings.speed.label()),
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
    ];
    for (opt, label) in options {
        lines.push(Line::from(Span::styled(
            label,
            option_style(theme, opt == view.start_selected),
        )));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "↕ navigate   Enter select   Q quit",
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(Span::styled(
            "arrows / hjkl / wasd to steer",
            Style::default().fg(theme.inactive_fg),
        )),
    ]);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme, "Ladder Snake"))
        .render(popup, frame.buffer_mut());
}

fn draw_settings(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let form = view.form;
    let popup = centered(area, 36, 10);
    Clear.render(popup, frame.buffer_mut());
    let field_style = |field: SettingsField| option_style(theme, form.field == field);
    let cursor = if form.field == SettingsField::Threshold && (view.anim_ms / 500) % 2 == 0 {
        "_"
    } else {
        " "
    };
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Ladder every ", field_style(SettingsField::Threshold)),
            Span::styled(
                format!(" {}{} ", form.threshold_input, cursor),
                Style::default().fg(theme.main_fg),
            ),
        ]),
        Line::from(Span::styled(
            "points (min 20)",
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(" Speed ", field_style(SettingsField::Speed))),
        Line::from(
            SpeedTier::ALL
                .iter()
                .map(|&tier| {
                    let style = if tier == form.speed {
                        Style::default().fg(theme.snake_head).bold()
                    } else {
                        Style::default().fg(theme.inactive_fg)
                    };
                    Span::styled(format!(" {} ", tier.label()), style)
                })
                .collect::<Vec<_>>(),
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Enter save   Esc cancel",
            Style::default().fg(theme.inactive_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme, "Settings"))
        .render(popup, frame.buffer_mut());
}

/// Border colour while the grace timer runs: pulses between alert and the floor background.
fn grace_border(theme: &Theme, bg: Color, anim_ms: u64) -> Color {
    let phase = (anim_ms % (GRACE_PULSE_MS * 2)) as f32 / GRACE_PULSE_MS as f32;
    let t = 1.0 - (phase - 1.0).abs();
    blend(theme.alert, bg, 0.4 + 0.6 * t)
}

/// Draw HUD and board; returns the board rect (with border).
fn draw_game(frame: &mut Frame, view: &View, area: Rect) -> Rect {
    let theme = view.theme;
    let board = view.state.snapshot();
    let (hud_area, board_area) = play_layout(area, board.size);

    let label = Style::default().fg(theme.title);
    let value = Style::default().fg(theme.main_fg);
    let hud = vec![
        Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(board.score.to_string(), value),
            Span::styled("  Best: ", label),
            Span::styled(view.best.max(board.score).to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("Floor: ", label),
            Span::styled(view.floor_label.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("Next Ladder: ", label),
            Span::styled(next_ladder_text(board.next_ladder), value),
        ]),
    ];
    Paragraph::new(hud)
        .alignment(Alignment::Center)
        .render(hud_area, frame.buffer_mut());

    let floor_bg = theme.floor_bg(board.floor);
    let empty = theme.floor_cell(board.floor);
    let border = if board.in_grace {
        grace_border(theme, floor_bg, view.anim_ms)
    } else {
        theme.div_line
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border).bg(floor_bg));
    let inner = block.inner(board_area);
    block.render(board_area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for (y, row) in board.rows().enumerate() {
        let ry = inner.y + y as u16;
        if ry >= inner.y + inner.height {
            break;
        }
        for (x, cell) in row.iter().enumerate() {
            let rx = inner.x + x as u16 * CELL_WIDTH;
            if rx + CELL_WIDTH > inner.x + inner.width {
                break;
            }
            let (symbol, fg) = match cell {
                CellKind::Empty => ("  ", empty),
                CellKind::SnakeHead => ("██", theme.snake_head),
                CellKind::SnakeBody => ("▓▓", theme.snake_body),
                CellKind::Food => ("()", theme.food),
                CellKind::Ladder => ("╟╢", theme.ladder),
            };
            buf.set_string(rx, ry, symbol, Style::default().fg(fg).bg(empty));
        }
    }
    board_area
}

fn draw_pause_overlay(frame: &mut Frame, view: &View, area: Rect) {
    let popup = centered(area, 28, 5);
    Clear.render(popup, frame.buffer_mut());
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(Span::styled(
            " Space/P resume   Q quit ",
            Style::default().fg(view.theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(view.theme.div_line).bg(view.theme.bg))
                .style(Style::default().bg(view.theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_quit_menu(frame: &mut Frame, view: &View, area: Rect) {
    let popup = centered(area, 24, 8);
    Clear.render(popup, frame.buffer_mut());
    let block = popup_block(view.theme, "Quit?");
    let inner = block.inner(popup);
    block.render(popup, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::MainMenu, " Main Menu "),
        (QuitOption::Exit, " Exit "),
    ];
    for (i, (opt, label)) in options.iter().enumerate() {
        let style = option_style(view.theme, *opt == view.quit_selected);
        let rx = inner.x + inner.width.saturating_sub(label.len() as u16) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.y + inner.height {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let popup = centered(area, 34, 17);
    Clear.render(popup, frame.buffer_mut());
    let score = view.state.game_over.unwrap_or(view.state.score);
    let text = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!("Score: {}", score), text)),
        Line::from(Span::styled(format!("Best: {}", view.best), text)),
        Line::from(Span::styled(
            format!("Length: {}", view.state.snake.total_len()),
            text,
        )),
        Line::from(Span::styled(format!("Reached: {}", view.floor_label), text)),
    ];
    if view.new_high_score {
        lines.push(Line::from(Span::styled(
            "New High Score!",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(""));
    let options = [
        (GameOverOption::PlayAgain, " Play Again "),
        (GameOverOption::Settings, " Settings "),
        (GameOverOption::MainMenu, " Main Menu "),
    ];
    for (opt, label) in options {
        lines.push(Line::from(Span::styled(
            label,
            option_style(theme, opt == view.game_over_selected),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter select   R again   Q menu",
        Style::default().fg(theme.inactive_fg),
    )));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme, "Ladder Snake"))
        .render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(screen: Screen, state: &GameState, new_high_score: bool) -> String {
        let theme = Theme::default();
        let form = SettingsForm::from_settings(&Settings::default());
        let view = View {
            screen,
            state,
            theme: &theme,
            paused: false,
            best: 12,
            new_high_score,
            floor_label: "The Ground Floor",
            start_selected: StartOption::Play,
            quit_selected: QuitOption::Resume,
            game_over_selected: GameOverOption::PlayAgain,
            form: &form,
            settings_from: Screen::Start,
            settings: Settings::default(),
            anim_ms: 0,
        };
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        let mut effect = None;
        let mut effect_time = None;
        terminal
            .draw(|f| draw(f, &view, &mut effect, &mut effect_time, Instant::now()))
            .unwrap();
        let buf = terminal.backend().buffer();
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_grid_size_for_terminal() {
        assert_eq!(grid_size_for_terminal(80, 24), 19);
        assert_eq!(grid_size_for_terminal(30, 40), 14);
        assert_eq!(grid_size_for_terminal(0, 0), 0);
    }

    #[test]
    fn test_next_ladder_text() {
        assert_eq!(next_ladder_text(NextLadder::Spawned), "Spawned");
        assert_eq!(next_ladder_text(NextLadder::Target(100)), "100");
        assert_eq!(next_ladder_text(NextLadder::Unbounded), "∞");
    }

    #[test]
    fn test_playing_screen_shows_hud() {
        let state = GameState::new(10, 50, 1);
        let out = render(Screen::Playing, &state, false);
        assert!(out.contains("Score: 0"));
        assert!(out.contains("The Ground Floor"));
        assert!(out.contains("Next Ladder: 50"));
        assert!(out.contains("██"));
    }

    #[test]
    fn test_game_over_shows_new_high_score() {
        let state = GameState::new(10, 50, 1);
        let out = render(Screen::GameOver, &state, true);
        assert!(out.contains("Game Over"));
        assert!(out.contains("New High Score!"));
        assert!(out.contains("Play Again"));
        assert!(out.contains("Settings"));
    }

    #[test]
    fn test_start_screen_lists_options() {
        let state = GameState::new(10, 50, 1);
        let out = render(Screen::Start, &state, false);
        assert!(out.contains("Play"));
        assert!(out.contains("Settings"));
        assert!(out.contains("Best: 12"));
    }

    #[test]
    fn test_play_layout_fits_small_terminal() {
        let area = Rect::new(0, 0, 20, 10);
        let (hud, board) = play_layout(area, 20);
        assert!(hud.right() <= area.right());
        assert!(board.bottom() <= area.bottom());
    }
}
