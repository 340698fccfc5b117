use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{self, stdout, Stdout},
    time::{Duration, Instant},
};

use falling_blocks::{
    config::{parse_palette, DEFAULT_HEIGHT, DEFAULT_WIDTH, LINES_PER_LEVEL, SOFT_DROP_FACTOR},
    BoardSize, ConfigError, Game, GameConfig, GameEvent, GameState, ShapeColor,
};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Parser, Debug)]
#[command(version, about = "A falling-block puzzle game for the terminal.", long_about = None)]
struct Args {
    /// Board width in cells.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
    /// Board height in cells.
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
    /// Seed of the piece generator, for reproducible games.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Lines to clear before the level goes up.
    #[arg(long, default_value_t = LINES_PER_LEVEL)]
    lines_per_level: u32,
    /// Fall interval multiplier while soft drop is held.
    #[arg(long, default_value_t = SOFT_DROP_FACTOR)]
    soft_drop_factor: f64,
    /// Piece colors as comma separated #RRGGBB values.
    #[arg(long, value_delimiter = ',')]
    palette: Vec<String>,
}

impl Args {
    fn into_config(self) -> Result<GameConfig, ConfigError> {
        let mut config = GameConfig {
            board: BoardSize {
                width: self.width,
                height: self.height,
            },
            lines_per_level: self.lines_per_level,
            soft_drop_factor: self.soft_drop_factor,
            seed: self.seed,
            ..GameConfig::default()
        };
        if !self.palette.is_empty() {
            config.palette = parse_palette(&self.palette)?;
        }
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const INFO_WIDTH: u16 = 18;

// Idle redraw cadence when no tick is due.
const IDLE_POLL: Duration = Duration::from_millis(250);
// Soft drop expiry on terminals that never report key releases.
const SOFT_DROP_HOLD: Duration = Duration::from_millis(200);

fn shape_color(color: ShapeColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game, status: &str) {
    let area = frame.size();

    match game.state {
        GameState::Playing => render_game(frame, game, status, area),
        GameState::Paused => render_paused(frame, game, status, area),
        GameState::GameOver => render_game_over(frame, game, status, area),
        GameState::Idle => render_idle(frame, game, status, area),
    }
}

fn render_game(frame: &mut Frame, game: &Game, status: &str, area: Rect) {
    let board = game.board();
    let grid_display_width = (board.width as u16 * CELL_WIDTH) + 2;
    let grid_display_height = board.height as u16 + 2;
    let total_width = grid_display_width + INFO_WIDTH + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(INFO_WIDTH),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_info(frame, game, status, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→/AD: Move | ↑/W: Rotate | ↓/S: Soft drop | P: Pause | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Falling Blocks ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = game
        .render_grid()
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match cell {
                    Some(color) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(shape_color(color)))
                    }
                    None => Span::raw(EMPTY_CHAR),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, status: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score)),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.lines_cleared)),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.level)),
        Line::from(""),
        Line::from(Span::styled("Speed", Style::default().fg(Color::Magenta))),
        Line::from(format!("{:.0} ms", game.fall_interval_ms())),
        Line::from(""),
        Line::from(Span::styled(status.to_string(), Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, text: Vec<Line>) {
    let height = text.len() as u16 + 2;
    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, height, area);
    frame.render_widget(paragraph, popup_area);
}

fn render_idle(frame: &mut Frame, game: &Game, status: &str, area: Rect) {
    render_game(frame, game, status, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("FALLING BLOCKS", Style::default().fg(Color::Cyan))),
        Line::from(""),
        Line::from(Span::styled(
            "Press ENTER to start",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_popup(frame, area, "Welcome", text);
}

fn render_game_over(frame: &mut Frame, game: &Game, status: &str, area: Rect) {
    render_game(frame, game, status, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score)),
        Line::from(format!("Lines: {}", game.lines_cleared)),
        Line::from(format!("Level: {}", game.level)),
        Line::from(""),
        Line::from(Span::styled(
            "ENTER: new game",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "ESC: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_popup(frame, area, "Game Over", text);
}

fn render_paused(frame: &mut Frame, game: &Game, status: &str, area: Rect) {
    render_game(frame, game, status, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to continue",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press Q to end the game",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_popup(frame, area, "Paused", text);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Event Journal
// ============================================================================

/// Folds drained game events into the one-line status shown in the panel.
fn describe_events(events: &[GameEvent], status: &mut String) {
    for event in events {
        match event {
            GameEvent::GameStarted => *status = "Good luck!".to_string(),
            GameEvent::LinesCleared(1) => *status = "1 line".to_string(),
            GameEvent::LinesCleared(lines) => *status = format!("{lines} lines"),
            GameEvent::LevelUp(level) => *status = format!("Level {level}!"),
            GameEvent::GameOver => *status = "Board full".to_string(),
            GameEvent::GameQuit => status.clear(),
            GameEvent::PieceSpawned(_)
            | GameEvent::PieceMoved
            | GameEvent::PieceRotated
            | GameEvent::PieceLocked
            | GameEvent::Paused
            | GameEvent::Unpaused => {}
        }
    }
}

// ============================================================================
// Main Loop
// ============================================================================

enum Flow {
    Continue,
    Exit,
}

struct SoftDrop {
    reports_release: bool,
    expires: Option<Instant>,
}

fn handle_key(game: &mut Game, key: KeyEvent, soft_drop: &mut SoftDrop) -> Flow {
    let is_down = matches!(
        key.code,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S')
    );

    if key.kind == KeyEventKind::Release {
        if is_down {
            game.end_soft_drop();
            soft_drop.expires = None;
        }
        return Flow::Continue;
    }

    match key.code {
        KeyCode::Esc => return Flow::Exit,
        KeyCode::Char('q') | KeyCode::Char('Q') if key.kind == KeyEventKind::Press => {
            match game.state {
                GameState::Playing | GameState::Paused => game.quit(),
                GameState::Idle | GameState::GameOver => return Flow::Exit,
            }
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => {}
        KeyCode::Enter => {
            game.start();
        }
        KeyCode::Char('p') | KeyCode::Char('P') if key.kind == KeyEventKind::Press => {
            game.toggle_pause();
        }
        _ if game.state == GameState::Playing => match key.code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                game.move_left();
            }
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                game.move_right();
            }
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W')
                if key.kind == KeyEventKind::Press =>
            {
                game.rotate();
            }
            _ if is_down => {
                game.begin_soft_drop();
                if !soft_drop.reports_release {
                    soft_drop.expires = Some(Instant::now() + SOFT_DROP_HOLD);
                }
            }
            _ => {}
        },
        _ => {}
    }
    Flow::Continue
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut game: Game,
    reports_release: bool,
) -> anyhow::Result<()> {
    let mut last_tick = Instant::now();
    let mut status = String::new();
    let mut soft_drop = SoftDrop {
        reports_release,
        expires: None,
    };

    loop {
        terminal
            .draw(|frame| render(frame, &game, &status))
            .context("failed to draw frame")?;

        let tick_duration = game.tick_interval();
        let timeout = if game.state == GameState::Playing {
            tick_duration
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO)
        } else {
            IDLE_POLL
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if let Flow::Exit = handle_key(&mut game, key, &mut soft_drop) {
                    break;
                }
            }
        }

        if soft_drop.expires.is_some_and(|expires| Instant::now() >= expires) {
            game.end_soft_drop();
            soft_drop.expires = None;
        }

        if game.state != GameState::Playing {
            last_tick = Instant::now();
        } else if last_tick.elapsed() >= game.tick_interval() {
            game.tick();
            last_tick = Instant::now();
        }

        describe_events(&game.take_events(), &mut status);
    }

    Ok(())
}

fn setup_terminal() -> io::Result<(Terminal<CrosstermBackend<Stdout>>, bool)> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let reports_release = supports_keyboard_enhancement().unwrap_or(false);
    if reports_release {
        stdout().execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok((terminal, reports_release))
}

fn restore_terminal(reports_release: bool) -> io::Result<()> {
    if reports_release {
        stdout().execute(PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.into_config().context("invalid game configuration")?;

    let (mut terminal, reports_release) =
        setup_terminal().context("failed to set up the terminal")?;
    let result = run(&mut terminal, Game::new(config), reports_release);
    restore_terminal(reports_release).context("failed to restore the terminal")?;

    result
}
