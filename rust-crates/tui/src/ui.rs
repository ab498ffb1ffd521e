use crate::client::BoardView;
use board_core::{
    perimeter::BOARD_SIZE,
    scheduler::Frame as BoardFrame,
};
use color_eyre::eyre::{
    Result,
    eyre,
};
use crossterm::{
    event::{
        Event,
        EventStream,
        KeyCode,
        KeyEvent,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use futures::StreamExt;
use ratatui::{
    prelude::*,
    widgets::{
        canvas::{
            self,
            Canvas,
            Circle,
            Rectangle,
        },
        *,
    },
};
use std::io::stdout;

const OWNER_MARKER_RADIUS: f64 = 5.0;
const PLAYER_MARKER_RADIUS: f64 = 12.0;
const SIDE_PANEL_WIDTH: u16 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEvent {
    Quit,
    Roll,
    Buy,
    Redraw,
}

pub type InputEventReceiver = EventStream;

#[derive(Default)]
pub struct UiState {
    show_help: bool,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // One persistent Terminal keeps the diffing buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn input_event_stream() -> InputEventReceiver {
    EventStream::new()
}

pub async fn next_raw_event(events: &mut InputEventReceiver) -> Result<Event> {
    match events.next().await {
        Some(event) => Ok(event?),
        None => Err(eyre!("terminal input stream closed")),
    }
}

pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    match event {
        Event::Key(key) => interpret_key(state, key),
        Event::Resize(..) => Some(UserEvent::Redraw),
        _ => None,
    }
}

fn interpret_key(state: &mut UiState, key: KeyEvent) -> Option<UserEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(UserEvent::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(UserEvent::Quit),
        KeyCode::Char('r') | KeyCode::Char(' ') => Some(UserEvent::Roll),
        KeyCode::Char('b') => Some(UserEvent::Buy),
        KeyCode::Char('h') | KeyCode::Char('?') => {
            state.show_help = !state.show_help;
            Some(UserEvent::Redraw)
        }
        _ => None,
    }
}

pub fn draw(state: &mut UiState, view: &BoardView) -> Result<()> {
    let show_help = state.show_help;
    if let Some(term) = state.terminal.as_mut() {
        term.draw(|f| ui(f, show_help, view))?;
    }
    Ok(())
}

fn ui(f: &mut Frame, show_help: bool, view: &BoardView) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(SIDE_PANEL_WIDTH)])
        .split(f.area());
    draw_board(f, columns[0], view);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // player
            Constraint::Length(4), // dice
            Constraint::Length(4), // actions
            Constraint::Length(7), // game log
            Constraint::Min(3),    // status
            Constraint::Length(if show_help { 7 } else { 3 }),
        ])
        .split(columns[1]);
    draw_player_panel(f, rows[0], view);
    draw_dice_panel(f, rows[1], view);
    draw_actions_panel(f, rows[2], view);
    draw_log_panel(f, rows[3], view);
    draw_status(f, rows[4], view);
    draw_help(f, rows[5], show_help);
}

fn draw_board(f: &mut Frame, area: Rect, view: &BoardView) {
    let title = format!("Room {}", view.room_id);
    let frame = &view.frame;
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, BOARD_SIZE])
        .y_bounds([0.0, BOARD_SIZE])
        .paint(|ctx| paint_board(ctx, frame));
    f.render_widget(canvas, area);
}

// Board geometry has y growing downwards; the canvas has it growing upwards.
fn flip_y(y: f64) -> f64 {
    BOARD_SIZE - y
}

fn paint_board(ctx: &mut canvas::Context<'_>, frame: &BoardFrame) {
    if frame.is_empty_board() {
        ctx.print(
            BOARD_SIZE / 2.0 - 60.0,
            BOARD_SIZE / 2.0,
            Line::from("Waiting for the game...").dark_gray(),
        );
        return;
    }
    for tile in &frame.tiles {
        ctx.draw(&Rectangle {
            x: tile.rect.x,
            y: flip_y(tile.rect.y + tile.rect.height),
            width: tile.rect.width,
            height: tile.rect.height,
            color: tile_color(&tile.color, tile.kind.is_ownable()),
        });
        if let Some(owner) = &tile.owner_color {
            let center = tile.rect.center();
            ctx.draw(&Circle {
                x: center.x,
                y: flip_y(center.y),
                radius: OWNER_MARKER_RADIUS,
                color: hex_color(owner).unwrap_or(Color::White),
            });
        }
    }
    ctx.layer();
    for marker in &frame.players {
        let color = hex_color(&marker.color).unwrap_or(Color::LightYellow);
        ctx.draw(&Circle {
            x: marker.point.x,
            y: flip_y(marker.point.y),
            radius: PLAYER_MARKER_RADIUS,
            color,
        });
        let initial: String = marker.name.chars().take(1).collect();
        ctx.print(
            marker.point.x,
            flip_y(marker.point.y),
            Span::styled(initial, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        );
    }
}

fn draw_player_panel(f: &mut Frame, area: Rect, view: &BoardView) {
    let connectivity = if view.connected {
        Span::styled("CONNECTED", Style::default().fg(Color::Green))
    } else {
        Span::styled("DISCONNECTED", Style::default().fg(Color::Red))
    };
    let mut lines = vec![Line::from(vec![Span::raw("Server: "), connectivity])];
    match &view.local {
        Some(hud) => {
            let color = hex_color(&hud.color).unwrap_or(Color::White);
            lines.push(Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::styled(
                    hud.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(format!("Money: ₹{}", hud.money)));
            lines.push(Line::from(format!("Properties: {}", hud.properties)));
            if hud.in_jail {
                lines.push(Line::from("IN JAIL").red());
            }
        }
        None => lines.push(Line::from(format!("{} (not seated yet)", view.player_name))),
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Player"));
    f.render_widget(widget, area);
}

fn draw_dice_panel(f: &mut Frame, area: Rect, view: &BoardView) {
    let dice = view.frame.dice;
    let faces = format!(
        "{}  {}",
        die_glyph(dice.faces[0]),
        die_glyph(dice.faces[1])
    );
    let mut spans = vec![Span::styled(
        faces,
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if dice.spinning {
        spans.push(Span::styled("  rolling...", Style::default().fg(Color::Yellow)));
    } else {
        let total = u16::from(dice.faces[0]) + u16::from(dice.faces[1]);
        spans.push(Span::raw(format!("  = {total}")));
    }
    let widget = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Dice"));
    f.render_widget(widget, area);
}

fn draw_actions_panel(f: &mut Frame, area: Rect, view: &BoardView) {
    let mut lines = Vec::new();
    if view.gate.can_roll {
        lines.push(Line::from("[r] ROLL DICE"));
    }
    if let Some(tile) = view.gate.buyable_tile.as_ref().filter(|_| view.gate.can_buy) {
        lines.push(
            Line::from(format!("[b] BUY {} (₹{})", tile.name, tile.price)).green(),
        );
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Actions"));
    f.render_widget(widget, area);
}

fn draw_log_panel(f: &mut Frame, area: Rect, view: &BoardView) {
    let lines: Vec<Line> = if view.log.is_empty() {
        vec![Line::from("No events yet").dark_gray()]
    } else {
        view.log.iter().map(|l| Line::from(l.clone())).collect()
    };
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Game Log"));
    f.render_widget(widget, area);
}

fn draw_status(f: &mut Frame, area: Rect, view: &BoardView) {
    let text = if view.status.trim().is_empty() {
        "Ready".to_string()
    } else {
        view.status.clone()
    };
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(Style::default().fg(Color::Green));
    f.render_widget(widget, area);
}

fn draw_help(f: &mut Frame, area: Rect, show_help: bool) {
    let text = if show_help {
        "r / space  roll dice\n\
         b          buy current tile\n\
         h / ?      toggle help\n\
         q / Esc    quit\n\
         Ctrl-C     quit"
    } else {
        "r roll | b buy | h help | q quit"
    };
    let help =
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn die_glyph(face: u8) -> char {
    match face {
        1 => '⚀',
        2 => '⚁',
        3 => '⚂',
        4 => '⚃',
        5 => '⚄',
        6 => '⚅',
        _ => '?',
    }
}

/// Parses `#RRGGBB`.
fn hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn tile_color(hex: &str, ownable: bool) -> Color {
    if !ownable {
        return Color::DarkGray;
    }
    hex_color(hex).unwrap_or(Color::Gray)
}
