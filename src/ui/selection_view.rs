//! Side-by-side terminal view of comparison results.
//!
//! One column per provider; the focused column has a cyan border. All
//! decisions are made by [`SelectionState`]; this module only maps keys to
//! events and draws.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use super::selection::{SelectionEvent, SelectionState};
use crate::ai::ProviderResult;
use crate::error::{CmdfyError, Result};
use crate::executor::CommandAssembler;

const TICK_RATE_MS: u64 = 100;

const HELP_TEXT: &str = "←/→ navigate • Enter select • q quit";

/// Key or terminal event → state machine event
pub fn map_event(event: &Event) -> Option<SelectionEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key),
        Event::Resize(width, height) => Some(SelectionEvent::Resize {
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}

fn map_key(key: &KeyEvent) -> Option<SelectionEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(SelectionEvent::Quit);
    }

    match key.code {
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => Some(SelectionEvent::MoveRight),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => Some(SelectionEvent::MoveLeft),
        KeyCode::Enter => Some(SelectionEvent::Confirm),
        KeyCode::Char('q') | KeyCode::Esc => Some(SelectionEvent::Quit),
        _ => None,
    }
}

/// Let the user pick one of `results`.
///
/// Returns the index of the confirmed entry, or `None` if they quit. The
/// terminal is restored before returning, also on error.
pub fn run_selection(results: &[ProviderResult]) -> Result<Option<usize>> {
    let Some(state) = SelectionState::try_new(results) else {
        return Ok(None);
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = crossterm::execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }

    let outcome = Terminal::new(CrosstermBackend::new(io::stdout()))
        .map_err(CmdfyError::from)
        .and_then(|mut terminal| {
            let chosen = event_loop(&mut terminal, results, state);
            let _ = terminal.show_cursor();
            chosen
        });

    restore_with(disable_raw_mode, || crossterm::execute!(io::stdout(), LeaveAlternateScreen))?;

    outcome
}

/// Undo both terminal changes, then report the first one that failed
fn restore_with<D, L>(disable: D, leave: L) -> Result<()>
where
    D: FnOnce() -> io::Result<()>,
    L: FnOnce() -> io::Result<()>,
{
    let raw = disable();
    let screen = leave();
    raw.and(screen)?;
    Ok(())
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    results: &[ProviderResult],
    mut state: SelectionState,
) -> Result<Option<usize>> {
    let tick_rate = Duration::from_millis(TICK_RATE_MS);

    while !state.is_quitting() {
        terminal.draw(|f| draw(f, results, &state))?;

        if event::poll(tick_rate)? {
            if let Some(ev) = map_event(&event::read()?) {
                state = state.update(ev);
            }
        }
    }

    Ok(state.into_choice())
}

/// Draw every provider column plus title and help bars
pub fn draw(f: &mut Frame, results: &[ProviderResult], state: &SelectionState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(5),    // Columns
            Constraint::Length(1), // Help
        ])
        .split(f.area());

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "cmdfy compare",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} of {} providers answered", succeeded, results.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(title, chunks[0]);

    let count = results.len().max(1) as u32;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints((0..count).map(|_| Constraint::Ratio(1, count)).collect::<Vec<_>>())
        .split(chunks[1]);

    for (i, (result, area)) in results.iter().zip(columns.iter()).enumerate() {
        draw_column(f, result, *area, i == state.cursor());
    }

    let help = Paragraph::new(HELP_TEXT).style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[2]);
}

fn draw_column(f: &mut Frame, entry: &ProviderResult, area: Rect, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", entry.name));

    let label = Style::default().fg(Color::Yellow);
    let mut lines = Vec::new();

    match &entry.outcome {
        Ok(result) => {
            lines.push(Line::from(Span::styled("Command:", label)));
            lines.push(Line::from(Span::styled(
                CommandAssembler::assemble(result),
                Style::default().fg(Color::Green),
            )));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("Explanation:", label)));
            lines.push(Line::from(result.explanation.clone()));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!(
                    "Latency: {}  Tokens: {}",
                    result.metrics.latency, result.metrics.token_count
                ),
                Style::default().fg(Color::DarkGray),
            )));
            if result.dangerous {
                lines.push(Line::from(Span::styled(
                    "[DANGEROUS]",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
            }
        }
        Err(e) => {
            lines.push(Line::from(Span::styled(
                "Error:",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(e.to_string()));
        }
    }

    let body = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(body, area);
}
