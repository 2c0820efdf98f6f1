//! Terminal front end: draws a [`ChatView`] with ratatui and feeds crossterm
//! input into the client loop.

use std::io;

use crossterm::event::{
    Event, EventStream, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use futures_util::StreamExt;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::message::Role;
use super::runtime::ClientRuntime;
use super::session::ClientEvent;
use super::view::{render, ChatView, Inline, TurnView};
use super::ClientError;

const MAX_INPUT_HEIGHT: u16 = 6;

/// Key chord that inserts a newline into the draft.
///
/// Legacy terminals report Shift+Enter as a bare Enter, so Alt+Enter is
/// advertised unless the kitty keyboard protocol is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewlineKey {
    ShiftEnter,
    AltEnter,
}

impl NewlineKey {
    pub fn for_terminal(enhanced: bool) -> Self {
        if enhanced {
            NewlineKey::ShiftEnter
        } else {
            NewlineKey::AltEnter
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NewlineKey::ShiftEnter => "Shift+Enter",
            NewlineKey::AltEnter => "Alt+Enter",
        }
    }
}

/// Flags pushed on terminals that support them: modified Enter is reported
/// with its modifiers, and key releases are tagged so they can be dropped.
pub fn enhancement_flags() -> KeyboardEnhancementFlags {
    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
}

fn push_enhancement() -> bool {
    match crossterm::terminal::supports_keyboard_enhancement() {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!("Keyboard enhancement unsupported; Alt+Enter inserts newlines");
            return false;
        }
        Err(err) => {
            tracing::warn!("Failed to query keyboard enhancement support: {}", err);
            return false;
        }
    }
    match execute!(io::stdout(), PushKeyboardEnhancementFlags(enhancement_flags())) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!("Failed to enable keyboard enhancement: {}", err);
            false
        }
    }
}

/// Runs the chat screen until the user quits.
pub async fn run(runtime: ClientRuntime) -> Result<(), ClientError> {
    let mut terminal = ratatui::try_init()?;
    let enhanced = push_enhancement();
    let newline = NewlineKey::for_terminal(enhanced);

    let events = runtime.sender();
    let reader = tokio::spawn(async move {
        let mut stream = EventStream::new();
        while let Some(event) = stream.next().await {
            let forwarded = match event {
                Ok(Event::Key(key)) => ClientEvent::Key(key),
                Ok(Event::Resize(_, _)) => ClientEvent::Redraw,
                Ok(_) => continue,
                Err(err) => {
                    tracing::error!("Terminal input failed: {}", err);
                    ClientEvent::Quit
                }
            };
            if events.send(forwarded).is_err() {
                break;
            }
        }
    });

    let result = runtime
        .run(|session| {
            let view = render(session);
            terminal.draw(|frame| draw(frame, &view, newline))?;
            Ok::<(), ClientError>(())
        })
        .await;

    reader.abort();
    if enhanced {
        if let Err(err) = execute!(io::stdout(), PopKeyboardEnhancementFlags) {
            tracing::warn!("Failed to disable keyboard enhancement: {}", err);
        }
    }
    ratatui::try_restore()?;
    result
}

pub fn draw(frame: &mut Frame, view: &ChatView, newline: NewlineKey) {
    let suggestions_height = view
        .suggestions
        .as_ref()
        .map(|items| items.len().min(9) as u16 + 2)
        .unwrap_or(0);
    let input_height = (view.input.split('\n').count() as u16 + 2).min(MAX_INPUT_HEIGHT);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(suggestions_height),
            Constraint::Length(input_height),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_messages(frame, chunks[0], view);
    if let Some(items) = &view.suggestions {
        draw_suggestions(frame, chunks[1], items);
    }
    draw_input(frame, chunks[2], view, newline);
    draw_status(frame, chunks[3], view, newline);
}

fn draw_messages(frame: &mut Frame, area: Rect, view: &ChatView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Placement Assistant ");
    let inner = block.inner(area);

    let mut lines: Vec<Line> = Vec::new();
    for turn in &view.turns {
        lines.extend(turn_lines(turn));
        lines.push(Line::default());
    }
    if view.typing {
        lines.push(Line::from(Span::styled(
            "Assistant is typing…",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    // Keep the newest line in view.
    let width = inner.width.max(1) as usize;
    let total: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    let scroll = total.saturating_sub(inner.height as usize);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, area);
}

fn turn_lines(turn: &TurnView) -> Vec<Line<'static>> {
    let (label, color) = match turn.role {
        Role::User => ("You", Color::Cyan),
        Role::Bot => ("Assistant", Color::Green),
    };
    let header = Line::from(vec![
        Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", turn.time),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let mut lines = vec![header];
    let mut spans: Vec<Span> = Vec::new();
    for inline in &turn.content {
        match inline {
            Inline::Text(text) => spans.push(Span::raw(text.clone())),
            Inline::Strong(text) => spans.push(Span::styled(
                text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Inline::LineBreak => lines.push(Line::from(std::mem::take(&mut spans))),
        }
    }
    lines.push(Line::from(spans));
    lines
}

fn draw_suggestions(frame: &mut Frame, area: Rect, items: &[String]) {
    let lines: Vec<Line> = items
        .iter()
        .take(9)
        .enumerate()
        .map(|(index, item)| {
            Line::from(vec![
                Span::styled(
                    format!("F{} ", index + 1),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(item.clone()),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Try asking "),
    );
    frame.render_widget(paragraph, area);
}

fn draw_input(frame: &mut Frame, area: Rect, view: &ChatView, newline: NewlineKey) {
    let (title, style) = if view.input_enabled {
        (
            format!(" Message (Enter to send, {} for newline) ", newline.label()),
            Style::default(),
        )
    } else {
        (
            " Waiting for reply… ".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);

    let line_count = view.input.split('\n').count();
    let visible = inner.height.max(1) as usize;
    let scroll = line_count.saturating_sub(visible);
    let paragraph = Paragraph::new(view.input.as_str())
        .style(style)
        .block(block)
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);

    if view.input_enabled && inner.width > 0 && inner.height > 0 {
        let last = view.input.rsplit('\n').next().unwrap_or_default();
        let column = (last.chars().count() as u16).min(inner.width - 1);
        let row = ((line_count - 1 - scroll) as u16).min(inner.height - 1);
        frame.set_cursor_position(Position::new(inner.x + column, inner.y + row));
    }
}

fn draw_status(frame: &mut Frame, area: Rect, view: &ChatView, newline: NewlineKey) {
    let line = if let Some(notice) = &view.notice {
        Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        ))
    } else if view.listening {
        Line::from(Span::styled(
            "🎤 Listening… (Ctrl+T to stop)",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            format!(
                "Ctrl+T speak · F1-F9 suggestion · {} newline · Esc quit",
                newline.label()
            ),
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}
