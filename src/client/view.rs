//! Pure projection of a [`ChatSession`] and the key bindings of the input box.

use std::sync::OnceLock;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use regex::Regex;

use super::message::Role;
use super::session::ChatSession;

/// One formatted piece of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
    LineBreak,
}

static BOLD_REGEX: OnceLock<Regex> = OnceLock::new();

fn bold_regex() -> &'static Regex {
    BOLD_REGEX.get_or_init(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("Failed to compile bold regex"))
}

/// Formats backend text: `**span**` becomes [`Inline::Strong`], `\n` becomes
/// [`Inline::LineBreak`]. Nothing else is interpreted. Only bot turns go
/// through here.
pub fn format_bot_text(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push(Inline::LineBreak);
        }
        let mut last = 0;
        for caps in bold_regex().captures_iter(line) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                out.push(Inline::Text(line[last..whole.start()].to_string()));
            }
            out.push(Inline::Strong(inner.as_str().to_string()));
            last = whole.end();
        }
        if last < line.len() {
            out.push(Inline::Text(line[last..].to_string()));
        }
    }
    out
}

/// User text is shown verbatim, split only at line breaks.
pub fn format_user_text(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push(Inline::LineBreak);
        }
        if !line.is_empty() {
            out.push(Inline::Text(line.to_string()));
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnView {
    pub role: Role,
    /// Local time as `HH:MM`.
    pub time: String,
    pub content: Vec<Inline>,
}

/// Everything the screen shows, derived from session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub turns: Vec<TurnView>,
    pub typing: bool,
    pub input: String,
    pub input_enabled: bool,
    pub listening: bool,
    /// Present only while the conversation is the greeting alone.
    pub suggestions: Option<Vec<String>>,
    pub notice: Option<String>,
}

pub fn render(session: &ChatSession) -> ChatView {
    let messages = session.messages();
    let turns = messages
        .turns()
        .iter()
        .map(|turn| TurnView {
            role: turn.role(),
            time: turn.timestamp().format("%H:%M").to_string(),
            content: match turn.role() {
                Role::Bot => format_bot_text(turn.text()),
                Role::User => format_user_text(turn.text()),
            },
        })
        .collect();

    let suggestions = session.suggestions();
    let show_suggestions = messages.is_seed_only() && !suggestions.is_empty();

    ChatView {
        turns,
        typing: session.is_busy(),
        input: messages.draft().as_str().to_string(),
        input_enabled: !session.is_busy(),
        listening: session.speech().is_listening(),
        suggestions: show_suggestions.then(|| suggestions.items().to_vec()),
        notice: session.notice().map(str::to_string),
    }
}

/// Intent of a key press in the chat screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Submit,
    InsertNewline,
    InsertChar(char),
    Backspace,
    ToggleSpeech,
    ChooseSuggestion(usize),
    Quit,
}

/// Maps a terminal key press. Enter submits only without modifiers;
/// Shift+Enter and Alt+Enter insert a newline.
pub fn map_key(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => {
            if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) {
                Some(KeyAction::InsertNewline)
            } else if key.modifiers.is_empty() {
                Some(KeyAction::Submit)
            } else {
                None
            }
        }
        KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('c') if ctrl => Some(KeyAction::Quit),
        KeyCode::Char('t') if ctrl => Some(KeyAction::ToggleSpeech),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(ch) => Some(KeyAction::InsertChar(ch)),
        KeyCode::Backspace => Some(KeyAction::Backspace),
        KeyCode::F(n @ 1..=9) => Some(KeyAction::ChooseSuggestion(usize::from(n - 1))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::session::ClientEvent;
    use crate::client::speech::SpeechAdapter;
    use crate::client::transport::ChatReply;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn bold_and_line_breaks() {
        assert_eq!(
            format_bot_text("**Citi** has:\n1. **Aptitude** round"),
            vec![
                Inline::Strong("Citi".to_string()),
                Inline::Text(" has:".to_string()),
                Inline::LineBreak,
                Inline::Text("1. ".to_string()),
                Inline::Strong("Aptitude".to_string()),
                Inline::Text(" round".to_string()),
            ]
        );
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(
            format_bot_text("5 ** 2 and *single*"),
            vec![Inline::Text("5 ** 2 and *single*".to_string())]
        );
        assert_eq!(format_bot_text("****"), vec![Inline::Text("****".to_string())]);
        assert_eq!(format_bot_text("*****"), vec![Inline::Text("*****".to_string())]);
        assert_eq!(
            format_bot_text("**5 * 3** is 15"),
            vec![Inline::Text("**5 * 3** is 15".to_string())]
        );
    }

    #[test]
    fn bold_does_not_span_lines() {
        assert_eq!(
            format_bot_text("**open\nclose**"),
            vec![
                Inline::Text("**open".to_string()),
                Inline::LineBreak,
                Inline::Text("close**".to_string()),
            ]
        );
    }

    #[test]
    fn user_text_is_not_formatted() {
        assert_eq!(
            format_user_text("is **this** bold?\nno"),
            vec![
                Inline::Text("is **this** bold?".to_string()),
                Inline::LineBreak,
                Inline::Text("no".to_string()),
            ]
        );
    }

    #[test]
    fn enter_bindings() {
        assert_eq!(
            map_key(&key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(KeyAction::Submit)
        );
        assert_eq!(
            map_key(&key(KeyCode::Enter, KeyModifiers::SHIFT)),
            Some(KeyAction::InsertNewline)
        );
        assert_eq!(
            map_key(&key(KeyCode::Enter, KeyModifiers::ALT)),
            Some(KeyAction::InsertNewline)
        );
        assert_eq!(map_key(&key(KeyCode::Enter, KeyModifiers::CONTROL)), None);
    }

    #[test]
    fn other_bindings() {
        assert_eq!(
            map_key(&key(KeyCode::Char('t'), KeyModifiers::CONTROL)),
            Some(KeyAction::ToggleSpeech)
        );
        assert_eq!(
            map_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
        assert_eq!(
            map_key(&key(KeyCode::Char('T'), KeyModifiers::SHIFT)),
            Some(KeyAction::InsertChar('T'))
        );
        assert_eq!(
            map_key(&key(KeyCode::F(3), KeyModifiers::NONE)),
            Some(KeyAction::ChooseSuggestion(2))
        );
        assert_eq!(map_key(&key(KeyCode::F(10), KeyModifiers::NONE)), None);
    }

    #[test]
    fn suggestions_only_with_seed_greeting() {
        let mut session = ChatSession::new("Hi", SpeechAdapter::unavailable());
        assert_eq!(render(&session).suggestions, None);

        session.handle(ClientEvent::SuggestionsLoaded(vec!["Q1".to_string()]));
        assert_eq!(render(&session).suggestions, Some(vec!["Q1".to_string()]));

        session.handle(ClientEvent::Submit("hello".to_string()));
        let view = render(&session);
        assert_eq!(view.suggestions, None);
        assert!(view.typing);
        assert!(!view.input_enabled);

        session.handle(ClientEvent::ChatCompleted(ChatReply::Answer("**hi**".to_string())));
        let view = render(&session);
        assert!(!view.typing);
        assert_eq!(view.turns.len(), 3);
        assert_eq!(view.turns[2].content, vec![Inline::Strong("hi".to_string())]);
        assert_eq!(view.turns[2].time.len(), 5);
    }
}
