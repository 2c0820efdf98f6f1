//! Client state and its transition function.
//!
//! [`ChatSession::handle`] applies one event and returns the effects the
//! runtime has to execute. It never performs I/O itself.

use crossterm::event::KeyEvent;

use super::message::MessageStore;
use super::speech::{SpeechAdapter, SpeechEvent, SpeechOutcome};
use super::suggestions::SuggestionSet;
use super::transport::ChatReply;
use super::view::{map_key, KeyAction};

#[derive(Debug, Clone)]
pub enum ClientEvent {
    Key(KeyEvent),
    Submit(String),
    ChooseSuggestion(usize),
    ToggleSpeech,
    SuggestionsLoaded(Vec<String>),
    ChatCompleted(ChatReply),
    Speech(SpeechEvent),
    /// Terminal resized or otherwise needs repainting.
    Redraw,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendChat(String),
    LoadSuggestions,
    Quit,
}

pub struct ChatSession {
    messages: MessageStore,
    suggestions: SuggestionSet,
    speech: SpeechAdapter,
    busy: bool,
    notice: Option<String>,
    finished: bool,
}

impl ChatSession {
    pub fn new(greeting: impl Into<String>, speech: SpeechAdapter) -> Self {
        Self {
            messages: MessageStore::new(greeting),
            suggestions: SuggestionSet::default(),
            speech,
            busy: false,
            notice: None,
            finished: false,
        }
    }

    /// Effects to run once when the client starts.
    pub fn start(&self) -> Vec<Effect> {
        vec![Effect::LoadSuggestions]
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn suggestions(&self) -> &SuggestionSet {
        &self.suggestions
    }

    pub fn speech(&self) -> &SpeechAdapter {
        &self.speech
    }

    /// True exactly while a chat request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn handle(&mut self, event: ClientEvent) -> Vec<Effect> {
        match event {
            ClientEvent::Key(key) => match map_key(&key) {
                Some(action) => self.handle_key(action),
                None => Vec::new(),
            },
            ClientEvent::Submit(text) => self.submit(&text),
            ClientEvent::ChooseSuggestion(index) => self.choose_suggestion(index),
            ClientEvent::ToggleSpeech => self.toggle_speech(),
            ClientEvent::SuggestionsLoaded(items) => {
                if !self.suggestions.apply(items) {
                    tracing::debug!("Suggestions already loaded; ignoring");
                }
                Vec::new()
            }
            ClientEvent::ChatCompleted(reply) => {
                if self.busy {
                    self.messages.append_bot(reply.bot_text());
                    self.busy = false;
                } else {
                    tracing::warn!("Chat reply arrived with no request outstanding");
                }
                Vec::new()
            }
            ClientEvent::Speech(event) => {
                let outcome = self.speech.handle_event(event);
                self.apply_speech_outcome(outcome)
            }
            ClientEvent::Redraw => Vec::new(),
            ClientEvent::Quit => self.quit(),
        }
    }

    fn handle_key(&mut self, action: KeyAction) -> Vec<Effect> {
        match action {
            KeyAction::Quit => self.quit(),
            KeyAction::ToggleSpeech => self.toggle_speech(),
            KeyAction::ChooseSuggestion(index) => self.choose_suggestion(index),
            _ if self.busy => Vec::new(),
            KeyAction::Submit => {
                let draft = self.messages.draft().as_str().to_string();
                self.submit(&draft)
            }
            KeyAction::InsertNewline => {
                self.notice = None;
                self.messages.draft_mut().insert_newline();
                Vec::new()
            }
            KeyAction::InsertChar(ch) => {
                self.notice = None;
                self.messages.draft_mut().insert_char(ch);
                Vec::new()
            }
            KeyAction::Backspace => {
                self.notice = None;
                self.messages.draft_mut().backspace();
                Vec::new()
            }
        }
    }

    fn submit(&mut self, text: &str) -> Vec<Effect> {
        if self.busy {
            tracing::debug!("Submit ignored while a request is outstanding");
            return Vec::new();
        }
        if !self.messages.append_user(text) {
            return Vec::new();
        }
        // A transcript arriving after this point could not be sent.
        if self.speech.cancel() {
            tracing::debug!("Stopped speech capture for submitted message");
        }
        self.notice = None;
        self.busy = true;
        vec![Effect::SendChat(text.trim().to_string())]
    }

    fn choose_suggestion(&mut self, index: usize) -> Vec<Effect> {
        if !self.messages.is_seed_only() {
            return Vec::new();
        }
        match self.suggestions.get(index).map(str::to_string) {
            Some(text) => self.submit(&text),
            None => Vec::new(),
        }
    }

    fn toggle_speech(&mut self) -> Vec<Effect> {
        if self.busy && !self.speech.is_listening() {
            return Vec::new();
        }
        self.notice = None;
        let outcome = self.speech.toggle();
        self.apply_speech_outcome(outcome)
    }

    fn apply_speech_outcome(&mut self, outcome: SpeechOutcome) -> Vec<Effect> {
        match outcome {
            SpeechOutcome::Nothing => Vec::new(),
            SpeechOutcome::Submit(text) => self.submit(&text),
            SpeechOutcome::Notice(notice) => {
                self.notice = Some(notice);
                Vec::new()
            }
        }
    }

    fn quit(&mut self) -> Vec<Effect> {
        self.finished = true;
        vec![Effect::Quit]
    }
}

#[cfg(test)]
mod proptests;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::message::Role;
    use crate::client::speech::{
        EngineFactory, SpeechEngine, SpeechError, SpeechSink, NOT_SUPPORTED_NOTICE,
    };
    use crate::client::transport::{GENERIC_ERROR_MESSAGE, UNREACHABLE_MESSAGE};
    use crate::client::view::render;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::Arc;

    fn session() -> ChatSession {
        ChatSession::new("Hi! Ask me about placements.", SpeechAdapter::unavailable())
    }

    fn press(session: &mut ChatSession, code: KeyCode, modifiers: KeyModifiers) -> Vec<Effect> {
        session.handle(ClientEvent::Key(KeyEvent::new(code, modifiers)))
    }

    fn type_text(session: &mut ChatSession, text: &str) {
        for ch in text.chars() {
            press(session, KeyCode::Char(ch), KeyModifiers::NONE);
        }
    }

    #[test]
    fn start_loads_suggestions() {
        assert_eq!(session().start(), vec![Effect::LoadSuggestions]);
    }

    #[test]
    fn submit_round_trip_appends_user_and_bot_turn() {
        let mut session = session();

        let effects = session.handle(ClientEvent::Submit("How many rounds at Citi?".to_string()));

        assert_eq!(
            effects,
            vec![Effect::SendChat("How many rounds at Citi?".to_string())]
        );
        assert!(session.is_busy());
        assert_eq!(session.messages().len(), 2);

        session.handle(ClientEvent::ChatCompleted(ChatReply::Answer("X".to_string())));

        assert!(!session.is_busy());
        let turns = session.messages().turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].role(), Role::Bot);
        assert_eq!(turns[2].text(), "X");
    }

    #[test]
    fn busy_is_released_for_every_outcome() {
        let replies = [
            (ChatReply::Answer("ok".to_string()), "ok".to_string()),
            (
                ChatReply::Failed {
                    status: 400,
                    message: Some("Y".to_string()),
                },
                "❌ Error: Y".to_string(),
            ),
            (
                ChatReply::Failed {
                    status: 500,
                    message: None,
                },
                GENERIC_ERROR_MESSAGE.to_string(),
            ),
            (ChatReply::Unreachable, UNREACHABLE_MESSAGE.to_string()),
        ];

        for (reply, expected) in replies {
            let mut session = session();
            session.handle(ClientEvent::Submit("question".to_string()));
            assert!(session.is_busy());
            session.handle(ClientEvent::ChatCompleted(reply));
            assert!(!session.is_busy());
            assert_eq!(session.messages().turns()[2].text(), expected);
        }
    }

    #[test]
    fn blank_submit_is_a_no_op() {
        let mut session = session();
        type_text(&mut session, "   ");

        let effects = press(&mut session, KeyCode::Enter, KeyModifiers::NONE);

        assert!(effects.is_empty());
        assert!(!session.is_busy());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages().draft().as_str(), "   ");
    }

    #[test]
    fn enter_submits_draft_and_shift_enter_does_not() {
        let mut session = session();
        type_text(&mut session, "line one");

        assert!(press(&mut session, KeyCode::Enter, KeyModifiers::SHIFT).is_empty());
        type_text(&mut session, "line two");
        assert_eq!(session.messages().len(), 1);

        let effects = press(&mut session, KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(
            effects,
            vec![Effect::SendChat("line one\nline two".to_string())]
        );
        assert_eq!(session.messages().draft().as_str(), "");
    }

    #[test]
    fn submit_while_busy_is_rejected() {
        let mut session = session();
        session.handle(ClientEvent::Submit("first".to_string()));

        assert!(session
            .handle(ClientEvent::Submit("second".to_string()))
            .is_empty());
        type_text(&mut session, "typed");
        assert!(press(&mut session, KeyCode::Enter, KeyModifiers::NONE).is_empty());

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages().draft().as_str(), "");
    }

    #[test]
    fn late_reply_without_request_is_ignored() {
        let mut session = session();
        session.handle(ClientEvent::ChatCompleted(ChatReply::Unreachable));
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn choosing_a_suggestion_submits_it() {
        let mut session = session();
        session.handle(ClientEvent::SuggestionsLoaded(vec![
            "What package does citi bank offers?".to_string(),
        ]));

        assert!(session.handle(ClientEvent::ChooseSuggestion(4)).is_empty());
        let effects = press(&mut session, KeyCode::F(1), KeyModifiers::NONE);

        assert_eq!(
            effects,
            vec![Effect::SendChat(
                "What package does citi bank offers?".to_string()
            )]
        );
    }

    #[test]
    fn speech_unavailable_sets_notice_until_next_input() {
        let mut session = session();

        press(&mut session, KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert_eq!(session.notice(), Some(NOT_SUPPORTED_NOTICE));

        type_text(&mut session, "a");
        assert_eq!(session.notice(), None);
    }

    struct SilentEngine;

    impl SpeechEngine for SilentEngine {
        fn start(&mut self, _capture: u64, _sink: SpeechSink) -> Result<(), SpeechError> {
            Ok(())
        }

        fn stop(&mut self) {}
    }

    #[test]
    fn transcript_is_submitted_like_typed_text() {
        let factory: EngineFactory =
            Box::new(|| Some(Box::new(SilentEngine) as Box<dyn SpeechEngine>));
        let mut session = ChatSession::new("Hi", SpeechAdapter::new(factory, Arc::new(|_| {})));

        session.handle(ClientEvent::ToggleSpeech);
        assert!(session.speech().is_listening());

        let effects = session.handle(ClientEvent::Speech(SpeechEvent::Transcript {
            capture: 1,
            text: "explain the interview process for comcast".to_string(),
        }));
        session.handle(ClientEvent::Speech(SpeechEvent::End { capture: 1 }));

        assert_eq!(
            effects,
            vec![Effect::SendChat(
                "explain the interview process for comcast".to_string()
            )]
        );
        assert!(!session.speech().is_listening());
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn typed_submit_stops_open_capture() {
        let factory: EngineFactory =
            Box::new(|| Some(Box::new(SilentEngine) as Box<dyn SpeechEngine>));
        let mut session = ChatSession::new("Hi", SpeechAdapter::new(factory, Arc::new(|_| {})));

        session.handle(ClientEvent::ToggleSpeech);
        let effects = session.handle(ClientEvent::Submit("typed question".to_string()));

        assert_eq!(effects, vec![Effect::SendChat("typed question".to_string())]);
        assert!(!session.speech().is_listening());
        assert!(!render(&session).listening);

        let late = session.handle(ClientEvent::Speech(SpeechEvent::Transcript {
            capture: 1,
            text: "spoken question".to_string(),
        }));
        assert!(late.is_empty());
        assert!(session.is_busy());

        session.handle(ClientEvent::ChatCompleted(ChatReply::Answer("a".to_string())));
        session.handle(ClientEvent::ToggleSpeech);
        let effects = session.handle(ClientEvent::Speech(SpeechEvent::Transcript {
            capture: 2,
            text: "spoken question".to_string(),
        }));
        assert_eq!(effects, vec![Effect::SendChat("spoken question".to_string())]);
    }

    #[test]
    fn quit_finishes_session() {
        let mut session = session();
        assert_eq!(
            press(&mut session, KeyCode::Esc, KeyModifiers::NONE),
            vec![Effect::Quit]
        );
        assert!(session.is_finished());
    }
}
