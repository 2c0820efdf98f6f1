//! Property-based tests for the client session
//!
//! Arbitrary event sequences are fed through `ChatSession::handle` and the
//! conversation invariants are checked after every step.

use super::*;
use crate::client::message::Role;
use crate::client::speech::{EngineFactory, SpeechEngine, SpeechError, SpeechSink};
use crate::client::transport::UNREACHABLE_MESSAGE;
use crate::client::view::render;
use crossterm::event::{KeyCode, KeyModifiers};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

struct SilentEngine;

impl SpeechEngine for SilentEngine {
    fn start(&mut self, _capture: u64, _sink: SpeechSink) -> Result<(), SpeechError> {
        Ok(())
    }

    fn stop(&mut self) {}
}

fn test_session() -> ChatSession {
    let factory: EngineFactory =
        Box::new(|| Some(Box::new(SilentEngine) as Box<dyn SpeechEngine>));
    ChatSession::new("Hi", SpeechAdapter::new(factory, Arc::new(|_| {})))
}

fn key(code: KeyCode, modifiers: KeyModifiers) -> ClientEvent {
    ClientEvent::Key(KeyEvent::new(code, modifiers))
}

/// Drives a session while tracking what the conversation should look like.
struct Tracked {
    session: ChatSession,
    pending: Option<String>,
    completed: usize,
}

impl Tracked {
    fn new() -> Self {
        Self {
            session: test_session(),
            pending: None,
            completed: 0,
        }
    }

    fn apply(&mut self, event: ClientEvent) -> Result<Vec<Effect>, TestCaseError> {
        let was_busy = self.session.is_busy();
        let reply = match &event {
            ClientEvent::ChatCompleted(reply) => Some(reply.clone()),
            _ => None,
        };

        let effects = self.session.handle(event);

        let sent: Vec<&String> = effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::SendChat(text) => Some(text),
                _ => None,
            })
            .collect();
        prop_assert!(sent.len() <= 1, "More than one request: {:?}", effects);

        if let Some(text) = sent.first() {
            prop_assert!(!was_busy, "Request sent while busy");
            prop_assert!(!text.is_empty());
            prop_assert_eq!(text.trim(), text.as_str());
            let last = self.session.messages().turns().last().cloned();
            prop_assert!(last.is_some());
            if let Some(last) = last {
                prop_assert_eq!(last.role(), Role::User);
                prop_assert_eq!(last.text(), text.as_str());
            }
            self.pending = Some((*text).clone());
        }

        if let Some(reply) = reply {
            if was_busy {
                let last = self.session.messages().turns().last().cloned();
                if let Some(last) = last {
                    prop_assert_eq!(last.role(), Role::Bot);
                    prop_assert_eq!(last.text().to_string(), reply.bot_text());
                }
                self.pending = None;
                self.completed += 1;
            }
        }

        self.check()?;
        Ok(effects)
    }

    fn check(&self) -> Result<(), TestCaseError> {
        let session = &self.session;
        let messages = session.messages();

        prop_assert_eq!(session.is_busy(), self.pending.is_some());
        prop_assert_eq!(
            messages.len(),
            1 + 2 * self.completed + usize::from(self.pending.is_some())
        );
        prop_assert!(
            !(session.is_busy() && session.speech().is_listening()),
            "Capture left open while a request is outstanding"
        );

        let view = render(session);
        prop_assert_eq!(
            view.suggestions.is_some(),
            messages.len() == 1 && !session.suggestions().is_empty()
        );
        prop_assert_eq!(view.input_enabled, !session.is_busy());
        prop_assert_eq!(view.typing, session.is_busy());
        Ok(())
    }

    /// Delivers a reply to the outstanding request, if any.
    fn settle(&mut self) -> Result<(), TestCaseError> {
        if self.session.is_busy() {
            self.apply(ClientEvent::ChatCompleted(ChatReply::Answer("ok".to_string())))?;
        }
        Ok(())
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_key_event() -> impl Strategy<Value = ClientEvent> {
    prop_oneof![
        4 => proptest::char::range('a', 'z')
            .prop_map(|ch| key(KeyCode::Char(ch), KeyModifiers::NONE)),
        1 => Just(key(KeyCode::Char(' '), KeyModifiers::NONE)),
        1 => Just(key(KeyCode::Enter, KeyModifiers::NONE)),
        1 => Just(key(KeyCode::Enter, KeyModifiers::SHIFT)),
        1 => Just(key(KeyCode::Enter, KeyModifiers::ALT)),
        1 => Just(key(KeyCode::Backspace, KeyModifiers::NONE)),
        1 => (1u8..=9).prop_map(|n| key(KeyCode::F(n), KeyModifiers::NONE)),
        1 => Just(key(KeyCode::Char('t'), KeyModifiers::CONTROL)),
    ]
}

fn arb_reply() -> impl Strategy<Value = ChatReply> {
    prop_oneof![
        "[a-zA-Z*\n ]{0,30}".prop_map(ChatReply::Answer),
        (400u16..600, proptest::option::of("[a-z ]{1,20}"))
            .prop_map(|(status, message)| ChatReply::Failed { status, message }),
        Just(ChatReply::Unreachable),
    ]
}

fn arb_speech_event() -> impl Strategy<Value = SpeechEvent> {
    prop_oneof![
        (0u64..4, "[ a-z]{0,12}")
            .prop_map(|(capture, text)| SpeechEvent::Transcript { capture, text }),
        (0u64..4).prop_map(|capture| SpeechEvent::End { capture }),
        (0u64..4, "[a-z ]{1,10}")
            .prop_map(|(capture, message)| SpeechEvent::Error { capture, message }),
    ]
}

fn arb_event() -> impl Strategy<Value = ClientEvent> {
    prop_oneof![
        4 => arb_key_event(),
        2 => "[ a-z\n]{0,12}".prop_map(ClientEvent::Submit),
        1 => (0usize..5).prop_map(ClientEvent::ChooseSuggestion),
        1 => Just(ClientEvent::ToggleSpeech),
        1 => proptest::collection::vec("[a-z ]{1,12}", 0..4)
            .prop_map(ClientEvent::SuggestionsLoaded),
        2 => arb_reply().prop_map(ClientEvent::ChatCompleted),
        2 => arb_speech_event().prop_map(ClientEvent::Speech),
        1 => Just(ClientEvent::Redraw),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<ClientEvent>> {
    proptest::collection::vec(arb_event(), 0..20)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Busy flag, turn count and suggestions panel stay consistent after every event
    #[test]
    fn prop_conversation_stays_consistent(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut tracked = Tracked::new();
        tracked.check()?;
        for event in events {
            tracked.apply(event)?;
        }
    }

    // Every non-blank question produces one user turn and then one bot turn
    #[test]
    fn prop_question_gets_one_user_and_one_bot_turn(
        history in arb_history(),
        question in "[ \n]{0,3}[a-z][a-z \n]{0,15}",
        reply in arb_reply(),
    ) {
        let mut tracked = Tracked::new();
        for event in history {
            tracked.apply(event)?;
        }
        tracked.settle()?;
        let before = tracked.session.messages().len();

        let effects = tracked.apply(ClientEvent::Submit(question.clone()))?;
        prop_assert_eq!(effects, vec![Effect::SendChat(question.trim().to_string())]);
        tracked.apply(ClientEvent::ChatCompleted(reply.clone()))?;

        let turns = tracked.session.messages().turns();
        prop_assert_eq!(turns.len(), before + 2);
        prop_assert_eq!(turns[before].role(), Role::User);
        prop_assert_eq!(turns[before].text(), question.trim());
        prop_assert_eq!(turns[before + 1].role(), Role::Bot);
        prop_assert_eq!(turns[before + 1].text().to_string(), reply.bot_text());
        prop_assert!(!tracked.session.is_busy());
    }

    // Whitespace-only input changes nothing
    #[test]
    fn prop_blank_submit_is_noop(history in arb_history(), blank in "[ \t\n]{0,8}") {
        let mut tracked = Tracked::new();
        for event in history {
            tracked.apply(event)?;
        }
        let before = tracked.session.messages().len();
        let draft = tracked.session.messages().draft().as_str().to_string();
        let busy = tracked.session.is_busy();

        let effects = tracked.apply(ClientEvent::Submit(blank))?;

        prop_assert!(effects.is_empty());
        prop_assert_eq!(tracked.session.messages().len(), before);
        prop_assert_eq!(tracked.session.messages().draft().as_str(), draft.as_str());
        prop_assert_eq!(tracked.session.is_busy(), busy);
    }

    // Shift+Enter extends the draft and never sends
    #[test]
    fn prop_shift_enter_never_sends(history in arb_history()) {
        let mut tracked = Tracked::new();
        for event in history {
            tracked.apply(event)?;
        }
        let before = tracked.session.messages().len();

        let effects = tracked.apply(key(KeyCode::Enter, KeyModifiers::SHIFT))?;

        prop_assert!(!effects.iter().any(|effect| matches!(effect, Effect::SendChat(_))));
        prop_assert_eq!(tracked.session.messages().len(), before);
    }

    // Enter sends the trimmed draft exactly once when idle
    #[test]
    fn prop_enter_sends_draft_once(history in arb_history(), text in "[a-z][a-z ]{0,12}") {
        let mut tracked = Tracked::new();
        for event in history {
            tracked.apply(event)?;
        }
        tracked.settle()?;
        for ch in text.chars() {
            tracked.apply(key(KeyCode::Char(ch), KeyModifiers::NONE))?;
        }
        let draft = tracked.session.messages().draft().as_str().trim().to_string();

        let effects = tracked.apply(key(KeyCode::Enter, KeyModifiers::NONE))?;

        prop_assert_eq!(effects, vec![Effect::SendChat(draft)]);
        prop_assert!(tracked.session.messages().draft().is_blank());
        let again = tracked.apply(key(KeyCode::Enter, KeyModifiers::NONE))?;
        prop_assert!(again.is_empty());
    }

    // A network failure reads the same whatever was asked
    #[test]
    fn prop_unreachable_text_ignores_question(question in "[a-z][a-z ?]{0,30}") {
        let mut tracked = Tracked::new();
        tracked.apply(ClientEvent::Submit(question))?;
        tracked.apply(ClientEvent::ChatCompleted(ChatReply::Unreachable))?;

        let last = tracked.session.messages().turns().last().cloned();
        prop_assert!(last.is_some());
        if let Some(last) = last {
            prop_assert_eq!(last.text(), UNREACHABLE_MESSAGE);
        }
    }
}
