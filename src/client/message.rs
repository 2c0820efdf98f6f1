//! Conversation log and the input draft.

use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// One immutable entry in the conversation.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    role: Role,
    text: String,
    timestamp: DateTime<Local>,
}

impl ChatTurn {
    fn new(role: Role, text: String) -> Self {
        Self {
            role,
            text,
            timestamp: Local::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

/// Text the user is composing.
#[derive(Debug, Clone, Default)]
pub struct InputDraft {
    text: String,
}

impl InputDraft {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub fn insert_newline(&mut self) {
        self.text.push('\n');
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

/// Append-only conversation log, seeded with a greeting.
///
/// Turns are never edited or removed, so index order is both display order
/// and chronological order.
#[derive(Debug, Clone)]
pub struct MessageStore {
    turns: Vec<ChatTurn>,
    draft: InputDraft,
}

impl MessageStore {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![ChatTurn::new(Role::Bot, greeting.into())],
            draft: InputDraft::default(),
        }
    }

    /// Appends a user turn with the trimmed text and clears the draft.
    /// Blank text is ignored and leaves the draft untouched.
    pub fn append_user(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.turns.push(ChatTurn::new(Role::User, text.to_string()));
        self.draft.clear();
        true
    }

    pub fn append_bot(&mut self, text: impl Into<String>) {
        self.turns.push(ChatTurn::new(Role::Bot, text.into()));
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True while the log holds only the greeting.
    pub fn is_seed_only(&self) -> bool {
        self.turns.len() == 1
    }

    pub fn draft(&self) -> &InputDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut InputDraft {
        &mut self.draft
    }
}
