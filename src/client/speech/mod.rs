//! Speech input state machine.
//!
//! Transitions:
//! - Idle -> Listening (toggle, engine available and started)
//! - Listening -> Idle (toggle, engine end, engine error)
//!
//! The engine is constructed lazily on the first toggle and kept for the
//! rest of the session. Every capture gets a fresh id; engine events carrying
//! an older id are ignored.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

mod command;

pub use command::CommandSpeechEngine;

pub const NOT_SUPPORTED_NOTICE: &str = "Speech recognition is not supported on this system.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    Listening,
}

impl fmt::Display for SpeechState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechState::Idle => write!(f, "Idle"),
            SpeechState::Listening => write!(f, "Listening"),
        }
    }
}

/// Discrete events emitted by an engine for one capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Transcript { capture: u64, text: String },
    End { capture: u64 },
    Error { capture: u64, message: String },
}

impl SpeechEvent {
    pub fn capture(&self) -> u64 {
        match self {
            SpeechEvent::Transcript { capture, .. }
            | SpeechEvent::End { capture }
            | SpeechEvent::Error { capture, .. } => *capture,
        }
    }
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("{0}")]
    Start(String),
}

/// Where engines deliver their events.
pub type SpeechSink = Arc<dyn Fn(SpeechEvent) + Send + Sync>;

/// A single-utterance recognizer.
pub trait SpeechEngine: Send {
    /// Begins capture `capture`. Events for it go to `sink`.
    fn start(&mut self, capture: u64, sink: SpeechSink) -> Result<(), SpeechError>;

    fn stop(&mut self);
}

/// Builds the engine, or `None` when speech input is unavailable.
pub type EngineFactory = Box<dyn FnOnce() -> Option<Box<dyn SpeechEngine>> + Send>;

/// What the session should do after a speech transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    Nothing,
    Submit(String),
    Notice(String),
}

enum EngineSlot {
    Undetected(EngineFactory),
    Unavailable,
    Ready(Box<dyn SpeechEngine>),
}

pub struct SpeechAdapter {
    state: SpeechState,
    engine: EngineSlot,
    sink: SpeechSink,
    capture: u64,
    transcript_taken: bool,
}

impl SpeechAdapter {
    pub fn new(factory: EngineFactory, sink: SpeechSink) -> Self {
        Self {
            state: SpeechState::Idle,
            engine: EngineSlot::Undetected(factory),
            sink,
            capture: 0,
            transcript_taken: false,
        }
    }

    /// An adapter whose capability is absent.
    pub fn unavailable() -> Self {
        Self::new(Box::new(|| None), Arc::new(|_| {}))
    }

    pub fn state(&self) -> SpeechState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == SpeechState::Listening
    }

    pub fn toggle(&mut self) -> SpeechOutcome {
        match self.state {
            SpeechState::Listening => {
                self.cancel();
                SpeechOutcome::Nothing
            }
            SpeechState::Idle => self.start_capture(),
        }
    }

    /// Stops the active capture, if any. Events still in flight for it are
    /// dropped as stale. Returns whether a capture was stopped.
    pub fn cancel(&mut self) -> bool {
        if self.state != SpeechState::Listening {
            return false;
        }
        if let EngineSlot::Ready(engine) = &mut self.engine {
            engine.stop();
        }
        self.state = SpeechState::Idle;
        true
    }

    fn start_capture(&mut self) -> SpeechOutcome {
        self.detect_engine();
        let EngineSlot::Ready(engine) = &mut self.engine else {
            return SpeechOutcome::Notice(NOT_SUPPORTED_NOTICE.to_string());
        };

        self.capture += 1;
        self.transcript_taken = false;
        match engine.start(self.capture, self.sink.clone()) {
            Ok(()) => {
                self.state = SpeechState::Listening;
                SpeechOutcome::Nothing
            }
            Err(err) => {
                tracing::warn!("Speech capture failed to start: {}", err);
                SpeechOutcome::Notice(format!("Speech recognition error: {}", err))
            }
        }
    }

    fn detect_engine(&mut self) {
        if !matches!(self.engine, EngineSlot::Undetected(_)) {
            return;
        }
        let slot = std::mem::replace(&mut self.engine, EngineSlot::Unavailable);
        if let EngineSlot::Undetected(factory) = slot {
            self.engine = match factory() {
                Some(engine) => EngineSlot::Ready(engine),
                None => {
                    tracing::info!("Speech recognition is unavailable");
                    EngineSlot::Unavailable
                }
            };
        }
    }

    pub fn handle_event(&mut self, event: SpeechEvent) -> SpeechOutcome {
        if event.capture() != self.capture || self.state != SpeechState::Listening {
            tracing::debug!(capture = event.capture(), "Ignoring stale speech event");
            return SpeechOutcome::Nothing;
        }

        match event {
            SpeechEvent::Transcript { text, .. } => {
                if self.transcript_taken {
                    return SpeechOutcome::Nothing;
                }
                self.transcript_taken = true;
                let text = text.trim();
                if text.is_empty() {
                    SpeechOutcome::Nothing
                } else {
                    SpeechOutcome::Submit(text.to_string())
                }
            }
            SpeechEvent::End { .. } => {
                self.state = SpeechState::Idle;
                SpeechOutcome::Nothing
            }
            SpeechEvent::Error { message, .. } => {
                self.state = SpeechState::Idle;
                SpeechOutcome::Notice(format!("Speech recognition error: {}", message))
            }
        }
    }
}
