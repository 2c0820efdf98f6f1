//! The client event loop.
//!
//! Every state change goes through [`ChatSession::handle`] on this loop.
//! Effects run as spawned tasks whose only job is to post a completion event
//! back onto the channel.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::session::{ChatSession, ClientEvent, Effect};
use super::speech::SpeechSink;
use super::suggestions::load_suggestions;
use super::transport::{ChatBackend, ChatReply};

pub struct ClientRuntime {
    session: ChatSession,
    backend: Arc<dyn ChatBackend>,
    events_tx: mpsc::UnboundedSender<ClientEvent>,
    events_rx: mpsc::UnboundedReceiver<ClientEvent>,
}

/// Creates the event channel. The sender is handed to input sources (speech
/// engines, the terminal reader) before the runtime is built.
pub fn event_channel() -> (
    mpsc::UnboundedSender<ClientEvent>,
    mpsc::UnboundedReceiver<ClientEvent>,
) {
    mpsc::unbounded_channel()
}

/// A speech sink that posts engine events onto the client loop.
pub fn speech_sink(events: mpsc::UnboundedSender<ClientEvent>) -> SpeechSink {
    Arc::new(move |event| {
        let _ = events.send(ClientEvent::Speech(event));
    })
}

impl ClientRuntime {
    pub fn new(
        session: ChatSession,
        backend: Arc<dyn ChatBackend>,
        events_tx: mpsc::UnboundedSender<ClientEvent>,
        events_rx: mpsc::UnboundedReceiver<ClientEvent>,
    ) -> Self {
        Self {
            session,
            backend,
            events_tx,
            events_rx,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<ClientEvent> {
        self.events_tx.clone()
    }

    /// Runs the start-up effects.
    pub fn start(&mut self) {
        let effects = self.session.start();
        self.execute(effects);
    }

    /// Waits for one event and applies it. Returns `false` once the session
    /// has finished or the channel is closed.
    pub async fn step(&mut self) -> bool {
        let Some(event) = self.events_rx.recv().await else {
            return false;
        };
        let effects = self.session.handle(event);
        self.execute(effects);
        !self.session.is_finished()
    }

    /// Starts the session and processes events until it finishes, calling
    /// `on_change` after start-up and after every event.
    pub async fn run<F, E>(mut self, mut on_change: F) -> Result<(), E>
    where
        F: FnMut(&ChatSession) -> Result<(), E>,
    {
        self.start();
        on_change(&self.session)?;
        while self.step().await {
            on_change(&self.session)?;
        }
        Ok(())
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendChat(text) => self.spawn_chat(text),
                Effect::LoadSuggestions => self.spawn_suggestions(),
                Effect::Quit => tracing::info!("Chat session finished"),
            }
        }
    }

    fn spawn_chat(&self, text: String) {
        let backend = self.backend.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let request = tokio::spawn(async move { backend.send(&text).await });
            let reply = match request.await {
                Ok(reply) => reply,
                Err(err) => {
                    tracing::error!("Chat request task failed: {}", err);
                    ChatReply::Unreachable
                }
            };
            let _ = events.send(ClientEvent::ChatCompleted(reply));
        });
    }

    fn spawn_suggestions(&self) {
        let backend = self.backend.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let items = load_suggestions(backend.as_ref()).await;
            let _ = events.send(ClientEvent::SuggestionsLoaded(items));
        });
    }
}
