use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;

use placement_chatbot::client::runtime::{event_channel, speech_sink, ClientRuntime};
use placement_chatbot::client::session::ChatSession;
use placement_chatbot::client::speech::{CommandSpeechEngine, SpeechAdapter};
use placement_chatbot::client::transport::HttpBackend;
use placement_chatbot::client::{tui, ClientSettings, DEFAULT_BACKEND_URL};
use placement_chatbot::core::config::{AppPaths, ConfigService};
use placement_chatbot::core::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init_file_only(&paths, "client.log");

    let config = ConfigService::new(paths.clone());
    let raw = config.load_config().unwrap_or_else(|err| {
        tracing::warn!("Failed to load config, using client defaults: {}", err);
        Value::Null
    });
    let settings = ClientSettings::from_config(&raw);

    let backend = HttpBackend::new(DEFAULT_BACKEND_URL).context("Failed to create HTTP client")?;
    tracing::info!("Chat client using backend {}", backend.base_url());

    let (events_tx, events_rx) = event_channel();
    let speech = SpeechAdapter::new(
        CommandSpeechEngine::factory(settings.speech_command.clone()),
        speech_sink(events_tx.clone()),
    );
    let session = ChatSession::new(settings.greeting.clone(), speech);
    let runtime = ClientRuntime::new(session, Arc::new(backend), events_tx, events_rx);

    tui::run(runtime).await.context("Chat client failed")?;
    Ok(())
}
