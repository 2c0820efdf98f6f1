use tokio::process::Command;
use tokio::task::JoinHandle;

use super::{EngineFactory, SpeechEngine, SpeechError, SpeechEvent, SpeechSink};

/// Runs an external speech-to-text command once per capture; its trimmed
/// stdout is the transcript.
pub struct CommandSpeechEngine {
    program: String,
    args: Vec<String>,
    task: Option<JoinHandle<()>>,
}

impl CommandSpeechEngine {
    /// `command` is the program followed by its arguments.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        let program = program.trim();
        if program.is_empty() {
            return None;
        }
        Some(Self {
            program: program.to_string(),
            args: args.to_vec(),
            task: None,
        })
    }

    /// Factory for the session. An empty command means no capability.
    pub fn factory(command: Vec<String>) -> EngineFactory {
        Box::new(move || {
            CommandSpeechEngine::new(&command).map(|engine| Box::new(engine) as Box<dyn SpeechEngine>)
        })
    }
}

impl SpeechEngine for CommandSpeechEngine {
    fn start(&mut self, capture: u64, sink: SpeechSink) -> Result<(), SpeechError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::Start(e.to_string()))?;
        self.stop();

        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);

        self.task = Some(runtime.spawn(async move {
            match command.output().await {
                Ok(output) if output.status.success() => {
                    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !text.is_empty() {
                        sink(SpeechEvent::Transcript { capture, text });
                    }
                    sink(SpeechEvent::End { capture });
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    let message = if stderr.is_empty() {
                        format!("recognizer exited with {}", output.status)
                    } else {
                        stderr
                    };
                    sink(SpeechEvent::Error { capture, message });
                }
                Err(err) => sink(SpeechEvent::Error {
                    capture,
                    message: err.to_string(),
                }),
            }
        }));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for CommandSpeechEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
