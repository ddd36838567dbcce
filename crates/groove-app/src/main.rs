//! GrooveWake binary: wires the synthetic pose source, the log sink, and
//! the engine loop together. Stdin lines stand in for the set/cancel
//! buttons of a real UI.

use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use groove_app::{AppConfig, DanceAlarmEngine, EngineCommand, LogSink, SyntheticPoseSource};
use groove_core::{Error, Result, SessionId};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            AppConfig::from_file(&path).map_err(|err| Error::Config(err.to_string()))?
        }
        None => AppConfig::default(),
    };

    let session_id = SessionId::new();
    let source = SyntheticPoseSource::new(session_id, config.source.fps);

    let (commands, command_rx) = mpsc::channel(8);

    let shutdown = commands.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown.send(EngineCommand::Shutdown).await;
        }
    });

    tokio::spawn(read_commands(commands));

    info!("GrooveWake: dance winds the alarm forward; type 'set' to arm, 'cancel' to disarm");

    let mut engine = DanceAlarmEngine::new(session_id, LogSink::new());
    engine.run(source, command_rx, &config.clock).await
}

/// Translate stdin lines into engine commands.
async fn read_commands(commands: mpsc::Sender<EngineCommand>) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let command = match line.trim() {
            "set" => EngineCommand::SetAlarm,
            "cancel" => EngineCommand::CancelAlarm,
            "quit" | "exit" => EngineCommand::Shutdown,
            "" => continue,
            other => {
                warn!(input = other, "unknown command (set | cancel | quit)");
                continue;
            }
        };

        if commands.send(command).await.is_err() {
            break;
        }
    }
}
