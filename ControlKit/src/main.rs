mod console;
mod logging;
mod simulated;

use std::sync::Arc;

use anyhow::Result;
use ckconfig::Config;
use ckcontrol::{
    ConfigTokenStore, ControlConfigExt, ControlService, SystemController, remote_event_channel,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::console::{ConsoleCommand, HELP};

#[tokio::main]
async fn main() -> Result<()> {
    // ========== PHASE 1 : Configuration + logs ==========
    let config_dir = std::env::args().nth(1).unwrap_or_default();
    let config = Arc::new(Config::load_config(&config_dir)?);
    logging::init_logging(&config);
    info!(config_dir = config.directory(), "Configuration loaded");

    // ========== PHASE 2 : Contrôleur ==========
    let mut settings = config.controller_settings()?;
    settings.token_store = Some(Arc::new(ConfigTokenStore::from_config(config.clone())?));
    info!(?settings, "Controller settings");

    let (remote_tx, remote_rx) = remote_event_channel();
    let services = simulated::device_services(remote_tx);
    let controller = SystemController::new(services, settings).await;
    let (handle, service) = ControlService::spawn(controller, remote_rx);

    // Journalise chaque événement publié
    let events = handle.subscribe();
    std::thread::spawn(move || {
        for event in events.iter() {
            match serde_json::to_string(&event) {
                Ok(json) => info!(event = %json, "Control event"),
                Err(e) => warn!("Failed to serialize control event: {}", e),
            }
        }
    });

    // ========== PHASE 3 : Console ==========
    info!("ControlKit is ready, type 'help' for commands (Ctrl+C to stop)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received");
                break;
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read stdin: {}", e);
                        break;
                    }
                };
                match ConsoleCommand::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(ConsoleCommand::Quit)) => break,
                    Ok(Some(ConsoleCommand::Help)) => println!("{HELP}"),
                    Ok(Some(ConsoleCommand::Status)) => match handle.snapshot().await {
                        Ok(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
                        Err(e) => error!("Failed to get status: {}", e),
                    },
                    Ok(Some(command)) => command.forward(&handle),
                    Err(e) => warn!("{}", e),
                }
            }
        }
    }

    let controller = service.shutdown().await?;
    info!(?controller, "ControlKit stopped");
    Ok(())
}
