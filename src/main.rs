//! Headless host for the bridge.
//!
//! Inbound port messages are read as JSON lines from stdin, for example
//! `{"port":"subscribeToEmailStream","value":"app-123"}`, and outbound port
//! messages are written as JSON lines to stdout. Logs and dialogs go to stderr.

use bridge::error::Error;
use bridge::http::HttpConnector;
use bridge::Manager;
use log::*;
use ports::{port_pair, InboundMessage, OutboundMessage, RuntimePorts};
use service::{config::Config, logging::Logger};
use std::io::BufRead;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::LocalSet;

mod terminal_dialog;

use terminal_dialog::TerminalDialog;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Bridging email streams from {} [reconnect delay: {:?}]",
        config.base_api_url(),
        config.reconnect_delay()
    );

    let connector = match HttpConnector::new() {
        Ok(connector) => connector.with_reconnect_delay(config.reconnect_delay()),
        Err(e) => {
            error!("Failed to build the HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let (runtime, ports) = port_pair();
    let RuntimePorts { inbound, outbound } = runtime;

    let manager = Manager::new(
        config.bridge_config(),
        TerminalDialog::new(config.modal_hide_after()),
        connector,
        ports.outbound,
    );

    // Stdin is read on a plain thread so a pending read never holds up shutdown.
    std::thread::spawn(move || read_inbound(inbound));
    let writer = tokio::spawn(write_outbound(outbound));

    let local = LocalSet::new();
    tokio::select! {
        _ = local.run_until(manager.run(ports.inbound)) => {
            info!("Input closed with no live email stream or open dialog, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }
    drop(local);

    if let Err(e) = writer.await {
        error!("Port writer failed: {e}");
        std::process::exit(1);
    }
}

fn read_inbound(inbound: UnboundedSender<InboundMessage>) {
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read from stdin: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<InboundMessage>(&line) {
            Ok(message) => {
                if inbound.send(message).is_err() {
                    break;
                }
            }
            Err(e) => warn!("Ignoring malformed port message {line}: {}", Error::from(e)),
        }
    }
    debug!("Stdin closed");
}

async fn write_outbound(mut outbound: UnboundedReceiver<OutboundMessage>) {
    let mut stdout = tokio::io::stdout();
    while let Some(message) = outbound.recv().await {
        let mut line = match serde_json::to_string(&message) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to encode port message {message:?}: {e}");
                continue;
            }
        };
        line.push('\n');

        if let Err(e) = stdout.write_all(line.as_bytes()).await {
            error!("Failed to write to stdout: {e}");
            break;
        }
        if let Err(e) = stdout.flush().await {
            error!("Failed to flush stdout: {e}");
            break;
        }
    }
}
