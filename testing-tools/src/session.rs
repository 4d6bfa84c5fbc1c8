use anyhow::Result;
use bridge::http::HttpConnector;
use bridge::stream::StreamBridge;
use bridge::BridgeConfig;
use log::*;
use ports::{port_pair, OutboundMessage, PortName};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;

/// A stream bridge wired to the HTTP event source, pumped by the caller.
///
/// Nothing runs in the background: connection events are only pulled while
/// waiting for a signal, so the whole session lives on the caller's task.
pub struct Session {
    pub label: String,
    bridge: StreamBridge<HttpConnector>,
    outbound: UnboundedReceiver<OutboundMessage>,
}

impl Session {
    pub fn new(base_url: &str, reconnect_delay: Duration, label: String) -> Result<Self> {
        let connector = HttpConnector::new()?.with_reconnect_delay(reconnect_delay);
        let (runtime, ports) = port_pair();

        Ok(Self {
            label,
            bridge: StreamBridge::new(BridgeConfig::new(base_url), connector, ports.outbound),
            outbound: runtime.outbound,
        })
    }

    /// Publish `subscribeToEmailStream(app_id)`. Returns whether a connection
    /// was wired.
    pub fn subscribe(&mut self, app_id: &str) -> bool {
        self.bridge.subscribe(app_id).is_some()
    }

    pub fn unsubscribe(&mut self, app_id: &str) -> usize {
        self.bridge.unsubscribe(app_id)
    }

    /// Next outbound signal, pumping connection events until one is published.
    pub async fn next_signal(&mut self, timeout: Duration) -> Result<OutboundMessage> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Ok(message) = self.outbound.try_recv() {
                debug!("{} received {}", self.label, message.port_name());
                return Ok(message);
            }

            if !self.bridge.has_live_streams() {
                anyhow::bail!("No live email stream connection left");
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                anyhow::bail!("Timeout waiting for a bridge signal");
            }

            match tokio::time::timeout(remaining, self.bridge.next_item()).await {
                Ok(Some(item)) => self.bridge.handle(item),
                Ok(None) => anyhow::bail!("Email stream connections ended"),
                Err(_) => anyhow::bail!("Timeout waiting for a bridge signal"),
            }
        }
    }

    /// Skip signals until one arrives on `port`.
    pub async fn wait_for_signal(&mut self, port: &str, timeout: Duration) -> Result<OutboundMessage> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                anyhow::bail!("Timeout waiting for signal: {}", port);
            }

            let message = self.next_signal(remaining).await?;
            if message.port_name() == port {
                return Ok(message);
            }
            debug!("{} skipping {} while waiting for {}", self.label, message.port_name(), port);
        }
    }
}
