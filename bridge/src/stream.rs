use crate::config::BridgeConfig;
use crate::connection::{ConnectionId, ConnectionRegistry, ConnectionState};
use crate::source::{ReadyState, SourceEvent, StreamConnector};
use futures_util::future;
use futures_util::stream::{self, LocalBoxStream, SelectAll, StreamExt};
use log::*;
use ports::{Outbound, OutboundMessage};

/// One item pulled from the merged connection streams. `event` is `None`
/// once the connection's source has run dry.
#[derive(Debug)]
pub struct StreamItem {
    pub connection_id: ConnectionId,
    pub event: Option<SourceEvent>,
}

/// Forwards the lifecycle and data events of email stream connections to the
/// runtime.
///
/// Every subscription opens its own connection. Connection events from all
/// subscriptions are merged into one stream that the owner polls with
/// [`StreamBridge::next_item`] and feeds back through [`StreamBridge::handle`],
/// which keeps all state changes on the caller's task.
pub struct StreamBridge<C> {
    config: BridgeConfig,
    connector: C,
    outbound: Outbound,
    registry: ConnectionRegistry,
    events: SelectAll<LocalBoxStream<'static, StreamItem>>,
}

impl<C: StreamConnector> StreamBridge<C> {
    pub fn new(config: BridgeConfig, connector: C, outbound: Outbound) -> Self {
        Self {
            config,
            connector,
            outbound,
            registry: ConnectionRegistry::new(),
            events: SelectAll::new(),
        }
    }

    /// Open a connection for `application_id`.
    ///
    /// Returns the id of the new connection, or `None` when the platform
    /// reported the connection unusable on construction, in which case
    /// `emailStreamClosed` has already been published and nothing was wired.
    pub fn subscribe(&mut self, application_id: &str) -> Option<ConnectionId> {
        let url = self.config.email_stream_url(application_id);

        let source = match self.connector.connect(&url) {
            Ok(source) => source,
            Err(e) => {
                warn!("Email stream for {application_id} refused at {url}: {e}");
                self.outbound.send(OutboundMessage::EmailStreamClosed);
                return None;
            }
        };

        let ready_state = source.ready_state();
        if ready_state == ReadyState::Closed {
            info!("Email stream for {application_id} closed on construction");
            self.outbound.send(OutboundMessage::EmailStreamClosed);
            return None;
        }

        let (events, abort_handle) = stream::abortable(source.into_events());
        let connection_id =
            self.registry
                .register(application_id.to_string(), ready_state.into(), abort_handle);

        let tagged_id = connection_id.clone();
        let end_id = connection_id.clone();
        let tagged = events
            .map(move |event| StreamItem {
                connection_id: tagged_id.clone(),
                event: Some(event),
            })
            .chain(stream::once(future::ready(StreamItem {
                connection_id: end_id,
                event: None,
            })));
        self.events.push(tagged.boxed_local());

        info!(
            "Opened email stream connection {} for {application_id}",
            connection_id.as_str()
        );
        Some(connection_id)
    }

    /// Close every live connection for `application_id`, publishing one
    /// `emailStreamClosed` per connection. Returns how many were closed.
    pub fn unsubscribe(&mut self, application_id: &str) -> usize {
        let connection_ids = self.registry.connections_for(application_id);

        for connection_id in &connection_ids {
            if let Some(info) = self.registry.unregister(connection_id) {
                info.abort_handle.abort();
                self.outbound.send(OutboundMessage::EmailStreamClosed);
                info!(
                    "Closed email stream connection {} for {application_id}",
                    connection_id.as_str()
                );
            }
        }

        if connection_ids.is_empty() {
            debug!("Unsubscribe for {application_id} matched no live connection");
        }
        connection_ids.len()
    }

    /// Next event from any live connection, in per-connection arrival order.
    /// Resolves to `None` only when no connection stream remains.
    pub async fn next_item(&mut self) -> Option<StreamItem> {
        self.events.next().await
    }

    /// Apply one merged item: publish what its connection's state machine
    /// emits, or retire the connection if its source has ended.
    pub fn handle(&mut self, item: StreamItem) {
        match item.event {
            Some(event) => {
                trace!(
                    "Connection {} raised {:?}",
                    item.connection_id.as_str(),
                    event
                );
                if let Some(message) = self.registry.apply(&item.connection_id, event) {
                    self.outbound.send(message);
                }
            }
            None => {
                if let Some(info) = self.registry.unregister(&item.connection_id) {
                    info!(
                        "Email stream connection {} for {} ended",
                        item.connection_id.as_str(),
                        info.application_id
                    );
                }
            }
        }
    }

    pub fn state(&self, connection_id: &ConnectionId) -> Option<ConnectionState> {
        self.registry.state(connection_id)
    }

    /// True while any connection stream is still being polled.
    pub fn has_live_streams(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn live_connections(&self) -> usize {
        self.registry.len()
    }
}
