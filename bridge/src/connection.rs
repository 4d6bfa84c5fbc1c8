use crate::source::{ReadyState, SourceEvent};
use futures_util::stream::AbortHandle;
use log::*;
use ports::OutboundMessage;
use std::collections::{HashMap, HashSet};

// Opaque token naming the mailbox a subscription attaches to
pub type ApplicationId = String;

/// Unique identifier for a connection (bridge-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Observable lifecycle state of one stream connection.
///
/// ```text
/// Connecting ──open──▶ Open ──message──▶ Open
///      │                 │
///      └──error──▶ Erroring ◀──error──┘
///                    │
///                    └──open──▶ Open   (platform reconnected)
/// ```
///
/// `Closed` is only entered from outside the event flow: a synchronous
/// refusal, an unsubscribe, or the source running dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Erroring,
    Closed,
}

impl ConnectionState {
    /// Apply a native event, returning the next state and the port message to
    /// publish. Every open, message and error is forwarded as-is; a closed
    /// connection swallows late events.
    pub fn transition(self, event: SourceEvent) -> (ConnectionState, Option<OutboundMessage>) {
        match (self, event) {
            (ConnectionState::Closed, _) => (ConnectionState::Closed, None),
            (_, SourceEvent::Open) => (
                ConnectionState::Open,
                Some(OutboundMessage::EmailStreamOpened),
            ),
            (state, SourceEvent::Message(data)) => {
                (state, Some(OutboundMessage::EmailStreamOnMessage(data)))
            }
            (_, SourceEvent::Error) => (
                ConnectionState::Erroring,
                Some(OutboundMessage::EmailStreamError),
            ),
        }
    }
}

impl From<ReadyState> for ConnectionState {
    fn from(ready_state: ReadyState) -> Self {
        match ready_state {
            ReadyState::Connecting => ConnectionState::Connecting,
            ReadyState::Open => ConnectionState::Open,
            ReadyState::Closed => ConnectionState::Closed,
        }
    }
}

/// Connection information (no redundant connection_id)
#[derive(Debug)]
pub struct ConnectionInfo {
    pub application_id: ApplicationId,
    pub state: ConnectionState,
    pub abort_handle: AbortHandle,
}

/// Registry of live connections with dual indices.
///
/// Lives on the bridge's event-loop task, so plain maps suffice.
#[derive(Default)]
pub struct ConnectionRegistry {
    /// Primary storage: lookup by connection_id for event routing and cleanup
    connections: HashMap<ConnectionId, ConnectionInfo>,

    /// Secondary index: lookup by application identifier for unsubscribe
    application_index: HashMap<ApplicationId, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection
    pub fn register(
        &mut self,
        application_id: ApplicationId,
        state: ConnectionState,
        abort_handle: AbortHandle,
    ) -> ConnectionId {
        let connection_id = ConnectionId::new();

        self.connections.insert(
            connection_id.clone(),
            ConnectionInfo {
                application_id: application_id.clone(),
                state,
                abort_handle,
            },
        );

        self.application_index
            .entry(application_id)
            .or_default()
            .insert(connection_id.clone());

        connection_id
    }

    /// Unregister a connection, returning its information if it was live
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<ConnectionInfo> {
        let info = self.connections.remove(connection_id)?;

        if let Some(ids) = self.application_index.get_mut(&info.application_id) {
            ids.remove(connection_id);

            if ids.is_empty() {
                self.application_index.remove(&info.application_id);
            }
        }

        Some(info)
    }

    /// Apply a source event to a connection, returning the message to publish.
    /// Events for unknown connections are dropped.
    pub fn apply(
        &mut self,
        connection_id: &ConnectionId,
        event: SourceEvent,
    ) -> Option<OutboundMessage> {
        let Some(info) = self.connections.get_mut(connection_id) else {
            debug!(
                "Dropping event for unknown connection {}",
                connection_id.as_str()
            );
            return None;
        };

        let (next, message) = info.state.transition(event);
        if next != info.state {
            debug!(
                "Connection {} for {}: {:?} -> {:?}",
                connection_id.as_str(),
                info.application_id,
                info.state,
                next
            );
        }
        info.state = next;
        message
    }

    /// All live connections opened for an application identifier
    pub fn connections_for(&self, application_id: &str) -> Vec<ConnectionId> {
        self.application_index
            .get(application_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn state(&self, connection_id: &ConnectionId) -> Option<ConnectionState> {
        self.connections.get(connection_id).map(|info| info.state)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
