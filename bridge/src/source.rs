//! Event-source abstraction the Stream Bridge is written against.
//!
//! A [`StreamConnector`] opens an [`EventSource`] for a URL. The source
//! reports its ready state synchronously right after construction and then
//! yields [`SourceEvent`]s in the order the platform raises them. Reconnection
//! after an error is the source's own business; the bridge only forwards.

use crate::error::Error;
use futures_util::stream::LocalBoxStream;

/// Ready state of a server-push connection, numbered like the browser's
/// `EventSource.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closed = 2,
}

impl ReadyState {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(ReadyState::Connecting),
            1 => Some(ReadyState::Open),
            2 => Some(ReadyState::Closed),
            _ => None,
        }
    }
}

/// A native signal raised by an event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    Open,
    /// Raw `data` of one dispatched event.
    Message(String),
    Error,
}

/// One live server-push connection.
///
/// Dropping the source (or the stream returned by [`EventSource::into_events`])
/// closes the underlying connection.
pub trait EventSource {
    fn ready_state(&self) -> ReadyState;

    /// Start delivering events. Handlers are wired here, after the caller has
    /// inspected [`EventSource::ready_state`].
    fn into_events(self: Box<Self>) -> LocalBoxStream<'static, SourceEvent>;
}

/// Opens event sources for stream endpoint URLs.
pub trait StreamConnector {
    /// Construct a source for `url`. An `Err` means the platform refused to
    /// construct it at all and is treated like a synchronously closed source.
    fn connect(&self, url: &str) -> Result<Box<dyn EventSource>, Error>;
}
