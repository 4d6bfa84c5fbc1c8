//! Bridge between a reactive UI runtime's ports and two capabilities: a
//! modal error dialog and a live server-push stream of incoming emails.
//!
//! # Architecture
//!
//! - **Two independent bridges**: the [`modal::ModalBridge`] drives a dialog
//!   widget through show/hide and acknowledges closure; the
//!   [`stream::StreamBridge`] opens one server-push connection per
//!   subscription and forwards its lifecycle and data events.
//! - **Explicit connection state machine**: native open/message/error
//!   signals are transitions on a [`connection::ConnectionState`] owned by
//!   the stream bridge, so it can be exercised with a fake event source.
//! - **Injected capabilities**: the widget ([`modal::DialogWidget`]) and the
//!   event source ([`source::StreamConnector`]) are traits; the base API URL
//!   arrives in a [`BridgeConfig`].
//! - **Verbatim forwarding**: payloads are not parsed, errors are not
//!   retried or classified. Reconnection is left to the event source.
//!
//! # Message Flow
//!
//! 1. The runtime publishes `subscribeToEmailStream("app-123")`
//! 2. [`Manager`] routes it to the stream bridge, which connects to
//!    `<base>/api/stream/emails/app-123`
//! 3. A source that is closed on construction yields `emailStreamClosed`
//!    and nothing else
//! 4. Otherwise every open, message and error event of the connection is
//!    published as `emailStreamOpened`, `emailStreamOnMessage(data)` and
//!    `emailStreamError`, in arrival order
//! 5. `unsubscribeFromEmailStream("app-123")` closes the connection and
//!    yields `emailStreamClosed`
//!
//! # Modules
//!
//! - `config`: Base API URL and stream endpoint construction
//! - `connection`: ConnectionState machine and ConnectionRegistry with type-safe ConnectionId
//! - `error`: Error type and kinds
//! - `http`: HTTP event source (feature `native`)
//! - `manager`: Inbound routing and the cooperative event loop
//! - `modal`: Dialog widget contract and the modal bridge
//! - `source`: Event-source contract
//! - `stream`: The stream bridge
//! - `web`: Browser adapters (feature `web`)

pub mod config;
pub mod connection;
pub mod error;
#[cfg(feature = "native")]
pub mod http;
pub mod manager;
pub mod modal;
pub mod source;
pub mod stream;
#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
mod fake;

pub use config::BridgeConfig;
pub use manager::Manager;
