//! Error types for the `bridge` crate.
//!
//! Follows the same pattern as the other layers: a root `Error` struct holding
//! an error kind tree and an optional source for chaining. These errors never
//! cross a port. The bridges log them and translate them into the port signal
//! the runtime expects (`emailStreamClosed` for a refused connection,
//! `errorModalClosed` for a dialog that could not be shown).

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for the bridge crate.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in the bridge.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Stream(StreamErrorKind),
    Widget(WidgetErrorKind),
    Port(PortErrorKind),
}

/// Errors raised while constructing an event source.
#[derive(Debug, PartialEq)]
pub enum StreamErrorKind {
    /// The endpoint URL could not be parsed.
    InvalidUrl,
    /// The platform refused to create the connection.
    Rejected,
    /// The HTTP client could not be built.
    ClientBuildFailed,
}

/// Errors raised by a dialog widget.
#[derive(Debug, PartialEq)]
pub enum WidgetErrorKind {
    /// The dialog element could not be located.
    NotFound,
    /// The widget refused to display.
    ShowFailed,
}

/// Errors raised while decoding or delivering port traffic.
#[derive(Debug, PartialEq)]
pub enum PortErrorKind {
    /// The runtime's port object lacks a port or a `send`/`subscribe` function.
    Missing,
    /// A message payload could not be decoded.
    InvalidPayload,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let detail = self
            .source
            .as_ref()
            .map(|e| format!(": {e}"))
            .unwrap_or_default();
        match &self.error_kind {
            ErrorKind::Stream(kind) => write!(f, "Stream error: {kind:?}{detail}"),
            ErrorKind::Widget(kind) => write!(f, "Widget error: {kind:?}{detail}"),
            ErrorKind::Port(kind) => write!(f, "Port error: {kind:?}{detail}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

#[cfg(feature = "native")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Stream(StreamErrorKind::ClientBuildFailed)
        } else {
            ErrorKind::Stream(StreamErrorKind::Rejected)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Port(PortErrorKind::InvalidPayload),
        }
    }
}

/// Helper function to create stream errors.
pub fn stream_error(kind: StreamErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Stream(kind),
    }
}

/// Helper function to create widget errors.
pub fn widget_error(kind: WidgetErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Widget(kind),
    }
}

/// Helper function to create port errors.
pub fn port_error(kind: PortErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Port(kind),
    }
}
