use serde::{Deserialize, Serialize};

/// Trait for getting the runtime-side name of a port
pub trait PortName {
    fn port_name(&self) -> &'static str;
}

/// Payload of the `showErrorModal` port. Both fields are pre-rendered markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorModalRequest {
    pub title: String,
    pub description: String,
}

/// Requests flowing from the runtime into the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "port", content = "value")]
pub enum InboundMessage {
    #[serde(rename = "showErrorModal")]
    ShowErrorModal(ErrorModalRequest),
    /// Carries the application identifier to attach to.
    #[serde(rename = "subscribeToEmailStream")]
    SubscribeToEmailStream(String),
    /// Closes every live connection opened for the application identifier.
    #[serde(rename = "unsubscribeFromEmailStream")]
    UnsubscribeFromEmailStream(String),
}

/// Responses flowing from the bridge back to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "port", content = "value")]
pub enum OutboundMessage {
    #[serde(rename = "errorModalClosed")]
    ErrorModalClosed,
    #[serde(rename = "emailStreamOpened")]
    EmailStreamOpened,
    /// Raw frame text, unparsed.
    #[serde(rename = "emailStreamOnMessage")]
    EmailStreamOnMessage(String),
    #[serde(rename = "emailStreamError")]
    EmailStreamError,
    #[serde(rename = "emailStreamClosed")]
    EmailStreamClosed,
}

impl PortName for InboundMessage {
    fn port_name(&self) -> &'static str {
        match self {
            InboundMessage::ShowErrorModal(_) => "showErrorModal",
            InboundMessage::SubscribeToEmailStream(_) => "subscribeToEmailStream",
            InboundMessage::UnsubscribeFromEmailStream(_) => "unsubscribeFromEmailStream",
        }
    }
}

impl PortName for OutboundMessage {
    fn port_name(&self) -> &'static str {
        match self {
            OutboundMessage::ErrorModalClosed => "errorModalClosed",
            OutboundMessage::EmailStreamOpened => "emailStreamOpened",
            OutboundMessage::EmailStreamOnMessage(_) => "emailStreamOnMessage",
            OutboundMessage::EmailStreamError => "emailStreamError",
            OutboundMessage::EmailStreamClosed => "emailStreamClosed",
        }
    }
}

impl OutboundMessage {
    /// The text payload carried by this message, if the port has one.
    pub fn payload(&self) -> Option<&str> {
        match self {
            OutboundMessage::EmailStreamOnMessage(data) => Some(data),
            _ => None,
        }
    }
}
