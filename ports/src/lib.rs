//! Port messages exchanged between the UI runtime and the bridge.
//!
//! A port is a named, typed, unidirectional channel. Inbound ports carry
//! requests from the runtime to the bridge, outbound ports carry responses
//! back. This crate has no dependency on the bridge or on any concrete
//! runtime, so either side can be swapped without the other noticing.
//!
//! # Message Flow
//!
//! 1. The runtime publishes an [`InboundMessage`] through [`RuntimePorts`]
//! 2. The bridge receives it from [`BridgePorts`] and performs a side effect
//! 3. Zero or more [`OutboundMessage`]s flow back through [`Outbound`]
//!
//! # Wire encoding
//!
//! Messages serialize adjacently tagged with the port name, e.g.
//! `{"port":"subscribeToEmailStream","value":"app-123"}`. Payload-less ports
//! omit `value`.

pub mod channel;
pub mod message;

pub use channel::{port_pair, BridgePorts, Outbound, RuntimePorts};
pub use message::{ErrorModalRequest, InboundMessage, OutboundMessage, PortName};
