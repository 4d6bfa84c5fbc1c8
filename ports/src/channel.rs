use crate::message::{InboundMessage, OutboundMessage, PortName};
use log::*;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Runtime end of the port pair: publish requests, consume responses.
pub struct RuntimePorts {
    pub inbound: UnboundedSender<InboundMessage>,
    pub outbound: UnboundedReceiver<OutboundMessage>,
}

/// Bridge end of the port pair: consume requests, publish responses.
pub struct BridgePorts {
    pub inbound: UnboundedReceiver<InboundMessage>,
    pub outbound: Outbound,
}

/// Cloneable publisher for outbound port messages.
///
/// Publishing never blocks and never fails loudly: if the runtime has gone
/// away the message is dropped with a warning, the same way a page that has
/// been torn down silently ignores late port traffic.
#[derive(Debug, Clone)]
pub struct Outbound {
    sender: UnboundedSender<OutboundMessage>,
}

impl Outbound {
    pub fn new(sender: UnboundedSender<OutboundMessage>) -> Self {
        Self { sender }
    }

    pub fn send(&self, message: OutboundMessage) {
        let port = message.port_name();
        if let Err(e) = self.sender.send(message) {
            warn!("Failed to publish to port {port}: {e}. Runtime is no longer listening.");
        } else {
            trace!("Published to port {port}");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Create the two unidirectional channels connecting a runtime to a bridge.
pub fn port_pair() -> (RuntimePorts, BridgePorts) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    (
        RuntimePorts {
            inbound: inbound_tx,
            outbound: outbound_rx,
        },
        BridgePorts {
            inbound: inbound_rx,
            outbound: Outbound::new(outbound_tx),
        },
    )
}
