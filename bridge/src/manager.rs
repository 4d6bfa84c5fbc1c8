use crate::config::BridgeConfig;
use crate::modal::{DialogWidget, ModalBridge};
use crate::source::StreamConnector;
use crate::stream::StreamBridge;
use log::*;
use ports::{InboundMessage, Outbound, PortName};
use tokio::sync::mpsc::UnboundedReceiver;

/// Routes inbound port messages to the modal and stream bridges and drives
/// every live stream connection from a single cooperative loop.
pub struct Manager<W, C> {
    modal: ModalBridge<W>,
    streams: StreamBridge<C>,
}

impl<W: DialogWidget, C: StreamConnector> Manager<W, C> {
    pub fn new(config: BridgeConfig, widget: W, connector: C, outbound: Outbound) -> Self {
        Self {
            modal: ModalBridge::new(widget, outbound.clone()),
            streams: StreamBridge::new(config, connector, outbound),
        }
    }

    /// Dispatch one inbound message. Returns immediately; responses are
    /// published later through the outbound port.
    pub fn dispatch(&mut self, message: InboundMessage) {
        debug!("Dispatching inbound port {}", message.port_name());

        match message {
            InboundMessage::ShowErrorModal(request) => self.modal.show(&request),
            InboundMessage::SubscribeToEmailStream(application_id) => {
                self.streams.subscribe(&application_id);
            }
            InboundMessage::UnsubscribeFromEmailStream(application_id) => {
                self.streams.unsubscribe(&application_id);
            }
        }
    }

    /// Run the event loop until the inbound port has closed, no stream
    /// connection remains and no dialog is waiting to report its closure.
    pub async fn run(mut self, mut inbound: UnboundedReceiver<InboundMessage>) {
        let mut inbound_open = true;
        info!("Bridge running");

        loop {
            if !inbound_open && !self.streams.has_live_streams() && !self.modal.is_open() {
                break;
            }

            tokio::select! {
                biased;

                message = inbound.recv(), if inbound_open => {
                    match message {
                        Some(message) => self.dispatch(message),
                        None => {
                            info!(
                                "Inbound port closed, draining {} stream connection(s)",
                                self.streams.live_connections()
                            );
                            inbound_open = false;
                        }
                    }
                }
                Some(item) = self.streams.next_item(), if self.streams.has_live_streams() => {
                    self.streams.handle(item);
                }
                _ = self.modal.closed(), if self.modal.is_open() => {
                    debug!("Error modal closed");
                }
                else => break,
            }
        }

        info!("Bridge stopped");
    }
}
