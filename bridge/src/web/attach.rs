//! Attachment of the bridge to a runtime's JavaScript port object.
//!
//! **Inbound** (runtime → bridge): we call `ports.<name>.subscribe(fn)` for
//! every inbound port and push what the runtime publishes into the bridge's
//! inbound channel.
//!
//! **Outbound** (bridge → runtime): a task on the browser event loop calls
//! `ports.<name>.send(value)` for every [`OutboundMessage`].

use crate::config::BridgeConfig;
use crate::error::{port_error, Error, PortErrorKind};
use crate::manager::Manager;
use crate::web::dialog::DomDialog;
use crate::web::event_source::WebConnector;
use js_sys::{Function, Reflect};
use log::*;
use ports::{port_pair, ErrorModalRequest, InboundMessage, OutboundMessage, PortName};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use wasm_bindgen::prelude::*;

const INBOUND_PORTS: [&str; 3] = [
    "showErrorModal",
    "subscribeToEmailStream",
    "unsubscribeFromEmailStream",
];

/// Wire the bridge to `ports` and start it on the browser event loop.
///
/// `ports` is the runtime's port object (`app.ports`). Inbound ports the
/// runtime does not declare are skipped; outbound messages for undeclared
/// ports are dropped with a warning.
#[wasm_bindgen]
pub fn attach(ports: JsValue, base_api_url: String) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let (runtime, bridge_ports) = port_pair();

    for name in INBOUND_PORTS {
        match port(&ports, name) {
            Ok(port) => subscribe(&port, name, runtime.inbound.clone())
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            Err(e) => debug!("Skipping inbound port {name}: {e}"),
        }
    }

    let manager = Manager::new(
        BridgeConfig::new(base_api_url),
        DomDialog::default(),
        WebConnector,
        bridge_ports.outbound,
    );
    wasm_bindgen_futures::spawn_local(manager.run(bridge_ports.inbound));
    wasm_bindgen_futures::spawn_local(publish(ports, runtime.outbound));

    info!("Bridge attached to runtime ports");
    Ok(())
}

fn port(ports: &JsValue, name: &str) -> Result<JsValue, Error> {
    let port = Reflect::get(ports, &JsValue::from_str(name))
        .map_err(|e| port_error(PortErrorKind::Missing, &format!("{name}: {e:?}")))?;
    if port.is_undefined() || port.is_null() {
        return Err(port_error(PortErrorKind::Missing, name));
    }
    Ok(port)
}

fn method(port: &JsValue, name: &str) -> Result<Function, Error> {
    Reflect::get(port, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
        .ok_or_else(|| port_error(PortErrorKind::Missing, &format!("port has no {name}()")))
}

fn decode(name: &str, value: &JsValue) -> Result<InboundMessage, Error> {
    match name {
        "showErrorModal" => {
            let field = |field: &str| {
                Reflect::get(value, &JsValue::from_str(field))
                    .ok()
                    .and_then(|v| v.as_string())
                    .ok_or_else(|| {
                        port_error(
                            PortErrorKind::InvalidPayload,
                            &format!("showErrorModal.{field} is not a string"),
                        )
                    })
            };
            Ok(InboundMessage::ShowErrorModal(ErrorModalRequest {
                title: field("title")?,
                description: field("description")?,
            }))
        }
        "subscribeToEmailStream" | "unsubscribeFromEmailStream" => {
            let application_id = value.as_string().ok_or_else(|| {
                port_error(
                    PortErrorKind::InvalidPayload,
                    &format!("{name} expects a string identifier"),
                )
            })?;
            Ok(if name == "subscribeToEmailStream" {
                InboundMessage::SubscribeToEmailStream(application_id)
            } else {
                InboundMessage::UnsubscribeFromEmailStream(application_id)
            })
        }
        _ => Err(port_error(PortErrorKind::Missing, name)),
    }
}

fn subscribe(
    port: &JsValue,
    name: &'static str,
    inbound: UnboundedSender<InboundMessage>,
) -> Result<(), Error> {
    let subscribe = method(port, "subscribe")?;

    let on_message = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
        match decode(name, &value) {
            Ok(message) => {
                if inbound.send(message).is_err() {
                    warn!("Bridge stopped, dropping {name} request");
                }
            }
            Err(e) => warn!("Ignoring malformed {name} request: {e}"),
        }
    });
    subscribe
        .call1(port, on_message.as_ref())
        .map_err(|e| port_error(PortErrorKind::Missing, &format!("{name}.subscribe: {e:?}")))?;
    on_message.forget();

    Ok(())
}

async fn publish(ports: JsValue, mut outbound: UnboundedReceiver<OutboundMessage>) {
    while let Some(message) = outbound.recv().await {
        let name = message.port_name();
        let value = message
            .payload()
            .map(JsValue::from_str)
            .unwrap_or(JsValue::NULL);

        let sent = port(&ports, name)
            .and_then(|port| method(&port, "send").map(|send| (port, send)))
            .and_then(|(port, send)| {
                send.call1(&port, &value)
                    .map_err(|e| port_error(PortErrorKind::Missing, &format!("{e:?}")))
            });
        if let Err(e) = sent {
            warn!("Failed to publish to port {name}: {e}");
        }
    }
}
