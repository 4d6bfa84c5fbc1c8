//! Browser adapter tests, run in a headless browser through `wasm-pack test`
//! with the `web` feature.
#![cfg(all(feature = "web", target_arch = "wasm32"))]

use bridge::error::{ErrorKind, WidgetErrorKind};
use bridge::modal::{DialogWidget, HiddenCallback};
use bridge::source::{ReadyState, SourceEvent, StreamConnector};
use bridge::stream::StreamBridge;
use bridge::web::{DomDialog, WebConnector};
use bridge::BridgeConfig;
use futures_util::stream::StreamExt;
use ports::{port_pair, OutboundMessage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlDialogElement};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_unparseable_url_is_refused() {
    assert!(WebConnector.connect("http://[").is_err());
}

#[wasm_bindgen_test]
fn test_refused_subscription_reports_closed() {
    let (mut runtime, ports) = port_pair();
    let mut streams = StreamBridge::new(BridgeConfig::new("http://["), WebConnector, ports.outbound);

    assert!(streams.subscribe("bad-id").is_none());
    assert_eq!(
        runtime.outbound.try_recv(),
        Ok(OutboundMessage::EmailStreamClosed)
    );
    assert!(!streams.has_live_streams());
}

#[wasm_bindgen_test]
async fn test_failed_connection_ends_after_final_error() {
    // The test page's server answers 404, which makes the browser fail the
    // connection instead of reconnecting.
    let source = WebConnector.connect("/api/stream/emails/missing").unwrap();
    assert_eq!(source.ready_state(), ReadyState::Connecting);

    let mut events = source.into_events();
    assert_eq!(events.next().await, Some(SourceEvent::Error));
    assert_eq!(events.next().await, None);
}

#[wasm_bindgen_test]
async fn test_failed_connection_is_retired_from_the_bridge() {
    let (mut runtime, ports) = port_pair();
    let mut streams = StreamBridge::new(BridgeConfig::new(""), WebConnector, ports.outbound);

    let connection_id = streams.subscribe("missing").unwrap();
    while let Some(item) = streams.next_item().await {
        streams.handle(item);
    }

    assert_eq!(
        runtime.outbound.try_recv(),
        Ok(OutboundMessage::EmailStreamError)
    );
    assert!(streams.state(&connection_id).is_none());
    assert_eq!(streams.live_connections(), 0);
}

fn mount_dialog(class: &str) -> Element {
    let document = web_sys::window().unwrap().document().unwrap();
    document
        .document_element()
        .unwrap()
        .insert_adjacent_html(
            "beforeend",
            &format!(
                r#"<dialog class="{class}"><div class="header"></div><div class="content"><div class="description"></div></div></dialog>"#
            ),
        )
        .unwrap();
    document
        .query_selector(&format!(".{class}"))
        .unwrap()
        .unwrap()
}

// Dispatched synchronously, unlike the event queued by `dialog.close()`
fn fire_close(element: &Element) {
    let event = web_sys::Event::new("close").unwrap();
    element.dispatch_event(&event).unwrap();
}

fn counting_callback(count: &Arc<AtomicUsize>) -> HiddenCallback {
    let count = Arc::clone(count);
    Box::new(move || {
        count.fetch_add(1, Ordering::SeqCst);
    })
}

#[wasm_bindgen_test]
fn test_missing_dialog_element_is_reported() {
    let mut dialog = DomDialog::new(".no-such-dialog");
    let err = dialog.show().unwrap_err();
    assert_eq!(err.error_kind, ErrorKind::Widget(WidgetErrorKind::NotFound));
}

#[wasm_bindgen_test]
fn test_closing_dialog_runs_callback_once() {
    let element = mount_dialog("close-once");
    let hidden = Arc::new(AtomicUsize::new(0));
    let mut dialog = DomDialog::new(".close-once");

    dialog.set_header("Oops");
    dialog.on_hidden(counting_callback(&hidden));
    dialog.show().unwrap();
    assert!(element.clone().dyn_into::<HtmlDialogElement>().unwrap().open());
    assert_eq!(element.query_selector(".header").unwrap().unwrap().inner_html(), "Oops");

    fire_close(&element);
    fire_close(&element);
    assert_eq!(hidden.load(Ordering::SeqCst), 1);

    element.remove();
}

#[wasm_bindgen_test]
fn test_reshow_replaces_close_listener() {
    let element = mount_dialog("reshow");
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let mut dialog = DomDialog::new(".reshow");

    dialog.on_hidden(counting_callback(&first));
    dialog.show().unwrap();
    dialog.on_hidden(counting_callback(&second));
    dialog.show().unwrap();

    fire_close(&element);
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);

    element.remove();
}

#[wasm_bindgen_test]
fn test_dropped_dialog_detaches_close_listener() {
    let element = mount_dialog("dropped");
    let hidden = Arc::new(AtomicUsize::new(0));
    let mut dialog = DomDialog::new(".dropped");

    dialog.on_hidden(counting_callback(&hidden));
    dialog.show().unwrap();
    drop(dialog);

    // A listener left behind would call into a freed closure here
    fire_close(&element);
    assert_eq!(hidden.load(Ordering::SeqCst), 0);

    element.remove();
}
