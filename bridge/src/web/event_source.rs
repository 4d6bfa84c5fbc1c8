//! `EventSource` backed by the browser's native `EventSource` object.

use crate::error::{stream_error, Error, StreamErrorKind};
use crate::source::{EventSource, ReadyState, SourceEvent, StreamConnector};
use futures_util::stream::{self, LocalBoxStream, StreamExt};
use log::*;
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use wasm_bindgen::prelude::*;
use web_sys::MessageEvent;

/// Opens browser `EventSource` connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebConnector;

impl StreamConnector for WebConnector {
    fn connect(&self, url: &str) -> Result<Box<dyn EventSource>, Error> {
        let inner = web_sys::EventSource::new(url)
            .map_err(|e| stream_error(StreamErrorKind::Rejected, &format!("{e:?}")))?;
        Ok(Box::new(WebEventSource { inner }))
    }
}

/// Ready state as reported by the browser; unknown codes count as closed.
fn ready_state_of(source: &web_sys::EventSource) -> ReadyState {
    ReadyState::from_code(source.ready_state()).unwrap_or(ReadyState::Closed)
}

/// Whether an `error` raised while the source is in `ready_state` is its last
/// event. The browser only stays closed after an error once it has failed
/// the connection; otherwise it is reconnecting.
fn ends_after_error(ready_state: ReadyState) -> bool {
    ready_state == ReadyState::Closed
}

// Shared by the handlers; taking the sender out ends the event stream.
type Feed = Rc<RefCell<Option<UnboundedSender<SourceEvent>>>>;

fn push(feed: &Feed, event: SourceEvent) {
    if let Some(sender) = feed.borrow().as_ref() {
        let _ = sender.send(event);
    }
}

struct WebEventSource {
    inner: web_sys::EventSource,
}

/// Keeps the handler closures alive for as long as events are consumed and
/// closes the connection once the consumer lets go.
struct Wiring {
    inner: web_sys::EventSource,
    events: UnboundedReceiver<SourceEvent>,
    _on_open: Closure<dyn FnMut(web_sys::Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for Wiring {
    fn drop(&mut self) {
        self.inner.set_onopen(None);
        self.inner.set_onmessage(None);
        self.inner.set_onerror(None);
        self.inner.close();
    }
}

impl EventSource for WebEventSource {
    fn ready_state(&self) -> ReadyState {
        ready_state_of(&self.inner)
    }

    fn into_events(self: Box<Self>) -> LocalBoxStream<'static, SourceEvent> {
        let inner = self.inner;
        let (tx, rx) = mpsc::unbounded_channel();
        let feed: Feed = Rc::new(RefCell::new(Some(tx)));

        let open_feed = Rc::clone(&feed);
        let on_open = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            push(&open_feed, SourceEvent::Open);
        });

        let message_feed = Rc::clone(&feed);
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |evt: MessageEvent| {
            if let Some(data) = evt.data().as_string() {
                push(&message_feed, SourceEvent::Message(data));
            }
        });

        let error_source = inner.clone();
        let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            push(&feed, SourceEvent::Error);
            if ends_after_error(ready_state_of(&error_source)) {
                debug!("Event stream at {} failed for good", error_source.url());
                feed.borrow_mut().take();
            }
        });

        inner.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        inner.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        inner.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let wiring = Wiring {
            inner,
            events: rx,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
        };

        stream::unfold(wiring, |mut wiring| async move {
            wiring.events.recv().await.map(|event| (event, wiring))
        })
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_an_error_in_closed_state_ends_the_stream() {
        assert!(ends_after_error(ReadyState::Closed));
        assert!(!ends_after_error(ReadyState::Connecting));
        assert!(!ends_after_error(ReadyState::Open));
    }

    #[test]
    fn test_ending_the_feed_drains_then_closes_the_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let feed: Feed = Rc::new(RefCell::new(Some(tx)));

        push(&feed, SourceEvent::Error);
        feed.borrow_mut().take();
        push(&feed, SourceEvent::Open);

        assert_eq!(rx.try_recv(), Ok(SourceEvent::Error));
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
