//! In-memory stand-ins for the event source and dialog widget.

use crate::error::{stream_error, widget_error, Error, StreamErrorKind, WidgetErrorKind};
use crate::modal::{DialogWidget, HiddenCallback};
use crate::source::{EventSource, ReadyState, SourceEvent, StreamConnector};
use futures_util::stream::{self, LocalBoxStream, StreamExt};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Test-side view of a scripted source.
#[derive(Clone)]
pub struct FakeSource {
    wired: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
}

impl FakeSource {
    pub fn was_wired(&self) -> bool {
        self.wired.load(Ordering::SeqCst)
    }

    pub fn was_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

struct ScriptedSource {
    ready_state: ReadyState,
    events: UnboundedReceiver<SourceEvent>,
    handle: FakeSource,
}

impl EventSource for ScriptedSource {
    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn into_events(self: Box<Self>) -> LocalBoxStream<'static, SourceEvent> {
        let ScriptedSource { events, handle, .. } = *self;
        handle.wired.store(true, Ordering::SeqCst);
        let guard = DropFlag(handle.dropped.clone());

        stream::unfold((events, guard), |(mut events, guard)| async move {
            events.recv().await.map(|event| (event, (events, guard)))
        })
        .boxed_local()
    }
}

/// Hands out scripted sources in the order they were enqueued.
#[derive(Clone, Default)]
pub struct FakeConnector {
    queue: Arc<Mutex<VecDeque<ScriptedSource>>>,
    urls: Arc<Mutex<Vec<String>>>,
    refuse: bool,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector whose every construction attempt fails.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    /// Queue a source that reports `ready_state` on construction. Events sent
    /// on the returned sender are delivered once the source is wired.
    pub fn enqueue(&self, ready_state: ReadyState) -> (FakeSource, UnboundedSender<SourceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = FakeSource {
            wired: Arc::new(AtomicBool::new(false)),
            dropped: Arc::new(AtomicBool::new(false)),
        };
        self.queue
            .lock()
            .unwrap()
            .push_back(ScriptedSource {
                ready_state,
                events: rx,
                handle: handle.clone(),
            });
        (handle, tx)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl StreamConnector for FakeConnector {
    fn connect(&self, url: &str) -> Result<Box<dyn EventSource>, Error> {
        self.urls.lock().unwrap().push(url.to_string());
        if self.refuse {
            return Err(stream_error(StreamErrorKind::Rejected, "refused by fake"));
        }
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .map(|source| Box::new(source) as Box<dyn EventSource>)
            .ok_or_else(|| stream_error(StreamErrorKind::Rejected, "no scripted source queued"))
    }
}

#[derive(Default)]
struct DialogState {
    header: Option<String>,
    description: Option<String>,
    on_hidden: Option<HiddenCallback>,
    shows: usize,
    visible: bool,
}

/// Dialog widget that records what it was asked to display.
#[derive(Clone, Default)]
pub struct FakeDialog {
    state: Arc<Mutex<DialogState>>,
    fail_show: bool,
}

impl FakeDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A dialog whose `show` always fails.
    pub fn broken() -> Self {
        Self {
            fail_show: true,
            ..Self::default()
        }
    }

    pub fn header(&self) -> Option<String> {
        self.state.lock().unwrap().header.clone()
    }

    pub fn description(&self) -> Option<String> {
        self.state.lock().unwrap().description.clone()
    }

    pub fn shows(&self) -> usize {
        self.state.lock().unwrap().shows
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().unwrap().visible
    }

    /// Simulate the widget's hidden event (user dismissal, overlay click...).
    pub fn dismiss(&self) {
        let callback = {
            let mut state = self.state.lock().unwrap();
            state.visible = false;
            state.on_hidden.take()
        };
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl DialogWidget for FakeDialog {
    fn set_header(&mut self, markup: &str) {
        self.state.lock().unwrap().header = Some(markup.to_string());
    }

    fn set_description(&mut self, markup: &str) {
        self.state.lock().unwrap().description = Some(markup.to_string());
    }

    fn on_hidden(&mut self, callback: HiddenCallback) {
        self.state.lock().unwrap().on_hidden = Some(callback);
    }

    fn show(&mut self) -> Result<(), Error> {
        if self.fail_show {
            return Err(widget_error(WidgetErrorKind::ShowFailed, "broken fake"));
        }
        let mut state = self.state.lock().unwrap();
        state.shows += 1;
        state.visible = true;
        Ok(())
    }
}
