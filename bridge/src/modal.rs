use crate::error::Error;
use log::*;
use ports::{ErrorModalRequest, Outbound, OutboundMessage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Invoked by a widget when its dialog has been hidden.
pub type HiddenCallback = Box<dyn FnOnce() + Send + 'static>;

/// Imperative show/hide contract of a modal dialog widget.
pub trait DialogWidget {
    /// Replace the header content. `markup` is trusted and not escaped.
    fn set_header(&mut self, markup: &str);

    /// Replace the body description. `markup` is trusted and not escaped.
    fn set_description(&mut self, markup: &str);

    /// Register the callback to run when the dialog is hidden, replacing any
    /// previously registered one.
    fn on_hidden(&mut self, callback: HiddenCallback);

    fn show(&mut self) -> Result<(), Error>;
}

/// Publishes `errorModalClosed` for one show/hide cycle, at most once, and
/// wakes whoever waits in [`ModalBridge::closed`].
#[derive(Clone)]
struct ClosedSignal {
    fired: Arc<AtomicBool>,
    outbound: Outbound,
    hidden: Arc<Notify>,
}

impl ClosedSignal {
    fn new(outbound: Outbound, hidden: Arc<Notify>) -> Self {
        Self {
            fired: Arc::new(AtomicBool::new(false)),
            outbound,
            hidden,
        }
    }

    fn fire(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.outbound.send(OutboundMessage::ErrorModalClosed);
            self.hidden.notify_one();
        }
    }

    fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

/// Drives a dialog widget through its show/hide cycle on behalf of the runtime.
pub struct ModalBridge<W> {
    widget: W,
    outbound: Outbound,
    active: Option<ClosedSignal>,
    hidden: Arc<Notify>,
}

impl<W: DialogWidget> ModalBridge<W> {
    pub fn new(widget: W, outbound: Outbound) -> Self {
        Self {
            widget,
            outbound,
            active: None,
            hidden: Arc::new(Notify::new()),
        }
    }

    /// Populate and display the dialog. Closure is reported asynchronously
    /// through the `errorModalClosed` port when the widget hides.
    pub fn show(&mut self, request: &ErrorModalRequest) {
        if self.is_open() {
            debug!("Error modal already open, updating it in place");
        }

        self.widget.set_header(&request.title);
        self.widget.set_description(&request.description);

        let signal = ClosedSignal::new(self.outbound.clone(), Arc::clone(&self.hidden));
        let on_hidden = signal.clone();
        self.widget.on_hidden(Box::new(move || on_hidden.fire()));

        if let Err(e) = self.widget.show() {
            error!("Failed to show error modal \"{}\": {e}", request.title);
            signal.fire();
        } else {
            debug!("Showing error modal \"{}\"", request.title);
        }
        self.active = Some(signal);
    }

    /// True between a successful show and the widget's hidden event.
    pub fn is_open(&self) -> bool {
        self.active
            .as_ref()
            .map(|signal| !signal.has_fired())
            .unwrap_or(false)
    }

    /// Resolves once a dialog has been reported closed. A closure that
    /// happened while nobody was waiting resolves the next call at once.
    pub async fn closed(&self) {
        self.hidden.notified().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeDialog;
    use ports::port_pair;

    fn request(title: &str, description: &str) -> ErrorModalRequest {
        ErrorModalRequest {
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_show_populates_and_displays_without_escaping() {
        let dialog = FakeDialog::new();
        let (mut runtime, ports) = port_pair();
        let mut modal = ModalBridge::new(dialog.clone(), ports.outbound);

        modal.show(&request("Oops", "<p>Something <em>failed</em></p>"));

        assert_eq!(dialog.header().as_deref(), Some("Oops"));
        assert_eq!(
            dialog.description().as_deref(),
            Some("<p>Something <em>failed</em></p>")
        );
        assert!(dialog.is_visible());
        assert!(modal.is_open());
        assert!(runtime.outbound.try_recv().is_err());
    }

    #[test]
    fn test_dismiss_publishes_exactly_one_closed() {
        let dialog = FakeDialog::new();
        let (mut runtime, ports) = port_pair();
        let mut modal = ModalBridge::new(dialog.clone(), ports.outbound);

        modal.show(&request("Oops", "Something failed"));
        dialog.dismiss();
        dialog.dismiss();

        assert_eq!(
            runtime.outbound.try_recv(),
            Ok(OutboundMessage::ErrorModalClosed)
        );
        assert!(runtime.outbound.try_recv().is_err());
        assert!(!modal.is_open());
    }

    #[test]
    fn test_second_request_replaces_open_dialog() {
        let dialog = FakeDialog::new();
        let (mut runtime, ports) = port_pair();
        let mut modal = ModalBridge::new(dialog.clone(), ports.outbound);

        modal.show(&request("First", "one"));
        modal.show(&request("Second", "two"));

        assert_eq!(dialog.header().as_deref(), Some("Second"));
        assert_eq!(dialog.shows(), 2);

        dialog.dismiss();
        assert_eq!(
            runtime.outbound.try_recv(),
            Ok(OutboundMessage::ErrorModalClosed)
        );
        assert!(runtime.outbound.try_recv().is_err());
    }

    #[test]
    fn test_show_failure_reports_closed_immediately() {
        let dialog = FakeDialog::broken();
        let (mut runtime, ports) = port_pair();
        let mut modal = ModalBridge::new(dialog.clone(), ports.outbound);

        modal.show(&request("Oops", "Something failed"));

        assert_eq!(
            runtime.outbound.try_recv(),
            Ok(OutboundMessage::ErrorModalClosed)
        );
        assert!(!modal.is_open());

        // A late hidden event from the widget does not report again.
        dialog.dismiss();
        assert!(runtime.outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_resolves_after_dismissal() {
        let dialog = FakeDialog::new();
        let (_runtime, ports) = port_pair();
        let mut modal = ModalBridge::new(dialog.clone(), ports.outbound);

        modal.show(&request("Oops", "Something failed"));
        dialog.dismiss();

        tokio::time::timeout(std::time::Duration::from_secs(1), modal.closed())
            .await
            .expect("closure was not signalled");
        assert!(!modal.is_open());
    }
}
