//! Dialog widget backed by a `<dialog>` element in the page.

use crate::error::{widget_error, Error, WidgetErrorKind};
use crate::modal::{DialogWidget, HiddenCallback};
use log::*;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Element, HtmlDialogElement};

/// Selector of the dialog element used when none is given.
pub const DEFAULT_DIALOG_SELECTOR: &str = ".ui.modal";

const HEADER_SELECTOR: &str = ".header";
const DESCRIPTION_SELECTOR: &str = ".content .description";

/// Drives the page's error dialog.
///
/// Expected markup:
///
/// ```html
/// <dialog class="ui modal">
///   <div class="header"></div>
///   <div class="content"><div class="description"></div></div>
/// </dialog>
/// ```
pub struct DomDialog {
    selector: String,
    on_hidden: Option<HiddenCallback>,
    // Armed `close` listener; replaced when the dialog is re-shown while open
    listener: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

impl DomDialog {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            on_hidden: None,
            listener: None,
        }
    }

    fn root(&self) -> Result<Element, Error> {
        web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| widget_error(WidgetErrorKind::NotFound, "no document"))?
            .query_selector(&self.selector)
            .ok()
            .flatten()
            .ok_or_else(|| {
                widget_error(
                    WidgetErrorKind::NotFound,
                    &format!("no element matches {}", self.selector),
                )
            })
    }

    fn dialog(&self) -> Result<HtmlDialogElement, Error> {
        self.root()?.dyn_into().map_err(|_| {
            widget_error(
                WidgetErrorKind::NotFound,
                &format!("{} is not a <dialog> element", self.selector),
            )
        })
    }

    /// Detach the armed `close` listener, freeing its closure.
    fn disarm(&mut self, dialog: &HtmlDialogElement) {
        if let Some(previous) = self.listener.take() {
            if let Err(e) = dialog
                .remove_event_listener_with_callback("close", previous.as_ref().unchecked_ref())
            {
                debug!("Could not detach error modal close listener: {e:?}");
            }
        }
    }

    fn set_inner_html(&self, selector: &str, markup: &str) {
        match self.root().map(|root| root.query_selector(selector)) {
            Ok(Ok(Some(element))) => element.set_inner_html(markup),
            Ok(_) => warn!("Error modal has no {selector} element"),
            Err(e) => warn!("Cannot update error modal: {e}"),
        }
    }
}

impl Default for DomDialog {
    fn default() -> Self {
        Self::new(DEFAULT_DIALOG_SELECTOR)
    }
}

impl DialogWidget for DomDialog {
    fn set_header(&mut self, markup: &str) {
        self.set_inner_html(HEADER_SELECTOR, markup);
    }

    fn set_description(&mut self, markup: &str) {
        self.set_inner_html(DESCRIPTION_SELECTOR, markup);
    }

    fn on_hidden(&mut self, callback: HiddenCallback) {
        self.on_hidden = Some(callback);
    }

    fn show(&mut self) -> Result<(), Error> {
        let dialog = self.dialog()?;

        if let Some(callback) = self.on_hidden.take() {
            self.disarm(&dialog);

            let mut callback = Some(callback);
            let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
                if let Some(callback) = callback.take() {
                    callback();
                }
            });
            let options = AddEventListenerOptions::new();
            options.set_once(true);
            dialog
                .add_event_listener_with_callback_and_add_event_listener_options(
                    "close",
                    listener.as_ref().unchecked_ref(),
                    &options,
                )
                .map_err(|e| widget_error(WidgetErrorKind::ShowFailed, &format!("{e:?}")))?;
            self.listener = Some(listener);
        }

        if dialog.open() {
            return Ok(());
        }
        dialog
            .show_modal()
            .map_err(|e| widget_error(WidgetErrorKind::ShowFailed, &format!("{e:?}")))
    }
}

impl Drop for DomDialog {
    fn drop(&mut self) {
        if self.listener.is_none() {
            return;
        }
        match self.dialog() {
            Ok(dialog) => self.disarm(&dialog),
            Err(e) => debug!("Error modal gone before its close listener: {e}"),
        }
    }
}
