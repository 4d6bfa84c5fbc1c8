//! Browser adapters: native `EventSource`, `<dialog>` widget, and attachment
//! to the runtime's JavaScript port object.

pub mod attach;
pub mod dialog;
pub mod event_source;

pub use attach::attach;
pub use dialog::DomDialog;
pub use event_source::WebConnector;
