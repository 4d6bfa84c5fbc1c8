//! Error dialog rendered on the terminal for the headless host.

use bridge::error::Error;
use bridge::modal::{DialogWidget, HiddenCallback};
use colored::*;
use log::*;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Prints the dialog to stderr and hides it on its own after `hide_after`.
///
/// Re-showing while visible restarts the timer, so only the latest hidden
/// callback ever runs.
pub struct TerminalDialog {
    hide_after: Duration,
    header: String,
    description: String,
    on_hidden: Option<HiddenCallback>,
    hide_timer: Option<JoinHandle<()>>,
}

impl TerminalDialog {
    pub fn new(hide_after: Duration) -> Self {
        Self {
            hide_after,
            header: String::new(),
            description: String::new(),
            on_hidden: None,
            hide_timer: None,
        }
    }

    fn render(&self) {
        eprintln!();
        eprintln!("{} {}", "✗".red().bold(), self.header.bright_white().bold());
        eprintln!("  {}", self.description);
        eprintln!();
    }
}

impl DialogWidget for TerminalDialog {
    fn set_header(&mut self, markup: &str) {
        self.header = markup.to_string();
    }

    fn set_description(&mut self, markup: &str) {
        self.description = markup.to_string();
    }

    fn on_hidden(&mut self, callback: HiddenCallback) {
        self.on_hidden = Some(callback);
    }

    fn show(&mut self) -> Result<(), Error> {
        if let Some(timer) = self.hide_timer.take() {
            timer.abort();
        }

        self.render();

        let callback = self.on_hidden.take();
        let hide_after = self.hide_after;
        self.hide_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(hide_after).await;
            debug!("Error dialog hidden after {hide_after:?}");
            if let Some(callback) = callback {
                callback();
            }
        }));

        Ok(())
    }
}

impl Drop for TerminalDialog {
    fn drop(&mut self) {
        if let Some(timer) = self.hide_timer.take() {
            timer.abort();
        }
    }
}
