use anyhow::Result;
use colored::*;
use ports::OutboundMessage;
use std::time::{Duration, Instant};

use crate::output::{print_signal, TestResult};
use crate::session::Session;

/// Base URL no event source accepts, so the bridge must report the
/// subscription closed on construction.
pub const UNUSABLE_BASE_URL: &str = "not a url";

fn failed(scenario: &str, message: String, start: Instant) -> TestResult {
    println!("{} {}", "✗".red(), message);
    TestResult {
        scenario: scenario.to_string(),
        passed: false,
        message: Some(message),
        duration: start.elapsed(),
    }
}

fn passed(scenario: &str, message: Option<String>, start: Instant) -> TestResult {
    TestResult {
        scenario: scenario.to_string(),
        passed: true,
        message,
        duration: start.elapsed(),
    }
}

/// Subscribe and expect `emailStreamOpened` before anything else.
pub async fn test_connection(
    session: &mut Session,
    app_id: &str,
    timeout: Duration,
) -> Result<TestResult> {
    let start = Instant::now();
    let scenario = "connection_test";

    println!("\n{}", "=== TEST: Connection Test ===".bright_cyan().bold());
    println!("{} Subscribing to email stream for {}...", "→".blue(), app_id);

    if !session.subscribe(app_id) {
        return Ok(failed(
            scenario,
            "Subscription was closed on construction".to_string(),
            start,
        ));
    }

    let result = match session.next_signal(timeout).await {
        Ok(OutboundMessage::EmailStreamOpened) => {
            print_signal(&session.label, &OutboundMessage::EmailStreamOpened);
            println!("{} Email stream opened", "✓".green());
            passed(
                scenario,
                Some("Email stream connection established".to_string()),
                start,
            )
        }
        Ok(other) => {
            print_signal(&session.label, &other);
            failed(
                scenario,
                format!("Expected emailStreamOpened first, got {:?}", other),
                start,
            )
        }
        Err(e) => failed(scenario, format!("Timeout: {}", e), start),
    };

    session.unsubscribe(app_id);
    Ok(result)
}

/// Subscribe and expect the stream to open and then deliver at least one frame.
pub async fn test_message(
    session: &mut Session,
    app_id: &str,
    timeout: Duration,
) -> Result<TestResult> {
    let start = Instant::now();
    let scenario = "message_test";

    println!("\n{}", "=== TEST: Message Test ===".bright_cyan().bold());
    println!(
        "{}",
        "Waiting for the backend to push an email on the stream".bright_white()
    );

    if !session.subscribe(app_id) {
        return Ok(failed(
            scenario,
            "Subscription was closed on construction".to_string(),
            start,
        ));
    }

    if let Err(e) = session.wait_for_signal("emailStreamOpened", timeout).await {
        session.unsubscribe(app_id);
        return Ok(failed(scenario, format!("Stream never opened: {}", e), start));
    }
    println!("{} Email stream opened", "✓".green());

    println!(
        "{} Waiting up to {:?} for an email frame...",
        "→".blue(),
        timeout
    );
    let result = match session.wait_for_signal("emailStreamOnMessage", timeout).await {
        Ok(message) => {
            print_signal(&session.label, &message);
            println!("{} Frame forwarded verbatim", "✓".green());
            passed(scenario, None, start)
        }
        Err(e) => failed(scenario, format!("Timeout: {}", e), start),
    };

    session.unsubscribe(app_id);
    Ok(result)
}

/// Subscribe through a session whose base URL is unusable and expect
/// `emailStreamClosed` as the only signal.
pub async fn test_rejected(
    session: &mut Session,
    app_id: &str,
    timeout: Duration,
) -> Result<TestResult> {
    let start = Instant::now();
    let scenario = "rejected_test";

    println!("\n{}", "=== TEST: Rejected Subscription ===".bright_cyan().bold());
    println!(
        "{} Subscribing to email stream for {} through an unusable endpoint...",
        "→".blue(),
        app_id
    );

    if session.subscribe(app_id) {
        session.unsubscribe(app_id);
        return Ok(failed(
            scenario,
            "Bridge wired a connection to an unusable endpoint".to_string(),
            start,
        ));
    }

    let result = match session.next_signal(timeout).await {
        Ok(OutboundMessage::EmailStreamClosed) => {
            print_signal(&session.label, &OutboundMessage::EmailStreamClosed);
            println!("{} Subscription reported closed", "✓".green());
            passed(scenario, None, start)
        }
        Ok(other) => failed(
            scenario,
            format!("Expected emailStreamClosed, got {:?}", other),
            start,
        ),
        Err(e) => failed(scenario, format!("No closed signal: {}", e), start),
    };

    Ok(result)
}
