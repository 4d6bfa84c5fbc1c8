use colored::*;
use ports::{OutboundMessage, PortName};
use std::time::Duration;

#[derive(Debug)]
pub struct TestResult {
    pub scenario: String,
    pub passed: bool,
    pub message: Option<String>,
    pub duration: Duration,
}

pub fn print_signal(label: &str, message: &OutboundMessage) {
    println!(
        "\n[{}] {} signal received",
        label.bright_blue().bold(),
        message.port_name().yellow()
    );

    if let Some(payload) = message.payload() {
        // Payloads are opaque to the bridge; pretty-print them when they happen to be JSON
        match serde_json::from_str::<serde_json::Value>(payload)
            .and_then(|value| serde_json::to_string_pretty(&value))
        {
            Ok(pretty) => println!("   {}", pretty.dimmed()),
            Err(_) => println!("   {}", payload.dimmed()),
        }
    }
}

/// Number of passed and failed results.
pub fn tally(results: &[TestResult]) -> (usize, usize) {
    let passed = results.iter().filter(|r| r.passed).count();
    (passed, results.len() - passed)
}

pub fn print_test_summary(results: &[TestResult]) {
    println!("\n{}", "=== TEST SUMMARY ===".bright_white().bold());

    let (passed, failed) = tally(results);

    for result in results {
        let status = if result.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        println!("[{}] {} ({:?})", status, result.scenario, result.duration);

        if let Some(msg) = &result.message {
            println!("      {}", msg.dimmed());
        }
    }

    println!(
        "\n{}: {} passed, {} failed",
        "Results".bold(),
        passed.to_string().green(),
        failed.to_string().red()
    );
}
