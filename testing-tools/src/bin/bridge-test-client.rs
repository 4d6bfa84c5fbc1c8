use anyhow::Result;
use clap::Parser;
use colored::*;
use std::time::Duration;

use testing_tools::output::print_test_summary;
use testing_tools::scenarios::{self, UNUSABLE_BASE_URL};
use testing_tools::session::Session;

#[derive(Parser)]
#[command(name = "bridge-test-client")]
#[command(about = "Email Stream Bridge Integration Testing Tool")]
struct Cli {
    /// Base URL of the backend (e.g., http://localhost:8080)
    #[arg(long)]
    base_url: String,

    /// Application identifier to subscribe with
    #[arg(long, default_value = "app-123")]
    app_id: String,

    /// Test scenario to run
    #[arg(long, value_enum)]
    scenario: ScenarioChoice,

    /// Seconds to wait for each expected signal
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Delay in milliseconds before a dropped stream is reconnected
    #[arg(long, default_value_t = 3000)]
    reconnect_delay_ms: u64,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Test that the email stream opens
    Connection,
    /// Test that an email pushed by the backend is forwarded
    Message,
    /// Test that an unusable endpoint is reported closed
    Rejected,
    /// Run all tests
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== SETUP PHASE ===".bright_white().bold());

    let timeout = Duration::from_secs(cli.timeout_secs);
    let reconnect_delay = Duration::from_millis(cli.reconnect_delay_ms);

    println!("{} Building bridge sessions...", "→".blue());
    let mut live = Session::new(&cli.base_url, reconnect_delay, "Live".to_string())?;
    let mut unusable = Session::new(UNUSABLE_BASE_URL, reconnect_delay, "Unusable".to_string())?;
    println!("{} Bridge targeting {}", "✓".green(), cli.base_url);

    println!("\n{}", "=== TEST PHASE ===".bright_white().bold());

    let mut results = Vec::new();

    match cli.scenario {
        ScenarioChoice::Connection => {
            results.push(scenarios::test_connection(&mut live, &cli.app_id, timeout).await?);
        }
        ScenarioChoice::Message => {
            results.push(scenarios::test_message(&mut live, &cli.app_id, timeout).await?);
        }
        ScenarioChoice::Rejected => {
            results.push(scenarios::test_rejected(&mut unusable, &cli.app_id, timeout).await?);
        }
        ScenarioChoice::All => {
            results.push(scenarios::test_connection(&mut live, &cli.app_id, timeout).await?);
            results.push(scenarios::test_message(&mut live, &cli.app_id, timeout).await?);
            results.push(scenarios::test_rejected(&mut unusable, &cli.app_id, timeout).await?);
        }
    }

    // Print summary
    println!("\n{}", "=== RESULTS ===".bright_white().bold());
    print_test_summary(&results);

    let all_passed = results.iter().all(|r| r.passed);
    if all_passed {
        println!("\n{}", "All tests passed! ✓".bright_green().bold());
    } else {
        println!("\n{}", "Some tests failed! ✗".bright_red().bold());
    }

    std::process::exit(if all_passed { 0 } else { 1 });
}
