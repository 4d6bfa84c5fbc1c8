use bridge::BridgeConfig;
use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::time::Duration;

/// Backend base URL used when `BASE_API_URL` is not set.
pub const DEFAULT_BASE_API_URL: &str = "http://localhost:8080";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Base URL of the backend API. Email streams are opened at
    /// `<base_api_url>/api/stream/emails/<application id>`.
    #[arg(short, long, env, default_value = DEFAULT_BASE_API_URL)]
    base_api_url: String,

    /// Delay in milliseconds before a dropped event stream is reconnected,
    /// until the server overrides it with a `retry:` field
    #[arg(long, env, default_value_t = 3000)]
    pub reconnect_delay_ms: u64,

    /// How long in milliseconds the terminal error dialog stays up before it
    /// hides itself
    #[arg(long, env, default_value_t = 1500)]
    pub modal_hide_after_ms: u64,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn base_api_url(&self) -> &str {
        &self.base_api_url
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn modal_hide_after(&self) -> Duration {
        Duration::from_millis(self.modal_hide_after_ms)
    }

    /// Settings handed to the bridge constructor.
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig::new(self.base_api_url.clone())
    }
}
