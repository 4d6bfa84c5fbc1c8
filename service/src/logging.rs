use crate::config::Config;
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TerminalMode};

/// Modules to filter out from logging when not in Trace mode.
/// These are the HTTP client's dependencies, which log every connection attempt.
const FILTERED_MODULES: &[&str] = &["reqwest", "hyper", "h2", "rustls", "tokio_util"];

/// Every record goes to stderr; the host binary writes port messages to stdout.
const TERMINAL_MODE: TerminalMode = TerminalMode::Stderr;

pub struct Logger {}

impl Logger {
    /// Initializes the global terminal logger at the configured level.
    pub fn init_logger(config: &Config) {
        let level = config.log_level_filter;

        simplelog::TermLogger::init(
            level,
            Self::build_log_config(level),
            TERMINAL_MODE,
            ColorChoice::Auto,
        )
        .expect("Failed to start simplelog");
    }

    /// Dependency modules silenced at `level`. Trace shows everything.
    fn silenced_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            FILTERED_MODULES
        }
    }

    fn build_log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        for module in Self::silenced_modules(level) {
            builder.add_filter_ignore_str(module);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_go_to_stderr() {
        // Stdout is reserved for the port message stream
        assert!(matches!(TERMINAL_MODE, TerminalMode::Stderr));
    }

    #[test]
    fn test_trace_level_silences_nothing() {
        assert!(Logger::silenced_modules(LevelFilter::Trace).is_empty());
    }

    #[test]
    fn test_other_levels_silence_http_client_stack() {
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            let silenced = Logger::silenced_modules(level);
            for module in ["reqwest", "hyper", "h2", "rustls", "tokio_util"] {
                assert!(
                    silenced.contains(&module),
                    "{module} should be silenced at {level}"
                );
            }
        }
    }

    #[test]
    fn test_bridge_logs_are_never_silenced() {
        assert!(!Logger::silenced_modules(LevelFilter::Info).contains(&"bridge"));
        assert!(!Logger::silenced_modules(LevelFilter::Info).contains(&"ports"));
    }

    #[test]
    fn test_build_log_config_at_every_level_does_not_panic() {
        for level in [LevelFilter::Info, LevelFilter::Trace] {
            let _config = Logger::build_log_config(level);
        }
    }
}
