pub mod toml_config;

pub use toml_config::PricingConfig;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "price-suggest")]
#[command(about = "Suggest a sale price for a secondhand EV or battery listing")]
pub struct CliConfig {
    /// Listing draft as JSON; `-` reads from stdin
    #[arg(long, conflicts_with = "batch", required_unless_present = "batch")]
    pub draft: Option<String>,

    /// CSV file with one listing per row
    #[arg(long)]
    pub batch: Option<PathBuf>,

    /// Path to TOML configuration file (falls back to PRICE_SUGGEST_* variables)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Never call the remote estimator
    #[arg(long)]
    pub offline: bool,

    /// Overall suggestion deadline in milliseconds; the HTTP client still uses remote.timeout_seconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_timeout_ms_parses() {
        let cli = CliConfig::try_parse_from(["price-suggest", "--draft", "-", "--timeout-ms", "250"])
            .unwrap();
        assert_eq!(cli.timeout_ms, Some(250));
        assert!(!cli.offline);
    }

    #[test]
    fn test_timeout_ms_help_names_client_timeout() {
        let help = CliConfig::command().render_help().to_string();
        assert!(help.contains("Overall suggestion deadline"));
        assert!(help.contains("remote.timeout_seconds"));
    }

    #[test]
    fn test_draft_or_batch_required() {
        assert!(CliConfig::try_parse_from(["price-suggest"]).is_err());
        assert!(CliConfig::try_parse_from(["price-suggest", "--draft", "a.json", "--batch", "b.csv"]).is_err());
    }
}
