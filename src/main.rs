use anyhow::Context;
use clap::Parser;
use price_suggest::adapters::batch::estimate_batch;
use price_suggest::utils::{logger, validation::Validate};
use price_suggest::{CliConfig, ListingDraft, PriceSuggester, PricingConfig};
use std::io::Read;
use std::time::Duration;

fn read_draft(source: &str) -> anyhow::Result<Option<ListingDraft>> {
    let content = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read listing draft from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read listing draft '{}'", source))?
    };

    // `null` is a valid draft: it yields the insufficient-data estimate.
    serde_json::from_str(&content).context("listing draft is not valid JSON")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match &cli.config {
        Some(path) => match PricingConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => PricingConfig::from_env(),
    };

    // 初始化日誌
    if cli.json_logs || config.json_logs() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    tracing::info!("Starting price-suggest");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let mut suggester = if cli.offline {
        tracing::info!("Offline mode, remote estimator disabled");
        PriceSuggester::local(config.build_estimator())
    } else {
        config.build_suggester()
    };
    // Only the suggester deadline; the HTTP client timeout comes from config.
    if let Some(ms) = cli.timeout_ms {
        suggester = suggester.with_timeout(Duration::from_millis(ms));
    }

    if let Some(path) = &cli.batch {
        let input = std::fs::File::open(path)
            .with_context(|| format!("failed to open batch file '{}'", path.display()))?;
        let count = estimate_batch(&suggester, input, std::io::stdout()).await?;
        tracing::info!("✅ Estimated {} listings", count);
        return Ok(());
    }

    let source = cli.draft.as_deref().unwrap_or("-");
    let draft = read_draft(source)?;
    let estimate = suggester.suggest(draft.as_ref()).await;

    println!("{}", serde_json::to_string_pretty(&estimate)?);
    Ok(())
}
