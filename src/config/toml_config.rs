use crate::adapters::http::HttpEstimator;
use crate::core::anchors::AnchorTable;
use crate::core::estimator::Estimator;
use crate::core::suggest::{PriceSuggester, DEFAULT_REMOTE_TIMEOUT};
use crate::domain::ports::RemoteEstimator;
use crate::utils::error::{PricingError, Result};
use crate::utils::validation::{
    validate_anchor_key, validate_positive_amount, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingConfig {
    pub remote: Option<RemoteConfig>,
    pub estimator: Option<EstimatorConfig>,
    /// Extra or replacement reference prices, keyed `"brand:model"`.
    pub anchors: Option<BTreeMap<String, f64>>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Pins the year depreciation is measured against.
    pub current_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

// An unresolved `${VAR}` counts as not set.
fn configured(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.contains("${"))
}

impl PricingConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PricingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PricingError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Reads the remote settings from `PRICE_SUGGEST_*` variables.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("PRICE_SUGGEST_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let remote = endpoint.map(|endpoint| RemoteConfig {
            enabled: Some(true),
            endpoint: Some(endpoint),
            api_key: std::env::var("PRICE_SUGGEST_API_KEY").ok(),
            timeout_seconds: std::env::var("PRICE_SUGGEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
        });

        Self {
            remote,
            ..Default::default()
        }
    }

    /// 替換環境變數 (例如 ${API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(endpoint) = self.remote_endpoint() {
            validate_url("remote.endpoint", endpoint)?;
        }

        if let Some(seconds) = self.remote.as_ref().and_then(|r| r.timeout_seconds) {
            validate_range("remote.timeout_seconds", seconds, 1, 120)?;
        }

        if let Some(year) = self.current_year() {
            validate_range("estimator.current_year", year, 2000, 2100)?;
        }

        if let Some(anchors) = &self.anchors {
            for (key, price) in anchors {
                validate_anchor_key("anchors", key)?;
                validate_positive_amount(&format!("anchors.\"{}\"", key), *price)?;
            }
        }

        if let Some(level) = self.log_level() {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(PricingError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        Ok(())
    }

    /// Endpoint of the remote estimator, when delegation is switched on.
    pub fn remote_endpoint(&self) -> Option<&str> {
        let remote = self.remote.as_ref()?;
        if !remote.enabled.unwrap_or(true) {
            return None;
        }
        configured(remote.endpoint.as_deref())
    }

    pub fn api_key(&self) -> Option<&str> {
        configured(self.remote.as_ref()?.api_key.as_deref())
    }

    pub fn remote_timeout(&self) -> Duration {
        self.remote
            .as_ref()
            .and_then(|r| r.timeout_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REMOTE_TIMEOUT)
    }

    pub fn current_year(&self) -> Option<i32> {
        self.estimator.as_ref().and_then(|e| e.current_year)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn anchor_table(&self) -> Arc<AnchorTable> {
        match &self.anchors {
            Some(anchors) if !anchors.is_empty() => Arc::new(AnchorTable::with_overrides(
                anchors.iter().map(|(key, price)| (key.clone(), *price)),
            )),
            _ => AnchorTable::shared(),
        }
    }

    pub fn build_estimator(&self) -> Estimator {
        let estimator = Estimator::new(self.anchor_table());
        match self.current_year() {
            Some(year) => estimator.with_current_year(year),
            None => estimator,
        }
    }

    pub fn build_remote(&self) -> Option<Arc<dyn RemoteEstimator>> {
        let endpoint = self.remote_endpoint()?;
        let mut estimator = HttpEstimator::new(endpoint).with_timeout(self.remote_timeout());
        if let Some(key) = self.api_key() {
            estimator = estimator.with_api_key(key);
        }
        Some(Arc::new(estimator))
    }

    pub fn build_suggester(&self) -> PriceSuggester {
        let remote = self.build_remote();
        match &remote {
            Some(_) => tracing::info!(
                "Remote price estimation enabled: {}",
                self.remote_endpoint().unwrap_or_default()
            ),
            None => tracing::info!("No remote estimator configured, using local heuristic only"),
        }
        PriceSuggester::new(self.build_estimator(), remote).with_timeout(self.remote_timeout())
    }
}

impl Validate for PricingConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
