use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Listing category. Drives the anchor fallback and the clamp band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "EV")]
    Ev,
    #[serde(rename = "BATTERY")]
    Battery,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ev => "EV",
            Category::Battery => "BATTERY",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EV" => Ok(Category::Ev),
            "BATTERY" => Ok(Category::Battery),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// A quantity that arrives either as a JSON number or as free text such as `"3.5 kWh"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<i32> for NumericInput {
    fn from(value: i32) -> Self {
        NumericInput::Number(value as f64)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_capacity: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_percentage: Option<NumericInput>,
}

impl Product {
    /// True when no attribute carries anything to estimate from.
    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());
        blank(&self.brand)
            && blank(&self.model)
            && blank(&self.condition)
            && self.year.is_none()
            && self.battery_capacity.is_none()
            && self.health_percentage.is_none()
    }
}

/// In-progress listing as handed over by the authoring workflow. Read-only here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ListingDraft {
    pub fn new(category: Category, product: Product) -> Self {
        Self {
            category: Some(category),
            product: Some(product),
            ..Default::default()
        }
    }
}

// Unknown categories are treated as absent rather than rejected.
fn lenient_category<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    Heuristic,
    Remote,
}

impl EstimateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateSource::Heuristic => "heuristic",
            EstimateSource::Remote => "remote",
        }
    }
}

/// Result of one estimation call. Built fresh every time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimate {
    pub suggested_price: Option<u64>,
    pub reason: String,
    pub source: EstimateSource,
}

impl PriceEstimate {
    pub fn heuristic(suggested_price: Option<u64>, reason: impl Into<String>) -> Self {
        Self {
            suggested_price,
            reason: reason.into(),
            source: EstimateSource::Heuristic,
        }
    }

    pub fn remote(suggested_price: u64, reason: impl Into<String>) -> Self {
        Self {
            suggested_price: Some(suggested_price),
            reason: reason.into(),
            source: EstimateSource::Remote,
        }
    }

    /// Same price and source, different justification.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}
