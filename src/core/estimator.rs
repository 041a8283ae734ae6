//! Local heuristic: anchor × depreciation × condition × health × capacity,
//! clamped to the category band and rounded for display.

use crate::core::adjusters::{condition_factor, health_factor};
use crate::core::anchors::{AnchorOrigin, AnchorTable};
use crate::core::capacity::capacity_factor;
use crate::core::depreciation::{current_year, depreciation_factor_at};
use crate::core::numeric::parse_number;
use crate::domain::model::{Category, ListingDraft, PriceEstimate, Product};
use std::sync::Arc;

pub const PRICE_GRANULARITY: f64 = 100_000.0;

const YEAR_RANGE: std::ops::RangeInclusive<f64> = 0.0..=9999.0;

pub const INSUFFICIENT_DATA_REASON: &str =
    "Not enough listing details to estimate a price; add a category or product details";

/// Realistic price range for a category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
}

impl PriceBand {
    pub const EV: PriceBand = PriceBand {
        min: 10_000_000.0,
        max: 35_000_000.0,
    };
    pub const BATTERY: PriceBand = PriceBand {
        min: 2_000_000.0,
        max: 10_000_000.0,
    };
    /// Used when the category is unknown: spans both bands.
    pub const ANY: PriceBand = PriceBand {
        min: 2_000_000.0,
        max: 35_000_000.0,
    };

    pub fn for_category(category: Option<Category>) -> PriceBand {
        match category {
            Some(Category::Ev) => Self::EV,
            Some(Category::Battery) => Self::BATTERY,
            None => Self::ANY,
        }
    }

    pub fn clamp(&self, price: f64) -> f64 {
        price.clamp(self.min, self.max)
    }

    pub fn contains(&self, price: u64) -> bool {
        (self.min..=self.max).contains(&(price as f64))
    }
}

pub fn round_to_granularity(price: f64) -> u64 {
    ((price / PRICE_GRANULARITY).round() * PRICE_GRANULARITY) as u64
}

/// Every intermediate value of one heuristic estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub category: Option<Category>,
    pub anchor: f64,
    pub anchor_origin: AnchorOrigin,
    pub age_years: Option<i32>,
    pub depreciation: f64,
    pub condition: Option<String>,
    pub condition_factor: f64,
    pub health_pct: Option<f64>,
    pub health_factor: f64,
    pub capacity_kwh: Option<f64>,
    pub capacity_factor: f64,
    pub raw_price: f64,
    pub price: u64,
}

impl Breakdown {
    pub fn reason(&self) -> String {
        let anchor = match self.anchor_origin {
            AnchorOrigin::Model => format!("model reference price {}", format_amount(self.anchor)),
            AnchorOrigin::CategoryDefault => format!(
                "{} category reference price {}",
                self.category.map(|c| c.as_str()).unwrap_or("unknown"),
                format_amount(self.anchor)
            ),
            AnchorOrigin::Generic => format!("generic reference price {}", format_amount(self.anchor)),
        };

        let mut parts = vec![format!("Based on {}", anchor)];
        match self.age_years {
            Some(age) => parts.push(format!("{} year(s) of age (x{:.2})", age, self.depreciation)),
            None => parts.push(format!("unknown model year (x{:.2})", self.depreciation)),
        }
        parts.push(format!(
            "condition {} (x{:.2})",
            self.condition.as_deref().unwrap_or("unspecified"),
            self.condition_factor
        ));
        if let Some(pct) = self.health_pct {
            parts.push(format!("battery health {}% (x{:.3})", pct, self.health_factor));
        }
        if let Some(kwh) = self.capacity_kwh {
            parts.push(format!("capacity {} kWh (x{:.2})", kwh, self.capacity_factor));
        }

        let mut reason = parts.join(", ");
        let band = PriceBand::for_category(self.category);
        if self.raw_price < band.min || self.raw_price > band.max {
            reason.push_str(&format!(
                "; adjusted into the realistic range {} - {}",
                format_amount(band.min),
                format_amount(band.max)
            ));
        }
        reason
    }
}

/// Heuristic price estimator. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct Estimator {
    anchors: Arc<AnchorTable>,
    current_year: Option<i32>,
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new(AnchorTable::shared())
    }
}

impl Estimator {
    pub fn new(anchors: Arc<AnchorTable>) -> Self {
        Self {
            anchors,
            current_year: None,
        }
    }

    /// Pins the year depreciation is measured against.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn anchors(&self) -> &AnchorTable {
        &self.anchors
    }

    fn reference_year(&self) -> i32 {
        self.current_year.unwrap_or_else(current_year)
    }

    /// `None` when there is nothing to compute from.
    pub fn breakdown(&self, draft: Option<&ListingDraft>) -> Option<Breakdown> {
        let draft = draft?;
        let product = draft.product.as_ref().filter(|p| !p.is_empty());
        if draft.category.is_none() && product.is_none() {
            return None;
        }

        let empty = Product::default();
        let product = product.unwrap_or(&empty);
        let category = draft.category;

        let (anchor, anchor_origin) = self.anchors.resolve(
            category,
            product.brand.as_deref(),
            product.model.as_deref(),
        );

        let now = self.reference_year();
        // Negative or absurdly large years are as good as missing.
        let year = parse_number(product.year.as_ref())
            .filter(|y| YEAR_RANGE.contains(y))
            .map(|y| y.floor() as i32);
        let depreciation = depreciation_factor_at(year, now);
        let age_years = year
            .filter(|y| *y <= now.saturating_add(1))
            .map(|y| now.saturating_sub(y).max(0));

        let condition = product
            .condition
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let condition_factor = condition_factor(condition.as_deref());

        let health_pct = parse_number(product.health_percentage.as_ref());
        let health_factor = health_factor(health_pct);

        let capacity_kwh = parse_number(product.battery_capacity.as_ref());
        let capacity_factor = capacity_factor(category, capacity_kwh);

        let raw_price = anchor * depreciation * condition_factor * health_factor * capacity_factor;
        let price = round_to_granularity(PriceBand::for_category(category).clamp(raw_price));

        tracing::debug!(
            anchor,
            depreciation,
            condition_factor,
            health_factor,
            capacity_factor,
            raw_price,
            price,
            "heuristic estimate computed"
        );

        Some(Breakdown {
            category,
            anchor,
            anchor_origin,
            age_years,
            depreciation,
            condition,
            condition_factor,
            health_pct,
            health_factor,
            capacity_kwh,
            capacity_factor,
            raw_price,
            price,
        })
    }

    pub fn estimate(&self, draft: Option<&ListingDraft>) -> PriceEstimate {
        match self.breakdown(draft) {
            Some(breakdown) => PriceEstimate::heuristic(Some(breakdown.price), breakdown.reason()),
            None => PriceEstimate::heuristic(None, INSUFFICIENT_DATA_REASON),
        }
    }
}

/// Estimates with the built-in anchors and the local calendar year.
pub fn estimate(draft: Option<&ListingDraft>) -> PriceEstimate {
    Estimator::default().estimate(draft)
}

/// `29900000.0` -> `"29,900,000"`.
pub fn format_amount(amount: f64) -> String {
    let digits = (amount.round().max(0.0) as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
