//! Baseline new-product prices, keyed by normalized `brand:model`.

use crate::domain::model::Category;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

pub const EV_DEFAULT_ANCHOR: f64 = 20_000_000.0;
pub const BATTERY_DEFAULT_ANCHOR: f64 = 5_000_000.0;
pub const GENERIC_ANCHOR: f64 = 10_000_000.0;

const BUILTIN_ANCHORS: &[(&str, f64)] = &[
    ("vinfast:feliz s", 29_900_000.0),
    ("vinfast:klara s", 35_000_000.0),
    ("vinfast:evo200", 22_000_000.0),
    ("vinfast:evo200 lite", 20_000_000.0),
    ("vinfast:vento s", 50_000_000.0),
    ("vinfast:theon s", 63_000_000.0),
    ("yadea:g5", 29_000_000.0),
    ("yadea:xmen neo", 15_000_000.0),
    ("yadea:odora s", 16_000_000.0),
    ("dat bike:weaver 200", 39_900_000.0),
    ("pega:eliteone", 24_000_000.0),
    ("honda:u-go", 30_000_000.0),
    ("vinfast:lfp 3.5kwh", 9_000_000.0),
    ("vinfast:lfp 2.4kwh", 6_500_000.0),
    ("yadea:graphene 72v", 4_500_000.0),
    ("catl:lfp 48v 30ah", 5_500_000.0),
];

static BUILTIN: LazyLock<Arc<AnchorTable>> = LazyLock::new(|| {
    Arc::new(AnchorTable::from_entries(
        BUILTIN_ANCHORS
            .iter()
            .map(|(key, price)| (key.to_string(), *price)),
    ))
});

pub fn anchor_key(brand: &str, model: &str) -> String {
    format!(
        "{}:{}",
        brand.trim().to_lowercase(),
        model.trim().to_lowercase()
    )
}

pub fn category_default(category: Option<Category>) -> f64 {
    match category {
        Some(Category::Ev) => EV_DEFAULT_ANCHOR,
        Some(Category::Battery) => BATTERY_DEFAULT_ANCHOR,
        None => GENERIC_ANCHOR,
    }
}

/// Where an anchor value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorOrigin {
    Model,
    CategoryDefault,
    Generic,
}

/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AnchorTable {
    entries: HashMap<String, f64>,
}

impl AnchorTable {
    pub fn builtin() -> &'static AnchorTable {
        &BUILTIN
    }

    /// The built-in table as a shared handle.
    pub fn shared() -> Arc<AnchorTable> {
        Arc::clone(&*BUILTIN)
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|(key, price)| {
                let (brand, model) = key.split_once(':')?;
                Some((anchor_key(brand, model), price))
            })
            .collect();
        Self { entries }
    }

    /// Built-in entries with `overrides` layered on top.
    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut table = Self::builtin().clone();
        table
            .entries
            .extend(Self::from_entries(overrides).entries);
        table
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, brand: &str, model: &str) -> Option<f64> {
        self.entries.get(&anchor_key(brand, model)).copied()
    }

    /// Always yields a positive anchor: model entry, then category default, then generic.
    pub fn resolve(
        &self,
        category: Option<Category>,
        brand: Option<&str>,
        model: Option<&str>,
    ) -> (f64, AnchorOrigin) {
        if let (Some(brand), Some(model)) = (brand, model) {
            if let Some(price) = self.lookup(brand, model) {
                return (price, AnchorOrigin::Model);
            }
        }
        match category {
            Some(_) => (category_default(category), AnchorOrigin::CategoryDefault),
            None => (GENERIC_ANCHOR, AnchorOrigin::Generic),
        }
    }
}

/// Resolves against the built-in table.
pub fn resolve_anchor(category: Option<Category>, brand: Option<&str>, model: Option<&str>) -> f64 {
    AnchorTable::builtin().resolve(category, brand, model).0
}
