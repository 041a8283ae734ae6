//! CSV batch estimation: one listing per row in, one estimate per row out.

use crate::core::suggest::PriceSuggester;
use crate::domain::model::{ListingDraft, NumericInput, PriceEstimate, Product};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftRow {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    battery_capacity: Option<String>,
    #[serde(default)]
    health_percentage: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<DraftRow> for ListingDraft {
    fn from(row: DraftRow) -> Self {
        let product = Product {
            brand: present(row.brand),
            model: present(row.model),
            year: present(row.year).map(NumericInput::Text),
            condition: present(row.condition),
            battery_capacity: present(row.battery_capacity).map(NumericInput::Text),
            health_percentage: present(row.health_percentage).map(NumericInput::Text),
        };

        ListingDraft {
            title: present(row.title),
            category: present(row.category).and_then(|c| c.parse().ok()),
            product: (!product.is_empty()).then_some(product),
            location: present(row.location),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EstimateRow<'a> {
    title: Option<&'a str>,
    category: Option<&'static str>,
    brand: Option<&'a str>,
    model: Option<&'a str>,
    suggested_price: Option<u64>,
    source: &'static str,
    reason: &'a str,
}

impl<'a> EstimateRow<'a> {
    fn new(draft: &'a ListingDraft, estimate: &'a PriceEstimate) -> Self {
        let product = draft.product.as_ref();
        Self {
            title: draft.title.as_deref(),
            category: draft.category.map(|c| c.as_str()),
            brand: product.and_then(|p| p.brand.as_deref()),
            model: product.and_then(|p| p.model.as_deref()),
            suggested_price: estimate.suggested_price,
            source: estimate.source.as_str(),
            reason: &estimate.reason,
        }
    }
}

pub fn read_drafts<R: Read>(reader: R) -> Result<Vec<ListingDraft>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut drafts = Vec::new();
    for row in csv_reader.deserialize::<DraftRow>() {
        drafts.push(ListingDraft::from(row?));
    }
    Ok(drafts)
}

/// Estimates every row of `input` and writes the results to `output`.
/// Returns the number of rows written.
pub async fn estimate_batch<R: Read, W: Write>(
    suggester: &PriceSuggester,
    input: R,
    output: W,
) -> Result<usize> {
    let drafts = read_drafts(input)?;
    tracing::info!("Estimating {} listings", drafts.len());

    let mut writer = csv::Writer::from_writer(output);
    for draft in &drafts {
        let estimate = suggester.suggest(Some(draft)).await;
        writer.serialize(EstimateRow::new(draft, &estimate))?;
    }
    writer.flush()?;

    Ok(drafts.len())
}
