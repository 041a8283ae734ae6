//! Prompt text for the remote estimation model.
//!
//! Output is a pure function of the draft: the listing is embedded as JSON
//! with struct field order, so identical drafts give identical prompts.

use crate::core::estimator::{format_amount, PriceBand};
use crate::domain::model::ListingDraft;

const PREAMBLE: &str = "You are a pricing assistant for a secondhand electric vehicle and battery marketplace in Vietnam.\n\
Suggest a fair asking price in VND for the listing below.";

const ANSWER_FORMAT: &str = "Reply with:\n\
1. A single number: the suggested price in VND, digits only, without currency symbols or separators.\n\
2. A justification of at most 3 sentences.";

pub fn build_prompt(draft: &ListingDraft) -> String {
    let listing = serde_json::to_string_pretty(draft).unwrap_or_else(|_| format!("{:?}", draft));
    let band = PriceBand::for_category(draft.category);

    format!(
        "{preamble}\n\nListing:\n{listing}\n\nTypical prices for {category} listings range from {min} to {max} VND.\n\n{format}",
        preamble = PREAMBLE,
        listing = listing,
        category = draft.category.map(|c| c.as_str()).unwrap_or("uncategorized"),
        min = format_amount(band.min),
        max = format_amount(band.max),
        format = ANSWER_FORMAT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Category, Product};

    fn draft() -> ListingDraft {
        ListingDraft {
            title: Some("Feliz S, barely used".to_string()),
            category: Some(Category::Ev),
            product: Some(Product {
                brand: Some("VinFast".to_string()),
                model: Some("Feliz S".to_string()),
                year: Some(2024.into()),
                condition: Some("GOOD".to_string()),
                battery_capacity: Some("3.5 kWh".into()),
                health_percentage: Some(95.into()),
            }),
            location: Some("Hanoi".to_string()),
        }
    }

    #[test]
    fn test_prompt_embeds_listing() {
        let prompt = build_prompt(&draft());
        assert!(prompt.contains("\"brand\": \"VinFast\""));
        assert!(prompt.contains("\"batteryCapacity\": \"3.5 kWh\""));
        assert!(prompt.contains("\"location\": \"Hanoi\""));
        assert!(prompt.contains("EV listings range from 10,000,000 to 35,000,000 VND"));
        assert!(prompt.contains("at most 3 sentences"));
    }

    #[test]
    fn test_prompt_is_deterministic_and_ordered() {
        let first = build_prompt(&draft());
        assert_eq!(first, build_prompt(&draft()));

        let title = first.find("\"title\"").unwrap();
        let category = first.find("\"category\"").unwrap();
        let brand = first.find("\"brand\"").unwrap();
        let health = first.find("\"healthPercentage\"").unwrap();
        assert!(title < category && category < brand && brand < health);
    }

    #[test]
    fn test_prompt_for_empty_draft() {
        let prompt = build_prompt(&ListingDraft::default());
        assert!(prompt.contains("Listing:\n{}"));
        assert!(prompt.contains("uncategorized listings range from 2,000,000 to 35,000,000"));
    }
}
