pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::PricingConfig;

pub use crate::adapters::HttpEstimator;
pub use crate::core::estimator::{estimate, Estimator};
pub use crate::core::prompt::build_prompt;
pub use crate::core::suggest::PriceSuggester;
pub use domain::model::{Category, EstimateSource, ListingDraft, NumericInput, PriceEstimate, Product};
pub use domain::ports::{RemoteEstimator, RemoteReply, RemoteRequest};
pub use utils::error::{PricingError, Result};
