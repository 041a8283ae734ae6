pub mod adjusters;
pub mod anchors;
pub mod capacity;
pub mod depreciation;
pub mod estimator;
pub mod numeric;
pub mod prompt;
pub mod suggest;

pub use crate::domain::model::{Category, ListingDraft, PriceEstimate, Product};
pub use crate::domain::ports::RemoteEstimator;
pub use crate::utils::error::Result;
