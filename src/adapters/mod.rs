// Adapters layer: concrete implementations for external systems (remote estimator, CSV batches).

pub mod batch;
pub mod http;

pub use http::HttpEstimator;
