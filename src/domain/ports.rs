use crate::domain::model::{Category, Product};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Listing payload sent to the remote estimation service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteListing {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub product: Product,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteRequest {
    pub prompt: String,
    pub listing: RemoteListing,
}

/// What came back from the remote service, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteReply {
    /// Structured price field, when the service returned one.
    pub suggested_price: Option<f64>,
    /// Free-text answer or justification.
    pub text: String,
}

#[async_trait]
pub trait RemoteEstimator: Send + Sync {
    async fn estimate(&self, request: &RemoteRequest) -> Result<RemoteReply>;
}
