//! Delegated price suggestion with local fallback.
//!
//! The heuristic estimate is always computed first. A configured remote
//! estimator may supersede it; any failure, timeout or cancellation of the
//! remote call degrades to the heuristic and is never surfaced as an error.

use crate::core::estimator::{round_to_granularity, Estimator};
use crate::core::prompt::build_prompt;
use crate::domain::model::{ListingDraft, PriceEstimate};
use crate::domain::ports::{RemoteEstimator, RemoteListing, RemoteReply, RemoteRequest};
use regex::Regex;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

pub const NO_REMOTE_REASON: &str = "local heuristic, no remote configured";
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(15);

// Digit groups joined by single separator characters, e.g. "22.500.000" or "3.5".
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[., ]\d+)*").expect("valid digit-run pattern"));

/// First price-like number in free text.
///
/// Takes the first run of at least two digits. Runs written with thousands
/// separators (`22,500,000`, `22.500.000`, `22 500 000`) count as one run.
/// Zero is not a price.
pub fn extract_price(text: &str) -> Option<u64> {
    for candidate in DIGIT_RUN.find_iter(text) {
        let groups: Vec<&str> = candidate
            .as_str()
            .split(|c: char| !c.is_ascii_digit())
            .collect();

        let thousands = groups.len() > 1
            && (1..=3).contains(&groups[0].len())
            && groups[1..].iter().all(|g| g.len() == 3);

        if thousands {
            if let Some(price) = groups.concat().parse::<u64>().ok().filter(|p| *p > 0) {
                return Some(price);
            }
            continue;
        }

        for group in groups.iter().filter(|g| g.len() >= 2) {
            if let Some(price) = group.parse::<u64>().ok().filter(|p| *p > 0) {
                return Some(price);
            }
        }
    }
    None
}

/// Remote prices share the heuristic's granularity but are not clamped.
/// Anything that rounds to zero is not a price.
fn remote_price(price: f64) -> Option<u64> {
    if !price.is_finite() {
        return None;
    }
    Some(round_to_granularity(price)).filter(|p| *p > 0)
}

pub fn build_request(draft: &ListingDraft) -> RemoteRequest {
    RemoteRequest {
        prompt: build_prompt(draft),
        listing: RemoteListing {
            title: draft.title.clone(),
            category: draft.category,
            product: draft.product.clone().unwrap_or_default(),
            location: draft.location.clone(),
        },
    }
}

enum Interrupt {
    TimedOut(Duration),
    Cancelled,
}

pub struct PriceSuggester {
    estimator: Estimator,
    remote: Option<Arc<dyn RemoteEstimator>>,
    timeout: Duration,
}

impl PriceSuggester {
    pub fn new(estimator: Estimator, remote: Option<Arc<dyn RemoteEstimator>>) -> Self {
        Self {
            estimator,
            remote,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Heuristic only.
    pub fn local(estimator: Estimator) -> Self {
        Self::new(estimator, None)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub async fn suggest(&self, draft: Option<&ListingDraft>) -> PriceEstimate {
        self.suggest_with_timeout(draft, self.timeout).await
    }

    pub async fn suggest_with_timeout(
        &self,
        draft: Option<&ListingDraft>,
        timeout: Duration,
    ) -> PriceEstimate {
        let deadline = async move {
            tokio::time::sleep(timeout).await;
            Interrupt::TimedOut(timeout)
        };
        self.delegate(draft, deadline).await
    }

    /// Gives up on the remote as soon as `cancel` completes.
    pub async fn suggest_until<F>(&self, draft: Option<&ListingDraft>, cancel: F) -> PriceEstimate
    where
        F: Future<Output = ()>,
    {
        let cancelled = async move {
            cancel.await;
            Interrupt::Cancelled
        };
        self.delegate(draft, cancelled).await
    }

    async fn delegate<F>(&self, draft: Option<&ListingDraft>, interrupt: F) -> PriceEstimate
    where
        F: Future<Output = Interrupt>,
    {
        let heuristic = self.estimator.estimate(draft);

        let Some(draft) = draft else {
            return heuristic;
        };
        let Some(remote) = &self.remote else {
            let reason = format!("{}: {}", NO_REMOTE_REASON, heuristic.reason);
            return heuristic.with_reason(reason);
        };

        let request = build_request(draft);
        tracing::debug!("Requesting remote price estimate");

        tokio::select! {
            result = remote.estimate(&request) => match result {
                Ok(reply) => Self::interpret(reply, heuristic),
                Err(e) => {
                    tracing::warn!("Remote price estimation failed: {}", e);
                    Self::fallback(heuristic, &e.to_string())
                }
            },
            interrupt = interrupt => {
                let cause = match interrupt {
                    Interrupt::TimedOut(after) => format!("no answer within {}ms", after.as_millis()),
                    Interrupt::Cancelled => "request cancelled".to_string(),
                };
                tracing::warn!("Remote price estimation abandoned: {}", cause);
                Self::fallback(heuristic, &cause)
            }
        }
    }

    fn interpret(reply: RemoteReply, heuristic: PriceEstimate) -> PriceEstimate {
        let text = reply.text.trim();

        if let Some(price) = reply.suggested_price.and_then(remote_price) {
            let reason = if text.is_empty() { "remote estimate" } else { text };
            return PriceEstimate::remote(price, reason);
        }

        if let Some(price) = extract_price(text).and_then(|p| remote_price(p as f64)) {
            return PriceEstimate::remote(price, text);
        }

        tracing::debug!("Remote reply carried no usable price, keeping heuristic value");
        if text.is_empty() {
            Self::fallback(heuristic, "empty remote reply")
        } else {
            heuristic.with_reason(text)
        }
    }

    fn fallback(heuristic: PriceEstimate, cause: &str) -> PriceEstimate {
        let reason = format!(
            "remote estimation unavailable ({}), using local heuristic: {}",
            cause, heuristic.reason
        );
        heuristic.with_reason(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Category, EstimateSource, Product};
    use crate::utils::error::{PricingError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedRemote {
        reply: RemoteReply,
        calls: AtomicUsize,
    }

    impl CannedRemote {
        fn text(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: RemoteReply {
                    suggested_price: None,
                    text: text.to_string(),
                },
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RemoteEstimator for CannedRemote {
        async fn estimate(&self, _request: &RemoteRequest) -> Result<RemoteReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingRemote;

    #[async_trait]
    impl RemoteEstimator for FailingRemote {
        async fn estimate(&self, _request: &RemoteRequest) -> Result<RemoteReply> {
            Err(PricingError::RemoteStatusError {
                status: 503,
                body: "overloaded".to_string(),
            })
        }
    }

    struct SlowRemote;

    #[async_trait]
    impl RemoteEstimator for SlowRemote {
        async fn estimate(&self, _request: &RemoteRequest) -> Result<RemoteReply> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(RemoteReply::default())
        }
    }

    fn estimator() -> Estimator {
        Estimator::default().with_current_year(2026)
    }

    fn draft() -> ListingDraft {
        ListingDraft::new(
            Category::Ev,
            Product {
                brand: Some("VinFast".to_string()),
                model: Some("Feliz S".to_string()),
                year: Some(2024.into()),
                condition: Some("GOOD".to_string()),
                battery_capacity: Some("3.5 kWh".into()),
                health_percentage: Some(95.into()),
            },
        )
    }

    #[test]
    fn test_extract_price_plain_runs() {
        assert_eq!(extract_price("I suggest 21500000 VND."), Some(21_500_000));
        assert_eq!(extract_price("3.5 kWh pack, worth 8000000"), Some(8_000_000));
        assert_eq!(extract_price("around 3.50 million"), Some(50));
        assert_eq!(extract_price("no idea"), None);
        assert_eq!(extract_price("0 or 00"), None);
        assert_eq!(extract_price("7"), None);
    }

    #[test]
    fn test_extract_price_thousands_separators() {
        assert_eq!(extract_price("Price: 22,500,000 VND"), Some(22_500_000));
        assert_eq!(extract_price("Price: 22.500.000đ"), Some(22_500_000));
        assert_eq!(extract_price("Price: 22 500 000"), Some(22_500_000));
        assert_eq!(extract_price("built 2024, 150 km"), Some(2024));
    }

    #[tokio::test]
    async fn test_no_remote_matches_heuristic() {
        let suggester = PriceSuggester::local(estimator());
        let result = suggester.suggest(Some(&draft())).await;
        let heuristic = estimator().estimate(Some(&draft()));

        assert_eq!(result.suggested_price, heuristic.suggested_price);
        assert_eq!(result.source, EstimateSource::Heuristic);
        assert!(result.reason.starts_with(NO_REMOTE_REASON));
    }

    #[tokio::test]
    async fn test_missing_draft_skips_remote() {
        let remote = CannedRemote::text("25000000");
        let suggester = PriceSuggester::new(estimator(), Some(remote.clone()));
        let result = suggester.suggest(None).await;

        assert_eq!(result.suggested_price, None);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_free_text_supersedes() {
        let remote = CannedRemote::text("24,000,000. Low mileage and a healthy battery.");
        let suggester = PriceSuggester::new(estimator(), Some(remote.clone()));
        let result = suggester.suggest(Some(&draft())).await;

        assert_eq!(result.suggested_price, Some(24_000_000));
        assert_eq!(result.source, EstimateSource::Remote);
        assert!(result.reason.contains("healthy battery"));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remote_structured_price_preferred() {
        let remote = Arc::new(CannedRemote {
            reply: RemoteReply {
                suggested_price: Some(23_100_000.0),
                text: "Listed 2 years ago, 99 similar units".to_string(),
            },
            calls: AtomicUsize::new(0),
        });
        let suggester = PriceSuggester::new(estimator(), Some(remote));
        let result = suggester.suggest(Some(&draft())).await;

        assert_eq!(result.suggested_price, Some(23_100_000));
        assert_eq!(result.source, EstimateSource::Remote);
    }

    #[tokio::test]
    async fn test_remote_price_is_rounded() {
        let remote = CannedRemote::text("About 22,345,678 VND, battery still strong.");
        let suggester = PriceSuggester::new(estimator(), Some(remote));
        let result = suggester.suggest(Some(&draft())).await;

        assert_eq!(result.suggested_price, Some(22_300_000));
        assert_eq!(result.source, EstimateSource::Remote);

        let structured = Arc::new(CannedRemote {
            reply: RemoteReply {
                suggested_price: Some(40_950_001.0),
                text: String::new(),
            },
            calls: AtomicUsize::new(0),
        });
        let suggester = PriceSuggester::new(estimator(), Some(structured));
        let result = suggester.suggest(Some(&draft())).await;

        // Rounded, never clamped to the EV band.
        assert_eq!(result.suggested_price, Some(41_000_000));
        assert_eq!(result.reason, "remote estimate");
    }

    #[tokio::test]
    async fn test_remote_price_rounding_to_zero_keeps_heuristic() {
        let remote = CannedRemote::text("Roughly 45 thousand.");
        let suggester = PriceSuggester::new(estimator(), Some(remote));
        let result = suggester.suggest(Some(&draft())).await;

        assert_eq!(result.suggested_price, Some(22_200_000));
        assert_eq!(result.source, EstimateSource::Heuristic);
        assert_eq!(result.reason, "Roughly 45 thousand.");
    }

    #[tokio::test]
    async fn test_remote_without_digits_keeps_heuristic_price() {
        let remote = CannedRemote::text("Hard to say without photos.");
        let suggester = PriceSuggester::new(estimator(), Some(remote));
        let result = suggester.suggest(Some(&draft())).await;

        assert_eq!(
            result.suggested_price,
            estimator().estimate(Some(&draft())).suggested_price
        );
        assert_eq!(result.source, EstimateSource::Heuristic);
        assert_eq!(result.reason, "Hard to say without photos.");
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back() {
        let suggester = PriceSuggester::new(estimator(), Some(Arc::new(FailingRemote)));
        let result = suggester.suggest(Some(&draft())).await;

        assert_eq!(result.suggested_price, Some(22_200_000));
        assert_eq!(result.source, EstimateSource::Heuristic);
        assert!(result.reason.contains("503"));
    }

    #[tokio::test]
    async fn test_remote_timeout_falls_back() {
        let suggester = PriceSuggester::new(estimator(), Some(Arc::new(SlowRemote)))
            .with_timeout(Duration::from_millis(50));
        let result = suggester.suggest(Some(&draft())).await;

        assert_eq!(result.suggested_price, Some(22_200_000));
        assert!(result.reason.contains("no answer within 50ms"));
    }

    #[tokio::test]
    async fn test_cancellation_falls_back() {
        let suggester = PriceSuggester::new(estimator(), Some(Arc::new(SlowRemote)));
        let result = suggester
            .suggest_until(Some(&draft()), std::future::ready(()))
            .await;

        assert_eq!(result.suggested_price, Some(22_200_000));
        assert!(result.reason.contains("request cancelled"));
    }

    #[test]
    fn test_build_request_carries_listing() {
        let mut draft = draft();
        draft.location = Some("Da Nang".to_string());
        let request = build_request(&draft);

        assert_eq!(request.listing.category, Some(Category::Ev));
        assert_eq!(request.listing.location.as_deref(), Some("Da Nang"));
        assert_eq!(request.prompt, build_prompt(&draft));
    }
}
