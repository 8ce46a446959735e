//! Per-stage collaborator calls.
//!
//! Each call is bounded by the stage timeout and returns a `Result`; the
//! orchestrator decides what to substitute on `Err`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

use super::payloads::{Guidance, ResourceReport, RiskAnalysis};
use crate::actors::traits::{GuidanceProvider, ResourceProvider, RiskAnalysisProvider, RumorValidationProvider};
use crate::error::ProviderError;

/// Substrings marking an insight as a claim worth fact-checking.
const RUMOR_INDICATORS: [&str; 5] = ["rumor", "claim", "report", "social media", "unverified"];
/// At most this many insights are sent for validation.
const MAX_RUMORS: usize = 3;

/// Insights mentioning a rumor indicator, in order, at most three.
pub fn extract_potential_rumors(insights: &[String]) -> Vec<String> {
    insights
        .iter()
        .filter(|insight| {
            let lowered = insight.to_lowercase();
            RUMOR_INDICATORS.iter().any(|kw| lowered.contains(kw))
        })
        .take(MAX_RUMORS)
        .cloned()
        .collect()
}

/// Runs collaborator calls under a shared per-call deadline.
#[derive(Debug, Clone, Copy)]
pub struct StageExecutor {
    timeout: Duration,
}

impl StageExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn bounded<T, F>(&self, stage: &str, call: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        match timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(format!(
                "{} did not answer within {}s",
                stage,
                self.timeout.as_secs_f32()
            ))),
        }
    }

    /// Risk analysis followed, when a validator is configured, by rumor validation.
    ///
    /// A validation failure fails the whole stage.
    pub async fn risk(
        &self,
        analyst: &Arc<dyn RiskAnalysisProvider>,
        validator: Option<&Arc<dyn RumorValidationProvider>>,
        location: &str,
    ) -> Result<RiskAnalysis, ProviderError> {
        let mut analysis = self.bounded("risk analysis", analyst.analyze(location)).await?;

        let Some(validator) = validator else {
            return Ok(analysis);
        };

        let rumors = extract_potential_rumors(&analysis.insights);
        if !rumors.is_empty() {
            info!("Validating {} potential rumors for {}", rumors.len(), location);
            let validation = self
                .bounded("rumor validation", validator.validate(&rumors, location))
                .await?;
            analysis.rumor_validation = Some(validation);
        } else {
            debug!("No rumor indicators in risk insights");
        }

        Ok(analysis)
    }

    pub async fn guidance(
        &self,
        provider: &Arc<dyn GuidanceProvider>,
        risk: &RiskAnalysis,
        location: &str,
        audience: &str,
    ) -> Result<Guidance, ProviderError> {
        self.bounded("guidance generation", provider.generate(risk, location, audience))
            .await
    }

    pub async fn resource(
        &self,
        provider: &Arc<dyn ResourceProvider>,
        risk: &RiskAnalysis,
        location: &str,
    ) -> Result<ResourceReport, ProviderError> {
        self.bounded("resource planning", provider.generate(risk, location))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::workflow::payloads::RumorValidation;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SlowAnalyst;

    #[async_trait]
    impl RiskAnalysisProvider for SlowAnalyst {
        async fn analyze(&self, _location: &str) -> Result<RiskAnalysis, ProviderError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(RiskAnalysis::default())
        }
    }

    struct InsightAnalyst(Vec<String>);

    #[async_trait]
    impl RiskAnalysisProvider for InsightAnalyst {
        async fn analyze(&self, location: &str) -> Result<RiskAnalysis, ProviderError> {
            Ok(RiskAnalysis {
                location: location.to_string(),
                insights: self.0.clone(),
                ..RiskAnalysis::default()
            })
        }
    }

    #[derive(Default)]
    struct CountingValidator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RumorValidationProvider for CountingValidator {
        async fn validate(&self, claims: &[String], _location: &str) -> Result<RumorValidation, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut validation = RumorValidation::default();
            for claim in claims {
                validation.results.insert(claim.clone(), Default::default());
            }
            Ok(validation)
        }
    }

    #[test]
    fn test_extract_potential_rumors() {
        let insights: Vec<String> = [
            "Cases rising in the north",
            "Unverified claim of a new strain",
            "Social Media posts mention closures",
            "Hospital report shows strain",
            "A rumor about vaccine supply",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let rumors = extract_potential_rumors(&insights);
        assert_eq!(rumors.len(), 3);
        assert_eq!(rumors[0], "Unverified claim of a new strain");
        assert_eq!(rumors[2], "Hospital report shows strain");
    }

    #[tokio::test]
    async fn test_timeout_maps_to_provider_timeout() {
        let executor = StageExecutor::new(Duration::from_millis(20));
        let analyst: Arc<dyn RiskAnalysisProvider> = Arc::new(SlowAnalyst);

        let err = executor.risk(&analyst, None, "Ohio").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_validator_skipped_without_rumors() {
        let executor = StageExecutor::new(Duration::from_secs(1));
        let analyst: Arc<dyn RiskAnalysisProvider> = Arc::new(InsightAnalyst(vec!["Cases stable".to_string()]));
        let counting = Arc::new(CountingValidator::default());
        let validator: Arc<dyn RumorValidationProvider> = counting.clone();

        let risk = executor.risk(&analyst, Some(&validator), "Ohio").await.unwrap();
        assert!(risk.rumor_validation.is_none());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rumors_are_validated_and_attached() {
        let executor = StageExecutor::new(Duration::from_secs(1));
        let analyst: Arc<dyn RiskAnalysisProvider> =
            Arc::new(InsightAnalyst(vec!["Unverified reports of school closures".to_string()]));
        let counting = Arc::new(CountingValidator::default());
        let validator: Arc<dyn RumorValidationProvider> = counting.clone();

        let risk = executor.risk(&analyst, Some(&validator), "Ohio").await.unwrap();
        let validation = risk.rumor_validation.unwrap();
        assert!(validation.results.contains_key("Unverified reports of school closures"));
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }
}
