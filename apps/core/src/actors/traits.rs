use crate::error::ProviderError;
use crate::workflow::payloads::{Guidance, ResourceReport, RiskAnalysis, RumorValidation};
use async_trait::async_trait;

/// Defines the public interface for the data intelligence collaborator.
///
/// Implementations may call remote services; the workflow bounds every call
/// with its stage timeout.
#[async_trait]
pub trait RiskAnalysisProvider: Send + Sync + 'static {
    /// Produces a risk analysis for a location.
    async fn analyze(&self, location: &str) -> Result<RiskAnalysis, ProviderError>;
}

/// Fact-checks claims surfaced by the risk analysis.
#[async_trait]
pub trait RumorValidationProvider: Send + Sync + 'static {
    async fn validate(&self, claims: &[String], location: &str) -> Result<RumorValidation, ProviderError>;
}

/// Defines the public interface for the public guidance collaborator.
#[async_trait]
pub trait GuidanceProvider: Send + Sync + 'static {
    /// Writes recommendations for `audience` given the (possibly fallback) risk analysis.
    async fn generate(
        &self,
        risk: &RiskAnalysis,
        location: &str,
        audience: &str,
    ) -> Result<Guidance, ProviderError>;
}

/// Defines the public interface for the resource planning collaborator.
#[async_trait]
pub trait ResourceProvider: Send + Sync + 'static {
    async fn generate(&self, risk: &RiskAnalysis, location: &str) -> Result<ResourceReport, ProviderError>;
}
