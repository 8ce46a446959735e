//! Payloads exchanged with the external collaborators.
//!
//! Every struct deserializes from partial JSON (missing fields take their
//! defaults) so a provider backed by a loosely-typed service can hand its
//! output straight to the workflow. `error` is only ever set on fallbacks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ProviderError;

pub const FALLBACK_RISK_SCORE: f64 = 25.0;
pub const FALLBACK_RISK_CONFIDENCE: f64 = 0.5;
pub const FALLBACK_RISK_INSIGHT: &str = "Risk assessment failed - using default moderate risk level";
pub const FALLBACK_GUIDANCE: [&str; 3] = [
    "Follow local health department guidance",
    "Monitor official health communications",
    "Contact healthcare providers with questions",
];
pub const RESOURCE_STATUS_UNABLE: &str = "UNABLE_TO_ASSESS";
pub const FALLBACK_RESOURCE_RECOMMENDATION: &str = "Contact local emergency management";

/// Outbreak risk level reported by the risk collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
    /// Missing or unrecognized level
    #[default]
    #[serde(other)]
    Unknown,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::Unknown => "UNKNOWN",
        }
    }

    /// CRITICAL or HIGH.
    pub fn is_elevated(&self) -> bool {
        matches!(self, RiskLevel::Critical | RiskLevel::High)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseTrend {
    pub growth_rate: f64,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trends {
    pub cases: CaseTrend,
    pub hospitals: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RumorVerdict {
    pub verdict: String,
    pub confidence: f64,
    pub sources: Vec<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Verdicts keyed by the claim that was checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RumorValidation {
    pub results: BTreeMap<String, RumorVerdict>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskAnalysis {
    pub location: String,
    /// 0 - 100
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub insights: Vec<String>,
    pub trends: Trends,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rumor_validation: Option<RumorValidation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RiskAnalysis {
    /// Moderate default used when the risk stage fails.
    pub fn fallback(location: &str, error: &ProviderError) -> Self {
        Self {
            location: location.to_string(),
            risk_score: FALLBACK_RISK_SCORE,
            risk_level: RiskLevel::Moderate,
            confidence: FALLBACK_RISK_CONFIDENCE,
            insights: vec![FALLBACK_RISK_INSIGHT.to_string()],
            trends: Trends::default(),
            rumor_validation: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceCategory {
    pub recommendation: String,
    pub severity_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskContext {
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guidance {
    pub location: String,
    pub target_audience: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    pub key_recommendations: Vec<String>,
    pub guidance_categories: BTreeMap<String, GuidanceCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_context: Option<RiskContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Guidance {
    /// Generic recommendations used when the guidance stage fails.
    pub fn fallback(location: &str, target_audience: &str, risk_level: RiskLevel, error: &ProviderError) -> Self {
        Self {
            location: location.to_string(),
            target_audience: target_audience.to_string(),
            risk_level: Some(risk_level),
            key_recommendations: FALLBACK_GUIDANCE.iter().map(|s| s.to_string()).collect(),
            guidance_categories: BTreeMap::new(),
            risk_context: None,
            error: Some(error.to_string()),
        }
    }

    /// Level from the guidance's risk context, LOW when there is none.
    /// The top-level `risk_level` is not consulted.
    pub fn context_risk_level(&self) -> RiskLevel {
        self.risk_context
            .as_ref()
            .map(|ctx| ctx.risk_level)
            .unwrap_or(RiskLevel::Low)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourcePriority {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceProjection {
    pub priority: ResourcePriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilization_projected: Option<f64>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcurementRecommendation {
    pub resource: String,
    pub timeline: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl ProcurementRecommendation {
    pub fn is_immediate(&self) -> bool {
        self.timeline.to_lowercase().starts_with("immediate")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceReport {
    pub location: String,
    pub resource_projections: BTreeMap<String, ResourceProjection>,
    pub procurement_recommendations: Vec<ProcurementRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    /// Risk analysis the failed stage was given. Only set on fallbacks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_context: Option<RiskAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResourceReport {
    /// Minimal assessment used when the resource stage fails.
    pub fn fallback(location: &str, risk: &RiskAnalysis, error: &ProviderError) -> Self {
        Self {
            location: location.to_string(),
            status: Some(RESOURCE_STATUS_UNABLE.to_string()),
            recommendations: vec![FALLBACK_RESOURCE_RECOMMENDATION.to_string()],
            risk_context: Some(risk.clone()),
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}
