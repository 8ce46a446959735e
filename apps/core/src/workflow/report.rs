//! Report compilation.
//!
//! Pure functions of the three stage results. Nothing here can fail: missing
//! or unrecognized inputs map to the documented defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payloads::{Guidance, ResourcePriority, ResourceReport, RiskAnalysis, RiskLevel};

pub const VALIDITY_PERIOD: &str = "7 days";
const MAX_KEY_FINDINGS: usize = 5;
const MAX_CRITICAL_ACTIONS: usize = 5;
const ICU_BEDS: &str = "icu_beds";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatLevel {
    #[serde(rename = "IMMEDIATE ACTION REQUIRED")]
    ImmediateActionRequired,
    #[serde(rename = "ENHANCED RESPONSE NEEDED")]
    EnhancedResponseNeeded,
    #[serde(rename = "INCREASED VIGILANCE")]
    IncreasedVigilance,
    #[serde(rename = "ROUTINE MONITORING")]
    RoutineMonitoring,
}

impl ThreatLevel {
    pub fn from_risk(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Critical => ThreatLevel::ImmediateActionRequired,
            RiskLevel::High => ThreatLevel::EnhancedResponseNeeded,
            RiskLevel::Moderate => ThreatLevel::IncreasedVigilance,
            RiskLevel::Low | RiskLevel::Unknown => ThreatLevel::RoutineMonitoring,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThreatLevel::ImmediateActionRequired => "IMMEDIATE ACTION REQUIRED",
            ThreatLevel::EnhancedResponseNeeded => "ENHANCED RESPONSE NEEDED",
            ThreatLevel::IncreasedVigilance => "INCREASED VIGILANCE",
            ThreatLevel::RoutineMonitoring => "ROUTINE MONITORING",
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            ThreatLevel::ImmediateActionRequired => "🔴",
            ThreatLevel::EnhancedResponseNeeded => "🟠",
            ThreatLevel::IncreasedVigilance => "🟡",
            ThreatLevel::RoutineMonitoring => "🟢",
        }
    }

    /// Marker and label, e.g. "🟡 INCREASED VIGILANCE".
    pub fn display(&self) -> String {
        format!("{} {}", self.marker(), self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendIndicator {
    #[serde(rename = "rapidly increasing")]
    RapidlyIncreasing,
    #[serde(rename = "increasing")]
    Increasing,
    #[serde(rename = "stable")]
    Stable,
    #[serde(rename = "decreasing")]
    Decreasing,
}

impl TrendIndicator {
    pub fn from_growth_rate(growth_rate: f64) -> Self {
        if growth_rate > 0.2 {
            TrendIndicator::RapidlyIncreasing
        } else if growth_rate > 0.1 {
            TrendIndicator::Increasing
        } else if growth_rate > -0.1 {
            TrendIndicator::Stable
        } else {
            TrendIndicator::Decreasing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityStatus {
    #[serde(rename = "critical strain")]
    CriticalStrain,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "adequate")]
    Adequate,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CapacityStatus {
    /// Based on projected ICU bed utilization; no ICU projection means unknown.
    pub fn from_resources(report: &ResourceReport) -> Self {
        let Some(icu) = report.resource_projections.get(ICU_BEDS) else {
            return CapacityStatus::Unknown;
        };
        let utilization = icu.utilization_projected.unwrap_or(0.0);
        if utilization > 0.9 {
            CapacityStatus::CriticalStrain
        } else if utilization > 0.8 {
            CapacityStatus::High
        } else if utilization > 0.7 {
            CapacityStatus::Moderate
        } else {
            CapacityStatus::Adequate
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicReadiness {
    #[serde(rename = "emergency protocols")]
    EmergencyProtocols,
    #[serde(rename = "enhanced readiness")]
    EnhancedReadiness,
    #[serde(rename = "standard readiness")]
    StandardReadiness,
    #[serde(rename = "routine status")]
    RoutineStatus,
    #[serde(rename = "unknown")]
    Unknown,
}

impl PublicReadiness {
    pub fn from_risk(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Critical => PublicReadiness::EmergencyProtocols,
            RiskLevel::High => PublicReadiness::EnhancedReadiness,
            RiskLevel::Moderate => PublicReadiness::StandardReadiness,
            RiskLevel::Low => PublicReadiness::RoutineStatus,
            RiskLevel::Unknown => PublicReadiness::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceSummary {
    /// Marker plus threat label
    pub threat_level: String,
    /// "<score>/100"
    pub risk_score: String,
    pub location: String,
    pub key_findings: Vec<String>,
    pub critical_actions: Vec<String>,
    pub confidence: f64,
}

/// The three stage results, fallbacks included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub risk_assessment: RiskAnalysis,
    pub public_guidance: Guidance,
    pub resource_allocation: ResourceReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskIndicators {
    pub overall_risk: f64,
    pub case_trends: TrendIndicator,
    pub hospital_capacity: CapacityStatus,
    pub public_readiness: PublicReadiness,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub confidence_level: String,
    pub data_freshness: String,
    pub coverage_area: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionPriority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub priority: ActionPriority,
    pub action: String,
    pub owner: String,
    pub timeline: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Window such as "immediate", "24_hours" or "1_week"
    pub window: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveDashboard {
    pub risk_indicators: RiskIndicators,
    pub key_metrics: KeyMetrics,
    pub action_items: Vec<ActionItem>,
    pub timeline: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContacts {
    pub local_health_department: String,
    pub emergency_management: String,
    pub cdc_eoc: String,
    pub support: String,
}

impl EmergencyContacts {
    pub fn for_location(location: &str) -> Self {
        Self {
            local_health_department: format!("{} Health Department", location),
            emergency_management: format!("{} Emergency Management", location),
            cdc_eoc: "CDC Emergency Operations Center".to_string(),
            support: "Outbreak Intelligence Support".to_string(),
        }
    }
}

/// Unified output of a full analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub workflow_id: String,
    pub generation_timestamp: DateTime<Utc>,
    pub location: String,
    pub intelligence_summary: IntelligenceSummary,
    pub components: Components,
    pub executive_dashboard: ExecutiveDashboard,
    pub next_steps: Vec<String>,
    pub validity_period: String,
    pub contact_information: EmergencyContacts,
    /// The caller asked for a rendered document; rendering happens outside this crate.
    pub pdf_requested: bool,
}

impl FinalReport {
    /// True if any component is a stage fallback.
    pub fn is_degraded(&self) -> bool {
        self.components.risk_assessment.error.is_some()
            || self.components.public_guidance.error.is_some()
            || self.components.resource_allocation.error.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportCompiler;

impl ReportCompiler {
    pub fn new() -> Self {
        Self
    }

    pub fn compile(
        &self,
        workflow_id: &str,
        generated_at: DateTime<Utc>,
        location: &str,
        components: Components,
        pdf_requested: bool,
    ) -> FinalReport {
        let Components {
            risk_assessment: risk,
            public_guidance: guidance,
            resource_allocation: resources,
        } = &components;
        let intelligence_summary = self.summary(location, risk, guidance, resources);
        let executive_dashboard = self.dashboard(location, risk, guidance, resources);
        let next_steps = next_steps(risk.risk_level);

        FinalReport {
            workflow_id: workflow_id.to_string(),
            generation_timestamp: generated_at,
            location: location.to_string(),
            intelligence_summary,
            components,
            executive_dashboard,
            next_steps,
            validity_period: VALIDITY_PERIOD.to_string(),
            contact_information: EmergencyContacts::for_location(location),
            pdf_requested,
        }
    }

    fn summary(
        &self,
        location: &str,
        risk: &RiskAnalysis,
        guidance: &Guidance,
        resources: &ResourceReport,
    ) -> IntelligenceSummary {
        IntelligenceSummary {
            threat_level: ThreatLevel::from_risk(risk.risk_level).display(),
            risk_score: format!("{:.1}/100", risk.risk_score),
            location: location.to_string(),
            key_findings: key_findings(risk, resources),
            critical_actions: critical_actions(guidance, resources),
            confidence: risk.confidence,
        }
    }

    fn dashboard(
        &self,
        location: &str,
        risk: &RiskAnalysis,
        guidance: &Guidance,
        resources: &ResourceReport,
    ) -> ExecutiveDashboard {
        ExecutiveDashboard {
            risk_indicators: RiskIndicators {
                overall_risk: risk.risk_score,
                case_trends: TrendIndicator::from_growth_rate(risk.trends.cases.growth_rate),
                hospital_capacity: CapacityStatus::from_resources(resources),
                public_readiness: PublicReadiness::from_risk(guidance.context_risk_level()),
            },
            key_metrics: KeyMetrics {
                confidence_level: format!("{:.0}%", risk.confidence * 100.0),
                data_freshness: "Real-time".to_string(),
                coverage_area: location.to_string(),
            },
            action_items: action_items(guidance, resources),
            timeline: response_timeline(risk.risk_level),
        }
    }
}

/// Risk level line, top two insights, then one aggregated line for CRITICAL resources.
pub fn key_findings(risk: &RiskAnalysis, resources: &ResourceReport) -> Vec<String> {
    let mut findings = vec![format!("Outbreak risk level: {}", risk.risk_level)];
    findings.extend(risk.insights.iter().take(2).cloned());

    let shortages: Vec<&str> = resources
        .resource_projections
        .iter()
        .filter(|(_, projection)| projection.priority == ResourcePriority::Critical)
        .map(|(name, _)| name.as_str())
        .collect();
    if !shortages.is_empty() {
        findings.push(format!("Critical resource shortages: {}", shortages.join(", ")));
    }

    findings.truncate(MAX_KEY_FINDINGS);
    findings
}

/// Top three recommendations, then up to two immediate procurements.
pub fn critical_actions(guidance: &Guidance, resources: &ResourceReport) -> Vec<String> {
    let mut actions: Vec<String> = guidance.key_recommendations.iter().take(3).cloned().collect();
    actions.extend(
        resources
            .procurement_recommendations
            .iter()
            .filter(|rec| rec.is_immediate())
            .take(2)
            .map(|rec| format!("URGENT: Procure {}", procurement_target(&rec.resource))),
    );
    actions.truncate(MAX_CRITICAL_ACTIONS);
    actions
}

fn procurement_target(resource: &str) -> &str {
    if resource.is_empty() {
        "resources"
    } else {
        resource
    }
}

fn action_items(guidance: &Guidance, resources: &ResourceReport) -> Vec<ActionItem> {
    let mut items = Vec::new();

    if guidance.context_risk_level().is_elevated() {
        items.push(ActionItem {
            priority: ActionPriority::High,
            action: "Activate emergency response protocols".to_string(),
            owner: "Emergency Management".to_string(),
            timeline: "Immediate".to_string(),
        });
    }

    for rec in resources.procurement_recommendations.iter().take(3) {
        items.push(ActionItem {
            priority: ActionPriority::Medium,
            action: format!("Procure {}", procurement_target(&rec.resource)),
            owner: "Procurement Team".to_string(),
            timeline: if rec.timeline.is_empty() {
                "TBD".to_string()
            } else {
                rec.timeline.clone()
            },
        });
    }

    items
}

/// Fixed milestones per risk level. Unknown levels get the MODERATE plan.
pub fn response_timeline(level: RiskLevel) -> Vec<Milestone> {
    let plan: &[(&str, &str)] = match level {
        RiskLevel::Critical => &[
            ("immediate", "Activate emergency protocols"),
            ("24_hours", "Resource mobilization"),
            ("72_hours", "Full response deployment"),
        ],
        RiskLevel::High => &[
            ("immediate", "Enhanced monitoring"),
            ("24_hours", "Prepare response teams"),
            ("1_week", "Resource positioning"),
        ],
        RiskLevel::Low => &[
            ("1_week", "Routine monitoring"),
            ("1_month", "Preparedness review"),
        ],
        RiskLevel::Moderate | RiskLevel::Unknown => &[
            ("24_hours", "Review response plans"),
            ("1_week", "Staff training"),
            ("2_weeks", "Equipment checks"),
        ],
    };

    plan.iter()
        .map(|(window, action)| Milestone {
            window: window.to_string(),
            action: action.to_string(),
        })
        .collect()
}

pub fn next_steps(level: RiskLevel) -> Vec<String> {
    let mut steps = Vec::with_capacity(5);
    if level.is_elevated() {
        steps.push("Activate emergency operations center".to_string());
        steps.push("Issue public health alerts".to_string());
    }
    steps.push("Monitor outbreak intelligence updates".to_string());
    steps.push("Review and update response plans".to_string());
    steps.push("Coordinate with partner agencies".to_string());
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::workflow::payloads::{ProcurementRecommendation, ResourceProjection, RiskContext};

    fn projection(priority: ResourcePriority, utilization: Option<f64>) -> ResourceProjection {
        ResourceProjection {
            priority,
            utilization_projected: utilization,
            ..ResourceProjection::default()
        }
    }

    fn procurement(resource: &str, timeline: &str) -> ProcurementRecommendation {
        ProcurementRecommendation {
            resource: resource.to_string(),
            timeline: timeline.to_string(),
            ..ProcurementRecommendation::default()
        }
    }

    #[test]
    fn test_case_trend_thresholds() {
        assert_eq!(TrendIndicator::from_growth_rate(0.25), TrendIndicator::RapidlyIncreasing);
        assert_eq!(TrendIndicator::from_growth_rate(0.15), TrendIndicator::Increasing);
        assert_eq!(TrendIndicator::from_growth_rate(0.0), TrendIndicator::Stable);
        assert_eq!(TrendIndicator::from_growth_rate(-0.2), TrendIndicator::Decreasing);
        assert_eq!(
            serde_json::to_value(TrendIndicator::RapidlyIncreasing).unwrap(),
            "rapidly increasing"
        );
    }

    #[test]
    fn test_capacity_status() {
        let mut report = ResourceReport::default();
        assert_eq!(CapacityStatus::from_resources(&report), CapacityStatus::Unknown);

        for (utilization, expected) in [
            (0.95, CapacityStatus::CriticalStrain),
            (0.85, CapacityStatus::High),
            (0.75, CapacityStatus::Moderate),
            (0.5, CapacityStatus::Adequate),
        ] {
            report
                .resource_projections
                .insert(ICU_BEDS.to_string(), projection(ResourcePriority::High, Some(utilization)));
            assert_eq!(CapacityStatus::from_resources(&report), expected);
        }
    }

    #[test]
    fn test_threat_level_display() {
        assert_eq!(
            ThreatLevel::from_risk(RiskLevel::Critical).display(),
            "🔴 IMMEDIATE ACTION REQUIRED"
        );
        assert_eq!(
            ThreatLevel::from_risk(RiskLevel::Unknown),
            ThreatLevel::RoutineMonitoring
        );
    }

    #[test]
    fn test_critical_shortages_aggregate_into_one_finding() {
        let risk = RiskAnalysis {
            risk_level: RiskLevel::High,
            insights: vec!["a".into(), "b".into(), "c".into()],
            ..RiskAnalysis::default()
        };
        let mut resources = ResourceReport::default();
        resources
            .resource_projections
            .insert("ventilators".to_string(), projection(ResourcePriority::Critical, None));
        resources
            .resource_projections
            .insert("icu_beds".to_string(), projection(ResourcePriority::Critical, Some(0.95)));
        resources
            .resource_projections
            .insert("masks".to_string(), projection(ResourcePriority::Low, None));

        let findings = key_findings(&risk, &resources);
        let shortage_lines: Vec<&String> = findings
            .iter()
            .filter(|f| f.starts_with("Critical resource shortages"))
            .collect();

        assert!(findings.len() <= MAX_KEY_FINDINGS);
        assert_eq!(findings[0], "Outbreak risk level: HIGH");
        assert_eq!(shortage_lines.len(), 1);
        assert!(shortage_lines[0].contains("ventilators"));
        assert!(shortage_lines[0].contains("icu_beds"));
        assert!(!shortage_lines[0].contains("masks"));
    }

    #[test]
    fn test_critical_actions_capped() {
        let guidance = Guidance {
            key_recommendations: (1..=4).map(|i| format!("rec {}", i)).collect(),
            ..Guidance::default()
        };
        let resources = ResourceReport {
            procurement_recommendations: vec![
                procurement("ventilators", "Immediate (24h)"),
                procurement("masks", "within 2 weeks"),
                procurement("gloves", "IMMEDIATE"),
                procurement("gowns", "immediate"),
            ],
            ..ResourceReport::default()
        };

        let actions = critical_actions(&guidance, &resources);
        assert_eq!(
            actions,
            vec![
                "rec 1".to_string(),
                "rec 2".to_string(),
                "rec 3".to_string(),
                "URGENT: Procure ventilators".to_string(),
                "URGENT: Procure gloves".to_string(),
            ]
        );
    }

    #[test]
    fn test_next_steps_and_timeline() {
        assert_eq!(next_steps(RiskLevel::Low).len(), 3);
        let urgent = next_steps(RiskLevel::Critical);
        assert_eq!(urgent.len(), 5);
        assert_eq!(urgent[0], "Activate emergency operations center");

        assert_eq!(response_timeline(RiskLevel::Unknown), response_timeline(RiskLevel::Moderate));
        assert_eq!(response_timeline(RiskLevel::Low).len(), 2);
    }

    #[test]
    fn test_compile_report() {
        let risk = RiskAnalysis {
            location: "Travis County".to_string(),
            risk_score: 72.5,
            risk_level: RiskLevel::High,
            confidence: 0.8,
            ..RiskAnalysis::default()
        };
        let guidance = Guidance {
            risk_context: Some(RiskContext {
                risk_level: RiskLevel::High,
                risk_score: Some(72.5),
            }),
            ..Guidance::default()
        };
        let resources = ResourceReport {
            procurement_recommendations: vec![procurement("ventilators", "")],
            ..ResourceReport::default()
        };

        let report = ReportCompiler::new().compile(
            "WF-1",
            Utc::now(),
            "Travis County",
            Components {
                risk_assessment: risk,
                public_guidance: guidance,
                resource_allocation: resources,
            },
            true,
        );

        assert_eq!(report.intelligence_summary.risk_score, "72.5/100");
        assert_eq!(report.intelligence_summary.threat_level, "🟠 ENHANCED RESPONSE NEEDED");
        assert_eq!(report.executive_dashboard.key_metrics.confidence_level, "80%");
        assert_eq!(
            report.executive_dashboard.risk_indicators.public_readiness,
            PublicReadiness::EnhancedReadiness
        );
        assert_eq!(report.executive_dashboard.action_items.len(), 2);
        assert_eq!(report.executive_dashboard.action_items[1].timeline, "TBD");
        assert_eq!(
            report.contact_information.local_health_department,
            "Travis County Health Department"
        );
        assert_eq!(report.validity_period, VALIDITY_PERIOD);
        assert!(report.pdf_requested);
        assert!(!report.is_degraded());
    }

    #[test]
    fn test_readiness_ignores_top_level_guidance_level() {
        let failed = ProviderError::Failed("model overloaded".to_string());
        let guidance = Guidance::fallback("Ohio", "general_public", RiskLevel::High, &failed);
        let risk = RiskAnalysis {
            risk_level: RiskLevel::High,
            ..RiskAnalysis::default()
        };

        let dashboard = ReportCompiler::new().dashboard("Ohio", &risk, &guidance, &ResourceReport::default());
        assert_eq!(dashboard.risk_indicators.public_readiness, PublicReadiness::RoutineStatus);
        assert!(dashboard.action_items.is_empty());
    }
}
