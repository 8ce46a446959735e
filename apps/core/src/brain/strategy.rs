//! Routing strategy resolution.
//!
//! Maps an (intent, confidence, entities) triple to the agent that should
//! handle the request and how. Pure and deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::EntityBag;
use super::intent::Intent;

/// Confidence above which a request is treated as high priority.
pub const HIGH_PRIORITY_CONFIDENCE: f32 = 0.9;

/// Agents an outer dispatcher can hand a request to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    DataIntelligence,
    PublicGuidance,
    ResourcePlanning,
    Orchestrator,
}

impl AgentKind {
    pub fn label(&self) -> &'static str {
        match self {
            AgentKind::DataIntelligence => "data_intelligence",
            AgentKind::PublicGuidance => "public_guidance",
            AgentKind::ResourcePlanning => "resource_planning",
            AgentKind::Orchestrator => "orchestrator",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shape of the work the dispatcher should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    FullAnalysis,
    RiskFocused,
    GuidanceFocused,
    AudienceSpecific,
    ResourceFocused,
    ValidationFocused,
    EmergencyResponse,
    GeneralInquiry,
    ComparativeAnalysis,
}

impl WorkflowType {
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowType::FullAnalysis => "full_analysis",
            WorkflowType::RiskFocused => "risk_focused",
            WorkflowType::GuidanceFocused => "guidance_focused",
            WorkflowType::AudienceSpecific => "audience_specific",
            WorkflowType::ResourceFocused => "resource_focused",
            WorkflowType::ValidationFocused => "validation_focused",
            WorkflowType::EmergencyResponse => "emergency_response",
            WorkflowType::GeneralInquiry => "general_inquiry",
            WorkflowType::ComparativeAnalysis => "comparative_analysis",
        }
    }
}

impl fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Normal,
    High,
    Critical,
}

/// How a request should be handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingStrategy {
    pub primary_agent: AgentKind,
    pub workflow_type: WorkflowType,
    /// Supporting agents, in order, without duplicates
    pub additional_agents: Vec<AgentKind>,
    /// Advisory only; the workflow always runs its stages sequentially
    pub parallel_processing: bool,
    pub priority_level: PriorityLevel,
}

impl RoutingStrategy {
    /// Per-intent defaults, before any entity-based adjustment.
    pub fn for_intent(intent: Intent) -> Self {
        use AgentKind::*;

        let (primary_agent, workflow_type, additional_agents, parallel_processing) = match intent {
            Intent::OutbreakStatus => (DataIntelligence, WorkflowType::FullAnalysis, vec![PublicGuidance], false),
            Intent::RiskAssessment => (DataIntelligence, WorkflowType::RiskFocused, vec![], false),
            Intent::PublicGuidance => (PublicGuidance, WorkflowType::GuidanceFocused, vec![DataIntelligence], false),
            Intent::SchoolGuidance | Intent::TravelGuidance => {
                (PublicGuidance, WorkflowType::AudienceSpecific, vec![DataIntelligence], false)
            }
            Intent::ResourcePlanning | Intent::HospitalCapacity => {
                (ResourcePlanning, WorkflowType::ResourceFocused, vec![DataIntelligence], false)
            }
            Intent::RumorValidation => (DataIntelligence, WorkflowType::ValidationFocused, vec![], false),
            Intent::EmergencyAlert => (
                Orchestrator,
                WorkflowType::EmergencyResponse,
                vec![DataIntelligence, PublicGuidance, ResourcePlanning],
                true,
            ),
            Intent::GeneralInformation => (Orchestrator, WorkflowType::GeneralInquiry, vec![DataIntelligence], false),
        };

        Self {
            primary_agent,
            workflow_type,
            additional_agents,
            parallel_processing,
            priority_level: PriorityLevel::Normal,
        }
    }

    /// Strategy used when routing itself failed.
    pub fn fallback() -> Self {
        Self::for_intent(Intent::GeneralInformation)
    }

    /// Appends `agent` unless it is already listed.
    pub fn add_agent(&mut self, agent: AgentKind) {
        if !self.additional_agents.contains(&agent) {
            self.additional_agents.push(agent);
        }
    }
}

/// Derives a `RoutingStrategy` from classification output and entities
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutingStrategyResolver;

impl RoutingStrategyResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, intent: Intent, confidence: f32, entities: &EntityBag) -> RoutingStrategy {
        let mut strategy = RoutingStrategy::for_intent(intent);

        // 1. Priority
        if !entities.urgency_indicators.is_empty() || confidence > HIGH_PRIORITY_CONFIDENCE {
            strategy.priority_level = PriorityLevel::High;
        }
        if intent == Intent::EmergencyAlert {
            strategy.priority_level = PriorityLevel::Critical;
        }

        // 2. Care facilities pull in resource planning
        if entities.has_facility("hospital") || entities.has_facility("clinic") {
            strategy.add_agent(AgentKind::ResourcePlanning);
        }

        // 3. Several places means comparing them
        if entities.locations.len() > 1 {
            strategy.workflow_type = WorkflowType::ComparativeAnalysis;
        }

        strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> EntityBag {
        EntityBag::default()
    }

    #[test]
    fn test_intent_defaults() {
        let resolver = RoutingStrategyResolver::new();

        let s = resolver.resolve(Intent::OutbreakStatus, 0.5, &bag());
        assert_eq!(s.primary_agent, AgentKind::DataIntelligence);
        assert_eq!(s.workflow_type, WorkflowType::FullAnalysis);
        assert_eq!(s.additional_agents, vec![AgentKind::PublicGuidance]);
        assert_eq!(s.priority_level, PriorityLevel::Normal);

        let s = resolver.resolve(Intent::TravelGuidance, 0.5, &bag());
        assert_eq!(s.primary_agent, AgentKind::PublicGuidance);
        assert_eq!(s.workflow_type, WorkflowType::AudienceSpecific);

        let s = resolver.resolve(Intent::HospitalCapacity, 0.5, &bag());
        assert_eq!(s.primary_agent, AgentKind::ResourcePlanning);
        assert_eq!(s.workflow_type, WorkflowType::ResourceFocused);
    }

    #[test]
    fn test_emergency_is_always_critical() {
        let s = RoutingStrategyResolver::new().resolve(Intent::EmergencyAlert, 0.1, &bag());
        assert_eq!(s.priority_level, PriorityLevel::Critical);
        assert!(s.parallel_processing);
        assert_eq!(s.primary_agent, AgentKind::Orchestrator);
    }

    #[test]
    fn test_high_priority_from_urgency_or_confidence() {
        let resolver = RoutingStrategyResolver::new();

        let mut urgent = bag();
        urgent.urgency_indicators.insert("asap".to_string());
        assert_eq!(
            resolver.resolve(Intent::RiskAssessment, 0.2, &urgent).priority_level,
            PriorityLevel::High
        );

        assert_eq!(
            resolver.resolve(Intent::RiskAssessment, 0.95, &bag()).priority_level,
            PriorityLevel::High
        );
        assert_eq!(
            resolver.resolve(Intent::RiskAssessment, 0.9, &bag()).priority_level,
            PriorityLevel::Normal
        );
    }

    #[test]
    fn test_hospital_adds_resource_planning_once() {
        let resolver = RoutingStrategyResolver::new();
        let mut entities = bag();
        entities.facility_types.insert("hospital".to_string());
        entities.facility_types.insert("clinic".to_string());

        let s = resolver.resolve(Intent::RiskAssessment, 0.5, &entities);
        assert_eq!(s.additional_agents, vec![AgentKind::ResourcePlanning]);

        // Already present for emergencies: no duplicate.
        let s = resolver.resolve(Intent::EmergencyAlert, 0.5, &entities);
        let count = s
            .additional_agents
            .iter()
            .filter(|a| **a == AgentKind::ResourcePlanning)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_multiple_locations_switch_to_comparative_analysis() {
        let mut entities = bag();
        entities.locations.insert("Travis County".to_string());
        entities.locations.insert("Orange County".to_string());

        let s = RoutingStrategyResolver::new().resolve(Intent::OutbreakStatus, 0.5, &entities);
        assert_eq!(s.workflow_type, WorkflowType::ComparativeAnalysis);
    }

    #[test]
    fn test_fallback_strategy() {
        let s = RoutingStrategy::fallback();
        assert_eq!(s.primary_agent, AgentKind::Orchestrator);
        assert_eq!(s.workflow_type, WorkflowType::GeneralInquiry);
        assert_eq!(s.additional_agents, vec![AgentKind::DataIntelligence]);
        assert!(!s.parallel_processing);
        assert_eq!(s.priority_level, PriorityLevel::Normal);
    }
}
