//! Router - entry point of the brain module.
//!
//! Runs intent classification, entity extraction and strategy resolution, in
//! that order, and always returns a decision: any failure along the way is
//! logged and replaced by the pinned fallback decision.

use chrono::Utc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use super::decision::RoutingDecision;
use super::entities::EntityExtractor;
use super::intent::IntentClassifier;
use super::strategy::RoutingStrategyResolver;
use crate::config::Settings;
use crate::error::AppError;

/// Composes classifier, extractor and resolver into `route_request`
#[derive(Debug, Clone)]
pub struct Router {
    classifier: IntentClassifier,
    extractor: EntityExtractor,
    resolver: RoutingStrategyResolver,
    max_input_chars: usize,
}

impl Router {
    /// Create a router with default settings.
    ///
    /// Fails only if the pattern catalog cannot be loaded.
    pub fn new() -> Result<Self, AppError> {
        Self::with_settings(&Settings::default())
    }

    pub fn with_settings(settings: &Settings) -> Result<Self, AppError> {
        Ok(Self {
            classifier: IntentClassifier::new()?,
            extractor: EntityExtractor::new(),
            resolver: RoutingStrategyResolver::new(),
            max_input_chars: settings.max_input_chars,
        })
    }

    /// Route a request. Never fails; see `RoutingDecision::fallback`.
    #[instrument(skip(self, text), fields(input_len = text.len()))]
    pub fn route_request(&self, text: &str, location_context: Option<&str>) -> RoutingDecision {
        match self.try_route(text, location_context) {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Routing failed, using fallback decision: {}", e);
                RoutingDecision::fallback(text, location_context)
            }
        }
    }

    fn try_route(&self, text: &str, location_context: Option<&str>) -> Result<RoutingDecision, AppError> {
        let start = Instant::now();
        self.validate_input(text)?;

        // 1. Classify intent
        let classification = self.classifier.classify(text);

        // 2. Extract entities
        let entities = self.extractor.extract(text, location_context);

        // 3. Resolve strategy
        let strategy = self
            .resolver
            .resolve(classification.intent, classification.confidence, &entities);

        let decision = RoutingDecision {
            intent: classification.intent,
            confidence: classification.confidence,
            entities,
            strategy,
            input_text: text.to_string(),
            timestamp: Utc::now(),
            fallback: false,
        };

        debug!(
            matched = ?classification.matched_patterns,
            elapsed_us = start.elapsed().as_micros() as u64,
            "{}",
            decision.summary()
        );
        Ok(decision)
    }

    fn validate_input(&self, text: &str) -> Result<(), AppError> {
        if text.contains('\0') {
            return Err(AppError::Validation("input contains NUL bytes".to_string()));
        }
        let chars = text.chars().count();
        if chars > self.max_input_chars {
            return Err(AppError::Validation(format!(
                "input has {} characters, limit is {}",
                chars, self.max_input_chars
            )));
        }
        Ok(())
    }

    /// Human-readable account of a routing decision.
    pub fn explain(decision: &RoutingDecision) -> String {
        let mut explanation = format!(
            "Intent classified as '{}' with {:.1}% confidence. ",
            decision.intent,
            decision.confidence * 100.0
        );

        if !decision.entities.locations.is_empty() {
            let locations: Vec<&str> = decision.entities.locations.iter().map(String::as_str).collect();
            explanation.push_str(&format!("Detected locations: {}. ", locations.join(", ")));
        }

        if !decision.entities.urgency_indicators.is_empty() {
            explanation.push_str("Urgency indicators detected. ");
        }

        let strategy = &decision.strategy;
        explanation.push_str(&format!(
            "Routing to {} agent using {} workflow.",
            strategy.primary_agent, strategy.workflow_type
        ));

        if !strategy.additional_agents.is_empty() {
            let agents: Vec<&str> = strategy.additional_agents.iter().map(|a| a.label()).collect();
            explanation.push_str(&format!(" Additional agents: {}.", agents.join(", ")));
        }

        explanation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::intent::Intent;
    use crate::brain::strategy::{AgentKind, PriorityLevel, WorkflowType};

    #[test]
    fn test_basic_routing() {
        let router = Router::new().unwrap();
        let decision = router.route_request("What is the outbreak status in Travis County?", None);

        assert!(!decision.fallback);
        assert_eq!(decision.intent, Intent::OutbreakStatus);
        assert_eq!(decision.strategy.primary_agent, AgentKind::DataIntelligence);
        assert_eq!(decision.strategy.workflow_type, WorkflowType::FullAnalysis);
        assert!(decision.entities.locations.contains("Travis County"));
    }

    #[test]
    fn test_nul_input_falls_back() {
        let router = Router::new().unwrap();
        let decision = router.route_request("outbreak\0status", Some("Ohio"));

        assert!(decision.fallback);
        assert_eq!(decision.intent, Intent::GeneralInformation);
        assert!(decision.entities.locations.contains("Ohio"));
    }

    #[test]
    fn test_oversized_input_falls_back() {
        let settings = Settings {
            max_input_chars: 16,
            ..Settings::default()
        };
        let router = Router::with_settings(&settings).unwrap();
        let decision = router.route_request("is there an outbreak near the airport today?", None);

        assert!(decision.fallback);
        assert_eq!(decision.strategy.priority_level, PriorityLevel::Normal);
    }

    #[test]
    fn test_explain() {
        let router = Router::new().unwrap();
        let decision = router.route_request("urgent: hospital capacity in Travis County", None);
        let text = Router::explain(&decision);

        assert!(text.starts_with("Intent classified as 'hospital_capacity'"));
        assert!(text.contains("Detected locations: Travis County."));
        assert!(text.contains("Urgency indicators detected."));
        assert!(text.contains("Routing to resource_planning agent using resource_focused workflow."));
        // "hospital" in the facilities appends resource planning even though it is primary.
        assert!(text.contains("Additional agents: data_intelligence, resource_planning."));
    }
}
