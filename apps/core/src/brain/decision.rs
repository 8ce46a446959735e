//! Routing Decision - output structure of the router.
//!
//! Stateless record handed to the outer dispatcher; never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entities::EntityBag;
use super::intent::Intent;
use super::strategy::RoutingStrategy;

/// Confidence pinned on decisions produced after a routing failure.
pub const FALLBACK_CONFIDENCE: f32 = 0.1;

/// Complete routing outcome for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Classified intent
    pub intent: Intent,

    /// Classifier confidence (0.0 - 1.0)
    pub confidence: f32,

    /// Entities found in the request
    pub entities: EntityBag,

    /// Derived routing strategy
    pub strategy: RoutingStrategy,

    /// Original user input
    pub input_text: String,

    /// When the decision was made
    pub timestamp: DateTime<Utc>,

    /// True when routing failed and this is the pinned fallback
    #[serde(default)]
    pub fallback: bool,
}

impl RoutingDecision {
    /// Decision returned when routing failed for any reason.
    pub fn fallback(input_text: &str, location_context: Option<&str>) -> Self {
        Self {
            intent: Intent::GeneralInformation,
            confidence: FALLBACK_CONFIDENCE,
            entities: EntityBag::from_location(location_context),
            strategy: RoutingStrategy::fallback(),
            input_text: input_text.to_string(),
            timestamp: Utc::now(),
            fallback: true,
        }
    }

    /// Get a summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Intent: {} ({:.0}%), Agent: {}, Workflow: {}, Priority: {:?}, Locations: {}{}",
            self.intent,
            self.confidence * 100.0,
            self.strategy.primary_agent,
            self.strategy.workflow_type,
            self.strategy.priority_level,
            self.entities.locations.len(),
            if self.fallback { ", fallback" } else { "" }
        )
    }
}
