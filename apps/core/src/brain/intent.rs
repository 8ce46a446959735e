//! Intent Classification using weighted regex patterns.
//!
//! Scores the request against every rule of the `PatternCatalog` and keeps the
//! best one. No ML model required - pure Rust regex matching.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::patterns::PatternCatalog;
use crate::error::AppError;

/// Scores are normalized against this value to obtain a confidence.
pub const MAX_EXPECTED_SCORE: f32 = 15.0;

/// Confidence reported when no rule matched at all.
pub const NO_MATCH_CONFIDENCE: f32 = 0.3;

/// Classified purpose of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Current case activity in an area
    OutbreakStatus,
    /// Risk level or risk score questions
    RiskAssessment,
    /// Protective measures for the public
    PublicGuidance,
    /// Supplies, beds, equipment
    ResourcePlanning,
    /// Guidance for schools and students
    SchoolGuidance,
    /// Guidance for travelers
    TravelGuidance,
    /// ICU and bed capacity
    HospitalCapacity,
    /// Checking a claim or rumor
    RumorValidation,
    /// Anything else
    GeneralInformation,
    /// Urgent or crisis situations
    EmergencyAlert,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Intent {
    /// Catalog enumeration order. Equal scores resolve to the intent listed first.
    pub const ALL: [Intent; 10] = [
        Intent::OutbreakStatus,
        Intent::RiskAssessment,
        Intent::PublicGuidance,
        Intent::ResourcePlanning,
        Intent::SchoolGuidance,
        Intent::TravelGuidance,
        Intent::HospitalCapacity,
        Intent::RumorValidation,
        Intent::GeneralInformation,
        Intent::EmergencyAlert,
    ];

    /// Returns the wire label for the intent
    pub fn label(&self) -> &'static str {
        match self {
            Intent::OutbreakStatus => "outbreak_status",
            Intent::RiskAssessment => "risk_assessment",
            Intent::PublicGuidance => "public_guidance",
            Intent::ResourcePlanning => "resource_planning",
            Intent::SchoolGuidance => "school_guidance",
            Intent::TravelGuidance => "travel_guidance",
            Intent::HospitalCapacity => "hospital_capacity",
            Intent::RumorValidation => "rumor_validation",
            Intent::GeneralInformation => "general_information",
            Intent::EmergencyAlert => "emergency_alert",
        }
    }
}

/// Result of intent classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Detected intent
    pub intent: Intent,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Raw weighted score of the winning rule
    pub score: f32,
    /// Fragments that matched for the winning rule
    pub matched_patterns: Vec<String>,
}

impl ClassificationResult {
    fn no_match() -> Self {
        Self {
            intent: Intent::GeneralInformation,
            confidence: NO_MATCH_CONFIDENCE,
            score: 0.0,
            matched_patterns: vec![],
        }
    }
}

/// Intent classifier backed by the shared pattern catalog
#[derive(Debug, Clone, Copy)]
pub struct IntentClassifier {
    catalog: &'static PatternCatalog,
}

impl IntentClassifier {
    /// Create a classifier over the global catalog, loading it on first use.
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            catalog: PatternCatalog::global()?,
        })
    }

    /// Classify the intent of a text
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let lowered = text.to_lowercase();
        let mut best: Option<ClassificationResult> = None;

        for rule in self.catalog.rules() {
            let rule_score = rule.score(&lowered);
            if rule_score.score <= 0.0 {
                continue;
            }
            // Strict comparison keeps the earliest rule on ties.
            let improves = best
                .as_ref()
                .map_or(true, |current| rule_score.score > current.score);
            if improves {
                best = Some(ClassificationResult {
                    intent: rule.intent,
                    confidence: (rule_score.score / MAX_EXPECTED_SCORE).min(1.0),
                    score: rule_score.score,
                    matched_patterns: rule_score.matched,
                });
            }
        }

        best.unwrap_or_else(ClassificationResult::no_match)
    }
}
