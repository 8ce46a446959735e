//! Pattern Catalog - declarative per-intent matching rules.
//!
//! One rule per intent: keyword regexes, phrase substrings and exact-match
//! queries, all scored with the rule weight. Regexes are compiled once when the
//! catalog loads; a bad pattern fails the load, never a later match.

use std::sync::LazyLock;

use regex::Regex;

use super::intent::Intent;
use crate::error::AppError;

/// Bonus added for each exact match against the whole (trimmed) query.
pub const EXACT_MATCH_BONUS: f32 = 10.0;

/// Phrase matches count this many times the rule weight.
pub const PHRASE_MULTIPLIER: f32 = 1.5;

/// Uncompiled rule as written in the table below.
struct RuleSpec {
    intent: Intent,
    keywords: &'static [&'static str],
    phrases: &'static [&'static str],
    exact_matches: &'static [&'static str],
    weight: f32,
}

// Listed in `Intent::ALL` order; `PatternCatalog::load` enforces it.
const RULE_SPECS: &[RuleSpec] = &[
    RuleSpec {
        intent: Intent::OutbreakStatus,
        keywords: &[
            r"\boutbreak\b",
            r"\bspread\b",
            r"\bcases\b",
            r"\bincreasing\b",
            r"\bstatus\b",
            r"\bsituation\b",
            r"\bcurrent\b",
        ],
        phrases: &[
            "outbreak status",
            "current situation",
            "case numbers",
            "is there an outbreak",
            "outbreak activity",
            "infection rate",
        ],
        exact_matches: &["outbreak status", "status"],
        weight: 2.0,
    },
    RuleSpec {
        intent: Intent::RiskAssessment,
        keywords: &[
            r"\brisk\b",
            r"\bdanger\b",
            r"\bthreat\b",
            r"\bassess\b",
            r"\bsafety\b",
            r"\bscore\b",
        ],
        phrases: &[
            "risk level",
            "how dangerous",
            "threat assessment",
            "risk score",
            "safety level",
        ],
        exact_matches: &["risk", "risk level"],
        weight: 2.0,
    },
    RuleSpec {
        intent: Intent::PublicGuidance,
        keywords: &[
            r"\bguidance\b",
            r"\brecommend\b",
            r"\badvice\b",
            r"\bshould\b",
            r"\bprotection\b",
            r"\bprecaution\b",
        ],
        phrases: &[
            "public guidance",
            "recommendations",
            "what should",
            "health advice",
            "safety measures",
            "precautions",
        ],
        exact_matches: &["guidance", "public guidance"],
        weight: 2.0,
    },
    RuleSpec {
        intent: Intent::ResourcePlanning,
        keywords: &[
            r"\bresource\b",
            r"\bsupply\b",
            r"\bcapacity\b",
            r"\bbed\b",
            r"\bppe\b",
            r"\bequipment\b",
            r"\bshortage\b",
        ],
        phrases: &[
            "resource allocation",
            "hospital capacity",
            "bed availability",
            "ppe shortage",
            "medical supplies",
            "resource planning",
        ],
        exact_matches: &["resources", "resource planning"],
        weight: 2.0,
    },
    RuleSpec {
        intent: Intent::SchoolGuidance,
        keywords: &[
            r"\bschool\b",
            r"\bstudent\b",
            r"\beducation\b",
            r"\bclass\b",
            r"\bteacher\b",
            r"\bcampus\b",
        ],
        phrases: &[
            "school safety",
            "student guidance",
            "classroom precautions",
            "school closure",
            "educational settings",
        ],
        exact_matches: &["schools"],
        weight: 2.5,
    },
    RuleSpec {
        intent: Intent::TravelGuidance,
        keywords: &[
            r"\btravel\b",
            r"\btrip\b",
            r"\bflight\b",
            r"\btransport\b",
            r"\bairport\b",
            r"\bvisit\b",
        ],
        phrases: &[
            "travel advice",
            "travel restrictions",
            "safe to travel",
            "travel guidance",
            "trip safety",
        ],
        exact_matches: &["travel advisory"],
        weight: 2.5,
    },
    RuleSpec {
        intent: Intent::HospitalCapacity,
        keywords: &[
            r"\bhospital\b",
            r"\bicu\b",
            r"\bbed\b",
            r"\bcapacity\b",
            r"\bavailable\b",
            r"\bfull\b",
        ],
        phrases: &[
            "hospital capacity",
            "icu availability",
            "bed shortage",
            "hospital full",
            "medical capacity",
        ],
        exact_matches: &["icu beds"],
        weight: 2.5,
    },
    RuleSpec {
        intent: Intent::RumorValidation,
        keywords: &[
            r"\brumor\b",
            r"\bheard\b",
            r"\btrue\b",
            r"\bfalse\b",
            r"\bverify\b",
            r"\bcheck\b",
            r"\bclaim\b",
        ],
        phrases: &[
            "is it true",
            "verify claim",
            "fact check",
            "rumor validation",
            "heard that",
            "check if",
        ],
        exact_matches: &["fact check"],
        weight: 2.0,
    },
    RuleSpec {
        intent: Intent::GeneralInformation,
        keywords: &[
            r"\bwhat\b",
            r"\bhow\b",
            r"\bwhen\b",
            r"\bwhere\b",
            r"\binfo\b",
            r"\bhelp\b",
        ],
        phrases: &[
            "general information",
            "tell me about",
            "help with",
            "information about",
        ],
        exact_matches: &["help", "info"],
        weight: 1.0,
    },
    RuleSpec {
        intent: Intent::EmergencyAlert,
        keywords: &[
            r"\bemergency\b",
            r"\bcrisis\b",
            r"\burgent\b",
            r"\bcritical\b",
            r"\balert\b",
            r"\bimmediate\b",
        ],
        phrases: &[
            "emergency alert",
            "crisis situation",
            "urgent response",
            "critical outbreak",
            "immediate action",
        ],
        exact_matches: &["emergency"],
        weight: 3.0,
    },
];

/// Compiled matching rule for a single intent.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub intent: Intent,
    pub keywords: Vec<Regex>,
    pub phrases: &'static [&'static str],
    pub exact_matches: &'static [&'static str],
    pub weight: f32,
}

/// Score of one rule against one query, with the fragments that contributed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleScore {
    pub score: f32,
    pub matched: Vec<String>,
}

impl PatternRule {
    /// Scores an already lower-cased query.
    pub fn score(&self, lowered: &str) -> RuleScore {
        let mut result = RuleScore::default();
        let trimmed = lowered.trim();

        for keyword in &self.keywords {
            if let Some(m) = keyword.find(lowered) {
                result.score += self.weight;
                result.matched.push(m.as_str().to_string());
            }
        }

        for phrase in self.phrases {
            if lowered.contains(phrase) {
                result.score += self.weight * PHRASE_MULTIPLIER;
                result.matched.push((*phrase).to_string());
            }
        }

        for exact in self.exact_matches {
            if *exact == trimmed {
                result.score += EXACT_MATCH_BONUS;
                result.matched.push(format!("={}", exact));
            }
        }

        result
    }
}

/// Immutable table of rules, one per intent, in `Intent::ALL` order.
#[derive(Debug)]
pub struct PatternCatalog {
    rules: Vec<PatternRule>,
}

static GLOBAL_CATALOG: LazyLock<Result<PatternCatalog, AppError>> =
    LazyLock::new(PatternCatalog::load);

impl PatternCatalog {
    /// Compiles and validates the built-in table.
    pub fn load() -> Result<Self, AppError> {
        if RULE_SPECS.len() != Intent::ALL.len() {
            return Err(AppError::Config(format!(
                "pattern catalog has {} rules for {} intents",
                RULE_SPECS.len(),
                Intent::ALL.len()
            )));
        }

        let mut rules = Vec::with_capacity(RULE_SPECS.len());
        for (spec, expected) in RULE_SPECS.iter().zip(Intent::ALL) {
            if spec.intent != expected {
                return Err(AppError::Config(format!(
                    "pattern catalog out of order: found {} where {} was expected",
                    spec.intent, expected
                )));
            }
            let keywords = spec
                .keywords
                .iter()
                .map(|pattern| Regex::new(pattern))
                .collect::<Result<Vec<_>, _>>()?;
            rules.push(PatternRule {
                intent: spec.intent,
                keywords,
                phrases: spec.phrases,
                exact_matches: spec.exact_matches,
                weight: spec.weight,
            });
        }

        Ok(Self { rules })
    }

    /// Shared catalog, loaded on first use.
    pub fn global() -> Result<&'static PatternCatalog, AppError> {
        GLOBAL_CATALOG.as_ref().map_err(Clone::clone)
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn rule(&self, intent: Intent) -> Option<&PatternRule> {
        self.rules.iter().find(|rule| rule.intent == intent)
    }
}
