//! Entity Extraction using fixed regex lists.
//!
//! Pulls locations, dates, health terms, facility types and urgency markers out
//! of a request. Location patterns rely on capitalization and are matched
//! case-sensitively; every other category is case-insensitive and lower-cased.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

// NOTE: expect() is acceptable here: literal patterns, exercised by the tests below.
static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b([A-Z][a-z]+ (?:County|Parish))\b").expect("Invalid regex: county names"),
        Regex::new(r"\b([A-Z][a-z]+, [A-Z]{2})\b").expect("Invalid regex: city, state"),
        Regex::new(r"\b(California|Texas|New York|Florida|Illinois|Pennsylvania|Ohio|Georgia|North Carolina|Michigan)\b")
            .expect("Invalid regex: state names"),
        Regex::new(r"\b([A-Z][a-z]+ [A-Z][a-z]+(?:, [A-Z]{2})?)\b").expect("Invalid regex: city names"),
    ]
});

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(today|yesterday|tomorrow)\b").expect("Invalid regex: relative days"),
        Regex::new(r"(?i)\b(this week|next week|last week)\b").expect("Invalid regex: relative weeks"),
        Regex::new(r"(?i)\b(this month|next month|last month)\b").expect("Invalid regex: relative months"),
        Regex::new(r"\b(\d{1,2}/\d{1,2}/\d{4})\b").expect("Invalid regex: US dates"),
        Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("Invalid regex: ISO dates"),
    ]
});

static HEALTH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(covid|coronavirus|influenza|flu|pneumonia)\b").expect("Invalid regex: diseases"),
        Regex::new(r"(?i)\b(outbreak|epidemic|pandemic)\b").expect("Invalid regex: outbreak terms"),
        Regex::new(r"(?i)\b(symptoms|fever|cough|shortness of breath)\b").expect("Invalid regex: symptoms"),
    ]
});

static FACILITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(hospital|clinic|school|workplace|restaurant|gym)\b").expect("Invalid regex: facilities"),
        Regex::new(r"(?i)\b(nursing home|long-term care|assisted living)\b").expect("Invalid regex: care facilities"),
        Regex::new(r"(?i)\b(airport|public transport|bus|train)\b").expect("Invalid regex: transport"),
    ]
});

static URGENCY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(urgent|emergency|immediate|asap|critical)\b").expect("Invalid regex: urgency words"),
        Regex::new(r"(?i)\b(now|quickly|fast|rapid)\b").expect("Invalid regex: speed words"),
    ]
});

/// Entities found in a request, one deduplicated set per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBag {
    pub locations: BTreeSet<String>,
    pub dates: BTreeSet<String>,
    pub health_conditions: BTreeSet<String>,
    pub facility_types: BTreeSet<String>,
    pub urgency_indicators: BTreeSet<String>,
}

impl EntityBag {
    /// Bag holding only the caller's location context, if any.
    pub fn from_location(location_context: Option<&str>) -> Self {
        let mut bag = Self::default();
        if let Some(location) = location_context {
            bag.locations.insert(location.to_string());
        }
        bag
    }

    pub fn has_facility(&self, facility: &str) -> bool {
        self.facility_types.contains(facility)
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
            && self.dates.is_empty()
            && self.health_conditions.is_empty()
            && self.facility_types.is_empty()
            && self.urgency_indicators.is_empty()
    }
}

/// Regex-based entity extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract entities from `text`, adding `location_context` to the locations.
    pub fn extract(&self, text: &str, location_context: Option<&str>) -> EntityBag {
        let mut bag = EntityBag {
            locations: collect(&LOCATION_PATTERNS, text, false),
            dates: collect(&DATE_PATTERNS, text, true),
            health_conditions: collect(&HEALTH_PATTERNS, text, true),
            facility_types: collect(&FACILITY_PATTERNS, text, true),
            urgency_indicators: collect(&URGENCY_PATTERNS, text, true),
        };

        if let Some(location) = location_context {
            bag.locations.insert(location.to_string());
        }

        bag
    }
}

fn collect(patterns: &[Regex], text: &str, lowercase: bool) -> BTreeSet<String> {
    patterns
        .iter()
        .flat_map(|pattern| pattern.captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            if lowercase {
                m.as_str().to_lowercase()
            } else {
                m.as_str().to_string()
            }
        })
        .collect()
}
