//! # Brain Module
//!
//! Fast, deterministic request routing. Decides which agent should handle a
//! free-text request before any expensive analysis runs.
//!
//! ## Components
//! - `patterns`: Declarative per-intent pattern catalog
//! - `intent`: Weighted intent classification
//! - `entities`: Regex entity extraction
//! - `strategy`: Routing strategy resolution
//! - `decision`: Output data structure
//! - `router`: Main orchestrator

pub mod decision;
pub mod entities;
pub mod intent;
pub mod patterns;
pub mod router;
pub mod strategy;

pub use decision::RoutingDecision;
pub use entities::{EntityBag, EntityExtractor};
pub use intent::{ClassificationResult, Intent, IntentClassifier};
pub use patterns::{PatternCatalog, PatternRule};
pub use router::Router;
pub use strategy::{AgentKind, PriorityLevel, RoutingStrategy, RoutingStrategyResolver, WorkflowType};
