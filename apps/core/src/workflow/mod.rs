//! # Workflow Module
//!
//! Multi-stage outbreak analysis: risk assessment, public guidance and
//! resource planning, compiled into a single report.
//!
//! ## Components
//! - `payloads`: Collaborator inputs/outputs and their fallbacks
//! - `state`: Stages, per-run context and the bounded state store
//! - `stages`: Timeout-bounded collaborator calls
//! - `report`: Deterministic report compilation
//! - `orchestrator`: Stage sequencing

pub mod orchestrator;
pub mod payloads;
pub mod report;
pub mod stages;
pub mod state;

pub use orchestrator::{Workflow, WorkflowBuilder};
pub use payloads::{Guidance, ResourceReport, RiskAnalysis, RiskLevel, RumorValidation};
pub use report::{FinalReport, ReportCompiler};
pub use state::{Clock, StateStore, SystemClock, WorkflowContext, WorkflowStage, WorkflowStatus};
