//! Workflow state: stages, per-run context and the bounded store holding them.

use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

use crate::brain::AgentKind;
use crate::error::AppError;

/// Ordered pipeline stages. A run only ever moves forward through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Initialization,
    DataCollection,
    RiskAssessment,
    GuidanceGeneration,
    ResourcePlanning,
    ReportCompilation,
    Finalization,
}

impl WorkflowStage {
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowStage::Initialization => "initialization",
            WorkflowStage::DataCollection => "data_collection",
            WorkflowStage::RiskAssessment => "risk_assessment",
            WorkflowStage::GuidanceGeneration => "guidance_generation",
            WorkflowStage::ResourcePlanning => "resource_planning",
            WorkflowStage::ReportCompilation => "report_compilation",
            WorkflowStage::Finalization => "finalization",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkflowStatus {
    Running,
    Completed,
    Failed,
}

/// Record of one workflow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowContext {
    pub id: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    /// Which collaborators were configured when the run started
    pub agent_availability: BTreeMap<AgentKind, bool>,
    pub current_stage: WorkflowStage,
    pub stage_timestamp: DateTime<Utc>,
    /// Every stage entered so far, in order
    pub stages_visited: Vec<WorkflowStage>,
    pub status: WorkflowStatus,
    pub error: Option<String>,
    pub completion_time: Option<DateTime<Utc>>,
    pub error_time: Option<DateTime<Utc>>,
}

impl WorkflowContext {
    pub fn new(
        id: String,
        location: String,
        start_time: DateTime<Utc>,
        agent_availability: BTreeMap<AgentKind, bool>,
    ) -> Self {
        Self {
            id,
            location,
            start_time,
            agent_availability,
            current_stage: WorkflowStage::Initialization,
            stage_timestamp: start_time,
            stages_visited: vec![WorkflowStage::Initialization],
            status: WorkflowStatus::Running,
            error: None,
            completion_time: None,
            error_time: None,
        }
    }
}

/// Source of "now" for workflow timestamps and ids.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Sequence shared by every generator in the process, so workflows that share
/// a prefix and a state store never hand out the same id.
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Generates `<prefix>-YYYYMMDD-HHMMSS-<sequence>` ids.
#[derive(Debug, Clone)]
pub struct WorkflowIdGenerator {
    prefix: String,
}

impl WorkflowIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn next_id(&self, now: DateTime<Utc>) -> String {
        let sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}-{:04}", self.prefix, now.format("%Y%m%d-%H%M%S"), sequence)
    }
}

/// Bounded, shareable map of workflow contexts keyed by workflow id.
///
/// Least recently touched contexts are evicted once `capacity` is reached.
pub struct StateStore {
    inner: Mutex<LruCache<String, WorkflowContext>>,
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.lock();
        f.debug_struct("StateStore")
            .field("len", &guard.len())
            .field("capacity", &guard.cap())
            .finish()
    }
}

impl StateStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, AppError> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| AppError::Config("state store capacity must be at least 1".to_string()))?;
        Ok(Self::new(capacity))
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, WorkflowContext>> {
        // Contexts are plain data; a panic mid-update cannot leave them unusable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a new context. An id already present is refused, never overwritten.
    pub fn insert(&self, context: WorkflowContext) -> Result<(), AppError> {
        let mut guard = self.lock();
        if guard.contains(&context.id) {
            return Err(AppError::Orchestration(format!(
                "workflow {} is already registered",
                context.id
            )));
        }
        if let Some((evicted, _)) = guard.push(context.id.clone(), context) {
            warn!("State store full, evicted workflow {}", evicted);
        }
        Ok(())
    }

    /// Moves a workflow to `stage`. Entering a stage at or before the current one is an error.
    pub fn advance(&self, id: &str, stage: WorkflowStage, at: DateTime<Utc>) -> Result<(), AppError> {
        let mut guard = self.lock();
        let Some(context) = guard.get_mut(id) else {
            warn!("Workflow {} no longer in state store, stage {} not recorded", id, stage);
            return Ok(());
        };

        if stage <= context.current_stage {
            return Err(AppError::Orchestration(format!(
                "workflow {} cannot move from {} back to {}",
                id, context.current_stage, stage
            )));
        }

        context.current_stage = stage;
        context.stage_timestamp = at;
        context.stages_visited.push(stage);
        Ok(())
    }

    pub fn complete(&self, id: &str, at: DateTime<Utc>) {
        if let Some(context) = self.lock().get_mut(id) {
            context.status = WorkflowStatus::Completed;
            context.completion_time = Some(at);
        }
    }

    pub fn fail(&self, id: &str, error: &AppError, at: DateTime<Utc>) {
        if let Some(context) = self.lock().get_mut(id) {
            context.status = WorkflowStatus::Failed;
            context.error = Some(error.to_string());
            context.error_time = Some(at);
        }
    }

    /// Snapshot of a workflow's context, without refreshing its eviction rank.
    pub fn get(&self, id: &str) -> Option<WorkflowContext> {
        self.lock().peek(id).cloned()
    }

    /// Snapshots of every stored context, most recently touched first.
    pub fn snapshot(&self) -> Vec<WorkflowContext> {
        self.lock().iter().map(|(_, context)| context.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}
