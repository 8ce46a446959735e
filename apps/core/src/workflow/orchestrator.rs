//! Full-analysis orchestrator.
//!
//! Runs the collaborators strictly in sequence, substitutes a fallback payload
//! for any stage that fails or times out, and compiles the final report.
//! Only a missing collaborator, a blank location or a stage regression is fatal.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn, Span};

use super::payloads::{Guidance, ResourceReport, RiskAnalysis};
use super::report::{Components, FinalReport, ReportCompiler};
use super::stages::StageExecutor;
use super::state::{Clock, StateStore, SystemClock, WorkflowContext, WorkflowIdGenerator, WorkflowStage};
use crate::actors::traits::{GuidanceProvider, ResourceProvider, RiskAnalysisProvider, RumorValidationProvider};
use crate::brain::AgentKind;
use crate::config::Settings;
use crate::error::AppError;
use validator::Validate;

/// Collaborators verified at initialization.
struct Collaborators<'a> {
    risk: &'a Arc<dyn RiskAnalysisProvider>,
    rumors: Option<&'a Arc<dyn RumorValidationProvider>>,
    guidance: &'a Arc<dyn GuidanceProvider>,
    resources: &'a Arc<dyn ResourceProvider>,
}

/// Builder for [`Workflow`]. Collaborators are optional here so that a
/// misconfigured workflow is reported when it runs, not when it is built.
pub struct WorkflowBuilder {
    settings: Settings,
    risk: Option<Arc<dyn RiskAnalysisProvider>>,
    rumors: Option<Arc<dyn RumorValidationProvider>>,
    guidance: Option<Arc<dyn GuidanceProvider>>,
    resources: Option<Arc<dyn ResourceProvider>>,
    state: Option<Arc<StateStore>>,
    clock: Option<Arc<dyn Clock>>,
}

impl WorkflowBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            risk: None,
            rumors: None,
            guidance: None,
            resources: None,
            state: None,
            clock: None,
        }
    }

    pub fn risk_provider(mut self, provider: Arc<dyn RiskAnalysisProvider>) -> Self {
        self.risk = Some(provider);
        self
    }

    pub fn rumor_validator(mut self, provider: Arc<dyn RumorValidationProvider>) -> Self {
        self.rumors = Some(provider);
        self
    }

    pub fn guidance_provider(mut self, provider: Arc<dyn GuidanceProvider>) -> Self {
        self.guidance = Some(provider);
        self
    }

    pub fn resource_provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.resources = Some(provider);
        self
    }

    /// Share a state store between workflows. Defaults to a private store sized by settings.
    pub fn state_store(mut self, store: Arc<StateStore>) -> Self {
        self.state = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<Workflow, AppError> {
        self.settings.validate()?;

        let state = match self.state {
            Some(store) => store,
            None => Arc::new(StateStore::with_capacity(self.settings.state_capacity)?),
        };

        Ok(Workflow {
            ids: WorkflowIdGenerator::new(self.settings.workflow_id_prefix.clone()),
            executor: StageExecutor::new(self.settings.stage_timeout()),
            compiler: ReportCompiler::new(),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            risk: self.risk,
            rumors: self.rumors,
            guidance: self.guidance,
            resources: self.resources,
            state,
            settings: self.settings,
        })
    }
}

/// Multi-stage outbreak analysis over the configured collaborators.
pub struct Workflow {
    risk: Option<Arc<dyn RiskAnalysisProvider>>,
    rumors: Option<Arc<dyn RumorValidationProvider>>,
    guidance: Option<Arc<dyn GuidanceProvider>>,
    resources: Option<Arc<dyn ResourceProvider>>,
    state: Arc<StateStore>,
    clock: Arc<dyn Clock>,
    ids: WorkflowIdGenerator,
    executor: StageExecutor,
    compiler: ReportCompiler,
    settings: Settings,
}

impl Workflow {
    pub fn builder(settings: Settings) -> WorkflowBuilder {
        WorkflowBuilder::new(settings)
    }

    /// Runs every stage for `location` and returns the compiled report.
    ///
    /// Collaborator failures and timeouts never surface here; they show up as
    /// `error` fields on the affected report components.
    #[instrument(skip(self), fields(workflow_id = tracing::field::Empty))]
    pub async fn execute_full_analysis(
        &self,
        location: &str,
        target_audience: &str,
        generate_pdf: bool,
    ) -> Result<FinalReport, AppError> {
        let started = self.clock.now();
        let workflow_id = self.ids.next_id(started);
        Span::current().record("workflow_id", workflow_id.as_str());
        info!("Starting full analysis for {}", location);

        if let Err(e) = self.state.insert(WorkflowContext::new(
            workflow_id.clone(),
            location.to_string(),
            started,
            self.agent_availability(),
        )) {
            error!("Workflow {} could not be registered: {}", workflow_id, e);
            return Err(e);
        }

        let result = match self.initialize(location) {
            Ok(collaborators) => {
                self.run_stages(&workflow_id, location, target_audience, generate_pdf, collaborators)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(report) => {
                self.state.complete(&workflow_id, self.clock.now());
                info!(degraded = report.is_degraded(), "Workflow {} completed", workflow_id);
                Ok(report)
            }
            Err(e) => {
                error!("Workflow {} failed: {}", workflow_id, e);
                self.state.fail(&workflow_id, &e, self.clock.now());
                Err(e)
            }
        }
    }

    fn initialize(&self, location: &str) -> Result<Collaborators<'_>, AppError> {
        let risk = self
            .risk
            .as_ref()
            .ok_or_else(|| AppError::Config("Risk analysis provider not configured".to_string()))?;
        let guidance = self
            .guidance
            .as_ref()
            .ok_or_else(|| AppError::Config("Guidance provider not configured".to_string()))?;
        let resources = self
            .resources
            .as_ref()
            .ok_or_else(|| AppError::Config("Resource provider not configured".to_string()))?;

        if location.trim().is_empty() {
            return Err(AppError::Validation("Location must not be blank".to_string()));
        }

        Ok(Collaborators {
            risk,
            rumors: self.rumors.as_ref(),
            guidance,
            resources,
        })
    }

    async fn run_stages(
        &self,
        workflow_id: &str,
        location: &str,
        target_audience: &str,
        generate_pdf: bool,
        collaborators: Collaborators<'_>,
    ) -> Result<FinalReport, AppError> {
        self.enter(workflow_id, WorkflowStage::DataCollection)?;
        if self.settings.record_risk_assessment_stage {
            self.enter(workflow_id, WorkflowStage::RiskAssessment)?;
        }
        let risk = match self
            .executor
            .risk(collaborators.risk, collaborators.rumors, location)
            .await
        {
            Ok(risk) => risk,
            Err(e) => {
                warn!("Risk assessment failed, using fallback: {}", e);
                RiskAnalysis::fallback(location, &e)
            }
        };

        self.enter(workflow_id, WorkflowStage::GuidanceGeneration)?;
        let guidance = match self
            .executor
            .guidance(collaborators.guidance, &risk, location, target_audience)
            .await
        {
            Ok(guidance) => guidance,
            Err(e) => {
                warn!("Guidance generation failed, using fallback: {}", e);
                Guidance::fallback(location, target_audience, risk.risk_level, &e)
            }
        };

        self.enter(workflow_id, WorkflowStage::ResourcePlanning)?;
        let resources = match self
            .executor
            .resource(collaborators.resources, &risk, location)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                warn!("Resource planning failed, using fallback: {}", e);
                ResourceReport::fallback(location, &risk, &e)
            }
        };

        self.enter(workflow_id, WorkflowStage::ReportCompilation)?;
        let report = self.compiler.compile(
            workflow_id,
            self.clock.now(),
            location,
            Components {
                risk_assessment: risk,
                public_guidance: guidance,
                resource_allocation: resources,
            },
            generate_pdf,
        );

        self.enter(workflow_id, WorkflowStage::Finalization)?;
        Ok(report)
    }

    fn enter(&self, workflow_id: &str, stage: WorkflowStage) -> Result<(), AppError> {
        info!("Workflow {} entering {}", workflow_id, stage);
        self.state.advance(workflow_id, stage, self.clock.now())
    }

    fn agent_availability(&self) -> BTreeMap<AgentKind, bool> {
        BTreeMap::from([
            (AgentKind::DataIntelligence, self.risk.is_some()),
            (AgentKind::PublicGuidance, self.guidance.is_some()),
            (AgentKind::ResourcePlanning, self.resources.is_some()),
        ])
    }

    /// Snapshot of a workflow's context; `None` if unknown or evicted.
    pub fn get_workflow_status(&self, workflow_id: &str) -> Option<WorkflowContext> {
        self.state.get(workflow_id)
    }

    pub fn state_store(&self) -> &Arc<StateStore> {
        &self.state
    }

    pub fn default_audience(&self) -> &str {
        &self.settings.default_target_audience
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
