use crate::actors::messages::WorkflowMessage;
use crate::error::AppError;
use crate::workflow::{FinalReport, Workflow, WorkflowContext};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{info, instrument, warn};

const CHANNEL_CAPACITY: usize = 32;
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// A handle to the workflow actor.
///
/// Cheap to clone. Every analysis runs as its own task, so a slow collaborator
/// in one run never delays another run or a status query.
#[derive(Clone)]
pub struct WorkflowHandle {
    sender: mpsc::Sender<WorkflowMessage>,
    /// Upper bound for a full analysis: every stage may hit its timeout.
    analysis_timeout: Duration,
}

impl WorkflowHandle {
    /// Spawns the actor on the current tokio runtime and returns a handle to it.
    pub fn new(workflow: Arc<Workflow>) -> Self {
        // risk + rumor validation + guidance + resources, plus slack for compilation
        let analysis_timeout = workflow.settings().stage_timeout() * 4 + STATUS_TIMEOUT;
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let runner = WorkflowRunner { receiver, workflow };
        tokio::spawn(async move { runner.run().await });
        Self {
            sender,
            analysis_timeout,
        }
    }

    /// Runs a full analysis.
    ///
    /// # Arguments
    ///
    /// * `location` - Area to analyze.
    /// * `target_audience` - Audience for the guidance; `None` uses the configured default.
    /// * `generate_pdf` - Recorded on the report as `pdf_requested`.
    #[instrument(skip(self))]
    pub async fn run_analysis(
        &self,
        location: String,
        target_audience: Option<String>,
        generate_pdf: bool,
    ) -> Result<FinalReport, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = WorkflowMessage::RunAnalysis {
            location,
            target_audience,
            generate_pdf,
            responder: send,
        };
        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))?;
        timeout(self.analysis_timeout, recv)
            .await?
            .map_err(|e| AppError::Actor(e.to_string()))?
    }

    /// Snapshot of a workflow's context; `Ok(None)` if the id is unknown or evicted.
    pub async fn workflow_status(&self, workflow_id: String) -> Result<Option<WorkflowContext>, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = WorkflowMessage::GetStatus {
            workflow_id,
            responder: send,
        };
        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))?;
        timeout(STATUS_TIMEOUT, recv)
            .await?
            .map_err(|e| AppError::Actor(e.to_string()))
    }

    /// Stops the actor. Later calls on any clone of this handle fail with `AppError::Actor`.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.sender
            .send(WorkflowMessage::Shutdown)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))
    }
}

// --- Actor Runner ---
struct WorkflowRunner {
    receiver: mpsc::Receiver<WorkflowMessage>,
    workflow: Arc<Workflow>,
}

impl WorkflowRunner {
    async fn run(mut self) {
        info!("Workflow actor started");
        while let Some(msg) = self.receiver.recv().await {
            if !self.handle_message(msg) {
                break;
            }
        }
        info!("Workflow actor stopped");
    }

    /// Returns false once the actor should stop.
    fn handle_message(&self, msg: WorkflowMessage) -> bool {
        match msg {
            WorkflowMessage::RunAnalysis {
                location,
                target_audience,
                generate_pdf,
                responder,
            } => {
                let workflow = Arc::clone(&self.workflow);
                tokio::spawn(async move {
                    let audience = target_audience.unwrap_or_else(|| workflow.default_audience().to_string());
                    let result = workflow
                        .execute_full_analysis(&location, &audience, generate_pdf)
                        .await;
                    if responder.send(result).is_err() {
                        warn!("Caller for {} analysis went away before the report was ready", location);
                    }
                });
                true
            }
            WorkflowMessage::GetStatus { workflow_id, responder } => {
                let _ = responder.send(self.workflow.get_workflow_status(&workflow_id));
                true
            }
            WorkflowMessage::Shutdown => {
                info!("Workflow actor shutting down...");
                false
            }
        }
    }
}
