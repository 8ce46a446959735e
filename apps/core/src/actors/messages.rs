use tokio::sync::oneshot;

use crate::error::AppError;
use crate::workflow::{FinalReport, WorkflowContext};

/// Messages that can be sent to the workflow actor.
#[derive(Debug)]
pub enum WorkflowMessage {
    /// Run a full analysis for a location.
    RunAnalysis {
        location: String,
        /// `None` uses the configured default audience.
        target_audience: Option<String>,
        generate_pdf: bool,
        /// A channel to send the compiled report (or fatal error) back.
        responder: oneshot::Sender<Result<FinalReport, AppError>>,
    },
    /// Look up the context of a workflow by id.
    GetStatus {
        workflow_id: String,
        responder: oneshot::Sender<Option<WorkflowContext>>,
    },
    /// Stop the actor. Analyses already started run to completion.
    Shutdown,
}
