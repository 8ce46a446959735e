pub mod messages;
pub mod supervisor;
pub mod traits;

pub use supervisor::WorkflowHandle;
