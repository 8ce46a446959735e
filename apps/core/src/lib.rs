// Outbreak Intelligence core
// Request routing and multi-stage outbreak analysis

pub mod actors;
pub mod brain;
pub mod config;
pub mod error;
pub mod workflow;

pub use brain::{Router, RoutingDecision};
pub use config::Settings;
pub use error::{AppError, ProviderError};
pub use workflow::{FinalReport, Workflow};

#[cfg(test)]
mod tests;
