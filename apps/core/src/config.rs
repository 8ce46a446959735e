use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

const ENV_STAGE_TIMEOUT: &str = "OUTBREAK_STAGE_TIMEOUT_SECS";
const ENV_STATE_CAPACITY: &str = "OUTBREAK_STATE_CAPACITY";
const ENV_MAX_INPUT_CHARS: &str = "OUTBREAK_MAX_INPUT_CHARS";
const ENV_RECORD_RISK_STAGE: &str = "OUTBREAK_RECORD_RISK_STAGE";
const ENV_WORKFLOW_PREFIX: &str = "OUTBREAK_WORKFLOW_PREFIX";
const ENV_DEFAULT_AUDIENCE: &str = "OUTBREAK_DEFAULT_AUDIENCE";

/// Runtime configuration for the router and the analysis workflow.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct Settings {
    /// Upper bound for every collaborator call, in seconds. A timeout is handled like a provider error.
    #[validate(range(min = 1, max = 600))]
    pub stage_timeout_secs: u64,
    /// Maximum number of workflow contexts kept in the state store before LRU eviction.
    #[validate(range(min = 1))]
    pub state_capacity: usize,
    /// Inputs longer than this are routed to the fallback decision.
    #[validate(range(min = 1))]
    pub max_input_chars: usize,
    /// When set, RISK_ASSESSMENT is recorded as its own transition after DATA_COLLECTION.
    pub record_risk_assessment_stage: bool,
    /// Prefix of generated workflow ids.
    #[validate(length(min = 1))]
    pub workflow_id_prefix: String,
    /// Audience used by callers that do not name one.
    #[validate(length(min = 1))]
    pub default_target_audience: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stage_timeout_secs: 30,
            state_capacity: 1024,
            max_input_chars: 4096,
            record_risk_assessment_stage: false,
            workflow_id_prefix: "PHX-WF".to_string(),
            default_target_audience: "general_public".to_string(),
        }
    }
}

impl Settings {
    /// Builds settings from `OUTBREAK_*` environment variables, falling back to defaults
    /// for unset variables, and validates the result.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        let settings = Self {
            stage_timeout_secs: env_or(ENV_STAGE_TIMEOUT, defaults.stage_timeout_secs)?,
            state_capacity: env_or(ENV_STATE_CAPACITY, defaults.state_capacity)?,
            max_input_chars: env_or(ENV_MAX_INPUT_CHARS, defaults.max_input_chars)?,
            record_risk_assessment_stage: env_or(
                ENV_RECORD_RISK_STAGE,
                defaults.record_risk_assessment_stage,
            )?,
            workflow_id_prefix: env_or(ENV_WORKFLOW_PREFIX, defaults.workflow_id_prefix)?,
            default_target_audience: env_or(ENV_DEFAULT_AUDIENCE, defaults.default_target_audience)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}
