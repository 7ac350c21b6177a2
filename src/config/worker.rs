//! Background worker configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Background worker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Seconds between queue polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Maximum tasks claimed per poll
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Attempts before a task is parked as permanently failed
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Days without activity before an account is deactivated
    #[serde(default = "default_inactive_days")]
    pub inactive_days: u32,

    /// Days to keep processed webhook events before pruning
    #[serde(default = "default_webhook_retention_days")]
    pub webhook_retention_days: u32,
}

impl WorkerConfig {
    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate worker configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval_secs == 0 {
            return Err(ValidationError::InvalidWorkerInterval);
        }
        if self.batch_size == 0 || self.batch_size > 100 {
            return Err(ValidationError::InvalidBatchSize);
        }
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(ValidationError::InvalidAttemptBudget);
        }
        if self.inactive_days == 0 {
            return Err(ValidationError::InvalidInactivityWindow);
        }
        Ok(())
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            inactive_days: default_inactive_days(),
            webhook_retention_days: default_webhook_retention_days(),
        }
    }
}

fn default_poll_interval() -> u64 {
    10
}

fn default_batch_size() -> u32 {
    10
}

fn default_max_attempts() -> u32 {
    5
}

fn default_inactive_days() -> u32 {
    30
}

fn default_webhook_retention_days() -> u32 {
    90
}
