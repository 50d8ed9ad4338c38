//! Error types for the trainer_core library.

use crate::types::{PlanId, TraineeId};
use std::fmt;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Storage write that an evaluation depends on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageOp {
    ClearSessions,
    SetPlan,
    SetFitnessLevel,
    AppendSession,
    TouchActivity,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageOp::ClearSessions => "clear sessions",
            StorageOp::SetPlan => "set plan",
            StorageOp::SetFitnessLevel => "set fitness level",
            StorageOp::AppendSession => "append session",
            StorageOp::TouchActivity => "record activity",
        };
        f.write_str(name)
    }
}

/// Core error type for trainer_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plan catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Trainee state error (corrupt profile, duplicate enrolment)
    #[error("State error: {0}")]
    State(String),

    /// A session row failed validation at ingestion
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// Exercise name is not part of the catalog
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    /// No target table exists for the plan
    #[error("Unknown plan: {0}")]
    UnknownPlan(PlanId),

    /// No profile exists for the trainee
    #[error("Trainee {0} not found")]
    TraineeNotFound(TraineeId),

    /// A write required by a promotion or reset did not complete
    #[error("Storage write failed ({operation}): {source}")]
    StorageWriteFailed {
        operation: StorageOp,
        #[source]
        source: Box<Error>,
    },

    /// A promotion write failed and putting the earlier writes back failed too
    #[error("Storage write failed ({operation}): {source}; restoring the previous plan also failed: {rollback}")]
    RollbackFailed {
        operation: StorageOp,
        #[source]
        source: Box<Error>,
        rollback: Box<Error>,
    },
}

impl Error {
    pub(crate) fn write_failed(operation: StorageOp, source: Error) -> Self {
        Error::StorageWriteFailed {
            operation,
            source: Box::new(source),
        }
    }

    /// Attach a failed restore to a write failure
    pub(crate) fn with_rollback(self, rollback: Error) -> Self {
        match self {
            Error::StorageWriteFailed { operation, source } => Error::RollbackFailed {
                operation,
                source,
                rollback: Box::new(rollback),
            },
            other => other,
        }
    }
}
