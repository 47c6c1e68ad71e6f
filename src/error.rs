//! Error types for packet-flow operations.
//!
//! Defines the error types for the simulator subsystems:
//! - Packet store mutations
//! - Simulation configuration
//! - The real-time runner

use std::time::Duration;

use thiserror::Error;

use crate::pipeline::{PacketId, Stage};

/// Errors that can occur while mutating the packet store.
///
/// Only `NotFound` is expected at runtime (a packet evicted by one tick and
/// referenced by another); the other variants indicate a policy bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Packet {0} not found in store")]
    NotFound(PacketId),

    #[error("Stage '{stage}' is at capacity ({capacity})")]
    CapacityExceeded { stage: Stage, capacity: usize },

    #[error("Invalid stage transition for packet {id} from '{from}' to '{to}'")]
    InvalidTransition { id: PacketId, from: Stage, to: Stage },

    #[error("Packet {0} already exists in store")]
    DuplicateId(PacketId),
}

/// Errors that can occur when validating a simulation configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Capacity for stage '{0}' must be greater than 0")]
    ZeroCapacity(Stage),

    #[error("Tick period for timer '{timer}' must be greater than 0, got {period:?}")]
    ZeroPeriod { timer: String, period: Duration },

    #[error("Flag rate must be between 0.0 and 1.0, got {0}")]
    InvalidFlagRate(f64),

    #[error("Task catalog cannot be empty")]
    EmptyCatalog,

    #[error("Staged decisions require a settle period")]
    MissingSettlePeriod,

    #[error("No eviction timer covers stage '{0}'")]
    MissingEviction(Stage),

    #[error("Unknown simulation profile '{0}': must be 'pipeline' or 'loop'")]
    UnknownProfile(String),
}

/// Errors that can occur while driving the real-time runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Runner is not running")]
    NotRunning,

    #[error("Runner task panicked: {0}")]
    TaskPanicked(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound(PacketId::new(7));
        assert!(err.to_string().contains("7"));
        assert!(err.to_string().contains("not found"));

        let err = StoreError::CapacityExceeded {
            stage: Stage::Intake,
            capacity: 6,
        };
        assert_eq!(err.to_string(), "Stage 'intake' is at capacity (6)");

        let err = StoreError::InvalidTransition {
            id: PacketId::new(3),
            from: Stage::Verified,
            to: Stage::Reviewing,
        };
        assert!(err.to_string().contains("'verified'"));
        assert!(err.to_string().contains("'reviewing'"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidFlagRate(1.5);
        assert!(err.to_string().contains("1.5"));

        let err = ConfigError::ZeroPeriod {
            timer: "spawn".to_string(),
            period: Duration::ZERO,
        };
        assert!(err.to_string().contains("spawn"));

        let err = ConfigError::UnknownProfile("fast".to_string());
        assert!(err.to_string().contains("fast"));
    }

    #[test]
    fn test_runner_error_from_config() {
        let err: RunnerError = ConfigError::EmptyCatalog.into();
        assert!(err.to_string().contains("catalog"));
    }
}
