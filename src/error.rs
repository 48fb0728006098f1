//! Error taxonomy for wizard operations.

use serde::{Deserialize, Serialize};

use crate::gateway::GatewayError;
use crate::resource::{ResourceId, ResourceKind};
use crate::step::WizardStep;

/// Errors returned by workflow state mutations and step operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    /// A required predecessor does not exist yet.
    #[error("{step}: {reason}")]
    PreconditionNotMet {
        /// Step whose operation was attempted.
        step: WizardStep,
        /// What is missing.
        reason: &'static str,
    },

    /// An at-most-once operation was already performed.
    #[error("{step}: {reason}")]
    InvalidTransition {
        /// Step whose operation was attempted.
        step: WizardStep,
        /// What was already done.
        reason: &'static str,
    },

    /// Input rejected before reaching the gateway.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The same payload was already submitted in this session.
    #[error("duplicate {kind} submission")]
    DuplicateSubmission {
        /// Kind of resource that was submitted twice.
        kind: ResourceKind,
        /// Identifier created by the first submission, if tracked.
        existing: Option<ResourceId>,
    },

    /// The remote call failed. Carries the gateway's message verbatim.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Another operation is in flight for this session.
    #[error("another submission is in progress")]
    Busy,
}

impl WizardError {
    pub(crate) const fn precondition(step: WizardStep, reason: &'static str) -> Self {
        Self::PreconditionNotMet { step, reason }
    }

    pub(crate) const fn transition(step: WizardStep, reason: &'static str) -> Self {
        Self::InvalidTransition { step, reason }
    }

    pub(crate) const fn invalid_input(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidInput { field, reason }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PreconditionNotMet { .. } => ErrorKind::PreconditionNotMet,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::DuplicateSubmission { .. } => ErrorKind::DuplicateSubmission,
            Self::Gateway(_) => ErrorKind::GatewayFailure,
            Self::Busy => ErrorKind::Busy,
        }
    }
}

/// Coarse error category, stable across serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`WizardError::PreconditionNotMet`].
    PreconditionNotMet,
    /// See [`WizardError::InvalidTransition`].
    InvalidTransition,
    /// See [`WizardError::InvalidInput`].
    InvalidInput,
    /// See [`WizardError::DuplicateSubmission`].
    DuplicateSubmission,
    /// See [`WizardError::Gateway`].
    GatewayFailure,
    /// See [`WizardError::Busy`].
    Busy,
}

/// Snapshot of the last failure, kept in the workflow state for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    /// Failure category.
    pub kind: ErrorKind,
    /// Human-readable message. For gateway failures this is the gateway's own text.
    pub message: String,
}

impl From<&WizardError> for ErrorDescriptor {
    fn from(err: &WizardError) -> Self {
        let message = match err {
            WizardError::Gateway(e) => e.message.clone(),
            other => other.to_string(),
        };
        Self {
            kind: err.kind(),
            message,
        }
    }
}
