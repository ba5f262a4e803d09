//! Workflow error taxonomy shared by every domain crate

use thiserror::Error;

use crate::access::{Operation, Role};
use crate::money::MoneyError;
use crate::ports::PortError;

/// Errors returned by workflow operations
///
/// Everything except `NotFound` and `Store` is an expected outcome the caller
/// can resolve with different input; none of them is retried by the core.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Forbidden: {role} may not perform {operation:?}")]
    Forbidden { role: Role, operation: Operation },

    #[error("Invalid transition: {entity} cannot go from {from} via {action}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        action: String,
    },

    #[error("Already decided: {0}")]
    AlreadyDecided(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Claim is locked: its alert is {0}")]
    ClaimLocked(String),

    #[error("Urgency has not been confirmed for claim {0}")]
    PrematureOrientation(String),

    #[error("Claim {0} already has an open hospital stay")]
    DuplicateStay(String),

    #[error("Stay {stay} is {status}; its report can no longer be edited")]
    StayLocked { stay: String, status: String },

    #[error("Stay {0} has been invoiced; its report is read-only")]
    StayInvoiced(String),

    #[error("Nothing to validate: stay {stay} is {status}")]
    NothingToValidate { stay: String, status: String },

    #[error("Stay {stay} is {status}; only validated stays can be invoiced")]
    StayNotValidated { stay: String, status: String },

    #[error("An invoice already exists for stay {0}")]
    InvoiceAlreadyExists(String),

    #[error("Invalid invoice line {index}: {reason}")]
    InvalidLine { index: usize, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl WorkflowError {
    pub fn forbidden(role: Role, operation: Operation) -> Self {
        WorkflowError::Forbidden { role, operation }
    }

    pub fn invalid_transition(
        entity: &'static str,
        from: impl ToString,
        action: impl ToString,
    ) -> Self {
        WorkflowError::InvalidTransition {
            entity,
            from: from.to_string(),
            action: action.to_string(),
        }
    }

    pub fn already_decided(message: impl Into<String>) -> Self {
        WorkflowError::AlreadyDecided(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        WorkflowError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        WorkflowError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_line(index: usize, reason: impl Into<String>) -> Self {
        WorkflowError::InvalidLine {
            index,
            reason: reason.into(),
        }
    }

    /// Stable snake_case code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::Forbidden { .. } => "forbidden",
            WorkflowError::InvalidTransition { .. } => "invalid_transition",
            WorkflowError::AlreadyDecided(_) => "already_decided",
            WorkflowError::Conflict(_) => "conflict",
            WorkflowError::ClaimLocked(_) => "claim_locked",
            WorkflowError::PrematureOrientation(_) => "premature_orientation",
            WorkflowError::DuplicateStay(_) => "duplicate_stay",
            WorkflowError::StayLocked { .. } => "stay_locked",
            WorkflowError::StayInvoiced(_) => "stay_invoiced",
            WorkflowError::NothingToValidate { .. } => "nothing_to_validate",
            WorkflowError::StayNotValidated { .. } => "stay_not_validated",
            WorkflowError::InvoiceAlreadyExists(_) => "invoice_already_exists",
            WorkflowError::InvalidLine { .. } => "invalid_line",
            WorkflowError::Validation(_) => "validation_error",
            WorkflowError::NotFound { .. } => "not_found",
            WorkflowError::Store(_) => "store_error",
        }
    }

    /// Sequencing violations: right caller, wrong moment
    pub fn is_sequencing(&self) -> bool {
        matches!(
            self,
            WorkflowError::ClaimLocked(_)
                | WorkflowError::PrematureOrientation(_)
                | WorkflowError::StayLocked { .. }
                | WorkflowError::StayInvoiced(_)
                | WorkflowError::NothingToValidate { .. }
                | WorkflowError::StayNotValidated { .. }
        )
    }

    /// True for idempotency and concurrency violations
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            WorkflowError::AlreadyDecided(_)
                | WorkflowError::Conflict(_)
                | WorkflowError::InvalidTransition { .. }
                | WorkflowError::DuplicateStay(_)
                | WorkflowError::InvoiceAlreadyExists(_)
        )
    }
}

impl From<MoneyError> for WorkflowError {
    fn from(err: MoneyError) -> Self {
        WorkflowError::Validation(err.to_string())
    }
}
