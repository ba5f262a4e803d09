//! Claim workflow steps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ActorId, StepId, WorkflowError};

/// Stable step identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKey {
    UrgencyVerification,
    AmbulanceDispatch,
    Orientation,
    InvoiceIssued,
}

/// Step families; at most one step per family is in progress at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepFamily {
    Verification,
    Logistics,
    Billing,
}

impl StepKey {
    pub fn family(&self) -> StepFamily {
        match self {
            StepKey::UrgencyVerification => StepFamily::Verification,
            StepKey::AmbulanceDispatch | StepKey::Orientation => StepFamily::Logistics,
            StepKey::InvoiceIssued => StepFamily::Billing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKey::UrgencyVerification => "urgency_verification",
            StepKey::AmbulanceDispatch => "ambulance_dispatch",
            StepKey::Orientation => "orientation",
            StepKey::InvoiceIssued => "invoice_issued",
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl StepStatus {
    /// Completed and cancelled steps are immutable
    pub fn is_final(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named sub-task of a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: StepId,
    pub step_key: StepKey,
    /// Order within the claim's template
    pub position: u16,
    pub status: StepStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<ActorId>,
    /// Free-form notes, e.g. the reason for a rejection
    pub details: Option<String>,
}

impl WorkflowStep {
    /// Creates a pending step
    pub fn new(step_key: StepKey, position: u16) -> Self {
        Self {
            id: StepId::new_v7(),
            step_key,
            position,
            status: StepStatus::Pending,
            started_at: None,
            completed_at: None,
            completed_by: None,
            details: None,
        }
    }

    /// Moves a pending step to in progress
    pub fn start(&mut self) -> Result<(), WorkflowError> {
        if self.status != StepStatus::Pending {
            return Err(WorkflowError::invalid_transition(
                "workflow_step",
                self.status,
                "start",
            ));
        }
        self.status = StepStatus::InProgress;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Marks the step as completed
    pub fn complete(&mut self, by: ActorId, details: Option<String>) -> Result<(), WorkflowError> {
        self.finish(StepStatus::Completed, by, details)
    }

    /// Marks the step as cancelled (decided negatively)
    pub fn cancel(&mut self, by: ActorId, details: Option<String>) -> Result<(), WorkflowError> {
        self.finish(StepStatus::Cancelled, by, details)
    }

    fn finish(
        &mut self,
        status: StepStatus,
        by: ActorId,
        details: Option<String>,
    ) -> Result<(), WorkflowError> {
        if self.status.is_final() {
            return Err(WorkflowError::already_decided(format!(
                "step {} is already {}",
                self.step_key, self.status
            )));
        }
        self.status = status;
        self.completed_at = Some(Utc::now());
        self.completed_by = Some(by);
        self.details = details;
        Ok(())
    }
}

/// The fixed step template created alongside every claim
pub fn step_template() -> Vec<WorkflowStep> {
    [
        StepKey::UrgencyVerification,
        StepKey::AmbulanceDispatch,
        StepKey::Orientation,
        StepKey::InvoiceIssued,
    ]
    .into_iter()
    .enumerate()
    .map(|(position, key)| WorkflowStep::new(key, position as u16))
    .collect()
}
