//! Invoice approval slots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ActorId, Operation, Role, WorkflowError};

/// Decision held by one approval slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three stages of the approval chain, in chain order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStage {
    Medical,
    Sinistre,
    Compta,
}

impl ApprovalStage {
    pub const CHAIN: [ApprovalStage; 3] =
        [ApprovalStage::Medical, ApprovalStage::Sinistre, ApprovalStage::Compta];

    /// Role signing this stage
    pub fn role(&self) -> Role {
        match self {
            ApprovalStage::Medical => Role::MedicalReferent,
            ApprovalStage::Sinistre => Role::ClaimsAgent,
            ApprovalStage::Compta => Role::InsurerAccountant,
        }
    }

    /// Operation guarded by the capability table
    pub fn operation(&self) -> Operation {
        match self {
            ApprovalStage::Medical => Operation::DecideMedical,
            ApprovalStage::Sinistre => Operation::DecideSinistre,
            ApprovalStage::Compta => Operation::DecideCompta,
        }
    }

    /// Stage whose queue the given role works, if any
    pub fn for_role(role: Role) -> Option<ApprovalStage> {
        Self::CHAIN.into_iter().find(|stage| stage.role() == role)
    }
}

impl fmt::Display for ApprovalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApprovalStage::Medical => "validation_medicale",
            ApprovalStage::Sinistre => "validation_sinistre",
            ApprovalStage::Compta => "validation_compta",
        };
        f.write_str(name)
    }
}

/// One approval slot on an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub status: ApprovalStatus,
    pub decided_by: Option<ActorId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Default for Approval {
    fn default() -> Self {
        Self::pending()
    }
}

impl Approval {
    pub fn pending() -> Self {
        Self {
            status: ApprovalStatus::Pending,
            decided_by: None,
            decided_at: None,
            notes: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Records the decision; a slot can only be decided once
    pub fn decide(
        &mut self,
        stage: ApprovalStage,
        by: ActorId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<(), WorkflowError> {
        if !self.is_pending() {
            return Err(WorkflowError::already_decided(format!(
                "{} is already {}",
                stage, self.status
            )));
        }
        self.status = if approve { ApprovalStatus::Approved } else { ApprovalStatus::Rejected };
        self.decided_by = Some(by);
        self.decided_at = Some(Utc::now());
        self.notes = notes;
        Ok(())
    }
}
