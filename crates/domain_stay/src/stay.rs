//! Hospital stay aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{
    ActorId, ClaimId, HospitalId, InvoiceId, Operation, Role, StayId, WorkflowError,
};
use crate::report::{ReportSubmission, StayReport};

/// Stay status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StayStatus {
    /// Patient under treatment, report open for editing
    InProgress,
    /// Report closed by the doctor, waiting for the referent
    AwaitingValidation,
    /// Report approved by the referent
    Validated,
    /// Report rejected by the referent; the doctor may revise it
    Rejected,
    /// An invoice was issued for the stay
    Invoiced,
    /// Invoice fully approved
    Completed,
}

impl StayStatus {
    /// Invoiced and completed stays are closed for good
    pub fn is_terminal(&self) -> bool {
        matches!(self, StayStatus::Invoiced | StayStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StayStatus::InProgress => "in_progress",
            StayStatus::AwaitingValidation => "awaiting_validation",
            StayStatus::Validated => "validated",
            StayStatus::Rejected => "rejected",
            StayStatus::Invoiced => "invoiced",
            StayStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for StayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events driving the stay state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StayEvent {
    /// Doctor saves the report without closing it
    Revise,
    /// Doctor closes the report for validation
    Close,
    Approve,
    Reject,
    Invoice,
    Complete,
}

impl fmt::Display for StayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StayEvent::Revise => "revise",
            StayEvent::Close => "close",
            StayEvent::Approve => "approve",
            StayEvent::Reject => "reject",
            StayEvent::Invoice => "invoice",
            StayEvent::Complete => "complete",
        };
        f.write_str(name)
    }
}

const TRANSITIONS: &[(StayStatus, StayEvent, StayStatus)] = &[
    (StayStatus::InProgress, StayEvent::Revise, StayStatus::InProgress),
    (StayStatus::InProgress, StayEvent::Close, StayStatus::AwaitingValidation),
    (StayStatus::AwaitingValidation, StayEvent::Approve, StayStatus::Validated),
    (StayStatus::AwaitingValidation, StayEvent::Reject, StayStatus::Rejected),
    (StayStatus::Rejected, StayEvent::Revise, StayStatus::InProgress),
    (StayStatus::Validated, StayEvent::Invoice, StayStatus::Invoiced),
    (StayStatus::Invoiced, StayEvent::Complete, StayStatus::Completed),
];

/// Looks up the transition table
pub fn next_status(from: StayStatus, event: StayEvent) -> Option<StayStatus> {
    TRANSITIONS
        .iter()
        .find(|(f, e, _)| *f == from && *e == event)
        .map(|(_, _, to)| *to)
}

/// One treatment episode of a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalStay {
    pub id: StayId,
    pub claim_id: ClaimId,
    pub hospital_id: HospitalId,
    /// Doctor the patient was oriented to
    pub doctor_id: ActorId,
    pub status: StayStatus,
    pub report: StayReport,
    /// Notes written by reception when orienting the patient
    pub orientation_notes: Option<String>,
    pub validation_notes: Option<String>,
    pub validated_by: Option<ActorId>,
    pub validated_at: Option<DateTime<Utc>>,
    pub invoice_id: Option<InvoiceId>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HospitalStay {
    /// Creates the stay when reception orients the patient to a doctor
    pub fn orient(
        claim_id: ClaimId,
        hospital_id: HospitalId,
        doctor_id: ActorId,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: StayId::new_v7(),
            claim_id,
            hospital_id,
            doctor_id,
            status: StayStatus::InProgress,
            report: StayReport::default(),
            orientation_notes: notes,
            validation_notes: None,
            validated_by: None,
            validated_at: None,
            invoice_id: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Fires an event through the transition table
    pub fn fire(&mut self, event: StayEvent) -> Result<StayStatus, WorkflowError> {
        let next = next_status(self.status, event)
            .ok_or_else(|| WorkflowError::invalid_transition("hospital_stay", self.status, event))?;
        tracing::debug!(
            stay_id = %self.id,
            from = %self.status,
            to = %next,
            %event,
            "stay transition"
        );
        self.status = next;
        self.updated_at = Utc::now();
        Ok(next)
    }

    /// Saves the doctor's report, optionally closing it for validation
    ///
    /// A rejected report is reopened first; any other non-editable state is
    /// locked. Once invoiced the report is read-only whatever the status.
    pub fn submit_report(
        &mut self,
        doctor_id: ActorId,
        submission: ReportSubmission,
        close_stay: bool,
    ) -> Result<(), WorkflowError> {
        if doctor_id != self.doctor_id {
            return Err(WorkflowError::forbidden(Role::HospitalDoctor, Operation::SubmitReport));
        }
        if self.invoice_id.is_some() || self.is_terminal() {
            return Err(WorkflowError::StayInvoiced(self.id.to_string()));
        }
        if !matches!(self.status, StayStatus::InProgress | StayStatus::Rejected) {
            return Err(WorkflowError::StayLocked {
                stay: self.id.to_string(),
                status: self.status.to_string(),
            });
        }

        let mut report = self.report.clone();
        report.merge(submission)?;

        if self.status == StayStatus::Rejected {
            self.fire(StayEvent::Revise)?;
        }
        self.report = report;
        self.fire(if close_stay { StayEvent::Close } else { StayEvent::Revise })?;
        Ok(())
    }

    /// Records the referent's decision on a closed report
    pub fn validate_report(
        &mut self,
        referent_id: ActorId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<(), WorkflowError> {
        if self.status != StayStatus::AwaitingValidation {
            return Err(WorkflowError::NothingToValidate {
                stay: self.id.to_string(),
                status: self.status.to_string(),
            });
        }
        self.fire(if approve { StayEvent::Approve } else { StayEvent::Reject })?;
        self.validation_notes = notes;
        self.validated_by = Some(referent_id);
        self.validated_at = Some(Utc::now());
        Ok(())
    }

    /// Checks the stay can receive an invoice
    pub fn ensure_invoiceable(&self) -> Result<(), WorkflowError> {
        if self.invoice_id.is_some() {
            return Err(WorkflowError::InvoiceAlreadyExists(self.id.to_string()));
        }
        if self.status != StayStatus::Validated {
            return Err(WorkflowError::StayNotValidated {
                stay: self.id.to_string(),
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    /// Links the issued invoice and closes the stay
    pub fn mark_invoiced(&mut self, invoice_id: InvoiceId) -> Result<(), WorkflowError> {
        self.ensure_invoiceable()?;
        self.fire(StayEvent::Invoice)?;
        self.invoice_id = Some(invoice_id);
        Ok(())
    }

    /// Marks the stay completed once its invoice is fully approved
    pub fn complete(&mut self) -> Result<(), WorkflowError> {
        self.fire(StayEvent::Complete).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_loops_back_through_table() {
        assert_eq!(
            next_status(StayStatus::Rejected, StayEvent::Revise),
            Some(StayStatus::InProgress)
        );
    }

    #[test]
    fn test_terminal_states_have_no_edit_transitions() {
        for status in [StayStatus::Invoiced, StayStatus::Completed] {
            assert_eq!(next_status(status, StayEvent::Revise), None);
            assert_eq!(next_status(status, StayEvent::Close), None);
        }
        assert_eq!(next_status(StayStatus::Completed, StayEvent::Complete), None);
    }
}
