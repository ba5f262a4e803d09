//! Claim aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ActorId, AlertId, ClaimId, HospitalId, WorkflowError};
use crate::workflow::{step_template, StepKey, StepStatus, WorkflowStep};

/// Result of an urgency decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrgencyOutcome {
    /// The decision was recorded on the claim
    Recorded,
    /// The same decision had already been recorded; nothing changed
    Unchanged,
}

/// A claim ("sinistre") opened for an alert once a hospital is engaged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Owning alert (1:1)
    pub alert_id: AlertId,
    /// Hospital treating the patient
    pub hospital_id: HospitalId,
    /// Claim number, assigned once urgency is confirmed
    pub numero: Option<String>,
    /// Workflow steps, in template order
    pub steps: Vec<WorkflowStep>,
    /// Medical referent following the claim
    pub referent_id: Option<ActorId>,
    /// Optimistic concurrency version
    pub version: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Opens a claim with the step template; urgency verification starts immediately
    pub fn open(alert_id: AlertId, hospital_id: HospitalId) -> Self {
        let now = Utc::now();
        let mut claim = Self {
            id: ClaimId::new_v7(),
            alert_id,
            hospital_id,
            numero: None,
            steps: step_template(),
            referent_id: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        if let Some(step) = claim.step_mut(StepKey::UrgencyVerification) {
            step.status = StepStatus::InProgress;
            step.started_at = Some(now);
        }
        claim
    }

    /// Returns the step with the given key
    pub fn step(&self, key: StepKey) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.step_key == key)
    }

    fn step_mut(&mut self, key: StepKey) -> Option<&mut WorkflowStep> {
        self.steps.iter_mut().find(|s| s.step_key == key)
    }

    fn require_step_mut(&mut self, key: StepKey) -> Result<&mut WorkflowStep, WorkflowError> {
        let claim_id = self.id;
        self.step_mut(key).ok_or_else(|| {
            WorkflowError::not_found("workflow_step", format!("{}/{}", claim_id, key))
        })
    }

    /// Status of the urgency verification step, if the claim has one
    pub fn urgency_status(&self) -> Option<StepStatus> {
        self.step(StepKey::UrgencyVerification).map(|s| s.status)
    }

    /// True once the referent confirmed the urgency
    pub fn urgency_confirmed(&self) -> bool {
        self.urgency_status() == Some(StepStatus::Completed)
    }

    /// Starts a pending step
    ///
    /// Fails if another step of the same family is already in progress.
    pub fn start_step(&mut self, key: StepKey) -> Result<(), WorkflowError> {
        let family = key.family();
        if let Some(busy) = self
            .steps
            .iter()
            .find(|s| {
                s.step_key != key
                    && s.step_key.family() == family
                    && s.status == StepStatus::InProgress
            })
        {
            return Err(WorkflowError::invalid_transition(
                "workflow_step",
                format!("{} in progress", busy.step_key),
                format!("start {}", key),
            ));
        }
        self.require_step_mut(key)?.start()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Completes a step exactly once
    pub fn complete_step(
        &mut self,
        key: StepKey,
        by: ActorId,
        details: Option<String>,
    ) -> Result<(), WorkflowError> {
        self.require_step_mut(key)?.complete(by, details)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records the referent's urgency decision
    ///
    /// Repeating the decision already on file is a no-op; contradicting it
    /// is rejected.
    pub fn decide_urgency(
        &mut self,
        referent_id: ActorId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<UrgencyOutcome, WorkflowError> {
        let step = self.require_step_mut(StepKey::UrgencyVerification)?;
        let wanted = if approve { StepStatus::Completed } else { StepStatus::Cancelled };

        if step.status.is_final() {
            if step.status == wanted {
                return Ok(UrgencyOutcome::Unchanged);
            }
            return Err(WorkflowError::already_decided(format!(
                "urgency was already {}",
                step.status
            )));
        }

        if approve {
            step.complete(referent_id, notes)?;
        } else {
            step.cancel(referent_id, notes)?;
        }

        if self.referent_id.is_none() {
            self.referent_id = Some(referent_id);
        }
        self.updated_at = Utc::now();
        Ok(UrgencyOutcome::Recorded)
    }

    /// Counter scope of the claim number: one sequence per opening year
    pub fn numero_scope(&self) -> String {
        format!("SIN-{}", self.created_at.format("%Y"))
    }

    /// Sets the claim number from the next value of its scope's sequence
    ///
    /// A claim keeps the first number it is given.
    pub fn assign_numero(&mut self, sequence: u64) {
        if self.numero.is_none() {
            self.numero = Some(format!("{}-{:06}", self.numero_scope(), sequence));
            self.updated_at = Utc::now();
        }
    }
}
