//! Claim DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_claims::{Claim, StepKey, StepStatus, WorkflowStep};
use domain_workflow::{ClaimStage, ClaimView};

use super::invoices::InvoiceResponse;
use super::PageParams;
use super::stays::StayResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct OrientationRequest {
    pub doctor_id: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Query of the referent's claim queue
#[derive(Debug, Deserialize)]
pub struct ClaimQueueQuery {
    pub classified_stage: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ClaimQueueQuery {
    pub fn paging(&self) -> PageParams {
        PageParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub id: String,
    pub step_key: StepKey,
    pub position: u16,
    pub status: StepStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
    pub details: Option<String>,
}

impl From<WorkflowStep> for StepResponse {
    fn from(step: WorkflowStep) -> Self {
        Self {
            id: step.id.to_string(),
            step_key: step.step_key,
            position: step.position,
            status: step.status,
            started_at: step.started_at,
            completed_at: step.completed_at,
            completed_by: step.completed_by.map(|a| a.to_string()),
            details: step.details,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: String,
    pub alert_id: String,
    pub hospital_id: String,
    pub numero: Option<String>,
    pub referent_id: Option<String>,
    pub steps: Vec<StepResponse>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            id: claim.id.to_string(),
            alert_id: claim.alert_id.to_string(),
            hospital_id: claim.hospital_id.to_string(),
            numero: claim.numero,
            referent_id: claim.referent_id.map(|a| a.to_string()),
            steps: claim.steps.into_iter().map(StepResponse::from).collect(),
            version: claim.version,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}

/// Claim with its derived stage, current stay and invoice
#[derive(Debug, Serialize)]
pub struct ClaimViewResponse {
    #[serde(flatten)]
    pub claim: ClaimResponse,
    pub stage: ClaimStage,
    pub stay: Option<StayResponse>,
    pub invoice: Option<InvoiceResponse>,
}

impl From<ClaimView> for ClaimViewResponse {
    fn from(view: ClaimView) -> Self {
        Self {
            claim: view.claim.into(),
            stage: view.stage,
            stay: view.stay.map(Into::into),
            invoice: view.invoice.map(Into::into),
        }
    }
}
