//! Hospital stay DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_stay::{HospitalStay, ReportSubmission};

/// Doctor's report; duration is entered in days
#[derive(Debug, Deserialize, Validate)]
pub struct ReportRequest {
    #[validate(length(max = 2000))]
    pub motif_consultation: Option<String>,
    #[validate(length(max = 2000))]
    pub motif_hospitalisation: Option<String>,
    pub duration_days: Option<u32>,
    pub acts: Option<Vec<String>>,
    pub exams: Option<Vec<String>>,
    #[validate(length(max = 10000))]
    pub summary: Option<String>,
    #[validate(length(max = 10000))]
    pub observations: Option<String>,
    /// Closes the report and sends it for validation
    #[serde(default)]
    pub close_stay: bool,
}

impl ReportRequest {
    /// Splits the request into the report fields and the close flag
    pub fn into_submission(self) -> (ReportSubmission, bool) {
        let submission = ReportSubmission {
            motif_consultation: self.motif_consultation,
            motif_hospitalisation: self.motif_hospitalisation,
            duration_days: self.duration_days,
            acts: self.acts,
            exams: self.exams,
            summary: self.summary,
            observations: self.observations,
        };
        (submission, self.close_stay)
    }
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub motif_consultation: Option<String>,
    pub motif_hospitalisation: Option<String>,
    pub duration_days: Option<u32>,
    pub acts: Vec<String>,
    pub exams: Vec<String>,
    pub summary: Option<String>,
    pub observations: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StayResponse {
    pub id: String,
    pub claim_id: String,
    pub hospital_id: String,
    pub doctor_id: String,
    pub status: String,
    pub report: ReportResponse,
    pub orientation_notes: Option<String>,
    pub validation_notes: Option<String>,
    pub validated_by: Option<String>,
    pub validated_at: Option<DateTime<Utc>>,
    pub invoice_id: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HospitalStay> for StayResponse {
    fn from(stay: HospitalStay) -> Self {
        let duration_days = stay.report.duration_days();
        Self {
            id: stay.id.to_string(),
            claim_id: stay.claim_id.to_string(),
            hospital_id: stay.hospital_id.to_string(),
            doctor_id: stay.doctor_id.to_string(),
            status: stay.status.to_string(),
            report: ReportResponse {
                motif_consultation: stay.report.motif_consultation,
                motif_hospitalisation: stay.report.motif_hospitalisation,
                duration_days,
                acts: stay.report.acts,
                exams: stay.report.exams,
                summary: stay.report.summary,
                observations: stay.report.observations,
            },
            orientation_notes: stay.orientation_notes,
            validation_notes: stay.validation_notes,
            validated_by: stay.validated_by.map(|a| a.to_string()),
            validated_at: stay.validated_at,
            invoice_id: stay.invoice_id.map(|i| i.to_string()),
            version: stay.version,
            created_at: stay.created_at,
            updated_at: stay.updated_at,
        }
    }
}
