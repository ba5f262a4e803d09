//! Doctor report carried by a hospital stay

use serde::{Deserialize, Serialize};

use core_kernel::WorkflowError;

pub const HOURS_PER_DAY: u32 = 24;

/// Converts a duration in whole days to the stored hours
pub fn days_to_hours(days: u32) -> Result<u32, WorkflowError> {
    days.checked_mul(HOURS_PER_DAY).ok_or_else(|| {
        WorkflowError::validation(format!("stay duration of {} days is out of range", days))
    })
}

/// Converts stored hours back to whole days
pub fn hours_to_days(hours: u32) -> u32 {
    hours / HOURS_PER_DAY
}

/// Report fields as stored on the stay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayReport {
    pub motif_consultation: Option<String>,
    pub motif_hospitalisation: Option<String>,
    /// Length of stay, stored in hours
    pub duration_hours: Option<u32>,
    /// Medical acts performed
    #[serde(default)]
    pub acts: Vec<String>,
    /// Exams performed
    #[serde(default)]
    pub exams: Vec<String>,
    pub summary: Option<String>,
    pub observations: Option<String>,
}

impl StayReport {
    /// Length of stay in days, as shown to users
    pub fn duration_days(&self) -> Option<u32> {
        self.duration_hours.map(hours_to_days)
    }

    /// Merges a submission; absent fields keep their current value
    pub fn merge(&mut self, submission: ReportSubmission) -> Result<(), WorkflowError> {
        let duration_hours = submission.duration_days.map(days_to_hours).transpose()?;

        if let Some(motif) = submission.motif_consultation {
            self.motif_consultation = Some(motif);
        }
        if let Some(motif) = submission.motif_hospitalisation {
            self.motif_hospitalisation = Some(motif);
        }
        if duration_hours.is_some() {
            self.duration_hours = duration_hours;
        }
        if let Some(acts) = submission.acts {
            self.acts = acts;
        }
        if let Some(exams) = submission.exams {
            self.exams = exams;
        }
        if let Some(summary) = submission.summary {
            self.summary = Some(summary);
        }
        if let Some(observations) = submission.observations {
            self.observations = Some(observations);
        }
        Ok(())
    }
}

/// Report fields as submitted by the doctor
///
/// Duration is entered in days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub motif_consultation: Option<String>,
    pub motif_hospitalisation: Option<String>,
    pub duration_days: Option<u32>,
    pub acts: Option<Vec<String>>,
    pub exams: Option<Vec<String>>,
    pub summary: Option<String>,
    pub observations: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_to_hours_overflow() {
        assert!(matches!(days_to_hours(u32::MAX), Err(WorkflowError::Validation(_))));
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut report = StayReport::default();
        report
            .merge(ReportSubmission {
                motif_consultation: Some("fracture".to_string()),
                duration_days: Some(2),
                ..Default::default()
            })
            .unwrap();
        report
            .merge(ReportSubmission {
                summary: Some("cast applied".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(report.motif_consultation.as_deref(), Some("fracture"));
        assert_eq!(report.duration_hours, Some(48));
        assert_eq!(report.summary.as_deref(), Some("cast applied"));
    }

    #[test]
    fn test_merge_fails_without_partial_write() {
        let mut report = StayReport::default();
        let result = report.merge(ReportSubmission {
            summary: Some("ignored".to_string()),
            duration_days: Some(u32::MAX),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(report, StayReport::default());
    }
}
