//! Claim stage classifier
//!
//! Derives the single bucket a claim is shown in from the urgency step, the
//! current stay and its invoice. Sub-entities commit independently, so the
//! snapshot may be momentarily inconsistent; the classifier is total and
//! simply picks the first rule that matches.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use domain_billing::{ApprovalStatus, Invoice};
use domain_claims::StepStatus;
use domain_stay::StayStatus;

/// Review bucket a claim currently sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStage {
    ClaimReview,
    ClaimValidated,
    ReportReview,
    ReportValidated,
    InvoiceReview,
    InvoiceValidated,
    Resolved,
}

impl ClaimStage {
    pub const ALL: [ClaimStage; 7] = [
        ClaimStage::ClaimReview,
        ClaimStage::ClaimValidated,
        ClaimStage::ReportReview,
        ClaimStage::ReportValidated,
        ClaimStage::InvoiceReview,
        ClaimStage::InvoiceValidated,
        ClaimStage::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStage::ClaimReview => "claim_review",
            ClaimStage::ClaimValidated => "claim_validated",
            ClaimStage::ReportReview => "report_review",
            ClaimStage::ReportValidated => "report_validated",
            ClaimStage::InvoiceReview => "invoice_review",
            ClaimStage::InvoiceValidated => "invoice_validated",
            ClaimStage::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ClaimStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown claim stage '{}'", s))
    }
}

/// Approval slots of the claim's invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSnapshot {
    pub medical: ApprovalStatus,
    pub sinistre: ApprovalStatus,
    pub compta: ApprovalStatus,
}

impl From<&Invoice> for InvoiceSnapshot {
    fn from(invoice: &Invoice) -> Self {
        Self {
            medical: invoice.validation_medicale.status,
            sinistre: invoice.validation_sinistre.status,
            compta: invoice.validation_compta.status,
        }
    }
}

/// What the classifier reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSnapshot {
    pub urgency: Option<StepStatus>,
    pub stay: Option<StayStatus>,
    pub invoice: Option<InvoiceSnapshot>,
}

impl ClaimSnapshot {
    fn medical(&self) -> Option<ApprovalStatus> {
        self.invoice.map(|i| i.medical)
    }
}

/// One row of the classification table
#[derive(Clone, Copy)]
pub struct StageRule {
    pub name: &'static str,
    pub stage: ClaimStage,
    pub matches: fn(&ClaimSnapshot) -> bool,
}

impl fmt::Debug for StageRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRule")
            .field("name", &self.name)
            .field("stage", &self.stage)
            .finish()
    }
}

fn invoice_closed(s: &ClaimSnapshot) -> bool {
    match s.invoice {
        Some(invoice) => {
            invoice.compta == ApprovalStatus::Approved
                || invoice.medical == ApprovalStatus::Rejected
        }
        None => false,
    }
}

fn report_awaiting_review(s: &ClaimSnapshot) -> bool {
    s.stay == Some(StayStatus::AwaitingValidation)
}

fn urgency_undecided(s: &ClaimSnapshot) -> bool {
    matches!(s.urgency, Some(status) if !status.is_final())
}

fn medical_pending(s: &ClaimSnapshot) -> bool {
    s.medical() == Some(ApprovalStatus::Pending)
}

fn medical_approved(s: &ClaimSnapshot) -> bool {
    s.medical() == Some(ApprovalStatus::Approved)
}

fn report_validated(s: &ClaimSnapshot) -> bool {
    s.stay == Some(StayStatus::Validated)
        && s.medical().map_or(true, |m| m != ApprovalStatus::Pending)
}

fn always(_: &ClaimSnapshot) -> bool {
    true
}

/// Classification rules in precedence order; the first match wins
pub const RULES: &[StageRule] = &[
    StageRule {
        name: "invoice_closed",
        stage: ClaimStage::Resolved,
        matches: invoice_closed,
    },
    StageRule {
        name: "report_awaiting_review",
        stage: ClaimStage::ReportReview,
        matches: report_awaiting_review,
    },
    StageRule {
        name: "urgency_undecided",
        stage: ClaimStage::ClaimReview,
        matches: urgency_undecided,
    },
    StageRule {
        name: "medical_pending",
        stage: ClaimStage::InvoiceReview,
        matches: medical_pending,
    },
    StageRule {
        name: "medical_approved",
        stage: ClaimStage::InvoiceValidated,
        matches: medical_approved,
    },
    StageRule {
        name: "report_validated",
        stage: ClaimStage::ReportValidated,
        matches: report_validated,
    },
    StageRule {
        name: "fallback",
        stage: ClaimStage::ClaimValidated,
        matches: always,
    },
];

/// Returns the first rule matching the snapshot
pub fn matching_rule(snapshot: &ClaimSnapshot) -> Option<&'static StageRule> {
    RULES.iter().find(|rule| (rule.matches)(snapshot))
}

/// Classifies a claim snapshot into exactly one stage
pub fn classify(snapshot: &ClaimSnapshot) -> ClaimStage {
    matching_rule(snapshot)
        .map(|rule| rule.stage)
        .unwrap_or(ClaimStage::ClaimValidated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_last() {
        let last = RULES.last().map(|r| r.stage);
        assert_eq!(last, Some(ClaimStage::ClaimValidated));
    }

    #[test]
    fn test_every_stage_has_a_rule() {
        for stage in ClaimStage::ALL {
            assert!(RULES.iter().any(|r| r.stage == stage), "{}", stage);
        }
    }

    #[test]
    fn test_stage_parses_from_name() {
        for stage in ClaimStage::ALL {
            assert_eq!(stage.as_str().parse::<ClaimStage>(), Ok(stage));
        }
        assert!("archived".parse::<ClaimStage>().is_err());
    }
}
