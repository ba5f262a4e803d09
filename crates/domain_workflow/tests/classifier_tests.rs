//! Tests for the claim stage classifier

use proptest::prelude::*;

use domain_billing::ApprovalStatus;
use domain_claims::StepStatus;
use domain_stay::StayStatus;
use domain_workflow::{classify, matching_rule, ClaimSnapshot, ClaimStage, InvoiceSnapshot, RULES};
use test_utils::generators::{
    approval_status_strategy, claim_snapshot_strategy, step_status_strategy, stay_status_strategy,
};

use ApprovalStatus::{Approved, Pending, Rejected};

fn invoice(
    medical: ApprovalStatus,
    sinistre: ApprovalStatus,
    compta: ApprovalStatus,
) -> Option<InvoiceSnapshot> {
    Some(InvoiceSnapshot { medical, sinistre, compta })
}

fn snapshot(
    urgency: Option<StepStatus>,
    stay: Option<StayStatus>,
    invoice: Option<InvoiceSnapshot>,
) -> ClaimSnapshot {
    ClaimSnapshot { urgency, stay, invoice }
}

mod scenarios {
    use super::*;

    #[test]
    fn test_pending_urgency_is_claim_review() {
        for status in [StepStatus::Pending, StepStatus::InProgress] {
            assert_eq!(classify(&snapshot(Some(status), None, None)), ClaimStage::ClaimReview);
        }
    }

    #[test]
    fn test_confirmed_urgency_without_stay_is_claim_validated() {
        let s = snapshot(Some(StepStatus::Completed), None, None);
        assert_eq!(classify(&s), ClaimStage::ClaimValidated);
    }

    #[test]
    fn test_rejected_urgency_falls_back_to_claim_validated() {
        let s = snapshot(Some(StepStatus::Cancelled), None, None);
        assert_eq!(classify(&s), ClaimStage::ClaimValidated);
    }

    #[test]
    fn test_stay_in_progress_is_claim_validated() {
        let s = snapshot(Some(StepStatus::Completed), Some(StayStatus::InProgress), None);
        assert_eq!(classify(&s), ClaimStage::ClaimValidated);
    }

    #[test]
    fn test_closed_report_is_report_review() {
        let s = snapshot(Some(StepStatus::Completed), Some(StayStatus::AwaitingValidation), None);
        assert_eq!(classify(&s), ClaimStage::ReportReview);
    }

    #[test]
    fn test_validated_stay_without_invoice_is_report_validated() {
        let s = snapshot(Some(StepStatus::Completed), Some(StayStatus::Validated), None);
        assert_eq!(classify(&s), ClaimStage::ReportValidated);
    }

    #[test]
    fn test_invoice_follows_medical_decision() {
        let pending = snapshot(
            Some(StepStatus::Completed),
            Some(StayStatus::Invoiced),
            invoice(Pending, Pending, Pending),
        );
        assert_eq!(classify(&pending), ClaimStage::InvoiceReview);

        let approved = snapshot(
            Some(StepStatus::Completed),
            Some(StayStatus::Invoiced),
            invoice(Approved, Pending, Pending),
        );
        assert_eq!(classify(&approved), ClaimStage::InvoiceValidated);
    }

    #[test]
    fn test_compta_approval_resolves() {
        let s = snapshot(
            Some(StepStatus::Completed),
            Some(StayStatus::Completed),
            invoice(Approved, Approved, Approved),
        );
        assert_eq!(classify(&s), ClaimStage::Resolved);
    }

    #[test]
    fn test_medical_rejection_resolves_regardless_of_stay() {
        for stay in [
            None,
            Some(StayStatus::InProgress),
            Some(StayStatus::AwaitingValidation),
            Some(StayStatus::Invoiced),
        ] {
            let s = snapshot(Some(StepStatus::InProgress), stay, invoice(Rejected, Pending, Pending));
            assert_eq!(classify(&s), ClaimStage::Resolved, "stay {:?}", stay);
        }
    }

    #[test]
    fn test_sinistre_rejection_keeps_invoice_validated_bucket() {
        let s = snapshot(
            Some(StepStatus::Completed),
            Some(StayStatus::Invoiced),
            invoice(Approved, Rejected, Pending),
        );
        assert_eq!(classify(&s), ClaimStage::InvoiceValidated);
    }

    #[test]
    fn test_empty_snapshot_is_total() {
        assert_eq!(classify(&ClaimSnapshot::default()), ClaimStage::ClaimValidated);
    }
}

mod precedence {
    use super::*;

    fn rule_name(s: &ClaimSnapshot) -> &'static str {
        matching_rule(s).map(|r| r.name).unwrap_or("none")
    }

    #[test]
    fn test_report_review_beats_undecided_urgency() {
        let s = snapshot(Some(StepStatus::InProgress), Some(StayStatus::AwaitingValidation), None);
        assert_eq!(rule_name(&s), "report_awaiting_review");
    }

    #[test]
    fn test_undecided_urgency_beats_pending_invoice() {
        let s = snapshot(Some(StepStatus::Pending), Some(StayStatus::Invoiced), invoice(Pending, Pending, Pending));
        assert_eq!(classify(&s), ClaimStage::ClaimReview);
    }

    #[test]
    fn test_each_rule_triggers_on_its_own() {
        let witnesses = [
            (snapshot(None, None, invoice(Approved, Approved, Approved)), "invoice_closed"),
            (snapshot(None, Some(StayStatus::AwaitingValidation), None), "report_awaiting_review"),
            (snapshot(Some(StepStatus::Pending), None, None), "urgency_undecided"),
            (snapshot(None, None, invoice(Pending, Pending, Pending)), "medical_pending"),
            (snapshot(None, None, invoice(Approved, Pending, Pending)), "medical_approved"),
            (snapshot(None, Some(StayStatus::Validated), None), "report_validated"),
            (snapshot(None, Some(StayStatus::Rejected), None), "fallback"),
        ];
        assert_eq!(witnesses.len(), RULES.len());
        for (s, expected) in witnesses {
            assert_eq!(rule_name(&s), expected);
        }
    }
}

proptest! {
    #[test]
    fn classification_is_total_and_deterministic(
        s in claim_snapshot_strategy(),
    ) {
        let first = classify(&s);
        prop_assert_eq!(first, classify(&s));
        prop_assert!(matching_rule(&s).is_some());
        prop_assert_eq!(matching_rule(&s).map(|r| r.stage), Some(first));
    }

    #[test]
    fn medical_rejection_always_resolves(
        urgency in prop::option::of(step_status_strategy()),
        stay in prop::option::of(stay_status_strategy()),
        sinistre in approval_status_strategy(),
        compta in approval_status_strategy(),
    ) {
        let s = snapshot(urgency, stay, invoice(Rejected, sinistre, compta));
        prop_assert_eq!(classify(&s), ClaimStage::Resolved);
    }
}
