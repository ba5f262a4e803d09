//! Tests for the hospital stay lifecycle

use proptest::prelude::*;

use core_kernel::{ActorId, ClaimId, HospitalId, InvoiceId, WorkflowError};
use domain_stay::{
    days_to_hours, hours_to_days, HospitalStay, ReportSubmission, StayStatus,
};

fn oriented_stay(doctor: ActorId) -> HospitalStay {
    HospitalStay::orient(
        ClaimId::new_v7(),
        HospitalId::new(),
        doctor,
        Some("box 3".to_string()),
    )
}

fn full_report(days: u32) -> ReportSubmission {
    ReportSubmission {
        motif_consultation: Some("Douleur thoracique".to_string()),
        motif_hospitalisation: Some("Surveillance".to_string()),
        duration_days: Some(days),
        acts: Some(vec!["ECG".to_string()]),
        exams: Some(vec!["Troponine".to_string()]),
        summary: Some("Stable".to_string()),
        observations: None,
    }
}

fn validated_stay(doctor: ActorId) -> HospitalStay {
    let mut stay = oriented_stay(doctor);
    stay.submit_report(doctor, full_report(2), true).unwrap();
    stay.validate_report(ActorId::new(), true, None).unwrap();
    stay
}

mod orientation {
    use super::*;

    #[test]
    fn test_orient_creates_in_progress_stay() {
        let doctor = ActorId::new();
        let stay = oriented_stay(doctor);
        assert_eq!(stay.status, StayStatus::InProgress);
        assert_eq!(stay.doctor_id, doctor);
        assert_eq!(stay.orientation_notes.as_deref(), Some("box 3"));
        assert!(stay.invoice_id.is_none());
    }
}

mod report_submission {
    use super::*;

    #[test]
    fn test_draft_keeps_in_progress() {
        let doctor = ActorId::new();
        let mut stay = oriented_stay(doctor);
        stay.submit_report(doctor, full_report(1), false).unwrap();
        stay.submit_report(doctor, ReportSubmission::default(), false).unwrap();

        assert_eq!(stay.status, StayStatus::InProgress);
        assert_eq!(stay.report.duration_hours, Some(24));
    }

    #[test]
    fn test_close_moves_to_awaiting_validation() {
        let doctor = ActorId::new();
        let mut stay = oriented_stay(doctor);
        stay.submit_report(doctor, full_report(3), true).unwrap();

        assert_eq!(stay.status, StayStatus::AwaitingValidation);
        assert_eq!(stay.report.duration_hours, Some(72));
        assert_eq!(stay.report.duration_days(), Some(3));
    }

    #[test]
    fn test_other_doctor_is_forbidden() {
        let doctor = ActorId::new();
        let mut stay = oriented_stay(doctor);
        let result = stay.submit_report(ActorId::new(), full_report(1), true);
        assert!(matches!(result, Err(WorkflowError::Forbidden { .. })));
        assert_eq!(stay.status, StayStatus::InProgress);
    }

    #[test]
    fn test_awaiting_validation_is_locked() {
        let doctor = ActorId::new();
        let mut stay = oriented_stay(doctor);
        stay.submit_report(doctor, full_report(1), true).unwrap();

        let result = stay.submit_report(doctor, full_report(2), false);
        assert!(matches!(result, Err(WorkflowError::StayLocked { .. })));
        assert_eq!(stay.report.duration_hours, Some(24));
    }

    #[test]
    fn test_validated_is_locked() {
        let doctor = ActorId::new();
        let mut stay = validated_stay(doctor);
        let result = stay.submit_report(doctor, full_report(5), false);
        assert!(matches!(result, Err(WorkflowError::StayLocked { .. })));
    }

    #[test]
    fn test_invoiced_stay_reports_stay_invoiced() {
        let doctor = ActorId::new();
        let mut stay = validated_stay(doctor);
        stay.mark_invoiced(InvoiceId::new()).unwrap();

        let result = stay.submit_report(doctor, full_report(5), false);
        assert!(matches!(result, Err(WorkflowError::StayInvoiced(_))));
    }

    #[test]
    fn test_rejected_report_reopens_on_revision() {
        let doctor = ActorId::new();
        let mut stay = oriented_stay(doctor);
        stay.submit_report(doctor, full_report(1), true).unwrap();
        stay.validate_report(ActorId::new(), false, Some("missing exams".to_string())).unwrap();
        assert_eq!(stay.status, StayStatus::Rejected);

        stay.submit_report(doctor, full_report(2), false).unwrap();
        assert_eq!(stay.status, StayStatus::InProgress);

        stay.submit_report(doctor, ReportSubmission::default(), true).unwrap();
        assert_eq!(stay.status, StayStatus::AwaitingValidation);
    }

    #[test]
    fn test_rejected_report_can_be_closed_directly() {
        let doctor = ActorId::new();
        let mut stay = oriented_stay(doctor);
        stay.submit_report(doctor, full_report(1), true).unwrap();
        stay.validate_report(ActorId::new(), false, None).unwrap();

        stay.submit_report(doctor, full_report(4), true).unwrap();
        assert_eq!(stay.status, StayStatus::AwaitingValidation);
        assert_eq!(stay.report.duration_days(), Some(4));
    }
}

mod validation {
    use super::*;

    #[test]
    fn test_approve_records_referent() {
        let doctor = ActorId::new();
        let referent = ActorId::new();
        let mut stay = oriented_stay(doctor);
        stay.submit_report(doctor, full_report(1), true).unwrap();
        stay.validate_report(referent, true, Some("ok".to_string())).unwrap();

        assert_eq!(stay.status, StayStatus::Validated);
        assert_eq!(stay.validated_by, Some(referent));
        assert_eq!(stay.validation_notes.as_deref(), Some("ok"));
        assert!(stay.validated_at.is_some());
    }

    #[test]
    fn test_nothing_to_validate_outside_awaiting_validation() {
        let doctor = ActorId::new();
        let mut stay = oriented_stay(doctor);
        let result = stay.validate_report(ActorId::new(), true, None);
        assert!(matches!(result, Err(WorkflowError::NothingToValidate { .. })));

        let mut validated = validated_stay(doctor);
        let result = validated.validate_report(ActorId::new(), false, None);
        assert!(matches!(result, Err(WorkflowError::NothingToValidate { .. })));
        assert_eq!(validated.status, StayStatus::Validated);
    }
}

mod invoicing {
    use super::*;

    #[test]
    fn test_in_progress_stay_is_not_invoiceable() {
        let stay = oriented_stay(ActorId::new());
        assert!(matches!(
            stay.ensure_invoiceable(),
            Err(WorkflowError::StayNotValidated { .. })
        ));
    }

    #[test]
    fn test_mark_invoiced_then_complete() {
        let mut stay = validated_stay(ActorId::new());
        let invoice = InvoiceId::new();
        stay.mark_invoiced(invoice).unwrap();
        assert_eq!(stay.status, StayStatus::Invoiced);
        assert_eq!(stay.invoice_id, Some(invoice));
        assert!(stay.is_terminal());

        assert!(matches!(
            stay.mark_invoiced(InvoiceId::new()),
            Err(WorkflowError::InvoiceAlreadyExists(_))
        ));

        stay.complete().unwrap();
        assert_eq!(stay.status, StayStatus::Completed);
        assert!(stay.complete().is_err());
    }
}

proptest! {
    #[test]
    fn whole_days_round_trip_through_hours(days in 0u32..=(u32::MAX / 24)) {
        let hours = days_to_hours(days).unwrap();
        prop_assert_eq!(hours, days * 24);
        prop_assert_eq!(hours_to_days(hours), days);
    }

    #[test]
    fn drafts_never_leave_in_progress(drafts in 1usize..10, days in 0u32..365) {
        let doctor = ActorId::new();
        let mut stay = oriented_stay(doctor);
        for _ in 0..drafts {
            stay.submit_report(doctor, full_report(days), false).unwrap();
            prop_assert_eq!(stay.status, StayStatus::InProgress);
        }
        stay.submit_report(doctor, full_report(days), true).unwrap();
        prop_assert_eq!(stay.status, StayStatus::AwaitingValidation);
        prop_assert_eq!(stay.report.duration_days(), Some(days));
    }
}
