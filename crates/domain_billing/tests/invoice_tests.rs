//! Tests for invoices and the approval chain

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ActorId, ClaimId, Currency, HospitalId, Role, StayId, WorkflowError};
use domain_billing::{
    compute_totals, ApprovalStage, ApprovalStatus, Invoice, InvoiceLine, InvoiceStatus, LineInput,
};

fn issue(lines: Vec<LineInput>, tax_rate: Decimal) -> Result<Invoice, WorkflowError> {
    Invoice::issue(
        StayId::new_v7(),
        ClaimId::new_v7(),
        HospitalId::new(),
        ActorId::new(),
        Currency::DZD,
        lines,
        tax_rate,
        None,
        Invoice::numero("FAC-202601", 1),
    )
}

fn standard_invoice() -> Invoice {
    issue(
        vec![
            LineInput::new("Consultation", 1, dec!(2500)),
            LineInput::new("Nuit d'hospitalisation", 3, dec!(8000)),
            LineInput::new("ECG", 2, dec!(1250.50)),
        ],
        dec!(0.19),
    )
    .unwrap()
}

mod issuing {
    use super::*;

    #[test]
    fn test_numero_scope_is_monthly() {
        let at = chrono::DateTime::parse_from_rfc3339("2026-10-17T08:30:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let scope = Invoice::numero_scope(at);
        assert_eq!(scope, "FAC-202610");
        assert_eq!(Invoice::numero(&scope, 42), "FAC-202610-000042");
        assert_ne!(Invoice::numero(&scope, 1), Invoice::numero(&scope, 2));
    }

    #[test]
    fn test_totals() {
        let invoice = standard_invoice();
        assert_eq!(invoice.subtotal.amount(), dec!(29001.00));
        // 29001 * 0.19 = 5510.19
        assert_eq!(invoice.tax_amount.amount(), dec!(5510));
        assert_eq!(invoice.total.amount(), dec!(34511.00));
        assert_eq!(invoice.numero, "FAC-202601-000001");
        assert_eq!(invoice.lines.len(), 3);
    }

    #[test]
    fn test_all_slots_start_pending() {
        let invoice = standard_invoice();
        for stage in ApprovalStage::CHAIN {
            assert_eq!(invoice.approval(stage).status, ApprovalStatus::Pending);
        }
        assert_eq!(invoice.status(), InvoiceStatus::PendingMedical);
    }

    #[test]
    fn test_zero_price_and_zero_tax_allowed() {
        let invoice = issue(vec![LineInput::new("Gratuit", 1, dec!(0))], dec!(0)).unwrap();
        assert!(invoice.total.is_zero());
    }

    #[test]
    fn test_empty_label_rejected() {
        let result = issue(
            vec![LineInput::new("ok", 1, dec!(1)), LineInput::new("   ", 1, dec!(1))],
            dec!(0),
        );
        assert!(matches!(result, Err(WorkflowError::InvalidLine { index: 1, .. })));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = issue(vec![LineInput::new("Radio", 0, dec!(10))], dec!(0));
        assert!(matches!(result, Err(WorkflowError::InvalidLine { index: 0, .. })));
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = issue(vec![LineInput::new("Remise", 1, dec!(-5))], dec!(0));
        assert!(matches!(result, Err(WorkflowError::InvalidLine { .. })));
    }

    #[test]
    fn test_huge_quantity_rejected() {
        let result = issue(vec![LineInput::new("Radio", i64::MAX, dec!(1))], dec!(0));
        assert!(matches!(result, Err(WorkflowError::InvalidLine { .. })));
    }

    #[test]
    fn test_tax_rate_bounds() {
        let line = || vec![LineInput::new("Consultation", 1, dec!(100))];
        assert!(matches!(issue(line(), dec!(1.01)), Err(WorkflowError::Validation(_))));
        assert!(matches!(issue(line(), dec!(-0.1)), Err(WorkflowError::Validation(_))));
        assert_eq!(issue(line(), dec!(1)).unwrap().total.amount(), dec!(200));
    }

    #[test]
    fn test_no_lines_rejected() {
        assert!(matches!(issue(vec![], dec!(0)), Err(WorkflowError::Validation(_))));
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        let invoice = issue(vec![LineInput::new("Soin", 1, dec!(25))], dec!(0.1)).unwrap();
        // 2.5 -> 3
        assert_eq!(invoice.tax_amount.amount(), dec!(3));
        assert_eq!(invoice.total.amount(), dec!(28));
    }
}

mod approval_chain {
    use super::*;

    #[test]
    fn test_full_chain_validates() {
        let mut invoice = standard_invoice();
        assert_eq!(
            invoice.decide(ApprovalStage::Medical, ActorId::new(), true, None).unwrap(),
            InvoiceStatus::PendingSinistre
        );
        assert_eq!(
            invoice.decide(ApprovalStage::Sinistre, ActorId::new(), true, None).unwrap(),
            InvoiceStatus::PendingCompta
        );
        assert_eq!(
            invoice.decide(ApprovalStage::Compta, ActorId::new(), true, None).unwrap(),
            InvoiceStatus::Validated
        );
    }

    #[test]
    fn test_rejection_at_any_stage() {
        for stage in ApprovalStage::CHAIN {
            let mut invoice = standard_invoice();
            for earlier in ApprovalStage::CHAIN.into_iter().take_while(|s| *s != stage) {
                invoice.decide(earlier, ActorId::new(), true, None).unwrap();
            }
            let status = invoice.decide(stage, ActorId::new(), false, Some("no".to_string())).unwrap();
            assert_eq!(status, InvoiceStatus::Rejected, "{:?}", stage);
        }
    }

    #[test]
    fn test_slots_are_independent_in_storage() {
        let mut invoice = standard_invoice();
        // Sinistre decided before medical: stored, but the chain still waits on medical
        invoice.decide(ApprovalStage::Sinistre, ActorId::new(), true, None).unwrap();
        assert_eq!(invoice.validation_sinistre.status, ApprovalStatus::Approved);
        assert_eq!(invoice.status(), InvoiceStatus::PendingMedical);

        invoice.decide(ApprovalStage::Medical, ActorId::new(), true, None).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::PendingCompta);
    }

    #[test]
    fn test_later_rejection_hidden_until_chain_reaches_it() {
        let mut invoice = standard_invoice();
        invoice.decide(ApprovalStage::Compta, ActorId::new(), false, None).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::PendingMedical);
    }

    #[test]
    fn test_redeciding_a_slot_is_rejected() {
        let mut invoice = standard_invoice();
        let referent = ActorId::new();
        invoice.decide(ApprovalStage::Medical, referent, true, Some("ok".to_string())).unwrap();

        for approve in [true, false] {
            let result = invoice.decide(ApprovalStage::Medical, referent, approve, None);
            assert!(matches!(result, Err(WorkflowError::AlreadyDecided(_))));
        }
        assert_eq!(invoice.validation_medicale.notes.as_deref(), Some("ok"));
        assert_eq!(invoice.validation_medicale.decided_by, Some(referent));
    }

    #[test]
    fn test_awaiting_stage_routes_to_role() {
        assert_eq!(
            InvoiceStatus::PendingSinistre.awaiting_stage().map(|s| s.role()),
            Some(Role::ClaimsAgent)
        );
        assert_eq!(InvoiceStatus::Validated.awaiting_stage(), None);
        assert_eq!(ApprovalStage::for_role(Role::InsurerAccountant), Some(ApprovalStage::Compta));
        assert_eq!(ApprovalStage::for_role(Role::HospitalDoctor), None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&InvoiceStatus::PendingSinistre).unwrap();
        assert_eq!(json, "\"pending_sinistre\"");
    }
}

fn line_strategy() -> impl Strategy<Value = LineInput> {
    ("[A-Za-z]{1,12}", 1i64..50, 0i64..10_000_000).prop_map(|(label, quantity, cents)| {
        LineInput::new(label, quantity, Decimal::new(cents, 2))
    })
}

proptest! {
    #[test]
    fn totals_follow_the_invoice_formula(
        inputs in proptest::collection::vec(line_strategy(), 1..8),
        rate_bp in 0u32..=10_000u32,
    ) {
        let tax_rate = Decimal::new(rate_bp as i64, 4);
        let lines: Vec<InvoiceLine> = inputs
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, input)| InvoiceLine::from_input(i, input, Currency::DZD).unwrap())
            .collect();

        let totals = compute_totals(&lines, tax_rate, Currency::DZD).unwrap();

        let expected_subtotal: Decimal = inputs
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity))
            .sum();
        let expected_tax = (expected_subtotal * tax_rate)
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);

        prop_assert_eq!(totals.subtotal.amount(), expected_subtotal);
        prop_assert_eq!(totals.tax_amount.amount(), expected_tax);
        prop_assert_eq!(totals.total.amount(), expected_subtotal + expected_tax);
    }
}
