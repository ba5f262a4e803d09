//! Property-Based Test Generators
//!
//! Proptest strategies for workflow inputs that respect the domain's
//! validation rules, plus arbitrary classifier snapshots.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::Currency;
use domain_billing::{ApprovalStatus, LineInput};
use domain_claims::StepStatus;
use domain_stay::StayStatus;
use domain_workflow::{ClaimSnapshot, InvoiceSnapshot};

/// Strategy for supported currencies
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::DZD),
        Just(Currency::EUR),
        Just(Currency::MAD),
        Just(Currency::TND),
        Just(Currency::USD),
    ]
}

/// Unit prices from 0.00 to 100 000.00
pub fn unit_price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Tax rates in [0, 1] with four decimal places
pub fn tax_rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 4))
}

/// A line the invoice will accept
pub fn valid_line_strategy() -> impl Strategy<Value = LineInput> {
    ("[A-Za-z][A-Za-z ]{0,30}", 1i64..100i64, unit_price_strategy())
        .prop_map(|(label, quantity, price)| LineInput::new(label, quantity, price))
}

/// Between one and ten valid lines
pub fn valid_lines_strategy() -> impl Strategy<Value = Vec<LineInput>> {
    prop::collection::vec(valid_line_strategy(), 1..10)
}

/// Stay lengths in days, small enough to convert to hours
pub fn stay_days_strategy() -> impl Strategy<Value = u32> {
    0u32..3650u32
}

pub fn step_status_strategy() -> impl Strategy<Value = StepStatus> {
    prop_oneof![
        Just(StepStatus::Pending),
        Just(StepStatus::InProgress),
        Just(StepStatus::Completed),
        Just(StepStatus::Cancelled),
    ]
}

pub fn stay_status_strategy() -> impl Strategy<Value = StayStatus> {
    prop_oneof![
        Just(StayStatus::InProgress),
        Just(StayStatus::AwaitingValidation),
        Just(StayStatus::Validated),
        Just(StayStatus::Rejected),
        Just(StayStatus::Invoiced),
        Just(StayStatus::Completed),
    ]
}

pub fn approval_status_strategy() -> impl Strategy<Value = ApprovalStatus> {
    prop_oneof![
        Just(ApprovalStatus::Pending),
        Just(ApprovalStatus::Approved),
        Just(ApprovalStatus::Rejected),
    ]
}

pub fn invoice_snapshot_strategy() -> impl Strategy<Value = InvoiceSnapshot> {
    (
        approval_status_strategy(),
        approval_status_strategy(),
        approval_status_strategy(),
    )
        .prop_map(|(medical, sinistre, compta)| InvoiceSnapshot {
            medical,
            sinistre,
            compta,
        })
}

/// Any combination of urgency, stay and invoice state, consistent or not
pub fn claim_snapshot_strategy() -> impl Strategy<Value = ClaimSnapshot> {
    (
        prop::option::of(step_status_strategy()),
        prop::option::of(stay_status_strategy()),
        prop::option::of(invoice_snapshot_strategy()),
    )
        .prop_map(|(urgency, stay, invoice)| ClaimSnapshot {
            urgency,
            stay,
            invoice,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{ActorId, ClaimId, HospitalId, StayId};
    use domain_billing::Invoice;
    use domain_stay::{days_to_hours, hours_to_days};
    use domain_workflow::{classify, ClaimStage};

    use crate::assertions::assert_invoice_totals_consistent;
    use crate::builders::SnapshotBuilder;

    proptest! {
        #[test]
        fn test_generated_lines_issue_consistent_invoices(
            lines in valid_lines_strategy(),
            rate in tax_rate_strategy(),
            currency in currency_strategy(),
        ) {
            let invoice = Invoice::issue(
                StayId::new(),
                ClaimId::new(),
                HospitalId::new(),
                ActorId::new(),
                currency,
                lines,
                rate,
                None,
                Invoice::numero("FAC-202601", 1),
            )
            .unwrap();
            assert_invoice_totals_consistent(&invoice);
        }

        #[test]
        fn test_generated_days_round_trip(days in stay_days_strategy()) {
            prop_assert_eq!(hours_to_days(days_to_hours(days).unwrap()), days);
        }

        #[test]
        fn test_classifier_is_total_over_generated_snapshots(snapshot in claim_snapshot_strategy()) {
            let stage = classify(&snapshot);
            prop_assert!(ClaimStage::ALL.contains(&stage));
            prop_assert_eq!(classify(&snapshot), stage);
        }
    }

    #[test]
    fn test_snapshot_builder_feeds_classifier() {
        let snapshot = SnapshotBuilder::new()
            .urgency(StepStatus::Completed)
            .stay(StayStatus::Invoiced)
            .invoice(ApprovalStatus::Approved, ApprovalStatus::Pending, ApprovalStatus::Pending)
            .build();
        assert_eq!(classify(&snapshot), ClaimStage::InvoiceValidated);
    }
}
