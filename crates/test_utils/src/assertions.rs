//! Custom Test Assertions
//!
//! Assertion helpers for workflow outcomes that give more meaningful
//! failure messages than `matches!`.

use std::fmt::Debug;

use rust_decimal::Decimal;

use core_kernel::WorkflowError;
use domain_billing::Invoice;
use domain_claims::{Claim, StepKey, StepStatus};

/// Asserts that a workflow call failed with the given error code
///
/// # Panics
///
/// Panics if the result is `Ok` or carries a different error code
pub fn assert_workflow_error<T: Debug>(result: Result<T, WorkflowError>, expected_code: &str) {
    match result {
        Ok(value) => panic!("Expected {} error, got Ok({:?})", expected_code, value),
        Err(err) => assert_eq!(
            err.code(),
            expected_code,
            "Expected {} error, got {}",
            expected_code,
            err
        ),
    }
}

/// Asserts the status of one workflow step
pub fn assert_step_status(claim: &Claim, key: StepKey, expected: StepStatus) {
    let actual = claim.step(key).map(|s| s.status);
    assert_eq!(
        actual,
        Some(expected),
        "Step {} of claim {} is {:?}, expected {}",
        key,
        claim.id,
        actual,
        expected
    );
}

/// Asserts that stored totals agree with the lines and tax rate
///
/// # Panics
///
/// Panics if subtotal is not the sum of the line totals, or total is not
/// subtotal plus tax
pub fn assert_invoice_totals_consistent(invoice: &Invoice) {
    let lines_sum: Decimal = invoice
        .lines
        .iter()
        .map(|l| l.unit_price.amount() * Decimal::from(l.quantity))
        .sum();
    assert_eq!(
        invoice.subtotal.amount(),
        lines_sum,
        "Subtotal {} does not match the line sum {}",
        invoice.subtotal,
        lines_sum
    );
    assert_eq!(
        invoice.total.amount(),
        invoice.subtotal.amount() + invoice.tax_amount.amount(),
        "Total {} is not subtotal {} + tax {}",
        invoice.total,
        invoice.subtotal,
        invoice.tax_amount
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_code_passes() {
        let result: Result<(), _> = Err(WorkflowError::already_decided("urgency"));
        assert_workflow_error(result, "already_decided");
    }

    #[test]
    #[should_panic(expected = "Expected forbidden error")]
    fn test_ok_result_panics() {
        assert_workflow_error(Ok::<_, WorkflowError>(1), "forbidden");
    }
}
