//! Stay invoices
//!
//! Invoices are issued once per validated stay. Lines are fixed at issue;
//! afterwards only the three approval slots change.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{
    ActorId, ClaimId, Currency, HospitalId, InvoiceId, InvoiceLineId, Money, StayId,
    WorkflowError,
};
use crate::approval::{Approval, ApprovalStage, ApprovalStatus};

/// Overall invoice status derived from the approval slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    PendingMedical,
    PendingSinistre,
    PendingCompta,
    Validated,
    Rejected,
}

impl InvoiceStatus {
    /// Stage whose approver currently has the invoice in their queue
    pub fn awaiting_stage(&self) -> Option<ApprovalStage> {
        match self {
            InvoiceStatus::PendingMedical => Some(ApprovalStage::Medical),
            InvoiceStatus::PendingSinistre => Some(ApprovalStage::Sinistre),
            InvoiceStatus::PendingCompta => Some(ApprovalStage::Compta),
            InvoiceStatus::Validated | InvoiceStatus::Rejected => None,
        }
    }

    /// Status of an invoice waiting on `stage`
    pub fn pending_at(stage: ApprovalStage) -> Self {
        match stage {
            ApprovalStage::Medical => InvoiceStatus::PendingMedical,
            ApprovalStage::Sinistre => InvoiceStatus::PendingSinistre,
            ApprovalStage::Compta => InvoiceStatus::PendingCompta,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::PendingMedical => "pending_medical",
            InvoiceStatus::PendingSinistre => "pending_sinistre",
            InvoiceStatus::PendingCompta => "pending_compta",
            InvoiceStatus::Validated => "validated",
            InvoiceStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line as entered by the accountant, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    pub label: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl LineInput {
    pub fn new(label: impl Into<String>, quantity: i64, unit_price: Decimal) -> Self {
        Self {
            label: label.into(),
            quantity,
            unit_price,
        }
    }
}

/// A validated invoice line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: InvoiceLineId,
    pub label: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl InvoiceLine {
    /// Validates a line input; `index` is only used for error reporting
    pub fn from_input(
        index: usize,
        input: LineInput,
        currency: Currency,
    ) -> Result<Self, WorkflowError> {
        let label = input.label.trim();
        if label.is_empty() {
            return Err(WorkflowError::invalid_line(index, "label must not be empty"));
        }
        if input.quantity < 1 {
            return Err(WorkflowError::invalid_line(index, "quantity must be at least 1"));
        }
        let quantity = u32::try_from(input.quantity)
            .map_err(|_| WorkflowError::invalid_line(index, "quantity is out of range"))?;
        if input.unit_price.is_sign_negative() && !input.unit_price.is_zero() {
            return Err(WorkflowError::invalid_line(index, "unit price must not be negative"));
        }

        Ok(Self {
            id: InvoiceLineId::new_v7(),
            label: label.to_string(),
            quantity,
            unit_price: Money::new(input.unit_price, currency),
        })
    }

    /// quantity × unit price
    pub fn total(&self) -> Result<Money, WorkflowError> {
        Ok(self.unit_price.checked_mul(Decimal::from(self.quantity))?)
    }
}

/// Invoice amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total: Money,
}

/// Computes subtotal, tax (rounded to whole units) and total
pub fn compute_totals(
    lines: &[InvoiceLine],
    tax_rate: Decimal,
    currency: Currency,
) -> Result<InvoiceTotals, WorkflowError> {
    let line_totals = lines
        .iter()
        .map(InvoiceLine::total)
        .collect::<Result<Vec<_>, _>>()?;
    let subtotal = Money::sum(currency, &line_totals)?;
    let tax_amount = subtotal.checked_mul(tax_rate)?.round_to_units();
    let total = subtotal.checked_add(&tax_amount)?;
    Ok(InvoiceTotals {
        subtotal,
        tax_amount,
        total,
    })
}

/// An invoice for one hospital stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Invoice number (human-readable)
    pub numero: String,
    pub stay_id: StayId,
    pub claim_id: ClaimId,
    pub hospital_id: HospitalId,
    pub currency: Currency,
    pub lines: Vec<InvoiceLine>,
    /// Tax rate in [0, 1]
    pub tax_rate: Decimal,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total: Money,
    pub notes: Option<String>,
    /// Hospital accountant who issued the invoice
    pub issued_by: ActorId,
    pub validation_medicale: Approval,
    pub validation_sinistre: Approval,
    pub validation_compta: Approval,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Issues an invoice, validating every line and the tax rate
    ///
    /// # Errors
    ///
    /// * `InvalidLine` for the first offending line
    /// * `Validation` when there are no lines or the tax rate is outside [0, 1]
    ///
    /// `numero` comes from [`Invoice::numero`] over the store's sequence.
    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        stay_id: StayId,
        claim_id: ClaimId,
        hospital_id: HospitalId,
        issued_by: ActorId,
        currency: Currency,
        lines: Vec<LineInput>,
        tax_rate: Decimal,
        notes: Option<String>,
        numero: String,
    ) -> Result<Self, WorkflowError> {
        if lines.is_empty() {
            return Err(WorkflowError::validation("an invoice needs at least one line"));
        }
        if tax_rate < Decimal::ZERO || tax_rate > dec!(1) {
            return Err(WorkflowError::validation(format!(
                "tax rate {} is outside [0, 1]",
                tax_rate
            )));
        }

        let lines = lines
            .into_iter()
            .enumerate()
            .map(|(index, input)| InvoiceLine::from_input(index, input, currency))
            .collect::<Result<Vec<_>, _>>()?;
        let totals = compute_totals(&lines, tax_rate, currency)?;

        let now = Utc::now();
        Ok(Self {
            id: InvoiceId::new_v7(),
            numero,
            stay_id,
            claim_id,
            hospital_id,
            currency,
            lines,
            tax_rate,
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            total: totals.total,
            notes,
            issued_by,
            validation_medicale: Approval::pending(),
            validation_sinistre: Approval::pending(),
            validation_compta: Approval::pending(),
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the slot for a stage
    pub fn approval(&self, stage: ApprovalStage) -> &Approval {
        match stage {
            ApprovalStage::Medical => &self.validation_medicale,
            ApprovalStage::Sinistre => &self.validation_sinistre,
            ApprovalStage::Compta => &self.validation_compta,
        }
    }

    fn approval_mut(&mut self, stage: ApprovalStage) -> &mut Approval {
        match stage {
            ApprovalStage::Medical => &mut self.validation_medicale,
            ApprovalStage::Sinistre => &mut self.validation_sinistre,
            ApprovalStage::Compta => &mut self.validation_compta,
        }
    }

    /// Overall status, reading the slots in chain order
    pub fn status(&self) -> InvoiceStatus {
        for stage in ApprovalStage::CHAIN {
            match self.approval(stage).status {
                ApprovalStatus::Approved => continue,
                ApprovalStatus::Rejected => return InvoiceStatus::Rejected,
                ApprovalStatus::Pending => return InvoiceStatus::pending_at(stage),
            }
        }
        InvoiceStatus::Validated
    }

    /// Records one stage's decision and returns the new overall status
    pub fn decide(
        &mut self,
        stage: ApprovalStage,
        by: ActorId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<InvoiceStatus, WorkflowError> {
        self.approval_mut(stage).decide(stage, by, approve, notes)?;
        self.updated_at = Utc::now();
        Ok(self.status())
    }

    /// Counter scope of invoice numbers: one sequence per month
    pub fn numero_scope(issued_at: DateTime<Utc>) -> String {
        format!("FAC-{}", issued_at.format("%Y%m"))
    }

    /// Invoice number for a scope and its next sequence value
    pub fn numero(scope: &str, sequence: u64) -> String {
        format!("{}-{:06}", scope, sequence)
    }

    /// Recomputes the totals from the lines
    pub fn totals(&self) -> Result<InvoiceTotals, WorkflowError> {
        compute_totals(&self.lines, self.tax_rate, self.currency)
    }
}
