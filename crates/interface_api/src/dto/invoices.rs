//! Invoice DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::Currency;
use domain_billing::{Approval, ApprovalStatus, Invoice, InvoiceLine, InvoiceStatus, LineInput};
use domain_workflow::NewInvoice;

use super::PageParams;

#[derive(Debug, Serialize, Deserialize)]
pub struct LineRequest {
    pub label: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    #[validate(length(min = 1, max = 200))]
    pub lines: Vec<LineRequest>,
    pub tax_rate: Decimal,
    /// ISO 4217 code; the service default applies when absent
    pub currency: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl CreateInvoiceRequest {
    /// Converts to the service input, rejecting unknown currencies
    pub fn into_new_invoice(self) -> Result<NewInvoice, String> {
        let currency = match self.currency {
            Some(code) => Some(
                Currency::from_code(&code)
                    .ok_or_else(|| format!("unsupported currency '{}'", code))?,
            ),
            None => None,
        };
        Ok(NewInvoice {
            lines: self
                .lines
                .into_iter()
                .map(|l| LineInput::new(l.label, l.quantity, l.unit_price))
                .collect(),
            tax_rate: self.tax_rate,
            currency,
            notes: self.notes,
        })
    }
}

/// Query of an approver's invoice queue
#[derive(Debug, Deserialize)]
pub struct InvoiceQueueQuery {
    pub awaiting: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl InvoiceQueueQuery {
    pub fn paging(&self) -> PageParams {
        PageParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineResponse {
    pub id: String,
    pub label: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total: Option<Decimal>,
}

impl From<InvoiceLine> for LineResponse {
    fn from(line: InvoiceLine) -> Self {
        Self {
            total: line.total().ok().map(|t| t.amount()),
            id: line.id.to_string(),
            label: line.label,
            quantity: line.quantity,
            unit_price: line.unit_price.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub status: ApprovalStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl From<Approval> for ApprovalResponse {
    fn from(approval: Approval) -> Self {
        Self {
            status: approval.status,
            decided_by: approval.decided_by.map(|a| a.to_string()),
            decided_at: approval.decided_at,
            notes: approval.notes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub numero: String,
    pub stay_id: String,
    pub claim_id: String,
    pub hospital_id: String,
    pub status: InvoiceStatus,
    pub currency: String,
    pub lines: Vec<LineResponse>,
    pub tax_rate: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
    pub issued_by: String,
    pub validation_medicale: ApprovalResponse,
    pub validation_sinistre: ApprovalResponse,
    pub validation_compta: ApprovalResponse,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            status: invoice.status(),
            id: invoice.id.to_string(),
            numero: invoice.numero,
            stay_id: invoice.stay_id.to_string(),
            claim_id: invoice.claim_id.to_string(),
            hospital_id: invoice.hospital_id.to_string(),
            currency: invoice.currency.code().to_string(),
            lines: invoice.lines.into_iter().map(LineResponse::from).collect(),
            tax_rate: invoice.tax_rate,
            subtotal: invoice.subtotal.amount(),
            tax_amount: invoice.tax_amount.amount(),
            total: invoice.total.amount(),
            notes: invoice.notes,
            issued_by: invoice.issued_by.to_string(),
            validation_medicale: invoice.validation_medicale.into(),
            validation_sinistre: invoice.validation_sinistre.into(),
            validation_compta: invoice.validation_compta.into(),
            version: invoice.version,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}
