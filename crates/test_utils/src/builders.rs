//! Test Data Builders
//!
//! Builders for service inputs and classifier snapshots. Tests specify only
//! the fields they care about; the rest gets sensible defaults.

use fake::faker::address::en::CityName;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::Currency;
use domain_alert::AlertPriority;
use domain_billing::{ApprovalStatus, LineInput};
use domain_claims::StepStatus;
use domain_stay::{ReportSubmission, StayStatus};
use domain_workflow::{ClaimSnapshot, InvoiceSnapshot, NewAlert, NewInvoice};

/// Builder for [`NewAlert`] with a generated description and location
pub struct NewAlertBuilder {
    priority: AlertPriority,
    description: Option<String>,
    location: Option<String>,
}

impl Default for NewAlertBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewAlertBuilder {
    pub fn new() -> Self {
        Self {
            priority: AlertPriority::Urgent,
            description: Some(Sentence(3..8).fake()),
            location: Some(CityName().fake()),
        }
    }

    pub fn priority(mut self, priority: AlertPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn without_details(mut self) -> Self {
        self.description = None;
        self.location = None;
        self
    }

    pub fn build(self) -> NewAlert {
        NewAlert {
            priority: self.priority,
            description: self.description,
            location: self.location,
        }
    }
}

/// Builder for [`NewInvoice`]
///
/// Defaults to two lines (2 000 + 2 × 5 000) at 9% tax in the service's
/// default currency.
pub struct NewInvoiceBuilder {
    lines: Vec<LineInput>,
    tax_rate: Decimal,
    currency: Option<Currency>,
    notes: Option<String>,
}

impl Default for NewInvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewInvoiceBuilder {
    pub fn new() -> Self {
        Self {
            lines: vec![
                LineInput::new("Consultation", 1, dec!(2000)),
                LineInput::new("Nuit d'hospitalisation", 2, dec!(5000)),
            ],
            tax_rate: dec!(0.09),
            currency: None,
            notes: None,
        }
    }

    /// Replaces the default lines
    pub fn lines(mut self, lines: Vec<LineInput>) -> Self {
        self.lines = lines;
        self
    }

    pub fn line(mut self, label: &str, quantity: i64, unit_price: Decimal) -> Self {
        self.lines.push(LineInput::new(label, quantity, unit_price));
        self
    }

    pub fn tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> NewInvoice {
        NewInvoice {
            lines: self.lines,
            tax_rate: self.tax_rate,
            currency: self.currency,
            notes: self.notes,
        }
    }
}

/// Builder for a doctor's [`ReportSubmission`]
pub struct ReportBuilder {
    submission: ReportSubmission,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            submission: ReportSubmission {
                motif_consultation: Some("Douleur thoracique".to_string()),
                acts: Some(vec!["ECG".to_string()]),
                ..ReportSubmission::default()
            },
        }
    }

    pub fn days(mut self, days: u32) -> Self {
        self.submission.duration_days = Some(days);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.submission.summary = Some(summary.into());
        self
    }

    pub fn build(self) -> ReportSubmission {
        self.submission
    }
}

/// Builder for classifier input
#[derive(Default)]
pub struct SnapshotBuilder {
    snapshot: ClaimSnapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn urgency(mut self, status: StepStatus) -> Self {
        self.snapshot.urgency = Some(status);
        self
    }

    pub fn stay(mut self, status: StayStatus) -> Self {
        self.snapshot.stay = Some(status);
        self
    }

    /// Invoice with the given approval slots
    pub fn invoice(
        mut self,
        medical: ApprovalStatus,
        sinistre: ApprovalStatus,
        compta: ApprovalStatus,
    ) -> Self {
        self.snapshot.invoice = Some(InvoiceSnapshot {
            medical,
            sinistre,
            compta,
        });
        self
    }

    pub fn build(self) -> ClaimSnapshot {
        self.snapshot
    }
}
