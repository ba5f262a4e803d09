//! Invoice Approval Domain
//!
//! An invoice is issued by the hospital accountant for a validated stay and
//! then signed off by three independent approvers.
//!
//! # Approval Chain
//!
//! The three approval slots are stored independently, but the overall status
//! reads them as an ordered chain:
//!
//! ```text
//! medical (referent) -> sinistre (claims agent) -> compta (insurer accountant) -> validated
//!        │                       │                          │
//!        └──────── any rejection ends the chain: rejected ──┘
//! ```

pub mod approval;
pub mod invoice;

pub use approval::{Approval, ApprovalStage, ApprovalStatus};
pub use invoice::{Invoice, InvoiceLine, InvoiceStatus, LineInput, InvoiceTotals, compute_totals};
