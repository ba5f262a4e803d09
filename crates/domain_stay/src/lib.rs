//! Hospital Stay Domain
//!
//! A stay is one treatment episode: reception orients the patient to a doctor,
//! the doctor writes the report, the medical referent validates it and the
//! hospital accountant finally invoices it.
//!
//! # Stay Lifecycle
//!
//! ```text
//!              revise
//!             ┌──────┐
//!             ▼      │
//!        InProgress ─┘ ──close──> AwaitingValidation ──approve──> Validated ──invoice──> Invoiced ──complete──> Completed
//!             ▲                          │
//!             └────revise──── Rejected <─┘ reject
//! ```

pub mod stay;
pub mod report;

pub use stay::{HospitalStay, StayStatus, StayEvent, next_status};
pub use report::{StayReport, ReportSubmission, days_to_hours, hours_to_days, HOURS_PER_DAY};
