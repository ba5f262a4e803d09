//! Alert Lifecycle Domain
//!
//! An alert is the emergency declaration that starts every claim.
//!
//! # Alert Lifecycle
//!
//! ```text
//! Pending -> Active -> Resolved
//!    |         |
//!    +---------+----> Cancelled
//! ```

pub mod alert;

pub use alert::{Alert, AlertStatus, AlertPriority, AlertAction};
