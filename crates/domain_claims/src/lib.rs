//! Claim Workflow Domain
//!
//! A claim ("sinistre") is opened when a hospital is engaged on an alert. It
//! carries a fixed template of workflow steps, each decided independently by
//! the role that owns it.
//!
//! # Step Template
//!
//! ```text
//! urgency_verification -> ambulance_dispatch -> orientation -> invoice_issued
//!   (referent)              (reception)          (reception)    (accountant)
//! ```

pub mod claim;
pub mod workflow;

pub use claim::{Claim, UrgencyOutcome};
pub use workflow::{WorkflowStep, StepKey, StepStatus, StepFamily, step_template};
