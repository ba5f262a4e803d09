//! Emergency Claim Workflow
//!
//! Ties the alert, claim, stay and invoice domains together:
//!
//! - [`classifier`]: derives one review stage per claim from its sub-entities
//! - [`ports`]: the versioned entity store the services persist through
//! - [`memory`]: in-memory store adapter
//! - [`services`]: role-gated workflow operations with optimistic concurrency
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_workflow::{InMemoryWorkflowStore, WorkflowConfig, WorkflowService};
//!
//! let store = Arc::new(InMemoryWorkflowStore::new());
//! let service = WorkflowService::new(store, WorkflowConfig::default());
//! let claim = service.assign_hospital(&operator, alert.id, hospital_id).await?;
//! let claim = service.decide_urgency(&referent, claim.id, true, None).await?;
//! ```

pub mod classifier;
pub mod memory;
pub mod ports;
pub mod services;

pub use classifier::{
    classify, matching_rule, ClaimSnapshot, ClaimStage, InvoiceSnapshot, StageRule, RULES,
};
pub use memory::InMemoryWorkflowStore;
pub use ports::{ClaimFilter, InvoiceFilter, WorkflowStore};
pub use services::{ClaimView, NewAlert, NewInvoice, WorkflowConfig, WorkflowService};
