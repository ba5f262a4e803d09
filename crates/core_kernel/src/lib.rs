//! Core Kernel - Foundational types for the emergency claim workflow
//!
//! This crate provides the building blocks shared by every workflow domain:
//! - Strongly-typed identifiers for alerts, claims, stays and invoices
//! - Money types with precise decimal arithmetic
//! - Caller identity and the role capability table
//! - The workflow error taxonomy and the port error used by store adapters

pub mod money;
pub mod identifiers;
pub mod access;
pub mod error;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{
    AlertId, ClaimId, StayId, InvoiceId, InvoiceLineId, StepId,
    ActorId, HospitalId,
};
pub use access::{Actor, Role, Operation, permits};
pub use error::WorkflowError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    Page, PageRequest,
};
