//! Domain Adapters
//!
//! Adapter implementations of the domain ports on top of the repository
//! layer. Each adapter implements the port trait, translates between domain
//! entities and row types, and maps `DatabaseError` into `PortError`.

pub mod workflow;

pub use workflow::PostgresWorkflowStore;
