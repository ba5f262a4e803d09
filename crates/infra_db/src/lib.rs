//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the emergency claim workflow using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: one repository per table owns
//! the SQL and its row type, and [`PostgresWorkflowStore`] adapts the
//! repositories to the `WorkflowStore` port used by the workflow services.
//!
//! # Concurrency
//!
//! Every table carries a `version` column. Updates only apply when the
//! stored version still matches the one the caller loaded, and the
//! uniqueness rules of the workflow (one claim per alert, one open stay per
//! claim, one invoice per stay) are unique indexes.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresWorkflowStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/emergency_claims")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresWorkflowStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::PostgresWorkflowStore;
