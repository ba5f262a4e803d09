//! Repository implementations for the workflow tables
//!
//! Each repository owns the SQL for one table and maps between its row type
//! and the domain entity. Queries are built at runtime with
//! `sqlx::query_as` over `FromRow` row structs.
//!
//! Every table has a `version` column. `update` is a compare-and-set on the
//! version carried by the row; a miss is reported as `NotFound` when the row
//! is gone and as `VersionConflict` otherwise.

pub mod alerts;
pub mod claims;
pub mod stays;
pub mod invoices;
pub mod sequences;

pub use alerts::{AlertRepository, AlertRow};
pub use claims::{ClaimRepository, ClaimRow};
pub use stays::{StayRepository, StayRow};
pub use invoices::{InvoiceRepository, InvoiceRow};
pub use sequences::SequenceRepository;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Encodes a unit enum as the snake_case text stored in status columns
pub(crate) fn encode_enum<T: Serialize>(value: &T) -> Result<String, DatabaseError> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(text) => Ok(text),
        other => Err(DatabaseError::SerializationError(format!(
            "expected a text enum, got {}",
            other
        ))),
    }
}

/// Decodes a status column back into its enum
pub(crate) fn decode_enum<T: DeserializeOwned>(
    column: &str,
    text: &str,
) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(text.to_string())).map_err(|e| {
        DatabaseError::SerializationError(format!("{} '{}': {}", column, text, e))
    })
}

/// Explains why a compare-and-set update matched no row
pub(crate) async fn missed_update(
    pool: &PgPool,
    table: &'static str,
    entity: &str,
    id: Uuid,
    expected_version: i64,
) -> DatabaseError {
    let query = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", table);
    match sqlx::query_scalar::<_, bool>(&query).bind(id).fetch_one(pool).await {
        Ok(true) => DatabaseError::version_conflict(entity, id, expected_version),
        Ok(false) => DatabaseError::not_found(entity, id),
        Err(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_stay::StayStatus;

    #[test]
    fn test_enum_text_codec() {
        let text = encode_enum(&StayStatus::AwaitingValidation).unwrap();
        assert_eq!(text, "awaiting_validation");
        let back: StayStatus = decode_enum("status", &text).unwrap();
        assert_eq!(back, StayStatus::AwaitingValidation);
    }

    #[test]
    fn test_unknown_text_is_serialization_error() {
        let result: Result<StayStatus, _> = decode_enum("status", "archived");
        assert!(matches!(result, Err(DatabaseError::SerializationError(_))));
    }
}
