//! Request handlers
//!
//! Handlers parse the request, take the caller's [`core_kernel::Actor`] from
//! the request extensions and delegate to the workflow service.

pub mod alerts;
pub mod claims;
pub mod stays;
pub mod invoices;
pub mod health;

use std::str::FromStr;

use crate::error::ApiError;

/// Parses a path identifier, prefixed (`SIN-…`) or bare UUID
pub(crate) fn parse_id<T: FromStr>(raw: &str, entity: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("malformed {} id '{}'", entity, raw)))
}
