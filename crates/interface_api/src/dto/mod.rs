//! Request and response bodies
//!
//! Identifiers are rendered with their prefixes (`SIN-…`, `FAC-…`); path
//! parameters accept either the prefixed form or a bare UUID.

pub mod alerts;
pub mod claims;
pub mod stays;
pub mod invoices;

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{Page, PageRequest};

/// Body of every approve/reject decision
#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    pub approve: bool,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// `page` / `per_page` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageParams {
    pub fn request(&self, default_per_page: u32) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(default_per_page),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
}

impl<T, U: Into<T>> From<Page<U>> for PageResponse<T> {
    fn from(page: Page<U>) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            page: page.page,
            per_page: page.per_page,
            total: page.total,
        }
    }
}
