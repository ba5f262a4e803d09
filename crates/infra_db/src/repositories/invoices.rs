//! Invoices table
//!
//! Lines and the three approval slots are JSONB. The `status` column is
//! derived from the slots and rewritten on every write so the approval
//! queues can filter on it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ActorId, ClaimId, Currency, HospitalId, InvoiceId, Money, StayId};
use domain_billing::{Approval, Invoice, InvoiceLine};

use super::missed_update;
use crate::error::DatabaseError;

const COLUMNS: &str = "id, numero, stay_id, claim_id, hospital_id, currency, lines, tax_rate, \
                       subtotal, tax_amount, total, notes, issued_by, validation_medicale, \
                       validation_sinistre, validation_compta, status, version, created_at, \
                       updated_at";

/// One row of `invoices`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub numero: String,
    pub stay_id: Uuid,
    pub claim_id: Uuid,
    pub hospital_id: Uuid,
    pub currency: String,
    pub lines: Json<Vec<InvoiceLine>>,
    pub tax_rate: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
    pub issued_by: Uuid,
    pub validation_medicale: Json<Approval>,
    pub validation_sinistre: Json<Approval>,
    pub validation_compta: Json<Approval>,
    pub status: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceRow {
    pub fn from_domain(invoice: &Invoice) -> Self {
        Self {
            id: *invoice.id.as_uuid(),
            numero: invoice.numero.clone(),
            stay_id: *invoice.stay_id.as_uuid(),
            claim_id: *invoice.claim_id.as_uuid(),
            hospital_id: *invoice.hospital_id.as_uuid(),
            currency: invoice.currency.code().to_string(),
            lines: Json(invoice.lines.clone()),
            tax_rate: invoice.tax_rate,
            subtotal: invoice.subtotal.amount(),
            tax_amount: invoice.tax_amount.amount(),
            total: invoice.total.amount(),
            notes: invoice.notes.clone(),
            issued_by: *invoice.issued_by.as_uuid(),
            validation_medicale: Json(invoice.validation_medicale.clone()),
            validation_sinistre: Json(invoice.validation_sinistre.clone()),
            validation_compta: Json(invoice.validation_compta.clone()),
            status: invoice.status().as_str().to_string(),
            version: invoice.version,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }

    pub fn into_domain(self) -> Result<Invoice, DatabaseError> {
        let currency = Currency::from_code(self.currency.trim()).ok_or_else(|| {
            DatabaseError::SerializationError(format!(
                "invoices.currency '{}' is not a supported currency",
                self.currency
            ))
        })?;

        Ok(Invoice {
            id: InvoiceId::from(self.id),
            numero: self.numero,
            stay_id: StayId::from(self.stay_id),
            claim_id: ClaimId::from(self.claim_id),
            hospital_id: HospitalId::from(self.hospital_id),
            currency,
            lines: self.lines.0,
            tax_rate: self.tax_rate,
            subtotal: Money::new(self.subtotal, currency),
            tax_amount: Money::new(self.tax_amount, currency),
            total: Money::new(self.total, currency),
            notes: self.notes,
            issued_by: ActorId::from(self.issued_by),
            validation_medicale: self.validation_medicale.0,
            validation_sinistre: self.validation_sinistre.0,
            validation_compta: self.validation_compta.0,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for the `invoices` table
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an invoice; a second invoice for the stay hits `invoices_stay_unique`
    pub async fn insert(&self, row: &InvoiceRow) -> Result<InvoiceRow, DatabaseError> {
        let query = format!(
            "INSERT INTO invoices ({COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, InvoiceRow>(&query)
            .bind(row.id)
            .bind(&row.numero)
            .bind(row.stay_id)
            .bind(row.claim_id)
            .bind(row.hospital_id)
            .bind(&row.currency)
            .bind(&row.lines)
            .bind(row.tax_rate)
            .bind(row.subtotal)
            .bind(row.tax_amount)
            .bind(row.total)
            .bind(&row.notes)
            .bind(row.issued_by)
            .bind(&row.validation_medicale)
            .bind(&row.validation_sinistre)
            .bind(&row.validation_compta)
            .bind(&row.status)
            .bind(row.version)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<InvoiceRow, DatabaseError> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, InvoiceRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("invoice", id))
    }

    pub async fn find_by_stay(&self, stay_id: Uuid) -> Result<Option<InvoiceRow>, DatabaseError> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE stay_id = $1");
        let row = sqlx::query_as::<_, InvoiceRow>(&query)
            .bind(stay_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Lists invoices, optionally by derived status and hospital set
    pub async fn list(
        &self,
        status: Option<&str>,
        hospital_ids: Option<&[Uuid]>,
    ) -> Result<Vec<InvoiceRow>, DatabaseError> {
        let query = format!(
            "SELECT {COLUMNS} FROM invoices \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::uuid[] IS NULL OR hospital_id = ANY($2)) \
             ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, InvoiceRow>(&query)
            .bind(status)
            .bind(hospital_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Writes the approval slots and the derived status
    pub async fn update(&self, row: &InvoiceRow) -> Result<InvoiceRow, DatabaseError> {
        let query = format!(
            "UPDATE invoices SET notes = $3, validation_medicale = $4, validation_sinistre = $5, \
             validation_compta = $6, status = $7, updated_at = $8, version = version + 1 \
             WHERE id = $1 AND version = $2 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, InvoiceRow>(&query)
            .bind(row.id)
            .bind(row.version)
            .bind(&row.notes)
            .bind(&row.validation_medicale)
            .bind(&row.validation_sinistre)
            .bind(&row.validation_compta)
            .bind(&row.status)
            .bind(row.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Ok(row),
            None => {
                Err(missed_update(&self.pool, "invoices", "invoice", row.id, row.version).await)
            }
        }
    }
}
