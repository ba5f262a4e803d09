//! Hospital stays table

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ActorId, ClaimId, HospitalId, InvoiceId, StayId};
use domain_stay::{HospitalStay, StayReport};

use super::{decode_enum, encode_enum, missed_update};
use crate::error::DatabaseError;

const COLUMNS: &str = "id, claim_id, hospital_id, doctor_id, status, report, orientation_notes, \
                       validation_notes, validated_by, validated_at, invoice_id, version, \
                       created_at, updated_at";

/// One row of `hospital_stays`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StayRow {
    pub id: Uuid,
    pub claim_id: Uuid,
    pub hospital_id: Uuid,
    pub doctor_id: Uuid,
    pub status: String,
    pub report: Json<StayReport>,
    pub orientation_notes: Option<String>,
    pub validation_notes: Option<String>,
    pub validated_by: Option<Uuid>,
    pub validated_at: Option<DateTime<Utc>>,
    pub invoice_id: Option<Uuid>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StayRow {
    pub fn from_domain(stay: &HospitalStay) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: *stay.id.as_uuid(),
            claim_id: *stay.claim_id.as_uuid(),
            hospital_id: *stay.hospital_id.as_uuid(),
            doctor_id: *stay.doctor_id.as_uuid(),
            status: encode_enum(&stay.status)?,
            report: Json(stay.report.clone()),
            orientation_notes: stay.orientation_notes.clone(),
            validation_notes: stay.validation_notes.clone(),
            validated_by: stay.validated_by.map(Uuid::from),
            validated_at: stay.validated_at,
            invoice_id: stay.invoice_id.map(Uuid::from),
            version: stay.version,
            created_at: stay.created_at,
            updated_at: stay.updated_at,
        })
    }

    pub fn into_domain(self) -> Result<HospitalStay, DatabaseError> {
        Ok(HospitalStay {
            id: StayId::from(self.id),
            claim_id: ClaimId::from(self.claim_id),
            hospital_id: HospitalId::from(self.hospital_id),
            doctor_id: ActorId::from(self.doctor_id),
            status: decode_enum("hospital_stays.status", &self.status)?,
            report: self.report.0,
            orientation_notes: self.orientation_notes,
            validation_notes: self.validation_notes,
            validated_by: self.validated_by.map(ActorId::from),
            validated_at: self.validated_at,
            invoice_id: self.invoice_id.map(InvoiceId::from),
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for the `hospital_stays` table
#[derive(Debug, Clone)]
pub struct StayRepository {
    pool: PgPool,
}

impl StayRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a stay; a second open stay for the claim hits `hospital_stays_open_per_claim`
    pub async fn insert(&self, row: &StayRow) -> Result<StayRow, DatabaseError> {
        let query = format!(
            "INSERT INTO hospital_stays ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, StayRow>(&query)
            .bind(row.id)
            .bind(row.claim_id)
            .bind(row.hospital_id)
            .bind(row.doctor_id)
            .bind(&row.status)
            .bind(&row.report)
            .bind(&row.orientation_notes)
            .bind(&row.validation_notes)
            .bind(row.validated_by)
            .bind(row.validated_at)
            .bind(row.invoice_id)
            .bind(row.version)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<StayRow, DatabaseError> {
        let query = format!("SELECT {COLUMNS} FROM hospital_stays WHERE id = $1");
        sqlx::query_as::<_, StayRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("stay", id))
    }

    /// All stays of a claim, oldest first
    pub async fn find_by_claim(&self, claim_id: Uuid) -> Result<Vec<StayRow>, DatabaseError> {
        let query = format!(
            "SELECT {COLUMNS} FROM hospital_stays WHERE claim_id = $1 ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, StayRow>(&query)
            .bind(claim_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn update(&self, row: &StayRow) -> Result<StayRow, DatabaseError> {
        let query = format!(
            "UPDATE hospital_stays SET doctor_id = $3, status = $4, report = $5, \
             orientation_notes = $6, validation_notes = $7, validated_by = $8, \
             validated_at = $9, invoice_id = $10, updated_at = $11, version = version + 1 \
             WHERE id = $1 AND version = $2 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, StayRow>(&query)
            .bind(row.id)
            .bind(row.version)
            .bind(row.doctor_id)
            .bind(&row.status)
            .bind(&row.report)
            .bind(&row.orientation_notes)
            .bind(&row.validation_notes)
            .bind(row.validated_by)
            .bind(row.validated_at)
            .bind(row.invoice_id)
            .bind(row.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Ok(row),
            None => {
                Err(missed_update(&self.pool, "hospital_stays", "stay", row.id, row.version).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_stay::StayStatus;

    #[test]
    fn test_stay_row_conversion() {
        let stay = HospitalStay::orient(
            ClaimId::new(),
            HospitalId::new(),
            ActorId::new(),
            Some("cardiology".to_string()),
        );
        let row = StayRow::from_domain(&stay).unwrap();
        assert_eq!(row.status, "in_progress");

        let back = row.into_domain().unwrap();
        assert_eq!(back.status, StayStatus::InProgress);
        assert_eq!(back, stay);
    }
}
