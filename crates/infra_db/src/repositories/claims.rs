//! Claims table
//!
//! Workflow steps are stored inline as a JSONB array in template order.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ActorId, AlertId, ClaimId, HospitalId};
use domain_claims::{Claim, WorkflowStep};

use super::missed_update;
use crate::error::DatabaseError;

const COLUMNS: &str =
    "id, alert_id, hospital_id, numero, referent_id, steps, version, created_at, updated_at";

/// One row of `claims`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub id: Uuid,
    pub alert_id: Uuid,
    pub hospital_id: Uuid,
    pub numero: Option<String>,
    pub referent_id: Option<Uuid>,
    pub steps: Json<Vec<WorkflowStep>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClaimRow {
    pub fn from_domain(claim: &Claim) -> Self {
        Self {
            id: *claim.id.as_uuid(),
            alert_id: *claim.alert_id.as_uuid(),
            hospital_id: *claim.hospital_id.as_uuid(),
            numero: claim.numero.clone(),
            referent_id: claim.referent_id.map(Uuid::from),
            steps: Json(claim.steps.clone()),
            version: claim.version,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }

    pub fn into_domain(self) -> Claim {
        Claim {
            id: ClaimId::from(self.id),
            alert_id: AlertId::from(self.alert_id),
            hospital_id: HospitalId::from(self.hospital_id),
            numero: self.numero,
            steps: self.steps.0,
            referent_id: self.referent_id.map(ActorId::from),
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for the `claims` table
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

impl ClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a claim; a second claim for the same alert hits `claims_alert_unique`
    pub async fn insert(&self, row: &ClaimRow) -> Result<ClaimRow, DatabaseError> {
        let query = format!(
            "INSERT INTO claims ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ClaimRow>(&query)
            .bind(row.id)
            .bind(row.alert_id)
            .bind(row.hospital_id)
            .bind(&row.numero)
            .bind(row.referent_id)
            .bind(&row.steps)
            .bind(row.version)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ClaimRow, DatabaseError> {
        let query = format!("SELECT {COLUMNS} FROM claims WHERE id = $1");
        sqlx::query_as::<_, ClaimRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("claim", id))
    }

    pub async fn find_by_alert(&self, alert_id: Uuid) -> Result<Option<ClaimRow>, DatabaseError> {
        let query = format!("SELECT {COLUMNS} FROM claims WHERE alert_id = $1");
        let row = sqlx::query_as::<_, ClaimRow>(&query)
            .bind(alert_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Claims followed by the referent or located at one of the hospitals
    pub async fn list_visible(
        &self,
        referent_id: Option<Uuid>,
        hospital_ids: &[Uuid],
    ) -> Result<Vec<ClaimRow>, DatabaseError> {
        let query = format!(
            "SELECT {COLUMNS} FROM claims \
             WHERE ($1::uuid IS NOT NULL AND referent_id = $1) OR hospital_id = ANY($2) \
             ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, ClaimRow>(&query)
            .bind(referent_id)
            .bind(hospital_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn update(&self, row: &ClaimRow) -> Result<ClaimRow, DatabaseError> {
        let query = format!(
            "UPDATE claims SET hospital_id = $3, numero = $4, referent_id = $5, steps = $6, \
             updated_at = $7, version = version + 1 \
             WHERE id = $1 AND version = $2 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ClaimRow>(&query)
            .bind(row.id)
            .bind(row.version)
            .bind(row.hospital_id)
            .bind(&row.numero)
            .bind(row.referent_id)
            .bind(&row.steps)
            .bind(row.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Ok(row),
            None => Err(missed_update(&self.pool, "claims", "claim", row.id, row.version).await),
        }
    }
}
