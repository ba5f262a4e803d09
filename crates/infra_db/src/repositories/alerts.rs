//! Alerts table

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ActorId, AlertId, HospitalId};
use domain_alert::Alert;

use super::{decode_enum, encode_enum, missed_update};
use crate::error::DatabaseError;

const COLUMNS: &str = "id, insured_id, status, priority, assigned_hospital, description, \
                       location, version, created_at, updated_at";

/// One row of `alerts`
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AlertRow {
    pub id: Uuid,
    pub insured_id: Uuid,
    pub status: String,
    pub priority: String,
    pub assigned_hospital: Option<Uuid>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AlertRow {
    pub fn from_domain(alert: &Alert) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: *alert.id.as_uuid(),
            insured_id: *alert.insured_id.as_uuid(),
            status: encode_enum(&alert.status)?,
            priority: encode_enum(&alert.priority)?,
            assigned_hospital: alert.assigned_hospital.map(Uuid::from),
            description: alert.description.clone(),
            location: alert.location.clone(),
            version: alert.version,
            created_at: alert.created_at,
            updated_at: alert.updated_at,
        })
    }

    pub fn into_domain(self) -> Result<Alert, DatabaseError> {
        Ok(Alert {
            id: AlertId::from(self.id),
            insured_id: ActorId::from(self.insured_id),
            status: decode_enum("alerts.status", &self.status)?,
            priority: decode_enum("alerts.priority", &self.priority)?,
            assigned_hospital: self.assigned_hospital.map(HospitalId::from),
            description: self.description,
            location: self.location,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for the `alerts` table
#[derive(Debug, Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: &AlertRow) -> Result<AlertRow, DatabaseError> {
        let query = format!(
            "INSERT INTO alerts ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, AlertRow>(&query)
            .bind(row.id)
            .bind(row.insured_id)
            .bind(&row.status)
            .bind(&row.priority)
            .bind(row.assigned_hospital)
            .bind(&row.description)
            .bind(&row.location)
            .bind(row.version)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<AlertRow, DatabaseError> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, AlertRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("alert", id))
    }

    /// Writes the row if it is still at `row.version`, bumping the version
    pub async fn update(&self, row: &AlertRow) -> Result<AlertRow, DatabaseError> {
        let query = format!(
            "UPDATE alerts SET status = $3, priority = $4, assigned_hospital = $5, \
             description = $6, location = $7, updated_at = $8, version = version + 1 \
             WHERE id = $1 AND version = $2 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, AlertRow>(&query)
            .bind(row.id)
            .bind(row.version)
            .bind(&row.status)
            .bind(&row.priority)
            .bind(row.assigned_hospital)
            .bind(&row.description)
            .bind(&row.location)
            .bind(row.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Ok(row),
            None => Err(missed_update(&self.pool, "alerts", "alert", row.id, row.version).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_alert::{AlertPriority, AlertStatus};

    #[test]
    fn test_row_carries_text_enums() {
        let mut alert = Alert::raise(ActorId::new(), AlertPriority::Critical).with_location("Oran");
        alert.assign_hospital(HospitalId::new()).unwrap();

        let row = AlertRow::from_domain(&alert).unwrap();
        assert_eq!(row.status, "active");
        assert_eq!(row.priority, "critical");

        let back = row.into_domain().unwrap();
        assert_eq!(back.status, AlertStatus::Active);
        assert_eq!(back, alert);
    }
}
