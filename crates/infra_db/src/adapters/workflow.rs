//! PostgreSQL Workflow Store
//!
//! `PostgresWorkflowStore` implements the `WorkflowStore` port over the four
//! workflow repositories. Row types are converted to domain entities here and
//! database errors are translated into `PortError`.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::PostgresWorkflowStore;
//! use domain_workflow::{WorkflowService, WorkflowConfig};
//!
//! let store = Arc::new(PostgresWorkflowStore::new(pool));
//! let service = WorkflowService::new(store, WorkflowConfig::default());
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, AlertId, ClaimId, DomainPort, HealthCheckResult, HealthCheckable, InvoiceId,
    PortError, StayId,
};
use domain_alert::Alert;
use domain_billing::Invoice;
use domain_claims::Claim;
use domain_stay::HospitalStay;
use domain_workflow::{ClaimFilter, InvoiceFilter, WorkflowStore};

use crate::repositories::{
    AlertRepository, AlertRow, ClaimRepository, ClaimRow, InvoiceRepository, InvoiceRow,
    SequenceRepository, StayRepository, StayRow,
};

const ADAPTER_ID: &str = "postgres-workflow-store";

/// PostgreSQL-backed implementation of the `WorkflowStore` port
///
/// Updates are `UPDATE ... WHERE version = $n`; a lost race comes back as
/// `PortError::Conflict`, as do unique index violations on insert.
#[derive(Debug, Clone)]
pub struct PostgresWorkflowStore {
    alerts: AlertRepository,
    claims: ClaimRepository,
    stays: StayRepository,
    invoices: InvoiceRepository,
    sequences: SequenceRepository,
    pool: PgPool,
}

impl PostgresWorkflowStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            alerts: AlertRepository::new(pool.clone()),
            claims: ClaimRepository::new(pool.clone()),
            stays: StayRepository::new(pool.clone()),
            invoices: InvoiceRepository::new(pool.clone()),
            sequences: SequenceRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresWorkflowStore {}

#[async_trait]
impl HealthCheckable for PostgresWorkflowStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl WorkflowStore for PostgresWorkflowStore {
    #[instrument(skip(self, alert), fields(alert_id = %alert.id))]
    async fn insert_alert(&self, alert: &Alert) -> Result<Alert, PortError> {
        let row = self.alerts.insert(&AlertRow::from_domain(alert)?).await?;
        Ok(row.into_domain()?)
    }

    #[instrument(skip(self), fields(alert_id = %id))]
    async fn get_alert(&self, id: AlertId) -> Result<Alert, PortError> {
        let row = self.alerts.get_by_id(id.into()).await?;
        Ok(row.into_domain()?)
    }

    #[instrument(skip(self, alert), fields(alert_id = %alert.id, version = alert.version))]
    async fn update_alert(&self, alert: &Alert) -> Result<Alert, PortError> {
        let row = self.alerts.update(&AlertRow::from_domain(alert)?).await?;
        Ok(row.into_domain()?)
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id, alert_id = %claim.alert_id))]
    async fn insert_claim(&self, claim: &Claim) -> Result<Claim, PortError> {
        let row = self.claims.insert(&ClaimRow::from_domain(claim)).await?;
        Ok(row.into_domain())
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        let row = self.claims.get_by_id(id.into()).await?;
        Ok(row.into_domain())
    }

    #[instrument(skip(self), fields(alert_id = %alert_id))]
    async fn find_claim_by_alert(&self, alert_id: AlertId) -> Result<Option<Claim>, PortError> {
        let row = self.claims.find_by_alert(alert_id.into()).await?;
        Ok(row.map(ClaimRow::into_domain))
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id, version = claim.version))]
    async fn update_claim(&self, claim: &Claim) -> Result<Claim, PortError> {
        let row = self.claims.update(&ClaimRow::from_domain(claim)).await?;
        Ok(row.into_domain())
    }

    #[instrument(skip(self, filter), fields(hospitals = filter.hospital_ids.len()))]
    async fn list_claims(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, PortError> {
        let hospital_ids: Vec<Uuid> = filter.hospital_ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = self
            .claims
            .list_visible(filter.referent_id.map(Uuid::from), &hospital_ids)
            .await?;
        debug!(count = rows.len(), "Listed claims");
        Ok(rows.into_iter().map(ClaimRow::into_domain).collect())
    }

    #[instrument(skip(self, stay), fields(stay_id = %stay.id, claim_id = %stay.claim_id))]
    async fn insert_stay(&self, stay: &HospitalStay) -> Result<HospitalStay, PortError> {
        let row = self.stays.insert(&StayRow::from_domain(stay)?).await?;
        Ok(row.into_domain()?)
    }

    #[instrument(skip(self), fields(stay_id = %id))]
    async fn get_stay(&self, id: StayId) -> Result<HospitalStay, PortError> {
        let row = self.stays.get_by_id(id.into()).await?;
        Ok(row.into_domain()?)
    }

    #[instrument(skip(self), fields(claim_id = %claim_id))]
    async fn find_stays_by_claim(&self, claim_id: ClaimId) -> Result<Vec<HospitalStay>, PortError> {
        let rows = self.stays.find_by_claim(claim_id.into()).await?;
        let stays = rows
            .into_iter()
            .map(StayRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stays)
    }

    #[instrument(skip(self, stay), fields(stay_id = %stay.id, version = stay.version))]
    async fn update_stay(&self, stay: &HospitalStay) -> Result<HospitalStay, PortError> {
        let row = self.stays.update(&StayRow::from_domain(stay)?).await?;
        Ok(row.into_domain()?)
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id, stay_id = %invoice.stay_id))]
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<Invoice, PortError> {
        let row = self.invoices.insert(&InvoiceRow::from_domain(invoice)).await?;
        Ok(row.into_domain()?)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        let row = self.invoices.get_by_id(id.into()).await?;
        Ok(row.into_domain()?)
    }

    #[instrument(skip(self), fields(stay_id = %stay_id))]
    async fn find_invoice_by_stay(&self, stay_id: StayId) -> Result<Option<Invoice>, PortError> {
        let row = self.invoices.find_by_stay(stay_id.into()).await?;
        Ok(row.map(InvoiceRow::into_domain).transpose()?)
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id, version = invoice.version))]
    async fn update_invoice(&self, invoice: &Invoice) -> Result<Invoice, PortError> {
        let row = self.invoices.update(&InvoiceRow::from_domain(invoice)).await?;
        Ok(row.into_domain()?)
    }

    #[instrument(skip(self, filter), fields(status = ?filter.status))]
    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, PortError> {
        let hospital_ids: Option<Vec<Uuid>> = filter
            .hospital_ids
            .as_ref()
            .map(|ids| ids.iter().map(|id| *id.as_uuid()).collect());
        let rows = self
            .invoices
            .list(filter.status.map(|s| s.as_str()), hospital_ids.as_deref())
            .await?;
        debug!(count = rows.len(), "Listed invoices");
        let invoices = rows
            .into_iter()
            .map(InvoiceRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(invoices)
    }

    #[instrument(skip(self))]
    async fn next_sequence(&self, scope: &str) -> Result<u64, PortError> {
        let value = self.sequences.next_value(scope).await?;
        u64::try_from(value)
            .map_err(|_| PortError::internal(format!("sequence {} went negative", scope)))
    }
}
