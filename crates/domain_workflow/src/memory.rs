//! In-memory entity store
//!
//! Backs the `memory` store backend and the service tests. All four tables
//! sit behind one lock so the uniqueness checks and the version
//! compare-and-set happen atomically with the write.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use core_kernel::{
    AdapterHealth, AlertId, ClaimId, DomainPort, HealthCheckResult, HealthCheckable, InvoiceId,
    PortError, StayId,
};
use domain_alert::Alert;
use domain_billing::Invoice;
use domain_claims::Claim;
use domain_stay::HospitalStay;

use crate::ports::{version_conflict, ClaimFilter, InvoiceFilter, WorkflowStore};

#[derive(Debug, Default)]
struct Tables {
    alerts: HashMap<AlertId, Alert>,
    claims: HashMap<ClaimId, Claim>,
    stays: HashMap<StayId, HospitalStay>,
    invoices: HashMap<InvoiceId, Invoice>,
    sequences: HashMap<String, u64>,
}

/// In-memory implementation of [`WorkflowStore`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Checks the stored version and writes the entity with the next version
macro_rules! compare_and_set {
    ($map:expr, $entity:expr, $name:literal) => {{
        let stored = $map
            .get_mut(&$entity.id)
            .ok_or_else(|| PortError::not_found($name, $entity.id))?;
        if stored.version != $entity.version {
            return Err(version_conflict($name, $entity.id, $entity.version));
        }
        let mut next = $entity.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }};
}

impl DomainPort for InMemoryWorkflowStore {}

#[async_trait]
impl HealthCheckable for InMemoryWorkflowStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "memory-workflow-store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn insert_alert(&self, alert: &Alert) -> Result<Alert, PortError> {
        let mut tables = self.tables.write().await;
        if tables.alerts.contains_key(&alert.id) {
            return Err(PortError::conflict(format!("alert {} already exists", alert.id)));
        }
        tables.alerts.insert(alert.id, alert.clone());
        Ok(alert.clone())
    }

    async fn get_alert(&self, id: AlertId) -> Result<Alert, PortError> {
        self.tables
            .read()
            .await
            .alerts
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("alert", id))
    }

    async fn update_alert(&self, alert: &Alert) -> Result<Alert, PortError> {
        let mut tables = self.tables.write().await;
        compare_and_set!(tables.alerts, alert, "alert")
    }

    async fn insert_claim(&self, claim: &Claim) -> Result<Claim, PortError> {
        let mut tables = self.tables.write().await;
        if tables.claims.values().any(|c| c.alert_id == claim.alert_id) {
            return Err(PortError::conflict(format!(
                "alert {} already has a claim",
                claim.alert_id
            )));
        }
        tables.claims.insert(claim.id, claim.clone());
        Ok(claim.clone())
    }

    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        self.tables
            .read()
            .await
            .claims
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("claim", id))
    }

    async fn find_claim_by_alert(&self, alert_id: AlertId) -> Result<Option<Claim>, PortError> {
        Ok(self
            .tables
            .read()
            .await
            .claims
            .values()
            .find(|c| c.alert_id == alert_id)
            .cloned())
    }

    async fn update_claim(&self, claim: &Claim) -> Result<Claim, PortError> {
        let mut tables = self.tables.write().await;
        compare_and_set!(tables.claims, claim, "claim")
    }

    async fn list_claims(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, PortError> {
        let tables = self.tables.read().await;
        let mut claims: Vec<Claim> = tables
            .claims
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        claims.sort_by_key(|c| (c.created_at, *c.id.as_uuid()));
        Ok(claims)
    }

    async fn insert_stay(&self, stay: &HospitalStay) -> Result<HospitalStay, PortError> {
        let mut tables = self.tables.write().await;
        if tables
            .stays
            .values()
            .any(|s| s.claim_id == stay.claim_id && !s.is_terminal())
        {
            return Err(PortError::conflict(format!(
                "claim {} already has an open stay",
                stay.claim_id
            )));
        }
        tables.stays.insert(stay.id, stay.clone());
        Ok(stay.clone())
    }

    async fn get_stay(&self, id: StayId) -> Result<HospitalStay, PortError> {
        self.tables
            .read()
            .await
            .stays
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("hospital_stay", id))
    }

    async fn find_stays_by_claim(&self, claim_id: ClaimId) -> Result<Vec<HospitalStay>, PortError> {
        let tables = self.tables.read().await;
        let mut stays: Vec<HospitalStay> = tables
            .stays
            .values()
            .filter(|s| s.claim_id == claim_id)
            .cloned()
            .collect();
        stays.sort_by_key(|s| (s.created_at, *s.id.as_uuid()));
        Ok(stays)
    }

    async fn update_stay(&self, stay: &HospitalStay) -> Result<HospitalStay, PortError> {
        let mut tables = self.tables.write().await;
        compare_and_set!(tables.stays, stay, "hospital_stay")
    }

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<Invoice, PortError> {
        let mut tables = self.tables.write().await;
        if tables.invoices.values().any(|i| i.stay_id == invoice.stay_id) {
            return Err(PortError::conflict(format!(
                "stay {} already has an invoice",
                invoice.stay_id
            )));
        }
        if tables.invoices.values().any(|i| i.numero == invoice.numero) {
            return Err(PortError::conflict(format!("invoice {} already exists", invoice.numero)));
        }
        tables.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice.clone())
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        self.tables
            .read()
            .await
            .invoices
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("invoice", id))
    }

    async fn find_invoice_by_stay(&self, stay_id: StayId) -> Result<Option<Invoice>, PortError> {
        Ok(self
            .tables
            .read()
            .await
            .invoices
            .values()
            .find(|i| i.stay_id == stay_id)
            .cloned())
    }

    async fn update_invoice(&self, invoice: &Invoice) -> Result<Invoice, PortError> {
        let mut tables = self.tables.write().await;
        compare_and_set!(tables.invoices, invoice, "invoice")
    }

    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, PortError> {
        let tables = self.tables.read().await;
        let mut invoices: Vec<Invoice> = tables
            .invoices
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        invoices.sort_by_key(|i| (i.created_at, *i.id.as_uuid()));
        Ok(invoices)
    }

    async fn next_sequence(&self, scope: &str) -> Result<u64, PortError> {
        let mut tables = self.tables.write().await;
        let counter = tables.sequences.entry(scope.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}
