//! Entity store port
//!
//! The workflow services persist alerts, claims, stays and invoices through
//! [`WorkflowStore`]. Every entity carries a `version`; `update_*` methods are
//! compare-and-set on the version the caller loaded and return the stored
//! entity with its bumped version. A lost race surfaces as
//! [`PortError::Conflict`].
//!
//! Inserts enforce the uniqueness rules of the workflow:
//!
//! - one claim per alert
//! - at most one non-terminal stay per claim
//! - one invoice per stay
//!
//! Claim and invoice numbers come from [`WorkflowStore::next_sequence`], one
//! counter per scope (`SIN-2026`, `FAC-202610`, ...).

use async_trait::async_trait;

use core_kernel::{
    ActorId, AlertId, ClaimId, DomainPort, HealthCheckable, HospitalId, InvoiceId, PortError,
    StayId,
};
use domain_alert::Alert;
use domain_billing::{Invoice, InvoiceStatus};
use domain_claims::Claim;
use domain_stay::HospitalStay;

/// Claims visible to a referent: assigned to them or at a hospital they cover
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimFilter {
    pub referent_id: Option<ActorId>,
    pub hospital_ids: Vec<HospitalId>,
}

impl ClaimFilter {
    pub fn matches(&self, claim: &Claim) -> bool {
        let assigned = self.referent_id.is_some() && claim.referent_id == self.referent_id;
        assigned || self.hospital_ids.contains(&claim.hospital_id)
    }
}

/// Invoice selection by derived status and hospital
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    /// `None` means every hospital
    pub hospital_ids: Option<Vec<HospitalId>>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        if let Some(status) = self.status {
            if invoice.status() != status {
                return false;
            }
        }
        match &self.hospital_ids {
            Some(ids) => ids.contains(&invoice.hospital_id),
            None => true,
        }
    }
}

/// Persistence port for the workflow entities
#[async_trait]
pub trait WorkflowStore: DomainPort + HealthCheckable {
    // Alerts

    async fn insert_alert(&self, alert: &Alert) -> Result<Alert, PortError>;

    async fn get_alert(&self, id: AlertId) -> Result<Alert, PortError>;

    async fn update_alert(&self, alert: &Alert) -> Result<Alert, PortError>;

    // Claims

    /// Fails with `Conflict` if the alert already has a claim
    async fn insert_claim(&self, claim: &Claim) -> Result<Claim, PortError>;

    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;

    async fn find_claim_by_alert(&self, alert_id: AlertId) -> Result<Option<Claim>, PortError>;

    async fn update_claim(&self, claim: &Claim) -> Result<Claim, PortError>;

    /// Claims matching the filter, oldest first
    async fn list_claims(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, PortError>;

    // Hospital stays

    /// Fails with `Conflict` if the claim already has a non-terminal stay
    async fn insert_stay(&self, stay: &HospitalStay) -> Result<HospitalStay, PortError>;

    async fn get_stay(&self, id: StayId) -> Result<HospitalStay, PortError>;

    /// Stays of a claim, oldest first
    async fn find_stays_by_claim(&self, claim_id: ClaimId) -> Result<Vec<HospitalStay>, PortError>;

    async fn update_stay(&self, stay: &HospitalStay) -> Result<HospitalStay, PortError>;

    // Invoices

    /// Fails with `Conflict` if the stay already has an invoice
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<Invoice, PortError>;

    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    async fn find_invoice_by_stay(&self, stay_id: StayId) -> Result<Option<Invoice>, PortError>;

    async fn update_invoice(&self, invoice: &Invoice) -> Result<Invoice, PortError>;

    /// Invoices matching the filter, oldest first
    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, PortError>;

    // Numbering

    /// Next value of the counter for `scope`, starting at 1
    async fn next_sequence(&self, scope: &str) -> Result<u64, PortError>;
}

pub(crate) fn version_conflict(
    entity: &str,
    id: impl std::fmt::Display,
    expected: i64,
) -> PortError {
    PortError::conflict(format!(
        "{} {} was modified concurrently (expected version {})",
        entity, id, expected
    ))
}
