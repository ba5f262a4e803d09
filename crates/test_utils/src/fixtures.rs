//! Pre-built Test Fixtures
//!
//! One hospital with a full cast of actors, and a [`WorkflowHarness`] that
//! runs the workflow up to the point a test cares about.

use std::sync::Arc;

use core_kernel::{Actor, ActorId, HospitalId, Role};
use domain_billing::Invoice;
use domain_claims::Claim;
use domain_stay::HospitalStay;
use domain_workflow::{InMemoryWorkflowStore, WorkflowConfig, WorkflowService};

use crate::builders::{NewAlertBuilder, NewInvoiceBuilder, ReportBuilder};

/// Every role taking part in a claim, staff scoped to one hospital
#[derive(Debug, Clone)]
pub struct WorkflowActors {
    pub hospital: HospitalId,
    pub insured: Actor,
    pub operator: Actor,
    pub referent: Actor,
    pub reception: Actor,
    pub doctor: Actor,
    pub accountant: Actor,
    pub agent: Actor,
    pub insurer_accountant: Actor,
}

impl WorkflowActors {
    pub fn new() -> Self {
        Self::at(HospitalId::new())
    }

    /// Actors for a given hospital
    pub fn at(hospital: HospitalId) -> Self {
        let staff = |role| Actor::new(ActorId::new(), role).at_hospital(hospital);
        Self {
            hospital,
            insured: Actor::new(ActorId::new(), Role::Insured),
            operator: Actor::new(ActorId::new(), Role::SosOperator),
            referent: staff(Role::MedicalReferent),
            reception: staff(Role::HospitalReception),
            doctor: staff(Role::HospitalDoctor),
            accountant: staff(Role::HospitalAccountant),
            agent: Actor::new(ActorId::new(), Role::ClaimsAgent),
            insurer_accountant: Actor::new(ActorId::new(), Role::InsurerAccountant),
        }
    }

    /// A staff member of the same role working at another hospital
    pub fn outsider(role: Role) -> Actor {
        Actor::new(ActorId::new(), role).at_hospital(HospitalId::new())
    }
}

impl Default for WorkflowActors {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a claim through the workflow over an in-memory store
///
/// Each step panics on failure; it is only meant for test setup.
#[derive(Clone)]
pub struct WorkflowHarness {
    pub store: Arc<InMemoryWorkflowStore>,
    pub service: WorkflowService,
    pub actors: WorkflowActors,
}

impl WorkflowHarness {
    pub fn new() -> Self {
        Self::with_config(WorkflowConfig::default())
    }

    pub fn with_config(config: WorkflowConfig) -> Self {
        let store = Arc::new(InMemoryWorkflowStore::new());
        Self {
            service: WorkflowService::new(store.clone(), config),
            store,
            actors: WorkflowActors::new(),
        }
    }

    /// Alert raised and hospital assigned; urgency still pending
    pub async fn open_claim(&self) -> Claim {
        let a = &self.actors;
        let alert = self
            .service
            .raise_alert(&a.insured, NewAlertBuilder::new().build())
            .await
            .expect("raise alert");
        self.service
            .assign_hospital(&a.operator, alert.id, a.hospital)
            .await
            .expect("assign hospital")
    }

    /// Urgency confirmed by the referent
    pub async fn confirmed_claim(&self) -> Claim {
        let claim = self.open_claim().await;
        self.service
            .decide_urgency(&self.actors.referent, claim.id, true, None)
            .await
            .expect("confirm urgency")
    }

    /// Patient oriented; the stay is in progress
    pub async fn open_stay(&self) -> HospitalStay {
        let a = &self.actors;
        let claim = self.confirmed_claim().await;
        self.service
            .orient_patient(&a.reception, claim.id, a.doctor.id, None)
            .await
            .expect("orient patient")
    }

    /// Report closed and validated by the referent
    pub async fn validated_stay(&self) -> HospitalStay {
        let a = &self.actors;
        let stay = self.open_stay().await;
        self.service
            .submit_report(&a.doctor, stay.id, ReportBuilder::new().days(2).build(), true)
            .await
            .expect("close report");
        self.service
            .validate_report(&a.referent, stay.id, true, None)
            .await
            .expect("validate report")
    }

    /// Invoice issued for a validated stay; medical approval pending
    pub async fn issued_invoice(&self) -> Invoice {
        let stay = self.validated_stay().await;
        self.service
            .create_invoice(&self.actors.accountant, stay.id, NewInvoiceBuilder::new().build())
            .await
            .expect("issue invoice")
    }
}

impl Default for WorkflowHarness {
    fn default() -> Self {
        Self::new()
    }
}
