//! Workflow services
//!
//! Each operation checks the caller's capability, loads the entities it
//! needs, applies the domain transition and writes back with the loaded
//! version. A lost version race reloads and re-applies the transition, so
//! the loser of two racing decisions sees the winner's result (usually as
//! `AlreadyDecided`) instead of overwriting it.
//!
//! Entities commit independently. A multi-entity operation such as invoice
//! creation writes the invoice first, then the stay, then the claim step.
//! Each of them resumes where a failed earlier attempt stopped, so repeating
//! the call after a store failure finishes the work instead of failing on
//! the part that was already committed.

use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{
    Actor, ActorId, AlertId, ClaimId, Currency, HealthCheckResult, HospitalId, InvoiceId,
    Operation, Page, PageRequest, PortError, Role, StayId, WorkflowError,
};
use domain_alert::{Alert, AlertAction, AlertPriority};
use domain_billing::{ApprovalStage, Invoice, InvoiceStatus, LineInput};
use domain_claims::{Claim, StepKey, UrgencyOutcome};
use domain_stay::{HospitalStay, ReportSubmission, StayStatus};

use crate::classifier::{classify, ClaimSnapshot, ClaimStage, InvoiceSnapshot};
use crate::ports::{ClaimFilter, InvoiceFilter, WorkflowStore};

/// Service tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Reload-and-reapply attempts after a lost version race
    pub max_conflict_retries: u32,
    /// Currency used when an invoice does not name one
    pub default_currency: Currency,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
            default_currency: Currency::default(),
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Input for raising an alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlert {
    pub priority: AlertPriority,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// Input for issuing an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub lines: Vec<LineInput>,
    pub tax_rate: Decimal,
    pub currency: Option<Currency>,
    pub notes: Option<String>,
}

/// A claim together with its current stay, invoice and derived stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimView {
    pub claim: Claim,
    pub stage: ClaimStage,
    pub stay: Option<HospitalStay>,
    pub invoice: Option<Invoice>,
}

impl ClaimView {
    pub fn snapshot(&self) -> ClaimSnapshot {
        ClaimSnapshot {
            urgency: self.claim.urgency_status(),
            stay: self.stay.as_ref().map(|s| s.status),
            invoice: self.invoice.as_ref().map(InvoiceSnapshot::from),
        }
    }
}

fn require(actor: &Actor, operation: Operation) -> Result<(), WorkflowError> {
    if actor.can(operation) {
        Ok(())
    } else {
        Err(WorkflowError::forbidden(actor.role, operation))
    }
}

fn require_hospital(
    actor: &Actor,
    operation: Operation,
    hospital_id: HospitalId,
) -> Result<(), WorkflowError> {
    if actor.covers(hospital_id) {
        Ok(())
    } else {
        Err(WorkflowError::forbidden(actor.role, operation))
    }
}

/// A referent may act on a claim assigned to them or at a hospital they cover
fn referent_may_act(actor: &Actor, claim: &Claim) -> bool {
    claim.referent_id == Some(actor.id) || actor.covers(claim.hospital_id)
}

fn lookup<T>(
    result: Result<T, PortError>,
    entity: &'static str,
    id: impl ToString,
) -> Result<T, WorkflowError> {
    result.map_err(|err| {
        if err.is_not_found() {
            WorkflowError::not_found(entity, id)
        } else {
            WorkflowError::Store(err)
        }
    })
}

/// Orchestrates the claim workflow over a [`WorkflowStore`]
#[derive(Clone)]
pub struct WorkflowService {
    store: Arc<dyn WorkflowStore>,
    config: WorkflowConfig,
}

impl std::fmt::Debug for WorkflowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WorkflowService {
    pub fn new(store: Arc<dyn WorkflowStore>, config: WorkflowConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub async fn health_check(&self) -> HealthCheckResult {
        self.store.health_check().await
    }

    /// Runs `attempt` until it stops losing version races
    async fn retrying<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, WorkflowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>>,
    {
        let attempts = self.config.max_conflict_retries + 1;
        for n in 1..=attempts {
            match attempt().await {
                Err(WorkflowError::Store(err)) if err.is_conflict() => {
                    warn!(operation, attempt = n, error = %err, "version conflict, reloading");
                }
                other => return other,
            }
        }
        Err(WorkflowError::Conflict(format!(
            "{} kept losing concurrent updates after {} attempts",
            operation, attempts
        )))
    }

    async fn load_alert(&self, id: AlertId) -> Result<Alert, WorkflowError> {
        lookup(self.store.get_alert(id).await, "alert", id)
    }

    async fn load_claim(&self, id: ClaimId) -> Result<Claim, WorkflowError> {
        lookup(self.store.get_claim(id).await, "claim", id)
    }

    async fn load_stay(&self, id: StayId) -> Result<HospitalStay, WorkflowError> {
        lookup(self.store.get_stay(id).await, "hospital_stay", id)
    }

    async fn load_invoice(&self, id: InvoiceId) -> Result<Invoice, WorkflowError> {
        lookup(self.store.get_invoice(id).await, "invoice", id)
    }

    /// Claims are frozen once their alert is resolved or cancelled
    async fn ensure_claim_open(&self, claim: &Claim) -> Result<(), WorkflowError> {
        let alert = self.load_alert(claim.alert_id).await?;
        if alert.is_closed() {
            return Err(WorkflowError::ClaimLocked(alert.status.to_string()));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Alerts
    // ------------------------------------------------------------------

    /// Records a new pending alert for the calling insured party
    #[instrument(
        skip(self, actor, input),
        fields(actor_id = %actor.id, priority = ?input.priority)
    )]
    pub async fn raise_alert(
        &self,
        actor: &Actor,
        input: NewAlert,
    ) -> Result<Alert, WorkflowError> {
        require(actor, Operation::RaiseAlert)?;

        let mut alert = Alert::raise(actor.id, input.priority);
        if let Some(description) = input.description.filter(|d| !d.trim().is_empty()) {
            alert = alert.with_description(description);
        }
        if let Some(location) = input.location.filter(|l| !l.trim().is_empty()) {
            alert = alert.with_location(location);
        }

        let alert = self.store.insert_alert(&alert).await?;
        info!(alert_id = %alert.id, "alert raised");
        Ok(alert)
    }

    pub async fn get_alert(
        &self,
        actor: &Actor,
        alert_id: AlertId,
    ) -> Result<Alert, WorkflowError> {
        let alert = self.load_alert(alert_id).await?;
        if actor.role == Role::Insured && alert.insured_id != actor.id {
            return Err(WorkflowError::not_found("alert", alert_id));
        }
        Ok(alert)
    }

    #[instrument(
        skip(self, actor),
        fields(actor_id = %actor.id, alert_id = %alert_id, action = %action)
    )]
    pub async fn transition_alert(
        &self,
        actor: &Actor,
        alert_id: AlertId,
        action: AlertAction,
    ) -> Result<Alert, WorkflowError> {
        let operation = match action {
            AlertAction::Activate => Operation::ActivateAlert,
            AlertAction::Resolve => Operation::ResolveAlert,
            AlertAction::Cancel => Operation::CancelAlert,
        };
        require(actor, operation)?;

        let alert = self
            .retrying("transition_alert", || async move {
                let mut alert = self.load_alert(alert_id).await?;
                alert.apply(action)?;
                Ok(self.store.update_alert(&alert).await?)
            })
            .await?;
        info!(alert_id = %alert.id, status = %alert.status, "alert transitioned");
        Ok(alert)
    }

    pub async fn activate_alert(
        &self,
        actor: &Actor,
        alert_id: AlertId,
    ) -> Result<Alert, WorkflowError> {
        self.transition_alert(actor, alert_id, AlertAction::Activate).await
    }

    pub async fn resolve_alert(
        &self,
        actor: &Actor,
        alert_id: AlertId,
    ) -> Result<Alert, WorkflowError> {
        self.transition_alert(actor, alert_id, AlertAction::Resolve).await
    }

    pub async fn cancel_alert(
        &self,
        actor: &Actor,
        alert_id: AlertId,
    ) -> Result<Alert, WorkflowError> {
        self.transition_alert(actor, alert_id, AlertAction::Cancel).await
    }

    /// Engages a hospital on the alert and opens its claim
    #[instrument(
        skip(self, actor),
        fields(actor_id = %actor.id, alert_id = %alert_id, hospital_id = %hospital_id)
    )]
    pub async fn assign_hospital(
        &self,
        actor: &Actor,
        alert_id: AlertId,
        hospital_id: HospitalId,
    ) -> Result<Claim, WorkflowError> {
        require(actor, Operation::AssignHospital)?;

        let alert = self
            .retrying("assign_hospital", || async move {
                let mut alert = self.load_alert(alert_id).await?;
                // A previous attempt committed the assignment but not the claim
                if alert.assigned_hospital == Some(hospital_id)
                    && !alert.is_closed()
                    && self.store.find_claim_by_alert(alert_id).await?.is_none()
                {
                    warn!(alert_id = %alert_id, "alert assigned without a claim, resuming");
                    return Ok(alert);
                }
                alert.assign_hospital(hospital_id)?;
                Ok(self.store.update_alert(&alert).await?)
            })
            .await?;

        let claim = Claim::open(alert.id, hospital_id);
        let claim = self.store.insert_claim(&claim).await.map_err(|err| {
            if err.is_conflict() {
                WorkflowError::already_decided(format!("alert {} already has a claim", alert_id))
            } else {
                WorkflowError::Store(err)
            }
        })?;
        info!(alert_id = %alert.id, claim_id = %claim.id, "hospital assigned, claim opened");
        Ok(claim)
    }

    // ------------------------------------------------------------------
    // Claims
    // ------------------------------------------------------------------

    /// Builds the claim view the classifier reads
    async fn claim_view(&self, claim: Claim) -> Result<ClaimView, WorkflowError> {
        let stay = self.store.find_stays_by_claim(claim.id).await?.pop();
        let invoice = match &stay {
            Some(stay) => self.store.find_invoice_by_stay(stay.id).await?,
            None => None,
        };
        let snapshot = ClaimSnapshot {
            urgency: claim.urgency_status(),
            stay: stay.as_ref().map(|s| s.status),
            invoice: invoice.as_ref().map(InvoiceSnapshot::from),
        };
        Ok(ClaimView {
            stage: classify(&snapshot),
            claim,
            stay,
            invoice,
        })
    }

    async fn can_view_claim(&self, actor: &Actor, claim: &Claim) -> Result<bool, WorkflowError> {
        Ok(match actor.role {
            Role::SosOperator | Role::ClaimsAgent | Role::InsurerAccountant => true,
            Role::MedicalReferent => referent_may_act(actor, claim),
            Role::HospitalReception | Role::HospitalDoctor | Role::HospitalAccountant => {
                actor.covers(claim.hospital_id)
            }
            Role::Insured => self.load_alert(claim.alert_id).await?.insured_id == actor.id,
        })
    }

    /// Returns the claim with its derived stage
    pub async fn get_claim(
        &self,
        actor: &Actor,
        claim_id: ClaimId,
    ) -> Result<ClaimView, WorkflowError> {
        let claim = self.load_claim(claim_id).await?;
        if !self.can_view_claim(actor, &claim).await? {
            return Err(WorkflowError::not_found("claim", claim_id));
        }
        self.claim_view(claim).await
    }

    /// Records the referent's urgency decision
    ///
    /// Repeating the recorded decision returns the claim unchanged.
    #[instrument(skip(self, actor, notes), fields(actor_id = %actor.id, claim_id = %claim_id))]
    pub async fn decide_urgency(
        &self,
        actor: &Actor,
        claim_id: ClaimId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<Claim, WorkflowError> {
        require(actor, Operation::DecideUrgency)?;

        self.retrying("decide_urgency", || {
            let notes = notes.clone();
            async move {
                let mut claim = self.load_claim(claim_id).await?;
                if !referent_may_act(actor, &claim) {
                    return Err(WorkflowError::forbidden(actor.role, Operation::DecideUrgency));
                }
                self.ensure_claim_open(&claim).await?;

                match claim.decide_urgency(actor.id, approve, notes)? {
                    UrgencyOutcome::Unchanged => Ok(claim),
                    UrgencyOutcome::Recorded => {
                        if approve && claim.numero.is_none() {
                            let sequence = self.store.next_sequence(&claim.numero_scope()).await?;
                            claim.assign_numero(sequence);
                        }
                        let claim = self.store.update_claim(&claim).await?;
                        info!(
                            claim_id = %claim.id,
                            numero = ?claim.numero,
                            approve,
                            "urgency decided"
                        );
                        Ok(claim)
                    }
                }
            }
        })
        .await
    }

    /// Marks the ambulance as dispatched
    #[instrument(skip(self, actor), fields(actor_id = %actor.id, claim_id = %claim_id))]
    pub async fn dispatch_ambulance(
        &self,
        actor: &Actor,
        claim_id: ClaimId,
    ) -> Result<Claim, WorkflowError> {
        require(actor, Operation::DispatchAmbulance)?;

        self.retrying("dispatch_ambulance", || async move {
            let mut claim = self.load_claim(claim_id).await?;
            require_hospital(actor, Operation::DispatchAmbulance, claim.hospital_id)?;
            self.ensure_claim_open(&claim).await?;

            claim.complete_step(StepKey::AmbulanceDispatch, actor.id, None)?;
            let claim = self.store.update_claim(&claim).await?;
            info!(claim_id = %claim.id, "ambulance dispatched");
            Ok(claim)
        })
        .await
    }

    /// Orients the patient to a doctor, opening a hospital stay
    #[instrument(
        skip(self, actor, notes),
        fields(actor_id = %actor.id, claim_id = %claim_id, doctor_id = %doctor_id)
    )]
    pub async fn orient_patient(
        &self,
        actor: &Actor,
        claim_id: ClaimId,
        doctor_id: ActorId,
        notes: Option<String>,
    ) -> Result<HospitalStay, WorkflowError> {
        require(actor, Operation::OrientPatient)?;

        let claim = self.load_claim(claim_id).await?;
        require_hospital(actor, Operation::OrientPatient, claim.hospital_id)?;
        self.ensure_claim_open(&claim).await?;
        if !claim.urgency_confirmed() {
            return Err(WorkflowError::PrematureOrientation(claim.id.to_string()));
        }

        let stays = self.store.find_stays_by_claim(claim.id).await?;
        if stays.iter().any(|s| !s.is_terminal()) {
            return Err(WorkflowError::DuplicateStay(claim.id.to_string()));
        }

        let stay = HospitalStay::orient(claim.id, claim.hospital_id, doctor_id, notes);
        let stay = self.store.insert_stay(&stay).await.map_err(|err| {
            if err.is_conflict() {
                WorkflowError::DuplicateStay(claim_id.to_string())
            } else {
                WorkflowError::Store(err)
            }
        })?;

        let stay_id = stay.id;
        self.retrying("complete_orientation_step", || async move {
            let mut claim = self.load_claim(claim_id).await?;
            let done = claim
                .step(StepKey::Orientation)
                .map_or(true, |step| step.status.is_final());
            if !done {
                claim.complete_step(
                    StepKey::Orientation,
                    actor.id,
                    Some(format!("stay {}", stay_id)),
                )?;
                self.store.update_claim(&claim).await?;
            }
            Ok(())
        })
        .await?;

        info!(claim_id = %claim_id, stay_id = %stay.id, "patient oriented");
        Ok(stay)
    }

    // ------------------------------------------------------------------
    // Hospital stays
    // ------------------------------------------------------------------

    /// Saves the doctor's report and optionally closes it for validation
    #[instrument(skip(self, actor, submission), fields(actor_id = %actor.id, stay_id = %stay_id))]
    pub async fn submit_report(
        &self,
        actor: &Actor,
        stay_id: StayId,
        submission: ReportSubmission,
        close_stay: bool,
    ) -> Result<HospitalStay, WorkflowError> {
        require(actor, Operation::SubmitReport)?;

        self.retrying("submit_report", || {
            let submission = submission.clone();
            async move {
                let mut stay = self.load_stay(stay_id).await?;
                // The invoice commits before the stay records it
                if stay.doctor_id == actor.id
                    && self.store.find_invoice_by_stay(stay.id).await?.is_some()
                {
                    return Err(WorkflowError::StayInvoiced(stay.id.to_string()));
                }
                stay.submit_report(actor.id, submission, close_stay)?;
                let stay = self.store.update_stay(&stay).await?;
                info!(stay_id = %stay.id, status = %stay.status, "report saved");
                Ok(stay)
            }
        })
        .await
    }

    /// Records the referent's decision on a closed report
    #[instrument(skip(self, actor, notes), fields(actor_id = %actor.id, stay_id = %stay_id))]
    pub async fn validate_report(
        &self,
        actor: &Actor,
        stay_id: StayId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<HospitalStay, WorkflowError> {
        require(actor, Operation::ValidateReport)?;

        self.retrying("validate_report", || {
            let notes = notes.clone();
            async move {
                let mut stay = self.load_stay(stay_id).await?;
                require_hospital(actor, Operation::ValidateReport, stay.hospital_id)?;

                stay.validate_report(actor.id, approve, notes)?;
                let stay = self.store.update_stay(&stay).await?;
                info!(stay_id = %stay.id, status = %stay.status, "report reviewed");
                Ok(stay)
            }
        })
        .await
    }

    // ------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------

    /// Issues the invoice of a validated stay
    #[instrument(
        skip(self, actor, input),
        fields(actor_id = %actor.id, stay_id = %stay_id, lines = input.lines.len())
    )]
    pub async fn create_invoice(
        &self,
        actor: &Actor,
        stay_id: StayId,
        input: NewInvoice,
    ) -> Result<Invoice, WorkflowError> {
        require(actor, Operation::CreateInvoice)?;

        let stay = self.load_stay(stay_id).await?;
        require_hospital(actor, Operation::CreateInvoice, stay.hospital_id)?;
        if let Some(existing) = self.store.find_invoice_by_stay(stay.id).await? {
            if stay.invoice_id.is_none() && stay.status == StayStatus::Validated {
                warn!(invoice_id = %existing.id, "invoice stored but stay not updated, resuming");
                self.record_invoice(&existing).await?;
                return Ok(existing);
            }
            return Err(WorkflowError::InvoiceAlreadyExists(stay.id.to_string()));
        }
        stay.ensure_invoiceable()?;

        let mut invoice = Invoice::issue(
            stay.id,
            stay.claim_id,
            stay.hospital_id,
            actor.id,
            input.currency.unwrap_or(self.config.default_currency),
            input.lines,
            input.tax_rate,
            input.notes,
            String::new(),
        )?;
        // Numbered only once the lines are known to be valid
        let scope = Invoice::numero_scope(invoice.created_at);
        let sequence = self.store.next_sequence(&scope).await?;
        invoice.numero = Invoice::numero(&scope, sequence);
        let invoice = self.store.insert_invoice(&invoice).await.map_err(|err| {
            if err.is_conflict() {
                WorkflowError::InvoiceAlreadyExists(stay_id.to_string())
            } else {
                WorkflowError::Store(err)
            }
        })?;
        info!(
            invoice_id = %invoice.id,
            numero = %invoice.numero,
            total = %invoice.total,
            "invoice issued"
        );

        self.record_invoice(&invoice).await?;
        Ok(invoice)
    }

    /// Links a stored invoice to its stay and completes the claim step
    ///
    /// Both writes are skipped when already done.
    async fn record_invoice(&self, invoice: &Invoice) -> Result<(), WorkflowError> {
        let (stay_id, invoice_id) = (invoice.stay_id, invoice.id);
        self.retrying("mark_stay_invoiced", || async move {
            let mut stay = self.load_stay(stay_id).await?;
            if stay.invoice_id.is_none() && stay.status == StayStatus::Validated {
                stay.mark_invoiced(invoice_id)?;
                self.store.update_stay(&stay).await?;
            }
            Ok(())
        })
        .await?;

        let (claim_id, issued_by) = (invoice.claim_id, invoice.issued_by);
        self.retrying("complete_invoice_step", || async move {
            let mut claim = self.load_claim(claim_id).await?;
            let done = claim
                .step(StepKey::InvoiceIssued)
                .map_or(true, |step| step.status.is_final());
            if !done {
                claim.complete_step(
                    StepKey::InvoiceIssued,
                    issued_by,
                    Some(format!("invoice {}", invoice_id)),
                )?;
                self.store.update_claim(&claim).await?;
            }
            Ok(())
        })
        .await
    }

    /// Records one approval stage's decision on an invoice
    ///
    /// Once the chain is fully approved the stay is marked completed.
    #[instrument(
        skip(self, actor, notes),
        fields(actor_id = %actor.id, invoice_id = %invoice_id, stage = %stage)
    )]
    pub async fn decide_invoice(
        &self,
        actor: &Actor,
        invoice_id: InvoiceId,
        stage: ApprovalStage,
        approve: bool,
        notes: Option<String>,
    ) -> Result<Invoice, WorkflowError> {
        require(actor, stage.operation())?;

        let invoice = self
            .retrying("decide_invoice", || {
                let notes = notes.clone();
                async move {
                    let mut invoice = self.load_invoice(invoice_id).await?;
                    if stage == ApprovalStage::Medical {
                        let claim = self.load_claim(invoice.claim_id).await?;
                        if !referent_may_act(actor, &claim) {
                            return Err(WorkflowError::forbidden(actor.role, stage.operation()));
                        }
                    }

                    let status = invoice.decide(stage, actor.id, approve, notes)?;
                    let invoice = self.store.update_invoice(&invoice).await?;
                    info!(invoice_id = %invoice.id, %stage, %status, "invoice approval recorded");
                    Ok(invoice)
                }
            })
            .await?;

        if invoice.status() == InvoiceStatus::Validated {
            self.record_invoice(&invoice).await?;
            self.complete_stay(invoice.stay_id).await?;
        }
        Ok(invoice)
    }

    pub async fn decide_medical(
        &self,
        actor: &Actor,
        invoice_id: InvoiceId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<Invoice, WorkflowError> {
        self.decide_invoice(actor, invoice_id, ApprovalStage::Medical, approve, notes).await
    }

    pub async fn decide_sinistre(
        &self,
        actor: &Actor,
        invoice_id: InvoiceId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<Invoice, WorkflowError> {
        self.decide_invoice(actor, invoice_id, ApprovalStage::Sinistre, approve, notes).await
    }

    pub async fn decide_compta(
        &self,
        actor: &Actor,
        invoice_id: InvoiceId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<Invoice, WorkflowError> {
        self.decide_invoice(actor, invoice_id, ApprovalStage::Compta, approve, notes).await
    }

    async fn complete_stay(&self, stay_id: StayId) -> Result<(), WorkflowError> {
        self.retrying("complete_stay", || async move {
            let mut stay = self.load_stay(stay_id).await?;
            if stay.status != StayStatus::Completed {
                stay.complete()?;
                let stay = self.store.update_stay(&stay).await?;
                info!(stay_id = %stay.id, "stay completed");
            }
            Ok(())
        })
        .await
    }

    // ------------------------------------------------------------------
    // Queues
    // ------------------------------------------------------------------

    /// Invoices whose derived status waits on the caller's approval stage
    #[instrument(skip(self, actor), fields(actor_id = %actor.id, role = %actor.role))]
    pub async fn list_invoices_awaiting(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<Page<Invoice>, WorkflowError> {
        require(actor, Operation::ViewInvoiceQueue)?;
        let stage = ApprovalStage::for_role(actor.role)
            .ok_or_else(|| WorkflowError::forbidden(actor.role, Operation::ViewInvoiceQueue))?;

        let filter = InvoiceFilter {
            status: Some(InvoiceStatus::pending_at(stage)),
            hospital_ids: None,
        };
        let mut invoices = self.store.list_invoices(&filter).await?;

        if stage == ApprovalStage::Medical {
            let mut visible = Vec::with_capacity(invoices.len());
            for invoice in invoices {
                if actor.covers(invoice.hospital_id)
                    || referent_may_act(actor, &self.load_claim(invoice.claim_id).await?)
                {
                    visible.push(invoice);
                }
            }
            invoices = visible;
        }

        Ok(Page::slice(invoices, page.clamped(self.config.max_page_size)))
    }

    /// The referent's claim queue for one stage
    #[instrument(skip(self, actor), fields(actor_id = %actor.id, stage = %stage))]
    pub async fn list_claims_by_stage(
        &self,
        actor: &Actor,
        stage: ClaimStage,
        page: PageRequest,
    ) -> Result<Page<ClaimView>, WorkflowError> {
        require(actor, Operation::ViewClaimQueue)?;

        let filter = ClaimFilter {
            referent_id: Some(actor.id),
            hospital_ids: actor.hospital_ids.clone(),
        };
        let claims = self.store.list_claims(&filter).await?;

        let mut views = Vec::new();
        for claim in claims {
            let view = self.claim_view(claim).await?;
            if view.stage == stage {
                views.push(view);
            }
        }

        Ok(Page::slice(views, page.clamped(self.config.max_page_size)))
    }
}
