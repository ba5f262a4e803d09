//! Caller identity and role capabilities
//!
//! Every workflow operation receives an explicit [`Actor`]. Whether the actor
//! may perform an operation is answered by [`permits`], a lookup in a static
//! `(role, operation)` table. Hospital scoping is checked separately by the
//! operation itself through [`Actor::covers`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::identifiers::{ActorId, HospitalId};

/// Actor roles taking part in the claim workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Insured party raising the alert
    Insured,
    /// SOS platform operator
    SosOperator,
    /// Hospital reception desk
    HospitalReception,
    /// Hospital doctor treating the patient
    HospitalDoctor,
    /// Insurer's medical referent
    MedicalReferent,
    /// Hospital accountant issuing invoices
    HospitalAccountant,
    /// Insurer claims ("sinistre") agent
    ClaimsAgent,
    /// Insurer accountant signing the accounting approval
    InsurerAccountant,
}

impl Role {
    /// Stable snake_case name, as carried in tokens
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Insured => "insured",
            Role::SosOperator => "sos_operator",
            Role::HospitalReception => "hospital_reception",
            Role::HospitalDoctor => "hospital_doctor",
            Role::MedicalReferent => "medical_referent",
            Role::HospitalAccountant => "hospital_accountant",
            Role::ClaimsAgent => "claims_agent",
            Role::InsurerAccountant => "insurer_accountant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insured" => Ok(Role::Insured),
            "sos_operator" => Ok(Role::SosOperator),
            "hospital_reception" => Ok(Role::HospitalReception),
            "hospital_doctor" => Ok(Role::HospitalDoctor),
            "medical_referent" => Ok(Role::MedicalReferent),
            "hospital_accountant" => Ok(Role::HospitalAccountant),
            "claims_agent" => Ok(Role::ClaimsAgent),
            "insurer_accountant" => Ok(Role::InsurerAccountant),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Workflow operations subject to a capability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    RaiseAlert,
    ActivateAlert,
    ResolveAlert,
    CancelAlert,
    AssignHospital,
    DecideUrgency,
    DispatchAmbulance,
    OrientPatient,
    SubmitReport,
    ValidateReport,
    CreateInvoice,
    DecideMedical,
    DecideSinistre,
    DecideCompta,
    ViewClaimQueue,
    ViewInvoiceQueue,
}

/// The capability table
const CAPABILITIES: &[(Role, Operation)] = &[
    (Role::Insured, Operation::RaiseAlert),
    (Role::SosOperator, Operation::RaiseAlert),
    (Role::SosOperator, Operation::ActivateAlert),
    (Role::SosOperator, Operation::ResolveAlert),
    (Role::SosOperator, Operation::CancelAlert),
    (Role::SosOperator, Operation::AssignHospital),
    (Role::MedicalReferent, Operation::DecideUrgency),
    (Role::HospitalReception, Operation::DispatchAmbulance),
    (Role::HospitalReception, Operation::OrientPatient),
    (Role::HospitalDoctor, Operation::SubmitReport),
    (Role::MedicalReferent, Operation::ValidateReport),
    (Role::HospitalAccountant, Operation::CreateInvoice),
    (Role::MedicalReferent, Operation::DecideMedical),
    (Role::ClaimsAgent, Operation::DecideSinistre),
    (Role::InsurerAccountant, Operation::DecideCompta),
    (Role::MedicalReferent, Operation::ViewClaimQueue),
    (Role::MedicalReferent, Operation::ViewInvoiceQueue),
    (Role::ClaimsAgent, Operation::ViewInvoiceQueue),
    (Role::InsurerAccountant, Operation::ViewInvoiceQueue),
];

/// Returns true if `role` holds the capability for `operation`
pub fn permits(role: Role, operation: Operation) -> bool {
    CAPABILITIES
        .iter()
        .any(|(r, op)| *r == role && *op == operation)
}

/// The caller of a workflow operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
    /// Hospitals the actor works at (staff) or covers (referents)
    #[serde(default)]
    pub hospital_ids: Vec<HospitalId>,
}

impl Actor {
    pub fn new(id: ActorId, role: Role) -> Self {
        Self {
            id,
            role,
            hospital_ids: Vec::new(),
        }
    }

    /// Adds a hospital to the actor's scope
    pub fn at_hospital(mut self, hospital_id: HospitalId) -> Self {
        self.hospital_ids.push(hospital_id);
        self
    }

    /// Returns true if the actor's role may perform `operation`
    pub fn can(&self, operation: Operation) -> bool {
        permits(self.role, operation)
    }

    /// Returns true if the actor works at or covers `hospital_id`
    pub fn covers(&self, hospital_id: HospitalId) -> bool {
        self.hospital_ids.contains(&hospital_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_name() {
        for role in [
            Role::Insured,
            Role::SosOperator,
            Role::HospitalReception,
            Role::HospitalDoctor,
            Role::MedicalReferent,
            Role::HospitalAccountant,
            Role::ClaimsAgent,
            Role::InsurerAccountant,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("admin".parse::<Role>().is_err());
    }
}
