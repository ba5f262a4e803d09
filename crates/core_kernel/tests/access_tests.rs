//! Tests for the role capability table

use core_kernel::{permits, Actor, ActorId, HospitalId, Operation, Role};

#[test]
fn test_referent_capabilities() {
    assert!(permits(Role::MedicalReferent, Operation::DecideUrgency));
    assert!(permits(Role::MedicalReferent, Operation::ValidateReport));
    assert!(permits(Role::MedicalReferent, Operation::DecideMedical));
    assert!(!permits(Role::MedicalReferent, Operation::DecideSinistre));
    assert!(!permits(Role::MedicalReferent, Operation::CreateInvoice));
}

#[test]
fn test_reception_capabilities() {
    assert!(permits(Role::HospitalReception, Operation::DispatchAmbulance));
    assert!(permits(Role::HospitalReception, Operation::OrientPatient));
    assert!(!permits(Role::HospitalReception, Operation::SubmitReport));
}

#[test]
fn test_each_invoice_slot_has_one_role() {
    let roles = [
        Role::Insured,
        Role::SosOperator,
        Role::HospitalReception,
        Role::HospitalDoctor,
        Role::MedicalReferent,
        Role::HospitalAccountant,
        Role::ClaimsAgent,
        Role::InsurerAccountant,
    ];
    for operation in [Operation::DecideMedical, Operation::DecideSinistre, Operation::DecideCompta] {
        let holders = roles.iter().filter(|r| permits(**r, operation)).count();
        assert_eq!(holders, 1, "{:?}", operation);
    }
}

#[test]
fn test_actor_hospital_scope() {
    let hospital = HospitalId::new();
    let other = HospitalId::new();
    let actor = Actor::new(ActorId::new(), Role::HospitalDoctor).at_hospital(hospital);

    assert!(actor.covers(hospital));
    assert!(!actor.covers(other));
    assert!(actor.can(Operation::SubmitReport));
    assert!(!actor.can(Operation::ValidateReport));
}
