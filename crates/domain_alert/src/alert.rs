//! Alert aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ActorId, AlertId, HospitalId, WorkflowError};

/// Alert status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Raised, no responder engaged yet
    Pending,
    /// A responder is handling the emergency
    Active,
    /// Closed after treatment
    Resolved,
    /// Closed without treatment
    Cancelled,
}

impl AlertStatus {
    /// Resolved and cancelled alerts accept no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Resolved | AlertStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "pending",
            AlertStatus::Active => "active",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert priority as triaged by the SOS platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Critical,
    Urgent,
    High,
    Normal,
    Low,
}

/// Actions that move an alert through its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertAction {
    Activate,
    Resolve,
    Cancel,
}

impl fmt::Display for AlertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertAction::Activate => "activate",
            AlertAction::Resolve => "resolve",
            AlertAction::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

const TRANSITIONS: &[(AlertStatus, AlertAction, AlertStatus)] = &[
    (AlertStatus::Pending, AlertAction::Activate, AlertStatus::Active),
    (AlertStatus::Pending, AlertAction::Cancel, AlertStatus::Cancelled),
    (AlertStatus::Active, AlertAction::Resolve, AlertStatus::Resolved),
    (AlertStatus::Active, AlertAction::Cancel, AlertStatus::Cancelled),
];

/// An emergency alert raised by an insured party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier
    pub id: AlertId,
    /// Insured party who raised the alert
    pub insured_id: ActorId,
    /// Status
    pub status: AlertStatus,
    /// Priority
    pub priority: AlertPriority,
    /// Hospital engaged for the patient
    pub assigned_hospital: Option<HospitalId>,
    /// Free-text description of the emergency
    pub description: Option<String>,
    /// Where the emergency happened
    pub location: Option<String>,
    /// Optimistic concurrency version
    pub version: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Alert {
    /// Creates a new pending alert
    pub fn raise(insured_id: ActorId, priority: AlertPriority) -> Self {
        let now = Utc::now();
        Self {
            id: AlertId::new_v7(),
            insured_id,
            status: AlertStatus::Pending,
            priority,
            assigned_hospital: None,
            description: None,
            location: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Returns true once the alert is resolved or cancelled
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Applies a lifecycle action
    pub fn apply(&mut self, action: AlertAction) -> Result<(), WorkflowError> {
        let next = TRANSITIONS
            .iter()
            .find(|(from, a, _)| *from == self.status && *a == action)
            .map(|(_, _, to)| *to)
            .ok_or_else(|| WorkflowError::invalid_transition("alert", self.status, action))?;

        tracing::debug!(alert_id = %self.id, from = %self.status, to = %next, "alert transition");
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn activate(&mut self) -> Result<(), WorkflowError> {
        self.apply(AlertAction::Activate)
    }

    pub fn resolve(&mut self) -> Result<(), WorkflowError> {
        self.apply(AlertAction::Resolve)
    }

    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        self.apply(AlertAction::Cancel)
    }

    /// Engages a hospital, activating a pending alert
    ///
    /// A hospital can be assigned once; a closed alert cannot be assigned.
    pub fn assign_hospital(&mut self, hospital_id: HospitalId) -> Result<(), WorkflowError> {
        if self.is_closed() {
            return Err(WorkflowError::invalid_transition(
                "alert",
                self.status,
                "assign_hospital",
            ));
        }
        if let Some(existing) = self.assigned_hospital {
            return Err(WorkflowError::already_decided(format!(
                "alert {} is already assigned to {}",
                self.id, existing
            )));
        }
        if self.status == AlertStatus::Pending {
            self.activate()?;
        }
        self.assigned_hospital = Some(hospital_id);
        self.updated_at = Utc::now();
        Ok(())
    }
}
