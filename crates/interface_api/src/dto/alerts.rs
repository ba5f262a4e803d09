//! Alert DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_alert::{Alert, AlertPriority};
use domain_workflow::NewAlert;

#[derive(Debug, Deserialize, Validate)]
pub struct RaiseAlertRequest {
    pub priority: AlertPriority,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 500))]
    pub location: Option<String>,
}

impl From<RaiseAlertRequest> for NewAlert {
    fn from(request: RaiseAlertRequest) -> Self {
        NewAlert {
            priority: request.priority,
            description: request.description,
            location: request.location,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignHospitalRequest {
    pub hospital_id: String,
}

#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub id: String,
    pub insured_id: String,
    pub status: String,
    pub priority: AlertPriority,
    pub assigned_hospital: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Alert> for AlertResponse {
    fn from(alert: Alert) -> Self {
        Self {
            id: alert.id.to_string(),
            insured_id: alert.insured_id.to_string(),
            status: alert.status.to_string(),
            priority: alert.priority,
            assigned_hospital: alert.assigned_hospital.map(|h| h.to_string()),
            description: alert.description,
            location: alert.location,
            version: alert.version,
            created_at: alert.created_at,
            updated_at: alert.updated_at,
        }
    }
}
