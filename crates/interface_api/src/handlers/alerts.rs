//! Alert handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::{Actor, AlertId, HospitalId};

use super::parse_id;
use crate::dto::alerts::{AlertResponse, AssignHospitalRequest, RaiseAlertRequest};
use crate::dto::claims::ClaimResponse;
use crate::{error::ApiError, AppState};

/// Raises a new alert
pub async fn raise_alert(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<RaiseAlertRequest>,
) -> Result<(StatusCode, Json<AlertResponse>), ApiError> {
    request.validate()?;
    let alert = state.service.raise_alert(&actor, request.into()).await?;
    Ok((StatusCode::CREATED, Json(alert.into())))
}

/// Gets an alert by ID
pub async fn get_alert(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<AlertResponse>, ApiError> {
    let id: AlertId = parse_id(&id, "alert")?;
    let alert = state.service.get_alert(&actor, id).await?;
    Ok(Json(alert.into()))
}

pub async fn activate_alert(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<AlertResponse>, ApiError> {
    let id: AlertId = parse_id(&id, "alert")?;
    let alert = state.service.activate_alert(&actor, id).await?;
    Ok(Json(alert.into()))
}

pub async fn resolve_alert(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<AlertResponse>, ApiError> {
    let id: AlertId = parse_id(&id, "alert")?;
    let alert = state.service.resolve_alert(&actor, id).await?;
    Ok(Json(alert.into()))
}

pub async fn cancel_alert(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<AlertResponse>, ApiError> {
    let id: AlertId = parse_id(&id, "alert")?;
    let alert = state.service.cancel_alert(&actor, id).await?;
    Ok(Json(alert.into()))
}

/// Engages a hospital and opens the claim
pub async fn assign_hospital(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<AssignHospitalRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let id: AlertId = parse_id(&id, "alert")?;
    let hospital_id: HospitalId = parse_id(&request.hospital_id, "hospital")?;
    let claim = state.service.assign_hospital(&actor, id, hospital_id).await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}
