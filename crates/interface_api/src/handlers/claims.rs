//! Claim handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::{Actor, ActorId, ClaimId};
use domain_workflow::ClaimStage;

use super::parse_id;
use crate::dto::claims::{ClaimQueueQuery, ClaimResponse, ClaimViewResponse, OrientationRequest};
use crate::dto::stays::StayResponse;
use crate::dto::{DecisionRequest, PageResponse};
use crate::{error::ApiError, AppState};

/// Gets a claim with its derived stage
pub async fn get_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ClaimViewResponse>, ApiError> {
    let id: ClaimId = parse_id(&id, "claim")?;
    let view = state.service.get_claim(&actor, id).await?;
    Ok(Json(view.into()))
}

/// The caller's claim queue for one classified stage
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ClaimQueueQuery>,
) -> Result<Json<PageResponse<ClaimViewResponse>>, ApiError> {
    let stage: ClaimStage = query
        .classified_stage
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("classified_stage is required".to_string()))?
        .parse()
        .map_err(ApiError::BadRequest)?;
    let page = query.paging().request(state.service.config().default_page_size);

    let page = state.service.list_claims_by_stage(&actor, stage, page).await?;
    Ok(Json(page.into()))
}

/// Records the urgency decision
pub async fn decide_urgency(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    request.validate()?;
    let id: ClaimId = parse_id(&id, "claim")?;
    let claim = state
        .service
        .decide_urgency(&actor, id, request.approve, request.notes)
        .await?;
    Ok(Json(claim.into()))
}

pub async fn dispatch_ambulance(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let id: ClaimId = parse_id(&id, "claim")?;
    let claim = state.service.dispatch_ambulance(&actor, id).await?;
    Ok(Json(claim.into()))
}

/// Orients the patient, opening a hospital stay
pub async fn orient_patient(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<OrientationRequest>,
) -> Result<(StatusCode, Json<StayResponse>), ApiError> {
    request.validate()?;
    let id: ClaimId = parse_id(&id, "claim")?;
    let doctor_id: ActorId = parse_id(&request.doctor_id, "doctor")?;
    let stay = state
        .service
        .orient_patient(&actor, id, doctor_id, request.notes)
        .await?;
    Ok((StatusCode::CREATED, Json(stay.into())))
}
