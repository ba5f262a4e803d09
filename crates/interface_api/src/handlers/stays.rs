//! Hospital stay handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::{Actor, StayId};

use super::parse_id;
use crate::dto::invoices::{CreateInvoiceRequest, InvoiceResponse};
use crate::dto::stays::{ReportRequest, StayResponse};
use crate::dto::DecisionRequest;
use crate::{error::ApiError, AppState};

/// Saves the doctor's report, optionally closing it
pub async fn submit_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<StayResponse>, ApiError> {
    request.validate()?;
    let id: StayId = parse_id(&id, "stay")?;
    let (submission, close_stay) = request.into_submission();
    let stay = state
        .service
        .submit_report(&actor, id, submission, close_stay)
        .await?;
    Ok(Json(stay.into()))
}

/// Referent decision on a closed report
pub async fn validate_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<StayResponse>, ApiError> {
    request.validate()?;
    let id: StayId = parse_id(&id, "stay")?;
    let stay = state
        .service
        .validate_report(&actor, id, request.approve, request.notes)
        .await?;
    Ok(Json(stay.into()))
}

/// Issues the stay's invoice
pub async fn create_invoice(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    request.validate()?;
    let id: StayId = parse_id(&id, "stay")?;
    let input = request.into_new_invoice().map_err(ApiError::Validation)?;
    let invoice = state.service.create_invoice(&actor, id, input).await?;
    Ok((StatusCode::CREATED, Json(invoice.into())))
}
