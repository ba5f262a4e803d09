//! Invoice approval handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use validator::Validate;

use core_kernel::{Actor, InvoiceId};
use domain_billing::ApprovalStage;

use super::parse_id;
use crate::dto::invoices::{InvoiceQueueQuery, InvoiceResponse};
use crate::dto::{DecisionRequest, PageResponse};
use crate::{error::ApiError, AppState};

/// Invoices waiting on the caller's approval stage (`?awaiting=me`)
pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<InvoiceQueueQuery>,
) -> Result<Json<PageResponse<InvoiceResponse>>, ApiError> {
    if query.awaiting.as_deref() != Some("me") {
        return Err(ApiError::BadRequest(
            "only the awaiting=me queue is available".to_string(),
        ));
    }
    let page = query.paging().request(state.service.config().default_page_size);

    let page = state.service.list_invoices_awaiting(&actor, page).await?;
    Ok(Json(page.into()))
}

async fn decide(
    state: AppState,
    actor: Actor,
    id: String,
    stage: ApprovalStage,
    request: DecisionRequest,
) -> Result<Json<InvoiceResponse>, ApiError> {
    request.validate()?;
    let id: InvoiceId = parse_id(&id, "invoice")?;
    let invoice = state
        .service
        .decide_invoice(&actor, id, stage, request.approve, request.notes)
        .await?;
    Ok(Json(invoice.into()))
}

pub async fn validate_medical(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    decide(state, actor, id, ApprovalStage::Medical, request).await
}

pub async fn validate_sinistre(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    decide(state, actor, id, ApprovalStage::Sinistre, request).await
}

pub async fn validate_compta(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    decide(state, actor, id, ApprovalStage::Compta, request).await
}
