//! Guide adaptation endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::rest::dto::{AdaptationResponse, CreateAdaptationRequest};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;
use crate::steps::StepIdentifier;

/// Block a step and insert alternatives in its place
#[utoipa::path(
    post,
    path = "/api/v1/guides/{guide_id}/adaptations",
    tag = "Guides",
    params(
        ("guide_id" = String, Path, description = "Guide id")
    ),
    request_body = CreateAdaptationRequest,
    responses(
        (status = 201, description = "Adaptation applied", body = AdaptationResponse),
        (status = 400, description = "Malformed step identifier", body = ErrorResponse),
        (status = 404, description = "Guide not found", body = ErrorResponse),
        (status = 409, description = "Adaptation precondition violated", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn adapt(
    State(state): State<ApiState>,
    Path(guide_id): Path<String>,
    Json(request): Json<CreateAdaptationRequest>,
) -> Result<(StatusCode, Json<AdaptationResponse>), ApiError> {
    let blocked = StepIdentifier::parse(&request.blocked_step)?;
    let drafts = request
        .alternatives
        .into_iter()
        .map(|alt| alt.into_draft())
        .collect::<Result<Vec<_>, _>>()?;

    let record = state
        .coordinator
        .adapt(&guide_id, blocked, request.reason, drafts)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AdaptationResponse::new(&guide_id, &record)),
    ))
}
