//! Session endpoints: start, read and navigate a guide one step at a time.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::rest::dto::{
    AdvanceRequest, JumpRequest, ProgressResponse, SectionOverviewResponse, SessionResponse,
    StartSessionRequest, TransitionResponse,
};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;
use crate::steps::StepIdentifier;

/// Start a session at the guide's first step
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = SessionResponse),
        (status = 404, description = "Guide not found", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn start(
    State(state): State<ApiState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let view = state.coordinator.start_session(&request.guide_id).await?;
    Ok((StatusCode::CREATED, Json(SessionResponse::from(&view))))
}

/// Get the step currently disclosed to the session
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/current",
    tag = "Sessions",
    params(
        ("id" = String, Path, description = "Session id")
    ),
    responses(
        (status = 200, description = "Current step or completion summary", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn current(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let view = state.coordinator.get_current(&id).await?;
    Ok(Json(SessionResponse::from(&view)))
}

/// Complete the current step and disclose the next one
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/advance",
    tag = "Sessions",
    params(
        ("id" = String, Path, description = "Session id")
    ),
    request_body(content = AdvanceRequest, description = "Optional guard on the current step"),
    responses(
        (status = 200, description = "Transition result", body = TransitionResponse),
        (status = 400, description = "Malformed step identifier", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn advance(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    body: Option<Json<AdvanceRequest>>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let expected = request
        .expected_step
        .as_deref()
        .map(StepIdentifier::parse)
        .transpose()?;

    let transition = state.coordinator.advance(&id, expected).await?;
    Ok(Json(TransitionResponse::from(&transition)))
}

/// Go back to the previous step
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/retreat",
    tag = "Sessions",
    params(
        ("id" = String, Path, description = "Session id")
    ),
    responses(
        (status = 200, description = "Transition result", body = TransitionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn retreat(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let transition = state.coordinator.retreat(&id).await?;
    Ok(Json(TransitionResponse::from(&transition)))
}

/// Jump to the first reachable step of a section
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/jump",
    tag = "Sessions",
    params(
        ("id" = String, Path, description = "Session id")
    ),
    request_body = JumpRequest,
    responses(
        (status = 200, description = "Transition result", body = TransitionResponse),
        (status = 404, description = "Session or section not found", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn jump(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<JumpRequest>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let transition = state
        .coordinator
        .jump_to_section(&id, &request.section_id)
        .await?;
    Ok(Json(TransitionResponse::from(&transition)))
}

/// Get progress through the guide
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/progress",
    tag = "Sessions",
    params(
        ("id" = String, Path, description = "Session id")
    ),
    responses(
        (status = 200, description = "Progress over non-blocked steps", body = ProgressResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn progress(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let progress = state.coordinator.progress(&id).await?;
    Ok(Json(ProgressResponse::from(&progress)))
}

/// List step titles and states for one section
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/sections/{section_id}",
    tag = "Sessions",
    params(
        ("id" = String, Path, description = "Session id"),
        ("section_id" = String, Path, description = "Section id")
    ),
    responses(
        (status = 200, description = "Section overview", body = SectionOverviewResponse),
        (status = 404, description = "Session or section not found", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn section_overview(
    State(state): State<ApiState>,
    Path((id, section_id)): Path<(String, String)>,
) -> Result<Json<SectionOverviewResponse>, ApiError> {
    let overview = state.coordinator.section_overview(&id, &section_id).await?;
    Ok(Json(SectionOverviewResponse::from(&overview)))
}
