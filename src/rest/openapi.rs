//! OpenAPI specification builder using utoipa.

use utoipa::OpenApi;

use crate::rest::dto::{
    AdaptationResponse, AdvanceRequest, AlternativeStepRequest, CreateAdaptationRequest,
    CurrentStepResponse, HealthResponse, JumpRequest, OverviewStepResponse, ProgressResponse,
    SectionOverviewResponse, SectionProgressResponse, SectionSummary, SessionResponse,
    StartSessionRequest, TransitionResponse,
};
use crate::rest::error::ErrorResponse;

/// OpenAPI documentation for the stepguide REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stepguide API",
        description = "Progressive disclosure of step-by-step guides with runtime adaptation.",
        license(name = "MIT")
    ),
    paths(
        // Health endpoints
        crate::rest::routes::health::health,
        // Session endpoints
        crate::rest::routes::sessions::start,
        crate::rest::routes::sessions::current,
        crate::rest::routes::sessions::advance,
        crate::rest::routes::sessions::retreat,
        crate::rest::routes::sessions::jump,
        crate::rest::routes::sessions::progress,
        crate::rest::routes::sessions::section_overview,
        // Guide endpoints
        crate::rest::routes::guides::adapt,
    ),
    components(
        schemas(
            // Response types
            HealthResponse,
            SessionResponse,
            CurrentStepResponse,
            SectionSummary,
            SectionProgressResponse,
            ProgressResponse,
            TransitionResponse,
            SectionOverviewResponse,
            OverviewStepResponse,
            AdaptationResponse,
            ErrorResponse,
            // Request types
            StartSessionRequest,
            AdvanceRequest,
            JumpRequest,
            CreateAdaptationRequest,
            AlternativeStepRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Sessions", description = "Session navigation and progress"),
        (name = "Guides", description = "Runtime guide adaptation"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }

    /// Generate the OpenAPI specification as a YAML string
    pub fn yaml() -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&Self::openapi())
    }
}
