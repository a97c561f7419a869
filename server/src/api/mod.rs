pub mod blocks;
pub mod recipes;
pub mod testing;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use larder_core::{ActionMessage, ActionResult, ErrorKind, FieldError};
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{IntoParams, OpenApi, ToSchema};

/// Error body for requests rejected before reaching the pipeline.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query of the search-to-add endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CandidatesQuery {
    /// Case-insensitive substring of the name. Blank returns no candidates.
    #[serde(default)]
    pub name: String,
}

/// HTTP status for a failed action.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::DuplicateImport => StatusCode::CONFLICT,
        ErrorKind::InputTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorKind::InsufficientGroupingMaterial => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::MalformedResponse | ErrorKind::FetchFailed => StatusCode::BAD_GATEWAY,
        ErrorKind::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::PersistenceFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Serialize an action result, choosing the status from its error kind.
///
/// The body is the full result in both cases so callers can always show `message`.
pub fn action_response<T: Serialize>(ok_status: StatusCode, result: ActionResult<T>) -> Response {
    let status = result.error_kind.map_or(ok_status, status_for);
    (status, Json(result)).into_response()
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(components(schemas(ErrorResponse, ErrorKind, FieldError, ActionMessage)))]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "user_id",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-User-Id"))),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        testing::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        blocks::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
