use crate::api::{action_response, ErrorResponse};
use crate::auth::AuthUser;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use larder_core::{ActionResult, BlockPlanDraft, CreatedBlocks};

/// Let the AI group all of the user's recipes into meal-plan blocks.
///
/// Nothing is saved; review the plan and post it to `/api/blocks/generate/complete`.
#[utoipa::path(
    post,
    path = "/api/blocks/generate",
    tag = "blocks",
    responses(
        (status = 200, description = "Block plan proposed", body = ActionResult<BlockPlanDraft>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 413, description = "Too many recipes for the model", body = ActionResult<BlockPlanDraft>),
        (status = 422, description = "Not enough recipes to group", body = ActionResult<BlockPlanDraft>),
        (status = 502, description = "Model output unusable", body = ActionResult<BlockPlanDraft>),
        (status = 503, description = "Model unavailable", body = ActionResult<BlockPlanDraft>)
    ),
    security(("user_id" = []))
)]
pub async fn generate_blocks(
    AuthUser(user): AuthUser,
    State(pipeline): State<AppState>,
) -> impl IntoResponse {
    let result = pipeline.generate_blocks(&user).await;
    action_response(StatusCode::OK, result)
}

/// Save a reviewed block plan and link each block to its recipes.
#[utoipa::path(
    post,
    path = "/api/blocks/generate/complete",
    tag = "blocks",
    request_body = BlockPlanDraft,
    responses(
        (status = 201, description = "Blocks created", body = ActionResult<CreatedBlocks>),
        (status = 400, description = "Invalid plan", body = ActionResult<CreatedBlocks>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Could not be saved", body = ActionResult<CreatedBlocks>)
    ),
    security(("user_id" = []))
)]
pub async fn complete_blocks(
    AuthUser(user): AuthUser,
    State(pipeline): State<AppState>,
    Json(plan): Json<BlockPlanDraft>,
) -> impl IntoResponse {
    let result = pipeline.complete_blocks_import(&user, plan).await;
    action_response(StatusCode::CREATED, result)
}
