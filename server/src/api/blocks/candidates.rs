use crate::api::{action_response, CandidatesQuery, ErrorResponse};
use crate::auth::AuthUser;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use larder_core::{ActionResult, EntityRef};

/// Recipes of the user that could be added to a block.
#[utoipa::path(
    get,
    path = "/api/blocks/{id}/recipe-candidates",
    tag = "blocks",
    params(
        ("id" = i32, Path, description = "Block ID"),
        CandidatesQuery
    ),
    responses(
        (status = 200, description = "Matching recipes", body = ActionResult<Vec<EntityRef>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Block not found", body = ActionResult<Vec<EntityRef>>)
    ),
    security(("user_id" = []))
)]
pub async fn recipe_candidates(
    AuthUser(user): AuthUser,
    State(pipeline): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<CandidatesQuery>,
) -> impl IntoResponse {
    let result = pipeline.find_recipes(&user, id, &query.name).await;
    action_response(StatusCode::OK, result)
}
