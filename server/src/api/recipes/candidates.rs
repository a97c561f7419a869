use crate::api::{action_response, CandidatesQuery, ErrorResponse};
use crate::auth::AuthUser;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use larder_core::{ActionResult, EntityRef};

/// Ingredients of the user that could be added to a recipe.
///
/// Ingredients already on the recipe are left out; at most ten are returned.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/ingredient-candidates",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID"),
        CandidatesQuery
    ),
    responses(
        (status = 200, description = "Matching ingredients", body = ActionResult<Vec<EntityRef>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ActionResult<Vec<EntityRef>>)
    ),
    security(("user_id" = []))
)]
pub async fn ingredient_candidates(
    AuthUser(user): AuthUser,
    State(pipeline): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<CandidatesQuery>,
) -> impl IntoResponse {
    let result = pipeline.find_ingredients(&user, id, &query.name).await;
    action_response(StatusCode::OK, result)
}
