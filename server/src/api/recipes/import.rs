use crate::api::{action_response, ErrorResponse};
use crate::auth::AuthUser;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use larder_core::{ActionResult, CreatedRecipe, RecipeDraft};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportRecipeRequest {
    /// Page to extract the recipe from.
    pub link: String,
}

/// Fetch a page and let the AI extract a recipe draft from it.
///
/// Nothing is saved; review the draft and post it to `/api/recipes/import/complete`.
#[utoipa::path(
    post,
    path = "/api/recipes/import",
    tag = "recipes",
    request_body = ImportRecipeRequest,
    responses(
        (status = 200, description = "Recipe draft extracted", body = ActionResult<RecipeDraft>),
        (status = 400, description = "Invalid link", body = ActionResult<RecipeDraft>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 409, description = "Link already imported", body = ActionResult<RecipeDraft>),
        (status = 413, description = "Page too large for the model", body = ActionResult<RecipeDraft>),
        (status = 502, description = "Page or model output unusable", body = ActionResult<RecipeDraft>),
        (status = 503, description = "Model unavailable", body = ActionResult<RecipeDraft>)
    ),
    security(("user_id" = []))
)]
pub async fn import_recipe(
    AuthUser(user): AuthUser,
    State(pipeline): State<AppState>,
    Json(request): Json<ImportRecipeRequest>,
) -> impl IntoResponse {
    let result = pipeline.import_recipe(&user, &request.link).await;
    action_response(StatusCode::OK, result)
}

/// Save a reviewed recipe draft together with its ingredients.
#[utoipa::path(
    post,
    path = "/api/recipes/import/complete",
    tag = "recipes",
    request_body = RecipeDraft,
    responses(
        (status = 201, description = "Recipe created", body = ActionResult<CreatedRecipe>),
        (status = 400, description = "Invalid draft", body = ActionResult<CreatedRecipe>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 409, description = "Link already imported", body = ActionResult<CreatedRecipe>),
        (status = 500, description = "Could not be saved", body = ActionResult<CreatedRecipe>)
    ),
    security(("user_id" = []))
)]
pub async fn complete_import(
    AuthUser(user): AuthUser,
    State(pipeline): State<AppState>,
    Json(draft): Json<RecipeDraft>,
) -> impl IntoResponse {
    let result = pipeline.complete_recipe_import(&user, draft).await;
    action_response(StatusCode::CREATED, result)
}
