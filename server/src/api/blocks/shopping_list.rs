use crate::api::{action_response, ErrorResponse};
use crate::auth::AuthUser;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use larder_core::{ActionResult, ShoppingList};

/// The stored shopping list of a block. `exists` is false until one is generated.
#[utoipa::path(
    get,
    path = "/api/blocks/{id}/shopping-list",
    tag = "blocks",
    params(("id" = i32, Path, description = "Block ID")),
    responses(
        (status = 200, description = "Stored shopping list", body = ActionResult<ShoppingList>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Block not found", body = ActionResult<ShoppingList>)
    ),
    security(("user_id" = []))
)]
pub async fn get_shopping_list(
    AuthUser(user): AuthUser,
    State(pipeline): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = pipeline.shopping_list(&user, id).await;
    action_response(StatusCode::OK, result)
}

/// Generate a shopping list from the block's recipes, replacing the stored one.
#[utoipa::path(
    post,
    path = "/api/blocks/{id}/shopping-list",
    tag = "blocks",
    params(("id" = i32, Path, description = "Block ID")),
    responses(
        (status = 201, description = "Shopping list generated", body = ActionResult<ShoppingList>),
        (status = 400, description = "Block has no ingredients", body = ActionResult<ShoppingList>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Block not found", body = ActionResult<ShoppingList>),
        (status = 413, description = "Too many ingredients for the model", body = ActionResult<ShoppingList>),
        (status = 502, description = "Model output unusable", body = ActionResult<ShoppingList>),
        (status = 503, description = "Model unavailable", body = ActionResult<ShoppingList>)
    ),
    security(("user_id" = []))
)]
pub async fn generate_shopping_list(
    AuthUser(user): AuthUser,
    State(pipeline): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = pipeline.generate_shopping_list(&user, id).await;
    action_response(StatusCode::CREATED, result)
}
