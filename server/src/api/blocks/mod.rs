pub mod candidates;
pub mod generate;
pub mod shopping_list;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/blocks endpoints (mounted at /api/blocks)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate::generate_blocks))
        .route("/generate/complete", post(generate::complete_blocks))
        .route("/{id}/recipe-candidates", get(candidates::recipe_candidates))
        .route(
            "/{id}/shopping-list",
            get(shopping_list::get_shopping_list).post(shopping_list::generate_shopping_list),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        generate::generate_blocks,
        generate::complete_blocks,
        candidates::recipe_candidates,
        shopping_list::get_shopping_list,
        shopping_list::generate_shopping_list,
    ),
    components(schemas(
        larder_core::BlockPlanDraft,
        larder_core::BlockClusterDraft,
        larder_core::ClusterRecipeRef,
        larder_core::CreatedBlocks,
        larder_core::ShoppingList,
        larder_core::ShoppingListItemDraft,
    ))
)]
pub struct ApiDoc;
