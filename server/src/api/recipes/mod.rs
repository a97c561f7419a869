pub mod candidates;
pub mod import;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/import", post(import::import_recipe))
        .route("/import/complete", post(import::complete_import))
        .route(
            "/{id}/ingredient-candidates",
            get(candidates::ingredient_candidates),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        import::import_recipe,
        import::complete_import,
        candidates::ingredient_candidates,
    ),
    components(schemas(
        import::ImportRecipeRequest,
        larder_core::RecipeDraft,
        larder_core::IngredientDraft,
        larder_core::CreatedRecipe,
        larder_core::EntityRef,
    ))
)]
pub struct ApiDoc;
