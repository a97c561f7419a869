pub mod action;
pub mod ai;
pub mod error;
pub mod gateway;
pub mod http;
pub mod llm;
pub mod pipeline;
pub mod reconcile;
pub mod types;
pub mod validate;

pub use action::ActionResult;
pub use error::{ActionMessage, ErrorKind, FetchError, FieldError, Operation, PipelineError};
pub use gateway::{GatewayError, MemoryGateway, NewRecipe, PersistenceGateway, RecipeCommit};
pub use http::{FetchClient, HttpClient, MockClient, MockResponse};
pub use llm::{create_provider, create_provider_from_env, FakeProvider, LlmError, LlmProvider};
pub use pipeline::Pipeline;
pub use reconcile::IngredientPlan;
pub use types::{
    BlockClusterDraft, BlockIngredient, BlockPlanDraft, ClusterRecipeRef, CreatedBlocks,
    CreatedRecipe, EntityRef, IngredientDraft, RecipeDraft, RecipeSummary, ResolvedBlock,
    ShoppingList, ShoppingListItemDraft, UserId,
};
