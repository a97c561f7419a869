//! The user-facing operations of the recipe pipeline.
//!
//! A [`Pipeline`] bundles the injected collaborators (model provider, page
//! fetcher, persistence gateway) and exposes one async method per user action.
//! Every method returns an [`ActionResult`]; no error type escapes.

use std::sync::Arc;

use crate::action::ActionResult;
use crate::ai::{self, AiError};
use crate::error::{ErrorKind, FieldError, Operation, PipelineError};
use crate::gateway::{GatewayError, NewRecipe, PersistenceGateway, RecipeCommit};
use crate::http::HttpClient;
use crate::llm::LlmProvider;
use crate::reconcile::{self, IngredientPlan, SEARCH_RESULT_LIMIT};
use crate::types::{
    BlockPlanDraft, CreatedBlocks, CreatedRecipe, EntityRef, RecipeDraft, ShoppingList, UserId,
};
use crate::validate;

/// Entry point for every AI-assisted user action.
#[derive(Clone)]
pub struct Pipeline {
    llm: Arc<dyn LlmProvider>,
    http: Arc<dyn HttpClient>,
    gateway: Arc<dyn PersistenceGateway>,
}

fn ai_failure(operation: Operation, error: AiError) -> PipelineError {
    PipelineError::new(operation, error.kind(), error.to_string())
}

fn gateway_failure(operation: Operation, error: GatewayError) -> PipelineError {
    PipelineError::new(operation, ErrorKind::PersistenceFailure, error.to_string())
}

fn not_found(operation: Operation, what: &str, id: i32) -> PipelineError {
    PipelineError::new(operation, ErrorKind::NotFound, format!("{what} {id} not found"))
}

/// Log a failure and turn it into the caller-facing result.
fn fail<T>(user: &UserId, error: PipelineError) -> ActionResult<T> {
    match error.kind {
        ErrorKind::PersistenceFailure
        | ErrorKind::ModelUnavailable
        | ErrorKind::MalformedResponse => {
            tracing::error!(
                user_id = %user,
                operation = %error.operation,
                kind = ?error.kind,
                detail = %error.detail,
                "operation failed"
            )
        }
        _ => {
            tracing::info!(
                user_id = %user,
                operation = %error.operation,
                kind = ?error.kind,
                detail = %error.detail,
                "operation rejected"
            )
        }
    }
    ActionResult::failure(error)
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        http: Arc<dyn HttpClient>,
        gateway: Arc<dyn PersistenceGateway>,
    ) -> Self {
        Self { llm, http, gateway }
    }

    /// Fetch the page at `link` and extract a recipe draft from it.
    ///
    /// A link the user already imported short-circuits with `DuplicateImport`
    /// before anything is fetched or sent to the model.
    pub async fn import_recipe(&self, user: &UserId, link: &str) -> ActionResult<RecipeDraft> {
        match self.try_import_recipe(user, link.trim()).await {
            Ok(draft) => ActionResult::success(draft).with_message(
                "Recipe imported",
                "Hey, look! The AI has loaded the recipe for you.",
            ),
            Err(e) => fail(user, e),
        }
    }

    async fn try_import_recipe(
        &self,
        user: &UserId,
        link: &str,
    ) -> Result<RecipeDraft, PipelineError> {
        const OP: Operation = Operation::ImportRecipe;

        validate::validate_import_link(link)
            .map_err(|errors| PipelineError::validation(OP, errors))?;

        let existing = self
            .gateway
            .find_recipe_by_link(user, link)
            .map_err(|e| gateway_failure(OP, e))?;
        if let Some(recipe_id) = existing {
            return Err(PipelineError::new(
                OP,
                ErrorKind::DuplicateImport,
                format!("link already imported as recipe {recipe_id}"),
            ));
        }

        tracing::info!(user_id = %user, link, "importing recipe");
        let html = self
            .http
            .fetch_html(link)
            .await
            .map_err(|e| PipelineError::new(OP, ErrorKind::FetchFailed, e.to_string()))?;

        let mut draft = ai::extract_recipe(self.llm.as_ref(), &html)
            .await
            .map_err(|e| ai_failure(OP, e))?;

        draft.link = link.to_string();
        draft.ingredients = reconcile::dedup_ingredients(draft.ingredients);
        Ok(draft)
    }

    /// Persist a reviewed recipe draft with its ingredients in one transaction.
    pub async fn complete_recipe_import(
        &self,
        user: &UserId,
        draft: RecipeDraft,
    ) -> ActionResult<CreatedRecipe> {
        match self.try_complete_recipe_import(user, draft) {
            Ok(created) => ActionResult::success(created)
                .with_message("Recipe created", "The recipe has been created successfully."),
            Err(e) => fail(user, e),
        }
    }

    fn try_complete_recipe_import(
        &self,
        user: &UserId,
        mut draft: RecipeDraft,
    ) -> Result<CreatedRecipe, PipelineError> {
        const OP: Operation = Operation::CompleteRecipeImport;

        draft.link = draft.link.trim().to_string();
        validate::validate_recipe_draft(&draft)
            .map_err(|errors| PipelineError::validation(OP, errors))?;

        if let Some(recipe_id) = self
            .gateway
            .find_recipe_by_link(user, &draft.link)
            .map_err(|e| gateway_failure(OP, e))?
        {
            return Err(PipelineError::new(
                OP,
                ErrorKind::DuplicateImport,
                format!("link already imported as recipe {recipe_id}"),
            ));
        }

        let ingredients = reconcile::dedup_ingredients(draft.ingredients);
        let names: Vec<String> = ingredients.iter().map(|i| i.name.trim().to_string()).collect();
        let existing = self
            .gateway
            .find_ingredients_by_names(user, &names)
            .map_err(|e| gateway_failure(OP, e))?;

        let commit = RecipeCommit {
            recipe: NewRecipe {
                name: draft.name.trim().to_string(),
                description: draft.description,
                link: draft.link,
                is_fast: draft.is_fast,
                is_suitable_for_fridge: draft.is_suitable_for_fridge,
            },
            ingredients: reconcile::match_existing_ingredients(ingredients, &existing),
        };

        let recipe_id = self
            .gateway
            .commit_recipe(user, &commit)
            .map_err(|e| gateway_failure(OP, e))?;

        tracing::info!(
            user_id = %user,
            recipe_id,
            ingredients = commit.ingredients.len(),
            reused = commit
                .ingredients
                .iter()
                .filter(|p| matches!(p, IngredientPlan::Existing { .. }))
                .count(),
            "recipe created"
        );
        Ok(CreatedRecipe { recipe_id })
    }

    /// Ask the model to cluster all of the user's recipes into blocks.
    pub async fn generate_blocks(&self, user: &UserId) -> ActionResult<BlockPlanDraft> {
        match self.try_generate_blocks(user).await {
            Ok(plan) => ActionResult::success(plan)
                .with_message("Blocks created", "The blocks have been created successfully."),
            Err(e) => fail(user, e),
        }
    }

    async fn try_generate_blocks(&self, user: &UserId) -> Result<BlockPlanDraft, PipelineError> {
        const OP: Operation = Operation::GenerateBlocks;

        let recipes = self
            .gateway
            .recipes_with_ingredients(user)
            .map_err(|e| gateway_failure(OP, e))?;
        if recipes.is_empty() {
            return Err(PipelineError::new(
                OP,
                ErrorKind::InsufficientGroupingMaterial,
                "user has no recipes",
            ));
        }

        tracing::info!(user_id = %user, recipes = recipes.len(), "generating blocks");
        ai::cluster_recipes(self.llm.as_ref(), &recipes)
            .await
            .map_err(|e| ai_failure(OP, e))
    }

    /// Persist a reviewed block plan, linking each block to its resolved recipes.
    pub async fn complete_blocks_import(
        &self,
        user: &UserId,
        plan: BlockPlanDraft,
    ) -> ActionResult<CreatedBlocks> {
        match self.try_complete_blocks_import(user, &plan) {
            Ok(created) => ActionResult::success(created)
                .with_message("Plans created", "The plans have been created successfully."),
            Err(e) => fail(user, e),
        }
    }

    fn try_complete_blocks_import(
        &self,
        user: &UserId,
        plan: &BlockPlanDraft,
    ) -> Result<CreatedBlocks, PipelineError> {
        const OP: Operation = Operation::CompleteBlocksImport;

        validate::validate_block_plan(plan)
            .map_err(|errors| PipelineError::validation(OP, errors))?;

        let recipes: Vec<EntityRef> = self
            .gateway
            .recipes_with_ingredients(user)
            .map_err(|e| gateway_failure(OP, e))?
            .into_iter()
            .map(|r| EntityRef { id: r.id, name: r.name })
            .collect();

        let mut resolved = reconcile::resolve_block_links(plan, &recipes);
        for block in &mut resolved {
            block.name = block.name.trim().to_string();
        }

        let block_ids = self
            .gateway
            .commit_blocks(user, &resolved)
            .map_err(|e| gateway_failure(OP, e))?;

        tracing::info!(
            user_id = %user,
            blocks = block_ids.len(),
            links = resolved.iter().map(|b| b.recipe_ids.len()).sum::<usize>(),
            "blocks created"
        );
        Ok(CreatedBlocks { block_ids })
    }

    /// Generate a consolidated shopping list for a block and store it,
    /// replacing any earlier list.
    pub async fn generate_shopping_list(
        &self,
        user: &UserId,
        block_id: i32,
    ) -> ActionResult<ShoppingList> {
        match self.try_generate_shopping_list(user, block_id).await {
            Ok(list) => ActionResult::success(list).with_message(
                "Shopping list created",
                "Your shopping list has been created successfully.",
            ),
            Err(e) => fail(user, e),
        }
    }

    async fn try_generate_shopping_list(
        &self,
        user: &UserId,
        block_id: i32,
    ) -> Result<ShoppingList, PipelineError> {
        const OP: Operation = Operation::GenerateShoppingList;

        if !self
            .gateway
            .block_exists(user, block_id)
            .map_err(|e| gateway_failure(OP, e))?
        {
            return Err(not_found(OP, "block", block_id));
        }

        let inputs = self
            .gateway
            .block_ingredients(user, block_id)
            .map_err(|e| gateway_failure(OP, e))?;
        if inputs.is_empty() {
            return Err(PipelineError::validation(
                OP,
                vec![FieldError::new(
                    "block_id",
                    "The block has no recipes with ingredients.",
                )],
            ));
        }

        tracing::info!(user_id = %user, block_id, items = inputs.len(), "generating shopping list");
        let list = ai::consolidate_shopping_list(self.llm.as_ref(), &inputs)
            .await
            .map_err(|e| ai_failure(OP, e))?;

        let missing = reconcile::missing_from_shopping_list(&inputs, &list);
        if !missing.is_empty() {
            return Err(PipelineError::new(
                OP,
                ErrorKind::MalformedResponse,
                format!("shopping list is missing: {}", missing.join(", ")),
            ));
        }

        // The list comes from the model, so a bad entry is a bad reply, not bad input.
        validate::validate_shopping_list(&list).map_err(|errors| {
            let detail = errors
                .iter()
                .map(|e| format!("{}: {}", e.field_name, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            PipelineError::new(OP, ErrorKind::MalformedResponse, detail)
        })?;

        self.gateway
            .replace_shopping_list(user, block_id, &list)
            .map_err(|e| gateway_failure(OP, e))?;

        Ok(ShoppingList::from_items(list))
    }

    /// Load the stored shopping list of a block.
    pub async fn shopping_list(&self, user: &UserId, block_id: i32) -> ActionResult<ShoppingList> {
        const OP: Operation = Operation::LoadShoppingList;

        let result = self
            .gateway
            .block_exists(user, block_id)
            .map_err(|e| gateway_failure(OP, e))
            .and_then(|exists| {
                if exists {
                    self.gateway
                        .shopping_list(user, block_id)
                        .map_err(|e| gateway_failure(OP, e))
                } else {
                    Err(not_found(OP, "block", block_id))
                }
            });

        match result {
            Ok(items) => ActionResult::success(ShoppingList::from_items(items)),
            Err(e) => fail(user, e),
        }
    }

    /// Search the user's ingredients to add to a recipe, excluding those already on it.
    pub async fn find_ingredients(
        &self,
        user: &UserId,
        recipe_id: i32,
        query: &str,
    ) -> ActionResult<Vec<EntityRef>> {
        let query = query.trim();
        if query.is_empty() {
            return ActionResult::success(Vec::new());
        }
        match self.try_find_ingredients(user, recipe_id, query) {
            Ok(found) => ActionResult::success(found),
            Err(e) => fail(user, e),
        }
    }

    fn try_find_ingredients(
        &self,
        user: &UserId,
        recipe_id: i32,
        query: &str,
    ) -> Result<Vec<EntityRef>, PipelineError> {
        const OP: Operation = Operation::FindIngredients;

        if !self
            .gateway
            .recipe_exists(user, recipe_id)
            .map_err(|e| gateway_failure(OP, e))?
        {
            return Err(not_found(OP, "recipe", recipe_id));
        }
        let linked = self
            .gateway
            .recipe_ingredient_ids(user, recipe_id)
            .map_err(|e| gateway_failure(OP, e))?;
        let candidates = self
            .gateway
            .search_ingredients(user, query, SEARCH_RESULT_LIMIT + linked.len())
            .map_err(|e| gateway_failure(OP, e))?;
        Ok(reconcile::exclude_linked(candidates, &linked))
    }

    /// Search the user's recipes to add to a block, excluding those already in it.
    pub async fn find_recipes(
        &self,
        user: &UserId,
        block_id: i32,
        query: &str,
    ) -> ActionResult<Vec<EntityRef>> {
        let query = query.trim();
        if query.is_empty() {
            return ActionResult::success(Vec::new());
        }
        match self.try_find_recipes(user, block_id, query) {
            Ok(found) => ActionResult::success(found),
            Err(e) => fail(user, e),
        }
    }

    fn try_find_recipes(
        &self,
        user: &UserId,
        block_id: i32,
        query: &str,
    ) -> Result<Vec<EntityRef>, PipelineError> {
        const OP: Operation = Operation::FindRecipes;

        if !self
            .gateway
            .block_exists(user, block_id)
            .map_err(|e| gateway_failure(OP, e))?
        {
            return Err(not_found(OP, "block", block_id));
        }
        let linked = self
            .gateway
            .block_recipe_ids(user, block_id)
            .map_err(|e| gateway_failure(OP, e))?;
        let candidates = self
            .gateway
            .search_recipes(user, query, SEARCH_RESULT_LIMIT + linked.len())
            .map_err(|e| gateway_failure(OP, e))?;
        Ok(reconcile::exclude_linked(candidates, &linked))
    }
}
