//! Persistence gateway: the storage operations the pipeline depends on.
//!
//! Every method is scoped by the user identifier; rows belonging to another
//! user are invisible. The three `commit_*`/`replace_*` methods are atomic:
//! either every row is written or none is.

mod memory;

pub use memory::MemoryGateway;

use thiserror::Error;

use crate::reconcile::IngredientPlan;
use crate::types::{
    BlockIngredient, EntityRef, RecipeSummary, ResolvedBlock, ShoppingListItemDraft, UserId,
};

#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Referenced row does not exist: {0}")]
    MissingReference(String),
}

/// The recipe row of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub name: String,
    pub description: String,
    pub link: String,
    pub is_fast: bool,
    pub is_suitable_for_fridge: bool,
}

/// A reconciled recipe ready for one atomic write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeCommit {
    pub recipe: NewRecipe,
    pub ingredients: Vec<IngredientPlan>,
}

pub trait PersistenceGateway: Send + Sync {
    /// Id of the user's recipe imported from `link`, if any.
    fn find_recipe_by_link(&self, user: &UserId, link: &str)
        -> Result<Option<i32>, GatewayError>;

    /// Every recipe of the user with its non-pantry ingredient names, ordered by id.
    /// Recipes without such ingredients are included with an empty list.
    fn recipes_with_ingredients(&self, user: &UserId)
        -> Result<Vec<RecipeSummary>, GatewayError>;

    fn recipe_exists(&self, user: &UserId, recipe_id: i32) -> Result<bool, GatewayError>;

    fn block_exists(&self, user: &UserId, block_id: i32) -> Result<bool, GatewayError>;

    /// Ingredient lines of every recipe linked to the block, ordered by ingredient name.
    fn block_ingredients(
        &self,
        user: &UserId,
        block_id: i32,
    ) -> Result<Vec<BlockIngredient>, GatewayError>;

    /// The stored shopping list of the block; empty when none was generated.
    fn shopping_list(
        &self,
        user: &UserId,
        block_id: i32,
    ) -> Result<Vec<ShoppingListItemDraft>, GatewayError>;

    /// The user's ingredients whose name equals one of `names`, ignoring case.
    fn find_ingredients_by_names(
        &self,
        user: &UserId,
        names: &[String],
    ) -> Result<Vec<EntityRef>, GatewayError>;

    /// Up to `limit` of the user's ingredients whose name contains `query`, ignoring case.
    fn search_ingredients(
        &self,
        user: &UserId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EntityRef>, GatewayError>;

    /// Ids of the ingredients already linked to the recipe.
    fn recipe_ingredient_ids(&self, user: &UserId, recipe_id: i32)
        -> Result<Vec<i32>, GatewayError>;

    /// Up to `limit` of the user's recipes whose name contains `query`, ignoring case.
    fn search_recipes(
        &self,
        user: &UserId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EntityRef>, GatewayError>;

    /// Ids of the recipes already linked to the block.
    fn block_recipe_ids(&self, user: &UserId, block_id: i32) -> Result<Vec<i32>, GatewayError>;

    /// Insert the recipe, its new ingredients and all ingredient links. Returns the recipe id.
    fn commit_recipe(&self, user: &UserId, commit: &RecipeCommit) -> Result<i32, GatewayError>;

    /// Insert the blocks and their recipe links. Returns block ids in input order.
    fn commit_blocks(
        &self,
        user: &UserId,
        blocks: &[ResolvedBlock],
    ) -> Result<Vec<i32>, GatewayError>;

    /// Replace the block's stored shopping list with `items`.
    fn replace_shopping_list(
        &self,
        user: &UserId,
        block_id: i32,
        items: &[ShoppingListItemDraft],
    ) -> Result<(), GatewayError>;
}
