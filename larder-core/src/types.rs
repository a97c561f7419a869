use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of the signed-in user.
///
/// Every read and write in the pipeline is scoped by this value. It is issued by
/// the authentication layer in front of the service and never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Maximum length accepted by the `user_id` columns.
    pub const MAX_LEN: usize = 32;

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One ingredient line of an AI-extracted recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IngredientDraft {
    pub name: String,
    /// Free-text quantity ("700g", "a clove"). Empty when none was found.
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub is_pantry: bool,
}

/// A recipe extracted from a web page, awaiting review before it is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecipeDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_fast: bool,
    #[serde(default)]
    pub is_suitable_for_fridge: bool,
    /// Source page. Set by the importer, never by the model.
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientDraft>,
}

/// A recipe reference inside a proposed block.
///
/// `id` is echoed back by the model from the `[id]` tag in the prompt. Older
/// responses carried only the name; those are resolved by name on commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClusterRecipeRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub name: String,
}

/// One proposed meal-plan block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BlockClusterDraft {
    pub name: String,
    /// How alike the recipes in this block are, from 0 to 1.
    #[serde(default)]
    pub similarity: f64,
    #[serde(default)]
    pub recipes: Vec<ClusterRecipeRef>,
    /// Descriptive only; never persisted as relations.
    #[serde(default)]
    pub common_ingredients: Vec<String>,
}

/// The full clustering proposal returned for a user's recipe collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BlockPlanDraft {
    #[serde(default)]
    pub blocks: Vec<BlockClusterDraft>,
    /// Names of recipes the model left out of every block.
    #[serde(default)]
    pub unused: Vec<String>,
}

/// One consolidated shopping-list line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ShoppingListItemDraft {
    pub name: String,
    /// Free text; may combine units ("200g + 2 tbsp"). Empty when unknown.
    #[serde(default)]
    pub amount: String,
}

/// A stored or freshly generated shopping list for a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ShoppingList {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<ShoppingListItemDraft>>,
}

impl ShoppingList {
    pub fn from_items(items: Vec<ShoppingListItemDraft>) -> Self {
        if items.is_empty() {
            Self {
                exists: false,
                list: None,
            }
        } else {
            Self {
                exists: true,
                list: Some(items),
            }
        }
    }
}

/// A recipe as fed to the clustering prompt: its non-pantry ingredient names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

/// An ingredient line of a recipe linked to a block, as fed to the shopping-list prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIngredient {
    pub name: String,
    #[serde(default)]
    pub amount: String,
}

/// An `(id, name)` pair for a persisted recipe or ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EntityRef {
    pub id: i32,
    pub name: String,
}

/// A proposed block after its recipe references were resolved to ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBlock {
    pub name: String,
    pub recipe_ids: Vec<i32>,
}

/// Returned after a recipe draft was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatedRecipe {
    pub recipe_id: i32,
}

/// Returned after a block plan was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatedBlocks {
    pub block_ids: Vec<i32>,
}
