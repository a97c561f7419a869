//! In-memory gateway for tests and offline runs.
//!
//! Tables are plain vectors behind one lock. Commits apply to a copy of the
//! tables and swap it in only when every insert succeeded.

use std::sync::{Mutex, MutexGuard};

use super::{GatewayError, PersistenceGateway, RecipeCommit};
use crate::reconcile::IngredientPlan;
use crate::types::{
    BlockIngredient, EntityRef, IngredientDraft, RecipeDraft, RecipeSummary, ResolvedBlock,
    ShoppingListItemDraft, UserId,
};

#[derive(Debug, Clone)]
struct RecipeRow {
    id: i32,
    name: String,
    description: String,
    link: String,
    is_fast: bool,
    is_suitable_for_fridge: bool,
    user_id: String,
}

#[derive(Debug, Clone)]
struct IngredientRow {
    id: i32,
    name: String,
    is_pantry: bool,
    user_id: String,
}

#[derive(Debug, Clone)]
struct RecipeIngredientRow {
    recipe_id: i32,
    ingredient_id: i32,
    quantity: String,
    user_id: String,
}

#[derive(Debug, Clone)]
struct BlockRow {
    id: i32,
    name: String,
    user_id: String,
}

#[derive(Debug, Clone)]
struct BlockRecipeRow {
    block_id: i32,
    recipe_id: i32,
    user_id: String,
}

#[derive(Debug, Clone)]
struct ShoppingListItemRow {
    block_id: i32,
    item_name: String,
    item_amount: String,
    user_id: String,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    next_id: i32,
    recipes: Vec<RecipeRow>,
    ingredients: Vec<IngredientRow>,
    recipe_ingredients: Vec<RecipeIngredientRow>,
    blocks: Vec<BlockRow>,
    block_recipes: Vec<BlockRecipeRow>,
    shopping_list_items: Vec<ShoppingListItemRow>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn owns_recipe(&self, user: &str, recipe_id: i32) -> bool {
        self.recipes
            .iter()
            .any(|r| r.id == recipe_id && r.user_id == user)
    }

    fn owns_block(&self, user: &str, block_id: i32) -> bool {
        self.blocks
            .iter()
            .any(|b| b.id == block_id && b.user_id == user)
    }

    fn owns_ingredient(&self, user: &str, ingredient_id: i32) -> bool {
        self.ingredients
            .iter()
            .any(|i| i.id == ingredient_id && i.user_id == user)
    }

    fn ingredient(&self, ingredient_id: i32) -> Option<&IngredientRow> {
        self.ingredients.iter().find(|i| i.id == ingredient_id)
    }

    fn insert_recipe_returning_id(&mut self, user: &str, recipe: &super::NewRecipe) -> i32 {
        let id = self.next_id();
        self.recipes.push(RecipeRow {
            id,
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            link: recipe.link.clone(),
            is_fast: recipe.is_fast,
            is_suitable_for_fridge: recipe.is_suitable_for_fridge,
            user_id: user.to_string(),
        });
        id
    }

    fn insert_ingredients_returning_ids(
        &mut self,
        user: &str,
        ingredients: &[&IngredientDraft],
    ) -> Vec<i32> {
        ingredients
            .iter()
            .map(|draft| {
                let id = self.next_id();
                self.ingredients.push(IngredientRow {
                    id,
                    name: draft.name.trim().to_string(),
                    is_pantry: draft.is_pantry,
                    user_id: user.to_string(),
                });
                id
            })
            .collect()
    }

    fn insert_recipe_ingredient_links(
        &mut self,
        user: &str,
        recipe_id: i32,
        links: &[(i32, String)],
    ) -> Result<(), GatewayError> {
        for (ingredient_id, quantity) in links {
            if !self.owns_ingredient(user, *ingredient_id) {
                return Err(GatewayError::MissingReference(format!(
                    "ingredient {ingredient_id}"
                )));
            }
            self.recipe_ingredients.push(RecipeIngredientRow {
                recipe_id,
                ingredient_id: *ingredient_id,
                quantity: quantity.clone(),
                user_id: user.to_string(),
            });
        }
        Ok(())
    }

    fn insert_blocks_returning_ids(&mut self, user: &str, names: &[&str]) -> Vec<i32> {
        names
            .iter()
            .map(|name| {
                let id = self.next_id();
                self.blocks.push(BlockRow {
                    id,
                    name: name.to_string(),
                    user_id: user.to_string(),
                });
                id
            })
            .collect()
    }

    fn insert_block_recipe_links(
        &mut self,
        user: &str,
        links: &[(i32, i32)],
    ) -> Result<(), GatewayError> {
        for &(block_id, recipe_id) in links {
            if !self.owns_recipe(user, recipe_id) {
                return Err(GatewayError::MissingReference(format!("recipe {recipe_id}")));
            }
            self.block_recipes.push(BlockRecipeRow {
                block_id,
                recipe_id,
                user_id: user.to_string(),
            });
        }
        Ok(())
    }

    fn insert_shopping_list_items(
        &mut self,
        user: &str,
        block_id: i32,
        items: &[ShoppingListItemDraft],
    ) {
        self.shopping_list_items
            .extend(items.iter().map(|item| ShoppingListItemRow {
                block_id,
                item_name: item.name.clone(),
                item_amount: item.amount.clone(),
                user_id: user.to_string(),
            }));
    }
}

/// A [`PersistenceGateway`] holding all rows in memory.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
    fail_commits: bool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose commits always fail, for exercising rollback paths.
    pub fn failing_commits() -> Self {
        Self {
            fail_commits: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        match self.tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Apply `f` to a copy of the tables; keep the copy only if `f` succeeds.
    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        if self.fail_commits {
            return Err(GatewayError::Query("commit rejected".to_string()));
        }
        let mut tables = self.lock();
        let mut working = tables.clone();
        let result = f(&mut working)?;
        *tables = working;
        Ok(result)
    }

    /// Seed a recipe with `(name, is_pantry, quantity)` ingredients. Returns the recipe id.
    pub fn seed_recipe(
        &self,
        user: &UserId,
        name: &str,
        link: &str,
        ingredients: &[(&str, bool, &str)],
    ) -> i32 {
        let mut tables = self.lock();
        let recipe_id = tables.insert_recipe_returning_id(
            user.as_str(),
            &super::NewRecipe {
                name: name.to_string(),
                description: String::new(),
                link: link.to_string(),
                is_fast: false,
                is_suitable_for_fridge: false,
            },
        );
        for (ingredient, is_pantry, quantity) in ingredients {
            let existing = tables
                .ingredients
                .iter()
                .find(|i| i.user_id == user.as_str() && i.name.eq_ignore_ascii_case(ingredient))
                .map(|i| i.id);
            let ingredient_id = match existing {
                Some(id) => id,
                None => {
                    let draft = IngredientDraft {
                        name: ingredient.to_string(),
                        quantity: String::new(),
                        is_pantry: *is_pantry,
                    };
                    tables.insert_ingredients_returning_ids(user.as_str(), &[&draft])[0]
                }
            };
            tables.recipe_ingredients.push(RecipeIngredientRow {
                recipe_id,
                ingredient_id,
                quantity: quantity.to_string(),
                user_id: user.as_str().to_string(),
            });
        }
        recipe_id
    }

    /// Seed a block linked to `recipe_ids`. Returns the block id.
    pub fn seed_block(&self, user: &UserId, name: &str, recipe_ids: &[i32]) -> i32 {
        let mut tables = self.lock();
        let block_id = tables.insert_blocks_returning_ids(user.as_str(), &[name])[0];
        for &recipe_id in recipe_ids {
            tables.block_recipes.push(BlockRecipeRow {
                block_id,
                recipe_id,
                user_id: user.as_str().to_string(),
            });
        }
        block_id
    }

    pub fn recipe_count(&self, user: &UserId) -> usize {
        self.lock()
            .recipes
            .iter()
            .filter(|r| r.user_id == user.as_str())
            .count()
    }

    pub fn ingredient_count(&self, user: &UserId) -> usize {
        self.lock()
            .ingredients
            .iter()
            .filter(|i| i.user_id == user.as_str())
            .count()
    }

    pub fn block_name(&self, user: &UserId, block_id: i32) -> Option<String> {
        self.lock()
            .blocks
            .iter()
            .find(|b| b.id == block_id && b.user_id == user.as_str())
            .map(|b| b.name.clone())
    }

    /// Recipe ids linked to a block, in link order.
    pub fn linked_recipes(&self, user: &UserId, block_id: i32) -> Vec<i32> {
        self.lock()
            .block_recipes
            .iter()
            .filter(|l| l.block_id == block_id && l.user_id == user.as_str())
            .map(|l| l.recipe_id)
            .collect()
    }

    /// The stored recipe read back as a draft, ingredients in link order.
    pub fn recipe(&self, user: &UserId, recipe_id: i32) -> Option<RecipeDraft> {
        let guard = self.lock();
        let tables: &Tables = &guard;
        let row = tables
            .recipes
            .iter()
            .find(|r| r.id == recipe_id && r.user_id == user.as_str())?;
        let ingredients = tables
            .recipe_ingredients
            .iter()
            .filter(|l| l.recipe_id == recipe_id)
            .filter_map(|l| {
                tables.ingredient(l.ingredient_id).map(|i| IngredientDraft {
                    name: i.name.clone(),
                    quantity: l.quantity.clone(),
                    is_pantry: i.is_pantry,
                })
            })
            .collect();
        Some(RecipeDraft {
            name: row.name.clone(),
            description: row.description.clone(),
            is_fast: row.is_fast,
            is_suitable_for_fridge: row.is_suitable_for_fridge,
            link: row.link.clone(),
            ingredients,
        })
    }

    /// Ingredient `(name, quantity)` pairs of a recipe, in link order.
    pub fn recipe_ingredients(&self, user: &UserId, recipe_id: i32) -> Vec<(String, String)> {
        let guard = self.lock();
        let tables: &Tables = &guard;
        tables
            .recipe_ingredients
            .iter()
            .filter(|l| l.recipe_id == recipe_id && l.user_id == user.as_str())
            .filter_map(|l| {
                tables
                    .ingredient(l.ingredient_id)
                    .map(|i| (i.name.clone(), l.quantity.clone()))
            })
            .collect()
    }
}

fn search<'a>(
    rows: impl Iterator<Item = (i32, &'a str)>,
    query: &str,
    limit: usize,
) -> Vec<EntityRef> {
    let needle = query.to_lowercase();
    let mut matches: Vec<EntityRef> = rows
        .filter(|(_, name)| name.to_lowercase().contains(&needle))
        .map(|(id, name)| EntityRef {
            id,
            name: name.to_string(),
        })
        .collect();
    matches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    matches.truncate(limit);
    matches
}

impl PersistenceGateway for MemoryGateway {
    fn find_recipe_by_link(
        &self,
        user: &UserId,
        link: &str,
    ) -> Result<Option<i32>, GatewayError> {
        Ok(self
            .lock()
            .recipes
            .iter()
            .find(|r| r.user_id == user.as_str() && r.link == link)
            .map(|r| r.id))
    }

    fn recipes_with_ingredients(
        &self,
        user: &UserId,
    ) -> Result<Vec<RecipeSummary>, GatewayError> {
        let guard = self.lock();
        let tables: &Tables = &guard;
        let mut recipes: Vec<RecipeSummary> = tables
            .recipes
            .iter()
            .filter(|r| r.user_id == user.as_str())
            .map(|r| RecipeSummary {
                id: r.id,
                name: r.name.clone(),
                ingredients: tables
                    .recipe_ingredients
                    .iter()
                    .filter(|l| l.recipe_id == r.id)
                    .filter_map(|l| tables.ingredient(l.ingredient_id))
                    .filter(|i| !i.is_pantry)
                    .map(|i| i.name.clone())
                    .collect(),
            })
            .collect();
        recipes.sort_by_key(|r| r.id);
        Ok(recipes)
    }

    fn recipe_exists(&self, user: &UserId, recipe_id: i32) -> Result<bool, GatewayError> {
        Ok(self.lock().owns_recipe(user.as_str(), recipe_id))
    }

    fn block_exists(&self, user: &UserId, block_id: i32) -> Result<bool, GatewayError> {
        Ok(self.lock().owns_block(user.as_str(), block_id))
    }

    fn block_ingredients(
        &self,
        user: &UserId,
        block_id: i32,
    ) -> Result<Vec<BlockIngredient>, GatewayError> {
        let guard = self.lock();
        let tables: &Tables = &guard;
        let mut items: Vec<BlockIngredient> = tables
            .block_recipes
            .iter()
            .filter(|b| b.block_id == block_id && b.user_id == user.as_str())
            .flat_map(|b| {
                tables
                    .recipe_ingredients
                    .iter()
                    .filter(move |l| l.recipe_id == b.recipe_id)
            })
            .filter_map(|l| {
                tables.ingredient(l.ingredient_id).map(|i| BlockIngredient {
                    name: i.name.clone(),
                    amount: l.quantity.clone(),
                })
            })
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn shopping_list(
        &self,
        user: &UserId,
        block_id: i32,
    ) -> Result<Vec<ShoppingListItemDraft>, GatewayError> {
        Ok(self
            .lock()
            .shopping_list_items
            .iter()
            .filter(|i| i.block_id == block_id && i.user_id == user.as_str())
            .map(|i| ShoppingListItemDraft {
                name: i.item_name.clone(),
                amount: i.item_amount.clone(),
            })
            .collect())
    }

    fn find_ingredients_by_names(
        &self,
        user: &UserId,
        names: &[String],
    ) -> Result<Vec<EntityRef>, GatewayError> {
        let wanted: Vec<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();
        Ok(self
            .lock()
            .ingredients
            .iter()
            .filter(|i| i.user_id == user.as_str() && wanted.contains(&i.name.to_lowercase()))
            .map(|i| EntityRef {
                id: i.id,
                name: i.name.clone(),
            })
            .collect())
    }

    fn search_ingredients(
        &self,
        user: &UserId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EntityRef>, GatewayError> {
        let tables = self.lock();
        Ok(search(
            tables
                .ingredients
                .iter()
                .filter(|i| i.user_id == user.as_str())
                .map(|i| (i.id, i.name.as_str())),
            query,
            limit,
        ))
    }

    fn recipe_ingredient_ids(
        &self,
        user: &UserId,
        recipe_id: i32,
    ) -> Result<Vec<i32>, GatewayError> {
        Ok(self
            .lock()
            .recipe_ingredients
            .iter()
            .filter(|l| l.recipe_id == recipe_id && l.user_id == user.as_str())
            .map(|l| l.ingredient_id)
            .collect())
    }

    fn search_recipes(
        &self,
        user: &UserId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EntityRef>, GatewayError> {
        let tables = self.lock();
        Ok(search(
            tables
                .recipes
                .iter()
                .filter(|r| r.user_id == user.as_str())
                .map(|r| (r.id, r.name.as_str())),
            query,
            limit,
        ))
    }

    fn block_recipe_ids(&self, user: &UserId, block_id: i32) -> Result<Vec<i32>, GatewayError> {
        Ok(self.linked_recipes(user, block_id))
    }

    fn commit_recipe(&self, user: &UserId, commit: &RecipeCommit) -> Result<i32, GatewayError> {
        let user = user.as_str();
        self.transaction(|tables| {
            let recipe_id = tables.insert_recipe_returning_id(user, &commit.recipe);

            let new: Vec<&IngredientDraft> = commit
                .ingredients
                .iter()
                .filter_map(|p| match p {
                    IngredientPlan::New(draft) => Some(draft),
                    IngredientPlan::Existing { .. } => None,
                })
                .collect();
            let mut new_ids = tables
                .insert_ingredients_returning_ids(user, &new)
                .into_iter();

            let mut links = Vec::with_capacity(commit.ingredients.len());
            for plan in &commit.ingredients {
                match plan {
                    IngredientPlan::Existing {
                        ingredient_id,
                        quantity,
                    } => links.push((*ingredient_id, quantity.clone())),
                    IngredientPlan::New(draft) => {
                        let id = new_ids.next().ok_or_else(|| {
                            GatewayError::Query("ingredient insert returned too few ids".into())
                        })?;
                        links.push((id, draft.quantity.clone()));
                    }
                }
            }
            tables.insert_recipe_ingredient_links(user, recipe_id, &links)?;
            Ok(recipe_id)
        })
    }

    fn commit_blocks(
        &self,
        user: &UserId,
        blocks: &[ResolvedBlock],
    ) -> Result<Vec<i32>, GatewayError> {
        let user = user.as_str();
        self.transaction(|tables| {
            let names: Vec<&str> = blocks.iter().map(|b| b.name.as_str()).collect();
            let ids = tables.insert_blocks_returning_ids(user, &names);

            let links: Vec<(i32, i32)> = ids
                .iter()
                .zip(blocks)
                .flat_map(|(&block_id, block)| {
                    block.recipe_ids.iter().map(move |&recipe_id| (block_id, recipe_id))
                })
                .collect();
            tables.insert_block_recipe_links(user, &links)?;
            Ok(ids)
        })
    }

    fn replace_shopping_list(
        &self,
        user: &UserId,
        block_id: i32,
        items: &[ShoppingListItemDraft],
    ) -> Result<(), GatewayError> {
        let user = user.as_str();
        self.transaction(|tables| {
            if !tables.owns_block(user, block_id) {
                return Err(GatewayError::MissingReference(format!("block {block_id}")));
            }
            tables
                .shopping_list_items
                .retain(|i| !(i.block_id == block_id && i.user_id == user));
            tables.insert_shopping_list_items(user, block_id, items);
            Ok(())
        })
    }
}
