//! PostgreSQL implementation of the persistence gateway.
//!
//! Reads run as single queries on a pooled connection. Every write path runs in
//! one `conn.transaction(..)` so a failed insert leaves nothing behind.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use larder_core::gateway::{GatewayError, NewRecipe, PersistenceGateway, RecipeCommit};
use larder_core::{
    BlockIngredient, EntityRef, IngredientDraft, IngredientPlan, RecipeSummary, ResolvedBlock,
    ShoppingListItemDraft, UserId,
};

use crate::db::DbPool;
use crate::models::{
    NewBlock, NewBlockRecipe, NewIngredientRow, NewRecipeIngredient, NewRecipeRow,
    NewShoppingListItem, ShoppingListItemRow,
};
use crate::schema::{
    block_recipes, block_shopping_list_items, blocks, ingredients, recipe_ingredients, recipes,
};

diesel::define_sql_function!(fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text);

type Conn = PooledConnection<ConnectionManager<PgConnection>>;

pub struct DieselGateway {
    pool: DbPool,
}

impl DieselGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<Conn, GatewayError> {
        self.pool
            .get()
            .map_err(|e| GatewayError::Connection(e.to_string()))
    }
}

fn query_error(e: DieselError) -> GatewayError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            GatewayError::MissingReference(info.message().to_string())
        }
        other => GatewayError::Query(other.to_string()),
    }
}

/// `%query%` with LIKE wildcards in the query escaped.
fn contains_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn insert_recipe_returning_id(
    conn: &mut PgConnection,
    user: &str,
    recipe: &NewRecipe,
) -> QueryResult<i32> {
    diesel::insert_into(recipes::table)
        .values(&NewRecipeRow {
            name: &recipe.name,
            description: &recipe.description,
            link: &recipe.link,
            is_fast: recipe.is_fast,
            is_suitable_for_fridge: recipe.is_suitable_for_fridge,
            user_id: user,
        })
        .returning(recipes::id)
        .get_result(conn)
}

/// One insert per row so the returned ids line up with `drafts`.
fn insert_ingredients_returning_ids(
    conn: &mut PgConnection,
    user: &str,
    drafts: &[&IngredientDraft],
) -> QueryResult<Vec<i32>> {
    drafts
        .iter()
        .map(|draft| {
            diesel::insert_into(ingredients::table)
                .values(&NewIngredientRow {
                    name: draft.name.trim(),
                    is_pantry: draft.is_pantry,
                    user_id: user,
                })
                .returning(ingredients::id)
                .get_result(conn)
        })
        .collect()
}

fn insert_recipe_ingredient_links(
    conn: &mut PgConnection,
    links: &[NewRecipeIngredient],
) -> QueryResult<usize> {
    if links.is_empty() {
        return Ok(0);
    }
    diesel::insert_into(recipe_ingredients::table)
        .values(links)
        .execute(conn)
}

fn insert_blocks_returning_ids(
    conn: &mut PgConnection,
    user: &str,
    names: &[&str],
) -> QueryResult<Vec<i32>> {
    names
        .iter()
        .map(|&name| {
            diesel::insert_into(blocks::table)
                .values(&NewBlock {
                    name,
                    user_id: user,
                })
                .returning(blocks::id)
                .get_result(conn)
        })
        .collect()
}

fn insert_block_recipe_links(
    conn: &mut PgConnection,
    links: &[NewBlockRecipe],
) -> QueryResult<usize> {
    if links.is_empty() {
        return Ok(0);
    }
    diesel::insert_into(block_recipes::table)
        .values(links)
        .execute(conn)
}

fn insert_shopping_list_items(
    conn: &mut PgConnection,
    items: &[NewShoppingListItem],
) -> QueryResult<usize> {
    if items.is_empty() {
        return Ok(0);
    }
    diesel::insert_into(block_shopping_list_items::table)
        .values(items)
        .execute(conn)
}

impl PersistenceGateway for DieselGateway {
    fn find_recipe_by_link(
        &self,
        user: &UserId,
        link: &str,
    ) -> Result<Option<i32>, GatewayError> {
        let mut conn = self.conn()?;
        recipes::table
            .filter(recipes::user_id.eq(user.as_str()))
            .filter(recipes::link.eq(link))
            .select(recipes::id)
            .order(recipes::id.asc())
            .first::<i32>(&mut conn)
            .optional()
            .map_err(query_error)
    }

    fn recipes_with_ingredients(
        &self,
        user: &UserId,
    ) -> Result<Vec<RecipeSummary>, GatewayError> {
        let mut conn = self.conn()?;

        let rows: Vec<(i32, String)> = recipes::table
            .filter(recipes::user_id.eq(user.as_str()))
            .select((recipes::id, recipes::name))
            .order(recipes::id.asc())
            .load(&mut conn)
            .map_err(query_error)?;

        let links: Vec<(i32, String)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::user_id.eq(user.as_str()))
            .filter(ingredients::is_pantry.eq(false))
            .select((recipe_ingredients::recipe_id, ingredients::name))
            .order(recipe_ingredients::id.asc())
            .load(&mut conn)
            .map_err(query_error)?;

        let mut by_recipe: HashMap<i32, Vec<String>> = HashMap::new();
        for (recipe_id, name) in links {
            by_recipe.entry(recipe_id).or_default().push(name);
        }

        Ok(rows
            .into_iter()
            .map(|(id, name)| RecipeSummary {
                id,
                name,
                ingredients: by_recipe.remove(&id).unwrap_or_default(),
            })
            .collect())
    }

    fn recipe_exists(&self, user: &UserId, recipe_id: i32) -> Result<bool, GatewayError> {
        let mut conn = self.conn()?;
        diesel::select(diesel::dsl::exists(
            recipes::table
                .filter(recipes::id.eq(recipe_id))
                .filter(recipes::user_id.eq(user.as_str())),
        ))
        .get_result(&mut conn)
        .map_err(query_error)
    }

    fn block_exists(&self, user: &UserId, block_id: i32) -> Result<bool, GatewayError> {
        let mut conn = self.conn()?;
        diesel::select(diesel::dsl::exists(
            blocks::table
                .filter(blocks::id.eq(block_id))
                .filter(blocks::user_id.eq(user.as_str())),
        ))
        .get_result(&mut conn)
        .map_err(query_error)
    }

    fn block_ingredients(
        &self,
        user: &UserId,
        block_id: i32,
    ) -> Result<Vec<BlockIngredient>, GatewayError> {
        let mut conn = self.conn()?;
        let rows: Vec<(String, String)> = block_recipes::table
            .inner_join(
                recipe_ingredients::table
                    .on(recipe_ingredients::recipe_id.eq(block_recipes::recipe_id)),
            )
            .inner_join(
                ingredients::table.on(ingredients::id.eq(recipe_ingredients::ingredient_id)),
            )
            .filter(block_recipes::block_id.eq(block_id))
            .filter(block_recipes::user_id.eq(user.as_str()))
            .select((ingredients::name, recipe_ingredients::quantity))
            .order((ingredients::name.asc(), recipe_ingredients::id.asc()))
            .load(&mut conn)
            .map_err(query_error)?;

        Ok(rows
            .into_iter()
            .map(|(name, amount)| BlockIngredient { name, amount })
            .collect())
    }

    fn shopping_list(
        &self,
        user: &UserId,
        block_id: i32,
    ) -> Result<Vec<ShoppingListItemDraft>, GatewayError> {
        let mut conn = self.conn()?;
        let rows: Vec<ShoppingListItemRow> = block_shopping_list_items::table
            .filter(block_shopping_list_items::block_id.eq(block_id))
            .filter(block_shopping_list_items::user_id.eq(user.as_str()))
            .select(ShoppingListItemRow::as_select())
            .order(block_shopping_list_items::id.asc())
            .load(&mut conn)
            .map_err(query_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ShoppingListItemDraft {
                name: row.item_name,
                amount: row.item_amount,
            })
            .collect())
    }

    fn find_ingredients_by_names(
        &self,
        user: &UserId,
        names: &[String],
    ) -> Result<Vec<EntityRef>, GatewayError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let lowered: Vec<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();

        let mut conn = self.conn()?;
        let rows: Vec<(i32, String)> = ingredients::table
            .filter(ingredients::user_id.eq(user.as_str()))
            .filter(lower(ingredients::name).eq_any(lowered))
            .select((ingredients::id, ingredients::name))
            .order(ingredients::id.asc())
            .load(&mut conn)
            .map_err(query_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| EntityRef { id, name })
            .collect())
    }

    fn search_ingredients(
        &self,
        user: &UserId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EntityRef>, GatewayError> {
        let mut conn = self.conn()?;
        let rows: Vec<(i32, String)> = ingredients::table
            .filter(ingredients::user_id.eq(user.as_str()))
            .filter(ingredients::name.ilike(contains_pattern(query)))
            .select((ingredients::id, ingredients::name))
            .order((ingredients::name.asc(), ingredients::id.asc()))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .load(&mut conn)
            .map_err(query_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| EntityRef { id, name })
            .collect())
    }

    fn recipe_ingredient_ids(
        &self,
        user: &UserId,
        recipe_id: i32,
    ) -> Result<Vec<i32>, GatewayError> {
        let mut conn = self.conn()?;
        recipe_ingredients::table
            .filter(recipe_ingredients::recipe_id.eq(recipe_id))
            .filter(recipe_ingredients::user_id.eq(user.as_str()))
            .select(recipe_ingredients::ingredient_id)
            .load(&mut conn)
            .map_err(query_error)
    }

    fn search_recipes(
        &self,
        user: &UserId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EntityRef>, GatewayError> {
        let mut conn = self.conn()?;
        let rows: Vec<(i32, String)> = recipes::table
            .filter(recipes::user_id.eq(user.as_str()))
            .filter(recipes::name.ilike(contains_pattern(query)))
            .select((recipes::id, recipes::name))
            .order((recipes::name.asc(), recipes::id.asc()))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .load(&mut conn)
            .map_err(query_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| EntityRef { id, name })
            .collect())
    }

    fn block_recipe_ids(&self, user: &UserId, block_id: i32) -> Result<Vec<i32>, GatewayError> {
        let mut conn = self.conn()?;
        block_recipes::table
            .filter(block_recipes::block_id.eq(block_id))
            .filter(block_recipes::user_id.eq(user.as_str()))
            .select(block_recipes::recipe_id)
            .order(block_recipes::id.asc())
            .load(&mut conn)
            .map_err(query_error)
    }

    fn commit_recipe(&self, user: &UserId, commit: &RecipeCommit) -> Result<i32, GatewayError> {
        let user = user.as_str();
        let mut conn = self.conn()?;

        conn.transaction::<_, DieselError, _>(|conn| {
            let recipe_id = insert_recipe_returning_id(conn, user, &commit.recipe)?;

            let new: Vec<&IngredientDraft> = commit
                .ingredients
                .iter()
                .filter_map(|plan| match plan {
                    IngredientPlan::New(draft) => Some(draft),
                    IngredientPlan::Existing { .. } => None,
                })
                .collect();
            let mut new_ids = insert_ingredients_returning_ids(conn, user, &new)?.into_iter();

            let links: Vec<NewRecipeIngredient> = commit
                .ingredients
                .iter()
                .filter_map(|plan| match plan {
                    IngredientPlan::Existing {
                        ingredient_id,
                        quantity,
                    } => Some((*ingredient_id, quantity.as_str())),
                    IngredientPlan::New(draft) => {
                        new_ids.next().map(|id| (id, draft.quantity.as_str()))
                    }
                })
                .map(|(ingredient_id, quantity)| NewRecipeIngredient {
                    recipe_id,
                    ingredient_id,
                    quantity,
                    user_id: user,
                })
                .collect();
            insert_recipe_ingredient_links(conn, &links)?;

            tracing::debug!(
                recipe_id,
                new_ingredients = new.len(),
                links = links.len(),
                "recipe committed"
            );
            Ok(recipe_id)
        })
        .map_err(query_error)
    }

    fn commit_blocks(
        &self,
        user: &UserId,
        resolved: &[ResolvedBlock],
    ) -> Result<Vec<i32>, GatewayError> {
        let user = user.as_str();
        let mut conn = self.conn()?;

        conn.transaction::<_, DieselError, _>(|conn| {
            let names: Vec<&str> = resolved.iter().map(|b| b.name.as_str()).collect();
            let block_ids = insert_blocks_returning_ids(conn, user, &names)?;

            let links: Vec<NewBlockRecipe> = block_ids
                .iter()
                .zip(resolved)
                .flat_map(|(&block_id, block)| {
                    block.recipe_ids.iter().map(move |&recipe_id| NewBlockRecipe {
                        block_id,
                        recipe_id,
                        user_id: user,
                    })
                })
                .collect();
            insert_block_recipe_links(conn, &links)?;

            Ok(block_ids)
        })
        .map_err(query_error)
    }

    fn replace_shopping_list(
        &self,
        user: &UserId,
        block_id: i32,
        items: &[ShoppingListItemDraft],
    ) -> Result<(), GatewayError> {
        let user = user.as_str();
        let mut conn = self.conn()?;

        conn.transaction::<_, DieselError, _>(|conn| {
            diesel::delete(
                block_shopping_list_items::table
                    .filter(block_shopping_list_items::block_id.eq(block_id))
                    .filter(block_shopping_list_items::user_id.eq(user)),
            )
            .execute(conn)?;

            let rows: Vec<NewShoppingListItem> = items
                .iter()
                .map(|item| NewShoppingListItem {
                    block_id,
                    item_name: item.name.trim(),
                    item_amount: &item.amount,
                    user_id: user,
                })
                .collect();
            insert_shopping_list_items(conn, &rows)?;
            Ok(())
        })
        .map_err(query_error)
    }
}
