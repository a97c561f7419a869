use diesel::prelude::*;

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipeRow<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub link: &'a str,
    pub is_fast: bool,
    pub is_suitable_for_fridge: bool,
    pub user_id: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ingredients)]
pub struct NewIngredientRow<'a> {
    pub name: &'a str,
    pub is_pantry: bool,
    pub user_id: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
pub struct NewRecipeIngredient<'a> {
    pub recipe_id: i32,
    pub ingredient_id: i32,
    pub quantity: &'a str,
    pub user_id: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::blocks)]
pub struct NewBlock<'a> {
    pub name: &'a str,
    pub user_id: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::block_recipes)]
pub struct NewBlockRecipe<'a> {
    pub block_id: i32,
    pub recipe_id: i32,
    pub user_id: &'a str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::block_shopping_list_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShoppingListItemRow {
    pub item_name: String,
    pub item_amount: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::block_shopping_list_items)]
pub struct NewShoppingListItem<'a> {
    pub block_id: i32,
    pub item_name: &'a str,
    pub item_amount: &'a str,
    pub user_id: &'a str,
}
