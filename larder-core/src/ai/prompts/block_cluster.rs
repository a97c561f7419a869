//! Prompt for grouping a user's recipes into meal-plan blocks.

use super::LIST_SEPARATOR;
use crate::types::RecipeSummary;

/// Prompt name for logging spans.
pub const BLOCK_CLUSTER_PROMPT_NAME: &str = "block_cluster";

pub const BLOCK_CLUSTER_USER_PREFIX: &str = "The recipes you are to process are:\r\n- ";

/// Soft-error code the model returns when it cannot form the requested groups.
pub const INSUFFICIENT_GROUPS_CODE: &str = "0001";

pub const BLOCK_CLUSTER_SYSTEM_PROMPT: &str = r#"You are an API endpoint.
You will be given a list of recipes, their identifiers and their ingredients. The recipes will be in the format:

- {Recipe_Name} [{Recipe_Id}]: ({Ingredient_1}, {Ingredient_2}, ...)
- {Recipe_Name} [{Recipe_Id}]: ({Ingredient_1}, {Ingredient_2}, ...)
...

You will respond in JSON format. For example:

{
    "blocks": [
        {
            "name": "Asian",
            "similarity": 0.8,
            "recipes": [
                { "id": 12, "name": "Fried Rice" },
                { "id": 31, "name": "Sushi" }
            ],
            "common_ingredients": ["Rice", "Soy Sauce"]
        },
        {
            "name": "European",
            "similarity": 0.6,
            "recipes": [
                { "id": 4, "name": "Pizza" },
                { "id": 9, "name": "Pasta" }
            ],
            "common_ingredients": ["Tomato", "Cheese"]
        }
    ],
    "unused": [
        "Stir Fried Greens", "Lasagne"
    ]
}

Where blocks is a list of recipe groups.
The groups are formed based on the similarity of the ingredients in the contained recipes.
Your aim is to create a number of groups where all the recipes in each group contain similar ingredients.
The similarity is a number between 0 and 1, where 1 is the most similar.
Assign a similarity value to each group based on the similarity of the ingredients in the contained recipes.
Each group should have 7 recipes. Prefer creating groups with lower similarity values over creating lots of small groups.
You can include a recipe in more than one group if it contains similar ingredients to recipes in both groups,
but try to avoid this where possible.
Aim to create 4 groups.
For every recipe you place in a group, copy its identifier from the square brackets into the "id" field and its name into the "name" field.
If you do not use a recipe in one of the blocks, add its name to the "unused" list.
For each group, list the ingredients that are common to all the recipes in that group in the "common_ingredients" field.

If you are unable to create the requested number and size of groups, return the following error:

{
    "error": { "code": "0001", "message": "Unable to create the requested number of groups." }
}

Do not include anything other than JSON in the response. Do not reply in markdown."#;

/// One recipe line: `{name} [{id}]: ({ingredient}, {ingredient}, ...)`.
pub fn render_recipe_line(recipe: &RecipeSummary) -> String {
    format!(
        "{} [{}]: ({})",
        recipe.name,
        recipe.id,
        recipe.ingredients.join(", ")
    )
}

/// Render the user message listing every recipe with its non-pantry ingredients.
pub fn render_block_cluster_user_prompt(recipes: &[RecipeSummary]) -> String {
    let lines: Vec<String> = recipes.iter().map(render_recipe_line).collect();
    format!("{BLOCK_CLUSTER_USER_PREFIX}{}", lines.join(LIST_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: i32, name: &str, ingredients: &[&str]) -> RecipeSummary {
        RecipeSummary {
            id,
            name: name.to_string(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_render_prompt() {
        let prompt = render_block_cluster_user_prompt(&[
            recipe(1, "Daal", &["Red Lentils", "Coconut Milk"]),
            recipe(7, "Pesto Pasta", &["Basil", "Spaghetti"]),
        ]);

        assert_eq!(
            prompt,
            "The recipes you are to process are:\r\n- Daal [1]: (Red Lentils, Coconut Milk)\r\n- Pesto Pasta [7]: (Basil, Spaghetti)"
        );
    }

    #[test]
    fn recipe_without_ingredients_renders_empty_parens() {
        assert_eq!(render_recipe_line(&recipe(3, "Toast", &[])), "Toast [3]: ()");
    }

    #[test]
    fn system_prompt_defines_soft_error() {
        assert!(BLOCK_CLUSTER_SYSTEM_PROMPT.contains(INSUFFICIENT_GROUPS_CODE));
        assert!(BLOCK_CLUSTER_SYSTEM_PROMPT.contains("Aim to create 4 groups"));
    }
}
