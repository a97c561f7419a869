//! Prompt for consolidating a block's ingredients into one shopping list.

use super::LIST_SEPARATOR;
use crate::types::BlockIngredient;

/// Prompt name for logging spans.
pub const SHOPPING_LIST_PROMPT_NAME: &str = "shopping_list";

pub const SHOPPING_LIST_USER_PREFIX: &str = "The items you are to process are:\r\n- ";

pub const SHOPPING_LIST_SYSTEM_PROMPT: &str = r#"You are an API endpoint.
You will be given a list of ingredients and their amounts, taken from several recipes. The items will be in the format:

- {Ingredient_Name}: {Amount}
- {Ingredient_Name}: {Amount}
...

Combine them into a single shopping list.
The same ingredient may appear more than once. Merge repeated ingredients into one item and add their amounts together.
Treat singular and plural names as the same ingredient (for example 'Tomato' and 'Tomatoes'), and merge names that clearly
describe the same thing (for example 'Red Onion' and 'Red Onions, diced').
Keep fresh and dried herbs as separate items (for example 'Fresh Basil' and 'Dried Basil').
If amounts use units that cannot be added together, join them with ' + ' (for example '200g + 2 handfuls').
If an ingredient has no amount, set the amount to ''.
Every ingredient in the input must appear in the output. Do not add ingredients that are not in the input.

You will respond in JSON format, as an array of items. For example:

[
    { "name": "Chestnut Mushrooms", "amount": "700g" },
    { "name": "Coriander", "amount": "1 bunch + 10g" },
    { "name": "Bay Leaves", "amount": "" }
]

Do not include anything other than JSON in the response. Do not reply in markdown."#;

/// Render the user message: every `{name}: {amount}` line sorted alphabetically by name.
pub fn render_shopping_list_user_prompt(items: &[BlockIngredient]) -> String {
    let mut sorted: Vec<&BlockIngredient> = items.iter().collect();
    sorted.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    let lines: Vec<String> = sorted
        .iter()
        .map(|item| format!("{}: {}", item.name, item.amount))
        .collect();

    format!("{SHOPPING_LIST_USER_PREFIX}{}", lines.join(LIST_SEPARATOR))
}
