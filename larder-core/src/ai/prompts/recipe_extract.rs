//! Prompt for extracting a structured recipe from a webpage.

/// Prompt name for logging spans.
pub const RECIPE_EXTRACT_PROMPT_NAME: &str = "recipe_extract";

pub const RECIPE_EXTRACT_USER_PREFIX: &str = "The HTML you are to analyse is: ";

pub const RECIPE_EXTRACT_SYSTEM_PROMPT: &str = r#"You are an API endpoint that, when given the HTML of a website,
will analyse the website for the following:
- A recipe name, up to 100 characters long
- A short description of the recipe, up to 200 characters long
- A categorization of how fast the recipe is to make
- A guess at how well the recipe will keep in the fridge
- A list of ingredients

Where the ingredients are a short name and a quantity.
If you cannot find a quantity for an ingredient, set the quantity to ''.
Do not add ingredients that are not in the recipe.
Include all ingredients you find in the recipe, but exclude Salt and Pepper.
Do not rename any of the ingredients.
Use title case for the ingredient names.
Exclude any 'to taste' directions from ingredient names and quantities.
For quantities that are not standard grams, millilitres, or teaspoons but are instead 'a clove', 'a handful', etc.,
use that as the quantity and not in the name of the ingredient.
If a recipe is broken up into different sections for different parts of the recipe, include all ingredients in one list.
Where possible, group the ingredients together. For example, if a section called 'For the curry' includes 1 tbsp of olive oil
and a section called 'For the rice' includes 2 tbsp of olive oil, list them once as 3 tbsp of olive oil.
If an ingredient quantity is 'half' or '1/2', convert this value to a decimal for the response.
When deciding if a recipe is fast or not, assume recipes that take less than an hour are fast.
When estimating how well the recipe will keep in the fridge, base this on how well the meal will transfer
into a container. For example, a salad will not keep well in the fridge, but a curry will.
For each ingredient, include an 'is_pantry' flag. This should be true if the ingredient is likely to be in a pantry, or is common among many recipes.
For example: salt, pepper, and olive oil are pantry items, but chestnut mushrooms are not. Always assume the following are pantry items: salt, pepper,
oil of all varieties, flour, sugar, onion, garlic, ginger, and any other common spices.
Never include any type of water in the ingredients list.

You will respond in JSON format. For example:

{
    "name": "Daal curry",
    "description": "A delightfully creamy vegan daal. Perfect with rice.",
    "is_fast": true,
    "is_suitable_for_fridge": true,
    "ingredients": [
        { "name": "Chestnut Mushrooms", "quantity": "700g", "is_pantry": false },
        { "name": "Spaghetti", "quantity": "500g", "is_pantry": false },
        { "name": "Olive Oil", "quantity": "1 tbsp", "is_pantry": true }
    ]
}

Do not include anything other than JSON in the response. Do not reply in markdown."#;

/// Render the user message: the instructional prefix followed by the narrowed HTML verbatim.
pub fn render_recipe_extract_user_prompt(narrowed_html: &str) -> String {
    format!("{RECIPE_EXTRACT_USER_PREFIX}{narrowed_html}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt() {
        let prompt = render_recipe_extract_user_prompt("<main><h1>Daal</h1></main>");
        assert_eq!(
            prompt,
            "The HTML you are to analyse is: <main><h1>Daal</h1></main>"
        );
    }

    #[test]
    fn system_prompt_forbids_markdown() {
        assert!(RECIPE_EXTRACT_SYSTEM_PROMPT.contains("Do not reply in markdown"));
        assert!(RECIPE_EXTRACT_SYSTEM_PROMPT.contains("is_pantry"));
    }
}
