//! Reconciliation of AI drafts against persisted records.
//!
//! Everything here is pure: callers load the relevant rows, reconcile, and only
//! then hand the result to the gateway for a single commit.

use std::collections::{HashMap, HashSet};

use crate::types::{
    BlockIngredient, BlockPlanDraft, EntityRef, IngredientDraft, ResolvedBlock,
    ShoppingListItemDraft,
};

/// Maximum number of search-to-add candidates returned.
pub const SEARCH_RESULT_LIMIT: usize = 10;

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Keep the first ingredient per distinct name, preserving order.
///
/// Names compare case-insensitively after trimming, so "Salt" and " salt" are
/// one ingredient even though the model spelled them differently. This is the
/// same key used when reusing a user's existing ingredients. Later duplicates
/// are dropped entirely; their quantities are not merged.
pub fn dedup_ingredients(ingredients: Vec<IngredientDraft>) -> Vec<IngredientDraft> {
    let mut seen = HashSet::new();
    ingredients
        .into_iter()
        .filter(|i| seen.insert(name_key(&i.name)))
        .collect()
}

/// How one draft ingredient will be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngredientPlan {
    /// Link to an ingredient the user already has.
    Existing { ingredient_id: i32, quantity: String },
    /// Insert a new ingredient row, then link it.
    New(IngredientDraft),
}

/// Match draft ingredients to the user's existing ingredients by name.
///
/// `existing` must already be scoped to the user. When several existing rows
/// share a name the lowest id wins.
pub fn match_existing_ingredients(
    ingredients: Vec<IngredientDraft>,
    existing: &[EntityRef],
) -> Vec<IngredientPlan> {
    let mut by_name: HashMap<String, i32> = HashMap::new();
    for row in existing {
        by_name
            .entry(name_key(&row.name))
            .and_modify(|id| *id = (*id).min(row.id))
            .or_insert(row.id);
    }

    ingredients
        .into_iter()
        .map(|draft| match by_name.get(&name_key(&draft.name)) {
            Some(&ingredient_id) => IngredientPlan::Existing {
                ingredient_id,
                quantity: draft.quantity,
            },
            None => IngredientPlan::New(draft),
        })
        .collect()
}

/// Resolve every block's recipe references to ids from the user's recipes.
///
/// An id is trusted when it belongs to `recipes`. Otherwise the reference is
/// resolved by exact name, and only when exactly one recipe has that name.
/// Anything else is dropped. A recipe listed twice in one block is linked once;
/// the same recipe may still appear in several blocks.
pub fn resolve_block_links(plan: &BlockPlanDraft, recipes: &[EntityRef]) -> Vec<ResolvedBlock> {
    let known_ids: HashSet<i32> = recipes.iter().map(|r| r.id).collect();
    let mut by_name: HashMap<&str, Vec<i32>> = HashMap::new();
    for recipe in recipes {
        by_name.entry(recipe.name.as_str()).or_default().push(recipe.id);
    }

    plan.blocks
        .iter()
        .map(|block| {
            let mut recipe_ids = Vec::new();
            for reference in &block.recipes {
                let resolved = reference
                    .id
                    .filter(|id| known_ids.contains(id))
                    .or_else(|| match by_name.get(reference.name.as_str()) {
                        Some(ids) if ids.len() == 1 => Some(ids[0]),
                        _ => None,
                    });

                match resolved {
                    Some(id) if !recipe_ids.contains(&id) => recipe_ids.push(id),
                    Some(_) => {}
                    None => tracing::warn!(
                        block = %block.name,
                        recipe = %reference.name,
                        id = ?reference.id,
                        "dropping unresolved recipe reference"
                    ),
                }
            }
            ResolvedBlock {
                name: block.name.clone(),
                recipe_ids,
            }
        })
        .collect()
}

/// Drop candidates already linked to the target and cap the result.
pub fn exclude_linked(candidates: Vec<EntityRef>, linked_ids: &[i32]) -> Vec<EntityRef> {
    let linked: HashSet<i32> = linked_ids.iter().copied().collect();
    candidates
        .into_iter()
        .filter(|c| !linked.contains(&c.id))
        .take(SEARCH_RESULT_LIMIT)
        .collect()
}

/// Input ingredient names no shopping-list entry designates.
///
/// Names are normalized (case, whitespace, punctuation, simple plurals) and an
/// entry designates an input when either name's words appear as a contiguous
/// run in the other. The result holds each missing name once, in input order.
pub fn missing_from_shopping_list(
    inputs: &[BlockIngredient],
    list: &[ShoppingListItemDraft],
) -> Vec<String> {
    let outputs: Vec<Vec<String>> = list.iter().map(|item| normalized_words(&item.name)).collect();

    let mut seen = HashSet::new();
    inputs
        .iter()
        .filter(|input| seen.insert(normalized_words(&input.name)))
        .filter(|input| {
            let words = normalized_words(&input.name);
            !words.is_empty()
                && !outputs
                    .iter()
                    .any(|out| contains_run(out, &words) || contains_run(&words, out))
        })
        .map(|input| input.name.clone())
        .collect()
}

fn normalized_words(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(singular)
        .collect()
}

fn singular(word: &str) -> String {
    if word.len() > 4 && word.ends_with("ies") {
        format!("{}y", &word[..word.len() - 3])
    } else if word.len() > 3 && word.ends_with("oes") {
        word[..word.len() - 2].to_string()
    } else if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BlockClusterDraft, ClusterRecipeRef};

    fn ingredient(name: &str, quantity: &str) -> IngredientDraft {
        IngredientDraft {
            name: name.to_string(),
            quantity: quantity.to_string(),
            is_pantry: false,
        }
    }

    fn entity(id: i32, name: &str) -> EntityRef {
        EntityRef {
            id,
            name: name.to_string(),
        }
    }

    fn reference(id: Option<i32>, name: &str) -> ClusterRecipeRef {
        ClusterRecipeRef {
            id,
            name: name.to_string(),
        }
    }

    fn block_ingredient(name: &str, amount: &str) -> BlockIngredient {
        BlockIngredient {
            name: name.to_string(),
            amount: amount.to_string(),
        }
    }

    fn list_item(name: &str, amount: &str) -> ShoppingListItemDraft {
        ShoppingListItemDraft {
            name: name.to_string(),
            amount: amount.to_string(),
        }
    }

    fn plan(recipes: Vec<ClusterRecipeRef>) -> BlockPlanDraft {
        BlockPlanDraft {
            blocks: vec![BlockClusterDraft {
                name: "Week 1".to_string(),
                similarity: 0.5,
                recipes,
                common_ingredients: vec![],
            }],
            unused: vec![],
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let result = dedup_ingredients(vec![
            ingredient("Salt", "1 tsp"),
            ingredient("Egg", "2"),
            ingredient("Salt", "2 tsp"),
        ]);
        assert_eq!(result, vec![ingredient("Salt", "1 tsp"), ingredient("Egg", "2")]);
    }

    #[test]
    fn dedup_ignores_case_and_padding() {
        let result = dedup_ingredients(vec![
            ingredient("Olive Oil", "1 tbsp"),
            ingredient(" olive oil", "2 tbsp"),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].quantity, "1 tbsp");
    }

    #[test]
    fn existing_ingredients_are_reused() {
        let plans = match_existing_ingredients(
            vec![ingredient("garlic", "2 cloves"), ingredient("Kale", "100g")],
            &[entity(9, "Garlic"), entity(4, "GARLIC")],
        );
        assert_eq!(
            plans,
            vec![
                IngredientPlan::Existing {
                    ingredient_id: 4,
                    quantity: "2 cloves".to_string()
                },
                IngredientPlan::New(ingredient("Kale", "100g")),
            ]
        );
    }

    #[test]
    fn trusted_ids_and_unique_names_resolve() {
        let recipes = vec![
            entity(1, "Daal"),
            entity(2, "Korma"),
            entity(3, "Korma"),
            entity(5, "Pho"),
        ];
        let resolved = resolve_block_links(
            &plan(vec![
                reference(Some(1), "Whatever"),
                reference(None, "Pho"),
                reference(None, "Korma"),
                reference(Some(99), "Nope"),
                reference(Some(1), "Daal"),
            ]),
            &recipes,
        );
        assert_eq!(resolved[0].recipe_ids, vec![1, 5]);
    }

    #[test]
    fn foreign_id_falls_back_to_name() {
        let resolved =
            resolve_block_links(&plan(vec![reference(Some(42), "Daal")]), &[entity(1, "Daal")]);
        assert_eq!(resolved[0].recipe_ids, vec![1]);
    }

    #[test]
    fn exclude_linked_filters_and_caps() {
        let candidates: Vec<EntityRef> = (1..=15).map(|i| entity(i, "Rice")).collect();
        let result = exclude_linked(candidates, &[1, 2]);
        assert_eq!(result.len(), SEARCH_RESULT_LIMIT);
        assert_eq!(result[0].id, 3);
    }

    #[test]
    fn shopping_list_coverage_folds_plurals_and_variants() {
        let inputs = vec![
            block_ingredient("Tomato", "2"),
            block_ingredient("Tomatoes", "400g"),
            block_ingredient("Red Onions, diced", "1"),
            block_ingredient("Fresh Basil", "1 bunch"),
            block_ingredient("Dried Basil", "1 tsp"),
        ];
        let list = vec![
            list_item("Tomatoes", "2 + 400g"),
            list_item("Red Onion", "1"),
            list_item("Fresh Basil", "1 bunch"),
        ];

        assert_eq!(
            missing_from_shopping_list(&inputs, &list),
            vec!["Dried Basil".to_string()]
        );
    }

    #[test]
    fn berries_fold_to_berry() {
        assert_eq!(normalized_words("Blueberries"), vec!["blueberry".to_string()]);
        assert_eq!(
            normalized_words("Swiss Cheese"),
            vec!["swiss".to_string(), "cheese".to_string()]
        );
    }
}
