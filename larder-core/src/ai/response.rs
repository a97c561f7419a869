//! Parsing and shaping of raw model output.
//!
//! Model output is untrusted text. It is parsed as JSON, checked for the soft
//! error envelope, and then shaped field by field into typed drafts. Shaping is
//! lenient where a safe default exists and strict only where the payload is
//! structurally wrong.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{
    BlockClusterDraft, BlockPlanDraft, ClusterRecipeRef, IngredientDraft, RecipeDraft,
    ShoppingListItemDraft,
};

/// Why a completion could not be turned into a draft.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("expected {expected}, got {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// A parsed completion: either the requested payload or a model-reported error.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Payload(Value),
    SoftError { code: String, message: String },
}

/// Parse raw completion text.
///
/// Surrounding whitespace and a single markdown code fence are tolerated. An
/// object with a non-null `error` member is treated as the soft error envelope.
pub fn parse_completion(raw: &str) -> Result<Completion, ResponseError> {
    let text = strip_code_fence(raw);
    let value: Value =
        serde_json::from_str(text).map_err(|e| ResponseError::InvalidJson(e.to_string()))?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let (code, message) = match error {
            Value::Object(obj) => (
                obj.get("code").map(scalar_to_string).unwrap_or_default(),
                obj.get("message").map(scalar_to_string).unwrap_or_default(),
            ),
            other => (String::new(), scalar_to_string(other)),
        };
        return Ok(Completion::SoftError { code, message });
    }

    Ok(Completion::Payload(value))
}

/// Remove one surrounding ```` ``` ```` fence (with optional language tag).
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag, whether or not a newline follows it.
    inner
        .trim_start()
        .trim_start_matches(|c: char| c.is_ascii_alphanumeric())
        .trim()
}

/// Shape a recipe payload into a [`RecipeDraft`]. The `link` is left empty.
pub fn shape_recipe_draft(value: &Value) -> Result<RecipeDraft, ResponseError> {
    let obj = as_object(value)?;

    let ingredients = match obj.get("ingredients") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(shape_ingredient).collect(),
        Some(_) => {
            return Err(ResponseError::InvalidField {
                field: "ingredients",
                expected: "an array",
            })
        }
    };

    Ok(RecipeDraft {
        name: string_field(obj, "name"),
        description: string_field(obj, "description"),
        is_fast: bool_field(obj, "is_fast"),
        is_suitable_for_fridge: bool_field(obj, "is_suitable_for_fridge"),
        link: String::new(),
        ingredients,
    })
}

fn shape_ingredient(value: &Value) -> Option<IngredientDraft> {
    let obj = value.as_object()?;
    let name = string_field(obj, "name");
    if name.is_empty() {
        return None;
    }
    Some(IngredientDraft {
        name,
        quantity: string_field(obj, "quantity"),
        is_pantry: bool_field(obj, "is_pantry"),
    })
}

/// Shape a clustering payload into a [`BlockPlanDraft`].
pub fn shape_block_plan(value: &Value) -> Result<BlockPlanDraft, ResponseError> {
    let obj = as_object(value)?;

    let blocks = match obj.get("blocks") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(shape_block).collect(),
        Some(_) => {
            return Err(ResponseError::InvalidField {
                field: "blocks",
                expected: "an array",
            })
        }
    };

    let unused = match obj.get("unused") {
        Some(Value::Array(items)) => items
            .iter()
            .map(scalar_to_string)
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    Ok(BlockPlanDraft { blocks, unused })
}

fn shape_block(value: &Value) -> Option<BlockClusterDraft> {
    let obj = value.as_object()?;
    let name = string_field(obj, "name");
    if name.is_empty() {
        return None;
    }

    let similarity = obj
        .get("similarity")
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .filter(|s: &f64| s.is_finite())
        .map(|s| s.clamp(0.0, 1.0))
        .unwrap_or(0.0);

    let recipes = match obj.get("recipes") {
        Some(Value::Array(items)) => items.iter().filter_map(shape_recipe_ref).collect(),
        _ => Vec::new(),
    };

    let common_ingredients = match obj.get("common_ingredients") {
        Some(Value::Array(items)) => items
            .iter()
            .map(scalar_to_string)
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    Some(BlockClusterDraft {
        name,
        similarity,
        recipes,
        common_ingredients,
    })
}

fn shape_recipe_ref(value: &Value) -> Option<ClusterRecipeRef> {
    match value {
        // Bare names show up in legacy responses.
        Value::String(name) => {
            let name = name.trim();
            (!name.is_empty()).then(|| ClusterRecipeRef {
                id: None,
                name: name.to_string(),
            })
        }
        Value::Object(obj) => {
            let name = string_field(obj, "name");
            let id = obj.get("id").and_then(|v| match v {
                Value::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            });
            if name.is_empty() && id.is_none() {
                return None;
            }
            Some(ClusterRecipeRef { id, name })
        }
        _ => None,
    }
}

/// Shape a shopping-list payload. The payload must be an array of objects with a `name`.
pub fn shape_shopping_list(value: &Value) -> Result<Vec<ShoppingListItemDraft>, ResponseError> {
    let items = value.as_array().ok_or(ResponseError::UnexpectedShape {
        expected: "an array",
        found: type_name(value),
    })?;

    items
        .iter()
        .map(|item| {
            let obj = as_object(item)?;
            match obj.get("name") {
                Some(Value::String(_)) | Some(Value::Number(_)) => Ok(ShoppingListItemDraft {
                    name: string_field(obj, "name"),
                    amount: string_field(obj, "amount"),
                }),
                _ => Err(ResponseError::InvalidField {
                    field: "name",
                    expected: "a string",
                }),
            }
        })
        .collect()
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, ResponseError> {
    value.as_object().ok_or(ResponseError::UnexpectedShape {
        expected: "an object",
        found: type_name(value),
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strings are trimmed and numbers rendered; anything else becomes empty.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).map(scalar_to_string).unwrap_or_default()
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(
            parse_completion("not json{"),
            Err(ResponseError::InvalidJson(_))
        ));
    }

    #[test]
    fn soft_error_envelope_is_recognised() {
        let parsed = parse_completion(
            r#"{"error": {"code": "0001", "message": "Unable to create the requested number of groups."}}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            Completion::SoftError {
                code: "0001".to_string(),
                message: "Unable to create the requested number of groups.".to_string(),
            }
        );
    }

    #[test]
    fn numeric_error_code_becomes_string() {
        let parsed = parse_completion(r#"{"error": {"code": 2, "message": "nope"}}"#).unwrap();
        assert!(matches!(parsed, Completion::SoftError { code, .. } if code == "2"));
    }

    #[test]
    fn null_error_member_is_payload() {
        let parsed = parse_completion(r#"{"error": null, "blocks": []}"#).unwrap();
        assert!(matches!(parsed, Completion::Payload(_)));
    }

    #[test]
    fn fenced_json_is_tolerated() {
        let parsed = parse_completion("```json\n{\"name\": \"Daal\"}\n```").unwrap();
        assert_eq!(parsed, Completion::Payload(json!({"name": "Daal"})));

        let parsed = parse_completion("```\n[1, 2]\n```").unwrap();
        assert_eq!(parsed, Completion::Payload(json!([1, 2])));
    }

    #[test]
    fn inline_fence_tag_is_dropped() {
        let parsed = parse_completion(r#"```json{"name": "x"}```"#).unwrap();
        assert_eq!(parsed, Completion::Payload(json!({"name": "x"})));

        let parsed = parse_completion("```JSON [1]```").unwrap();
        assert_eq!(parsed, Completion::Payload(json!([1])));
    }

    #[test]
    fn recipe_defaults_missing_fields() {
        let draft = shape_recipe_draft(&json!({
            "name": "  Daal  ",
            "ingredients": [
                {"name": "Red Lentils", "quantity": 200},
                {"name": "Garlic", "quantity": "2 cloves", "is_pantry": true},
                {"quantity": "1 tbsp"},
                "not an object"
            ]
        }))
        .unwrap();

        assert_eq!(draft.name, "Daal");
        assert_eq!(draft.description, "");
        assert!(!draft.is_fast);
        assert!(!draft.is_suitable_for_fridge);
        assert_eq!(draft.link, "");
        assert_eq!(
            draft.ingredients,
            vec![
                IngredientDraft {
                    name: "Red Lentils".to_string(),
                    quantity: "200".to_string(),
                    is_pantry: false,
                },
                IngredientDraft {
                    name: "Garlic".to_string(),
                    quantity: "2 cloves".to_string(),
                    is_pantry: true,
                },
            ]
        );
    }

    #[test]
    fn recipe_without_ingredients_is_empty() {
        let draft = shape_recipe_draft(&json!({"name": "Toast"})).unwrap();
        assert!(draft.ingredients.is_empty());
    }

    #[test]
    fn recipe_link_from_model_is_ignored() {
        let draft = shape_recipe_draft(&json!({"name": "Toast", "link": "http://evil"})).unwrap();
        assert_eq!(draft.link, "");
    }

    #[test]
    fn recipe_rejects_non_object_and_bad_ingredients() {
        assert!(shape_recipe_draft(&json!([1, 2])).is_err());
        assert_eq!(
            shape_recipe_draft(&json!({"name": "x", "ingredients": "flour"})),
            Err(ResponseError::InvalidField {
                field: "ingredients",
                expected: "an array"
            })
        );
    }

    #[test]
    fn block_plan_defaults_and_clamps() {
        let plan = shape_block_plan(&json!({
            "blocks": [
                {
                    "name": "Curries",
                    "similarity": 1.7,
                    "recipes": [{"id": 3, "name": "Daal"}, {"name": "Korma"}, "Balti"],
                    "common_ingredients": ["Rice"]
                },
                {"similarity": 0.2}
            ]
        }))
        .unwrap();

        assert!(plan.unused.is_empty());
        assert_eq!(plan.blocks.len(), 1);
        let block = &plan.blocks[0];
        assert_eq!(block.similarity, 1.0);
        assert_eq!(block.recipes[0].id, Some(3));
        assert_eq!(block.recipes[1].id, None);
        assert_eq!(block.recipes[2].name, "Balti");
    }

    #[test]
    fn empty_block_plan_is_valid() {
        assert_eq!(shape_block_plan(&json!({})).unwrap(), BlockPlanDraft::default());
    }

    #[test]
    fn shopping_list_must_be_array_of_named_items() {
        let items =
            shape_shopping_list(&json!([{"name": "Basil", "amount": "1 bunch"}, {"name": "Rice"}]))
                .unwrap();
        assert_eq!(items[1].amount, "");

        assert!(shape_shopping_list(&json!({"items": []})).is_err());
        assert!(shape_shopping_list(&json!([{"amount": "2"}])).is_err());
    }
}
