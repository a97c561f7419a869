//! Field validation for caller-supplied input and drafts about to be committed.
//!
//! Limits mirror the column sizes of the persisted tables. Field paths use the
//! dotted form `ingredients.2.name`.

use crate::error::FieldError;
use crate::types::{BlockPlanDraft, RecipeDraft, ShoppingListItemDraft};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_LINK_LEN: usize = 1000;
pub const MAX_QUANTITY_LEN: usize = 100;
pub const MAX_AMOUNT_LEN: usize = 255;

fn check_len(
    errors: &mut Vec<FieldError>,
    field: impl Into<String>,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min {
        errors.push(FieldError::new(field, "This field is required."));
    } else if len > max {
        errors.push(FieldError::new(
            field,
            format!("Must be at most {max} characters."),
        ));
    }
}

fn check_link(errors: &mut Vec<FieldError>, field: &str, link: &str) {
    let before = errors.len();
    check_len(errors, field, link.trim(), 1, MAX_LINK_LEN);
    if errors.len() > before {
        return;
    }
    match url::Url::parse(link.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {}
        _ => errors.push(FieldError::new(field, "Must be a valid http(s) URL.")),
    }
}

fn into_result(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the link given to a recipe import.
pub fn validate_import_link(link: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    check_link(&mut errors, "link", link);
    into_result(errors)
}

/// Validate a recipe draft before it is committed.
pub fn validate_recipe_draft(draft: &RecipeDraft) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    check_len(&mut errors, "name", draft.name.trim(), 1, MAX_NAME_LEN);
    check_len(
        &mut errors,
        "description",
        &draft.description,
        0,
        MAX_DESCRIPTION_LEN,
    );
    check_link(&mut errors, "link", &draft.link);

    for (i, ingredient) in draft.ingredients.iter().enumerate() {
        check_len(
            &mut errors,
            format!("ingredients.{i}.name"),
            ingredient.name.trim(),
            1,
            MAX_NAME_LEN,
        );
        check_len(
            &mut errors,
            format!("ingredients.{i}.quantity"),
            &ingredient.quantity,
            0,
            MAX_QUANTITY_LEN,
        );
    }

    into_result(errors)
}

/// Validate a block plan before it is committed.
pub fn validate_block_plan(plan: &BlockPlanDraft) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if plan.blocks.is_empty() {
        errors.push(FieldError::new("blocks", "At least one block is required."));
    }
    for (i, block) in plan.blocks.iter().enumerate() {
        check_len(
            &mut errors,
            format!("blocks.{i}.name"),
            block.name.trim(),
            1,
            MAX_NAME_LEN,
        );
    }
    into_result(errors)
}

/// Validate shopping-list items before they are stored.
pub fn validate_shopping_list(items: &[ShoppingListItemDraft]) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    for (i, item) in items.iter().enumerate() {
        check_len(
            &mut errors,
            format!("list.{i}.name"),
            item.name.trim(),
            1,
            MAX_NAME_LEN,
        );
        check_len(
            &mut errors,
            format!("list.{i}.amount"),
            &item.amount,
            0,
            MAX_AMOUNT_LEN,
        );
    }
    into_result(errors)
}
