//! Consolidating a block's ingredients into a shopping list.

use super::prompts::shopping_list::{
    render_shopping_list_user_prompt, SHOPPING_LIST_PROMPT_NAME, SHOPPING_LIST_SYSTEM_PROMPT,
};
use super::response::shape_shopping_list;
use super::{expect_payload, invoke, parse_completion, AiError};
use crate::llm::{ChatRequest, LlmProvider};
use crate::types::{BlockIngredient, ShoppingListItemDraft};

/// Ask the model to merge `items` into one shopping list.
///
/// The reply is a bare JSON array, so the request does not use the provider's
/// JSON-object mode. Coverage of the inputs is checked by the caller.
pub async fn consolidate_shopping_list(
    llm: &dyn LlmProvider,
    items: &[BlockIngredient],
) -> Result<Vec<ShoppingListItemDraft>, AiError> {
    let request = ChatRequest::with_system(
        SHOPPING_LIST_SYSTEM_PROMPT,
        render_shopping_list_user_prompt(items),
    );

    let raw = invoke(llm, SHOPPING_LIST_PROMPT_NAME, request).await?;
    let payload = expect_payload(parse_completion(&raw)?)?;
    let list = shape_shopping_list(&payload)?;

    tracing::debug!(
        inputs = items.len(),
        outputs = list.len(),
        "consolidated shopping list"
    );
    Ok(list)
}
