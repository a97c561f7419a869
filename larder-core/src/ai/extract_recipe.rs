//! Recipe extraction from a fetched web page.

use super::prompts::recipe_extract::{
    render_recipe_extract_user_prompt, RECIPE_EXTRACT_PROMPT_NAME, RECIPE_EXTRACT_SYSTEM_PROMPT,
};
use super::response::shape_recipe_draft;
use super::{expect_payload, invoke, narrow_html, parse_completion, AiError};
use crate::llm::{ChatRequest, LlmProvider};
use crate::types::RecipeDraft;

/// Extract a recipe draft from raw page HTML.
///
/// The HTML is narrowed to its body/main region and sent whole; oversized pages
/// surface as `LlmError::InputTooLarge`. The returned draft has an empty `link`
/// and may still contain repeated ingredient names.
pub async fn extract_recipe(llm: &dyn LlmProvider, html: &str) -> Result<RecipeDraft, AiError> {
    let narrowed = narrow_html(html);
    tracing::debug!(
        html_chars = html.len(),
        narrowed_chars = narrowed.len(),
        "narrowed page"
    );

    let request = ChatRequest {
        json_response: true,
        ..ChatRequest::with_system(
            RECIPE_EXTRACT_SYSTEM_PROMPT,
            render_recipe_extract_user_prompt(narrowed),
        )
    };

    let raw = invoke(llm, RECIPE_EXTRACT_PROMPT_NAME, request).await?;
    let payload = expect_payload(parse_completion(&raw)?)?;
    let draft = shape_recipe_draft(&payload)?;

    tracing::debug!(
        name = %draft.name,
        ingredients = draft.ingredients.len(),
        "extracted recipe"
    );
    Ok(draft)
}
