//! Grouping recipes into meal-plan blocks.

use super::prompts::block_cluster::{
    render_block_cluster_user_prompt, BLOCK_CLUSTER_PROMPT_NAME, BLOCK_CLUSTER_SYSTEM_PROMPT,
    INSUFFICIENT_GROUPS_CODE,
};
use super::response::shape_block_plan;
use super::{invoke, parse_completion, AiError, Completion};
use crate::llm::{ChatRequest, LlmProvider};
use crate::types::{BlockPlanDraft, RecipeSummary};

/// Ask the model to cluster `recipes` by ingredient similarity.
///
/// Soft-error code `0001` becomes [`AiError::InsufficientGroups`]; any other
/// code is reported as [`AiError::SoftError`].
pub async fn cluster_recipes(
    llm: &dyn LlmProvider,
    recipes: &[RecipeSummary],
) -> Result<BlockPlanDraft, AiError> {
    let request = ChatRequest {
        json_response: true,
        ..ChatRequest::with_system(
            BLOCK_CLUSTER_SYSTEM_PROMPT,
            render_block_cluster_user_prompt(recipes),
        )
    };

    let raw = invoke(llm, BLOCK_CLUSTER_PROMPT_NAME, request).await?;

    let payload = match parse_completion(&raw)? {
        Completion::Payload(value) => value,
        Completion::SoftError { code, message } if code == INSUFFICIENT_GROUPS_CODE => {
            tracing::info!(%message, "model could not form groups");
            return Err(AiError::InsufficientGroups(message));
        }
        Completion::SoftError { code, message } => {
            tracing::warn!(%code, %message, "unknown soft error from clustering");
            return Err(AiError::SoftError { code, message });
        }
    };

    let plan = shape_block_plan(&payload)?;
    tracing::debug!(
        blocks = plan.blocks.len(),
        unused = plan.unused.len(),
        "clustered recipes"
    );
    Ok(plan)
}
