//! A single traced model call.

use tracing::Instrument;

use crate::llm::{ChatRequest, LlmError, LlmProvider};

/// Send `request` to the model and return the completion text.
///
/// Runs inside an `llm_call` span carrying the prompt name, provider and model.
pub async fn invoke(
    llm: &dyn LlmProvider,
    prompt_name: &'static str,
    request: ChatRequest,
) -> Result<String, LlmError> {
    let span = tracing::info_span!(
        "llm_call",
        prompt_name,
        provider = llm.provider_name(),
        model = llm.model_name(),
    );

    async {
        let prompt_chars: usize = request.messages.iter().map(|m| m.content.len()).sum();
        tracing::debug!(prompt_chars, "sending prompt");

        match llm.complete(&request).await {
            Ok(response) => {
                tracing::debug!(
                    prompt_tokens = response.usage.prompt_tokens,
                    completion_tokens = response.usage.completion_tokens,
                    total_tokens = response.usage.total_tokens,
                    "completion received"
                );
                Ok(response.content)
            }
            Err(e) => {
                tracing::warn!(error = %e, "model call failed");
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}
