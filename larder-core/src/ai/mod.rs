//! AI tasks: recipe extraction, block clustering and shopping-list consolidation.
//!
//! Each task builds its prompt pair, makes exactly one model call through
//! [`invoke`], and shapes the reply into a typed draft. Tasks never touch
//! persisted state; the pipeline feeds them records and reconciles their output.

mod cluster_blocks;
mod extract_recipe;
mod invoke;
mod narrow;
pub mod prompts;
pub mod response;
mod shopping_list;

pub use cluster_blocks::cluster_recipes;
pub use extract_recipe::extract_recipe;
pub use invoke::invoke;
pub use narrow::narrow_html;
pub use response::{parse_completion, Completion, ResponseError};
pub use shopping_list::consolidate_shopping_list;

use thiserror::Error;

use crate::error::ErrorKind;
use crate::llm::LlmError;

/// Failure of an AI task.
#[derive(Error, Debug, Clone)]
pub enum AiError {
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("malformed model response: {0}")]
    Malformed(#[from] ResponseError),

    #[error("model could not form enough groups: {0}")]
    InsufficientGroups(String),

    #[error("model reported error {code}: {message}")]
    SoftError { code: String, message: String },
}

impl AiError {
    /// The failure class this error resolves to at the pipeline boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AiError::Llm(e) if e.is_input_too_large() => ErrorKind::InputTooLarge,
            AiError::Llm(_) => ErrorKind::ModelUnavailable,
            AiError::Malformed(_) => ErrorKind::MalformedResponse,
            AiError::InsufficientGroups(_) => ErrorKind::InsufficientGroupingMaterial,
            AiError::SoftError { .. } => ErrorKind::ModelUnavailable,
        }
    }
}

/// Unwrap a payload, treating any soft error as an unknown code.
pub(crate) fn expect_payload(completion: Completion) -> Result<serde_json::Value, AiError> {
    match completion {
        Completion::Payload(value) => Ok(value),
        Completion::SoftError { code, message } => Err(AiError::SoftError { code, message }),
    }
}
