//! AI prompt templates.
//!
//! Every task sends a fixed system prompt plus a user message built from data.
//! All system prompts demand bare JSON: no markdown fencing, no prose.

pub mod block_cluster;
pub mod recipe_extract;
pub mod shopping_list;

pub use block_cluster::{render_block_cluster_user_prompt, BLOCK_CLUSTER_PROMPT_NAME};
pub use recipe_extract::{render_recipe_extract_user_prompt, RECIPE_EXTRACT_PROMPT_NAME};
pub use shopping_list::{render_shopping_list_user_prompt, SHOPPING_LIST_PROMPT_NAME};

/// Separator between list entries in user prompts.
pub(crate) const LIST_SEPARATOR: &str = "\r\n- ";
