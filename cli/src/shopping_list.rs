use anyhow::{Context, Result};
use larder_core::{reconcile, BlockIngredient};
use std::fs;
use std::path::Path;

/// Consolidate ingredient lines and print the list.
/// Input names the model left out are logged as a warning.
pub async fn shopping_list(items_file: &Path) -> Result<()> {
    let content = fs::read_to_string(items_file)
        .with_context(|| format!("Failed to read {}", items_file.display()))?;
    let items: Vec<BlockIngredient> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", items_file.display()))?;

    let llm = larder_core::create_provider_from_env()?;
    let list = larder_core::ai::consolidate_shopping_list(llm.as_ref(), &items)
        .await
        .map_err(|e| super::report_ai_error("shopping-list", e))?;

    let missing = reconcile::missing_from_shopping_list(&items, &list);
    if !missing.is_empty() {
        tracing::warn!(?missing, "shopping list does not cover every ingredient");
    }

    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}
