use anyhow::{Context, Result};
use larder_core::RecipeSummary;
use std::fs;
use std::path::Path;

pub async fn cluster(recipes_file: &Path) -> Result<()> {
    let content = fs::read_to_string(recipes_file)
        .with_context(|| format!("Failed to read {}", recipes_file.display()))?;
    let recipes: Vec<RecipeSummary> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", recipes_file.display()))?;

    if recipes.is_empty() {
        anyhow::bail!("No recipes to cluster");
    }

    let llm = larder_core::create_provider_from_env()?;
    let plan = larder_core::ai::cluster_recipes(llm.as_ref(), &recipes)
        .await
        .map_err(|e| super::report_ai_error("cluster", e))?;

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
