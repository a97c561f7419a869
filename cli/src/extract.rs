use anyhow::{Context, Result};
use larder_core::{reconcile, FetchClient, HttpClient};
use std::fs;
use std::path::Path;

/// Extract a recipe draft and print it as JSON.
/// The link is set and ingredients deduplicated, exactly as an import would.
pub async fn extract(url: &str, file: Option<&Path>) -> Result<()> {
    let html = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read HTML file: {}", path.display()))?,
        None => FetchClient::from_env()?
            .fetch_html(url)
            .await
            .with_context(|| format!("Failed to fetch {}", url))?,
    };

    let llm = larder_core::create_provider_from_env()?;
    let mut draft = larder_core::ai::extract_recipe(llm.as_ref(), &html)
        .await
        .map_err(|e| super::report_ai_error("extract", e))?;

    draft.link = url.to_string();
    draft.ingredients = reconcile::dedup_ingredients(draft.ingredients);

    println!("{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}
