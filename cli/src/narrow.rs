use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Print the narrowed HTML of a file; sizes go to stderr.
pub fn narrow(file: &Path) -> Result<()> {
    let html = fs::read_to_string(file)
        .with_context(|| format!("Failed to read HTML file: {}", file.display()))?;

    let narrowed = larder_core::ai::narrow_html(&html);
    eprintln!("{} -> {} bytes", html.len(), narrowed.len());
    println!("{}", narrowed);
    Ok(())
}
