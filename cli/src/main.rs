mod cluster;
mod extract;
mod narrow;
mod shopping_list;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Dry-run the Larder AI tasks without a database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the part of an HTML file that would be sent to the model
    Narrow {
        /// Path to the HTML file
        file: PathBuf,
    },
    /// Extract a recipe draft from a web page
    Extract {
        /// Page to import
        url: String,
        /// Read the HTML from this file instead of fetching the URL
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Group recipes into meal-plan blocks
    Cluster {
        /// JSON array of {"id", "name", "ingredients": [..]}
        recipes: PathBuf,
    },
    /// Consolidate ingredient lines into a shopping list
    ShoppingList {
        /// JSON array of {"name", "amount"}
        items: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Narrow { file } => narrow::narrow(&file)?,
        Commands::Extract { url, file } => extract::extract(&url, file.as_deref()).await?,
        Commands::Cluster { recipes } => cluster::cluster(&recipes).await?,
        Commands::ShoppingList { items } => shopping_list::shopping_list(&items).await?,
    }

    Ok(())
}

/// Print a failed AI task as a JSON error object and return it as an error
/// so the exit code is non-zero.
fn report_ai_error(task: &str, e: larder_core::ai::AiError) -> anyhow::Error {
    let error_json = serde_json::json!({
        "error": e.to_string(),
        "kind": e.kind(),
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(json) => println!("{}", json),
        Err(ser) => eprintln!("{}", ser),
    }
    anyhow::anyhow!("{} failed: {}", task, e)
}
