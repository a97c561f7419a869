use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL host not allowed: {0}")]
    HostNotAllowed(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
}

/// Failure classes every pipeline operation resolves to.
///
/// Nothing else crosses the pipeline boundary: transport errors, JSON errors and
/// database errors are all mapped onto one of these before reaching the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The model endpoint rejected the prompt for exceeding its context window.
    InputTooLarge,
    /// The model reported it could not form the requested clusters.
    InsufficientGroupingMaterial,
    /// A recipe with the same source link already exists for the user.
    DuplicateImport,
    /// The model output was not JSON or did not have the expected shape.
    MalformedResponse,
    /// Any other model failure, including unknown soft-error codes.
    ModelUnavailable,
    /// The reconciled draft could not be written.
    PersistenceFailure,
    /// Caller-supplied input failed field validation.
    Validation,
    /// The source page could not be downloaded.
    FetchFailed,
    /// The target recipe or block does not exist for this user.
    NotFound,
}

/// The user action a pipeline failure belongs to. Selects the wording shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ImportRecipe,
    CompleteRecipeImport,
    GenerateBlocks,
    CompleteBlocksImport,
    GenerateShoppingList,
    LoadShoppingList,
    FindIngredients,
    FindRecipes,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ImportRecipe => "import_recipe",
            Operation::CompleteRecipeImport => "complete_recipe_import",
            Operation::GenerateBlocks => "generate_blocks",
            Operation::CompleteBlocksImport => "complete_blocks_import",
            Operation::GenerateShoppingList => "generate_shopping_list",
            Operation::LoadShoppingList => "load_shopping_list",
            Operation::FindIngredients => "find_ingredients",
            Operation::FindRecipes => "find_recipes",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single invalid field in caller-supplied input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    pub field_name: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
        }
    }
}

/// Title and description suitable for showing to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ActionMessage {
    pub title: String,
    pub description: String,
}

impl ActionMessage {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// A classified pipeline failure.
#[derive(Error, Debug, Clone)]
#[error("{operation} failed ({kind:?}): {detail}")]
pub struct PipelineError {
    pub operation: Operation,
    pub kind: ErrorKind,
    /// Diagnostic detail for logs. Never shown to the user.
    pub detail: String,
    pub field_errors: Vec<FieldError>,
}

impl PipelineError {
    pub fn new(operation: Operation, kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            detail: detail.into(),
            field_errors: Vec::new(),
        }
    }

    pub fn validation(operation: Operation, field_errors: Vec<FieldError>) -> Self {
        let detail = field_errors
            .iter()
            .map(|e| format!("{}: {}", e.field_name, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            operation,
            kind: ErrorKind::Validation,
            detail,
            field_errors,
        }
    }

    /// The message shown to the user for this failure.
    pub fn user_message(&self) -> ActionMessage {
        use ErrorKind::*;
        use Operation::*;

        let (title, description) = match (self.kind, self.operation) {
            (DuplicateImport, _) => (
                "Recipe import failed",
                "The recipe has already been imported.",
            ),
            (InputTooLarge, ImportRecipe) => (
                "Recipe import failed",
                "The AI was unable to load the recipe. The HTML was too long. Try another website!",
            ),
            (InputTooLarge, GenerateBlocks) => (
                "Block generation failed",
                "The AI was unable to generate blocks, because you have too many recipes. Please delete some recipes and try again.",
            ),
            (InputTooLarge, _) => (
                "Generation failed",
                "This block has too many ingredients for the AI to process. Remove some recipes and try again.",
            ),
            (InsufficientGroupingMaterial, _) => (
                "Block generation failed",
                "The AI was unable to generate blocks, because it couldn't create enough groups. Do you have enough recipes?",
            ),
            (FetchFailed, _) => (
                "Recipe import failed",
                "We couldn't load that page. Check the link and try again!",
            ),
            (Validation, _) => (
                "Check your input",
                "Some fields need your attention before we can continue.",
            ),
            (NotFound, ImportRecipe | CompleteRecipeImport | FindIngredients) => {
                ("Recipe not found", "That recipe could not be found.")
            }
            (NotFound, _) => ("Block not found", "That block could not be found."),
            (MalformedResponse | ModelUnavailable, ImportRecipe) => (
                "Recipe import failed",
                "The AI was unable to load the recipe. Try again!",
            ),
            (MalformedResponse | ModelUnavailable, GenerateBlocks) => (
                "AI failed",
                "The AI was unable to process your recipes. Try again!",
            ),
            (MalformedResponse | ModelUnavailable | PersistenceFailure, GenerateShoppingList) => (
                "Generation failed",
                "Generating the shopping list failed. Please try again!",
            ),
            (PersistenceFailure, CompleteRecipeImport) => (
                "Recipe creation failed",
                "The recipe could not be created. Try again!",
            ),
            (PersistenceFailure, CompleteBlocksImport) => (
                "Creation failed",
                "The plans could not be created. Try again!",
            ),
            (PersistenceFailure, LoadShoppingList) => (
                "Loading failed",
                "Loading the shopping list failed. Please try again!",
            ),
            (PersistenceFailure, FindIngredients | FindRecipes) => (
                "Search failed",
                "The search could not be completed. Try again!",
            ),
            _ => ("Something went wrong", "Please try again!"),
        };

        ActionMessage::new(title, description)
    }
}
