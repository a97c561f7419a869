//! Golden file tests for shaping raw model output.
//!
//! Each JSON file in `fixtures/responses/` holds one raw completion and what it
//! should shape into: a serialized draft, a soft-error code, or a malformed
//! response.

use std::fs;
use std::path::{Path, PathBuf};

use larder_core::ai::response::{
    shape_block_plan, shape_recipe_draft, shape_shopping_list, ResponseError,
};
use larder_core::ai::{parse_completion, Completion};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Task {
    Recipe,
    BlockPlan,
    ShoppingList,
}

#[derive(Debug, Deserialize)]
struct TestCase {
    task: Task,
    /// Completion text exactly as the model returned it.
    raw: String,
    #[serde(default)]
    expected: Option<Value>,
    #[serde(default)]
    expected_soft_error: Option<String>,
    #[serde(default)]
    malformed: bool,
}

enum Outcome {
    Shaped(Value),
    SoftError(String),
    Malformed(ResponseError),
}

fn fixture_paths() -> Vec<PathBuf> {
    let pattern = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/responses/*.json")
        .to_string_lossy()
        .into_owned();
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .expect("Invalid fixture pattern")
        .map(|entry| entry.expect("Failed to read fixture path"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "No fixtures match {pattern}");
    paths
}

fn run(case: &TestCase) -> Outcome {
    let payload = match parse_completion(&case.raw) {
        Ok(Completion::Payload(value)) => value,
        Ok(Completion::SoftError { code, .. }) => return Outcome::SoftError(code),
        Err(e) => return Outcome::Malformed(e),
    };

    let shaped = match case.task {
        Task::Recipe => shape_recipe_draft(&payload).map(|d| serde_json::to_value(d).unwrap()),
        Task::BlockPlan => shape_block_plan(&payload).map(|p| serde_json::to_value(p).unwrap()),
        Task::ShoppingList => {
            shape_shopping_list(&payload).map(|l| serde_json::to_value(l).unwrap())
        }
    };

    match shaped {
        Ok(value) => Outcome::Shaped(value),
        Err(e) => Outcome::Malformed(e),
    }
}

#[test]
fn test_response_golden_files() {
    for path in fixture_paths() {
        let name = path.file_stem().unwrap().to_string_lossy().into_owned();
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        let case: TestCase = serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));

        println!("Testing: {}", name);

        match run(&case) {
            Outcome::Shaped(actual) => {
                let expected = case
                    .expected
                    .as_ref()
                    .unwrap_or_else(|| panic!("{name}: shaped unexpectedly into {actual}"));
                assert_eq!(&actual, expected, "{name}: shaped output differs");
            }
            Outcome::SoftError(code) => {
                assert_eq!(
                    case.expected_soft_error.as_deref(),
                    Some(code.as_str()),
                    "{name}: unexpected soft error"
                );
            }
            Outcome::Malformed(e) => {
                assert!(case.malformed, "{name}: unexpectedly malformed: {e}");
            }
        }
    }
}
