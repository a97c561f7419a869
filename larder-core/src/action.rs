//! The structured result handed back to callers of every pipeline operation.

use serde::{Deserialize, Serialize};

use crate::error::{ActionMessage, ErrorKind, FieldError, PipelineError};

/// Outcome of one user action.
///
/// On success `data` carries the payload and `message` an optional confirmation.
/// On failure `error_kind` classifies the failure, `message` explains it in user
/// terms, and `errors` lists field problems for validation failures only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ActionResult<T> {
    pub successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ActionMessage>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ActionResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            successful: true,
            message: None,
            errors: Vec::new(),
            error_kind: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, title: &str, description: &str) -> Self {
        self.message = Some(ActionMessage::new(title, description));
        self
    }

    pub fn failure(error: PipelineError) -> Self {
        Self {
            successful: false,
            message: Some(error.user_message()),
            errors: error.field_errors,
            error_kind: Some(error.kind),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.successful
    }
}

impl<T> From<PipelineError> for ActionResult<T> {
    fn from(error: PipelineError) -> Self {
        Self::failure(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;

    #[test]
    fn failure_carries_kind_and_user_message() {
        let err = PipelineError::new(
            Operation::ImportRecipe,
            ErrorKind::DuplicateImport,
            "link exists",
        );
        let result: ActionResult<()> = err.into();

        assert!(!result.successful);
        assert_eq!(result.error_kind, Some(ErrorKind::DuplicateImport));
        assert_eq!(
            result.message.unwrap().description,
            "The recipe has already been imported."
        );
        assert!(result.data.is_none());
    }

    #[test]
    fn success_omits_error_fields_when_serialized() {
        let result = ActionResult::success(vec![1, 2]).with_message("Done", "All good");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["successful"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("error_kind").is_none());
        assert_eq!(json["errors"], serde_json::json!([]));
    }
}
