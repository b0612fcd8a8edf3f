use jsonschema::validator_for;
use serde_json::Value;

/// Frozen JSON Schema (draft 2020-12) for the structured error object carried
/// in JSON-RPC `error.data` by `resources/read` failures.
pub const RESOURCE_ERROR_SCHEMA_V0: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "Resource Error Response v0",
  "type": "object",
  "required": ["error"],
  "additionalProperties": false,
  "properties": {
    "error": {
      "type": "object",
      "required": ["code", "message"],
      "additionalProperties": false,
      "properties": {
        "code": {
          "type": "string",
          "enum": [
            "resource_not_found",
            "invalid_key",
            "provider_failed",
            "aggregation_failed",
            "internal_error"
          ]
        },
        "message": {
          "type": "string",
          "minLength": 1
        }
      }
    }
  }
}"#;

#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("Schema parse error: {0}")]
    SchemaParse(#[from] serde_json::Error),
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),
    #[error("Instance validation failed")]
    ValidationFailed,
}

/// Validate a JSON instance against a JSON Schema (draft 2020-12).
/// Returns Ok(()) if valid, Err otherwise.
pub fn validate_json(schema_str: &str, instance_str: &str) -> Result<(), SchemaValidationError> {
    let instance_json: Value = serde_json::from_str(instance_str)?;
    validate_value(schema_str, &instance_json)
}

/// Same as [`validate_json`] for an already-parsed instance.
pub fn validate_value(schema_str: &str, instance: &Value) -> Result<(), SchemaValidationError> {
    let schema_json: Value = serde_json::from_str(schema_str)?;

    let validator = validator_for(&schema_json)
        .map_err(|e| SchemaValidationError::SchemaCompile(e.to_string()))?;

    if validator.is_valid(instance) {
        Ok(())
    } else {
        Err(SchemaValidationError::ValidationFailed)
    }
}
