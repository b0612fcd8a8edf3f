use project_context_server::schema::{validate_json, SchemaValidationError, RESOURCE_ERROR_SCHEMA_V0};

#[test]
fn json_schema_harness_validates_instance() {
    let instance = r#"{
      "error": {
        "code": "provider_failed",
        "message": "rules provider: I/O error on .context/rules/core.md: permission denied"
      }
    }"#;

    validate_json(RESOURCE_ERROR_SCHEMA_V0, instance).expect("schema validation failed");
}

#[test]
fn json_schema_harness_reports_failures() {
    let extra_field = r#"{ "error": { "code": "invalid_key", "message": "bad", "hint": "x" } }"#;
    assert!(matches!(
        validate_json(RESOURCE_ERROR_SCHEMA_V0, extra_field),
        Err(SchemaValidationError::ValidationFailed)
    ));

    assert!(matches!(
        validate_json(RESOURCE_ERROR_SCHEMA_V0, "{ not json"),
        Err(SchemaValidationError::SchemaParse(_))
    ));
}
