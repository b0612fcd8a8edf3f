use jsonschema::validator_for;
use serde_json::Value;

use project_context_server::protocol::{JsonRpcError, ResourceErrorCode, ResourceErrorResponse};
use project_context_server::schema::{validate_value, RESOURCE_ERROR_SCHEMA_V0};

const ALL_CODES: [ResourceErrorCode; 5] = [
    ResourceErrorCode::ResourceNotFound,
    ResourceErrorCode::InvalidKey,
    ResourceErrorCode::ProviderFailed,
    ResourceErrorCode::AggregationFailed,
    ResourceErrorCode::InternalError,
];

#[test]
fn golden_resource_error_schema_validation() {
    // 1. Build a canonical error response
    let response = ResourceErrorResponse::canonical(ResourceErrorCode::AggregationFailed);

    let json_str = serde_json::to_string_pretty(&response).unwrap();
    let json_value: Value = serde_json::from_str(&json_str).unwrap();

    // 2. Validate against the frozen v0 schema
    let schema_json: Value = serde_json::from_str(RESOURCE_ERROR_SCHEMA_V0).unwrap();
    let validator = validator_for(&schema_json).unwrap();
    assert!(validator.is_valid(&json_value), "resource error JSON must satisfy v0 schema");

    // 3. Golden snapshot (byte-identical, stable)
    let expected = r#"{
  "error": {
    "code": "aggregation_failed",
    "message": "No content source succeeded"
  }
}"#;

    assert_eq!(json_str.trim(), expected.trim(), "resource error JSON snapshot mismatch");
}

#[test]
fn every_code_satisfies_schema_and_maps_to_json_rpc() {
    for code in ALL_CODES {
        let response = ResourceErrorResponse::canonical(code.clone());
        let value = serde_json::to_value(&response).unwrap();
        validate_value(RESOURCE_ERROR_SCHEMA_V0, &value).expect("canonical error must validate");

        let rpc: JsonRpcError = response.clone().into();
        assert_eq!(rpc.code, code.json_rpc_code());
        assert_eq!(rpc.message, response.error.message);
        assert_eq!(rpc.data, Some(value));
    }
}

#[test]
fn empty_message_is_rejected_by_schema() {
    let value = serde_json::json!({ "error": { "code": "invalid_key", "message": "" } });
    assert!(validate_value(RESOURCE_ERROR_SCHEMA_V0, &value).is_err());

    let value = serde_json::json!({ "error": { "code": "cache_missing", "message": "x" } });
    assert!(validate_value(RESOURCE_ERROR_SCHEMA_V0, &value).is_err());
}
