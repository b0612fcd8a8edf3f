//! Integration tests for the resource handlers.
//!
//! Requests go through `handlers::dispatch` with a test `ServerConfig`
//! pointing at a temporary project.

mod common;

use std::path::PathBuf;
use std::time::Duration;

use common::Project;
use project_context_server::compliance::FeatureId;
use project_context_server::config::ServerConfig;
use project_context_server::handlers::{self, AppState};
use project_context_server::protocol::{JsonRpcRequest, JsonRpcResponse, RpcId};
use project_context_server::section::{extract, Criticality, Status};
use project_context_server::session::{noop_progress, ProgressCollector};

fn test_state(root: Option<PathBuf>) -> AppState {
    AppState::new(ServerConfig {
        project_root: root,
        content_dir: None,
        provider_timeout: Duration::from_secs(10),
        scope_working_directory: false,
    })
}

fn request(id: i64, method: &str, params: Option<serde_json::Value>) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Number(id)),
        method: method.into(),
        params,
    }
}

async fn read(state: &AppState, uri: &str) -> JsonRpcResponse {
    let req = request(7, "resources/read", Some(serde_json::json!({ "uri": uri })));
    handlers::dispatch(&req, state, noop_progress()).await.unwrap()
}

fn text_of(response: &JsonRpcResponse) -> String {
    let result = response.result.as_ref().expect("expected a successful response");
    result["contents"][0]["text"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Protocol basics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initialize_advertises_resources() {
    let state = test_state(None);
    let req = request(
        1,
        "initialize",
        Some(serde_json::json!({
            "protocolVersion": "2024-11-05",
            "clientInfo": { "name": "test-client", "version": "0.1" }
        })),
    );

    let response = handlers::dispatch(&req, &state, noop_progress()).await.unwrap();
    let result = response.result.unwrap();
    assert!(result["capabilities"]["resources"].is_object());
    assert_eq!(result["serverInfo"]["name"], "project-context-server");
}

#[tokio::test]
async fn initialized_notification_gets_no_response() {
    let state = test_state(None);
    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: None,
        method: "notifications/initialized".into(),
        params: None,
    };
    assert!(handlers::dispatch(&req, &state, noop_progress()).await.is_none());
}

#[tokio::test]
async fn unknown_method_is_rejected() {
    let state = test_state(None);
    let response = handlers::dispatch(&request(3, "tools/list", None), &state, noop_progress())
        .await
        .unwrap();
    assert_eq!(response.error.unwrap().code, -32601);
}

#[tokio::test]
async fn resources_list_has_concrete_keys_and_session() {
    let state = test_state(None);
    let response = handlers::dispatch(&request(2, "resources/list", None), &state, noop_progress())
        .await
        .unwrap();

    let result = response.result.unwrap();
    let uris: Vec<&str> = result["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["uri"].as_str().unwrap())
        .collect();

    assert!(uris.contains(&"context://rule/all"));
    assert!(uris.contains(&"context://project/gitignore-compliance"));
    assert!(uris.contains(&"context://project/gitignore-files"));
    assert_eq!(uris.last(), Some(&"context://session/init-context"));
    assert!(uris.iter().all(|uri| !uri.contains('{')));
    assert_eq!(uris.len(), 9);
}

#[tokio::test]
async fn templates_list_has_parameterized_keys() {
    let state = test_state(None);
    let response = handlers::dispatch(&request(2, "resources/templates/list", None), &state, noop_progress())
        .await
        .unwrap();

    let result = response.result.unwrap();
    let templates: Vec<&str> = result["resourceTemplates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["uriTemplate"].as_str().unwrap())
        .collect();
    assert_eq!(
        templates,
        vec!["context://rule/{name}", "context://workflow/{name}", "context://knowledge/{name}", "context://task/{name}"]
    );
}

// ---------------------------------------------------------------------------
// resources/read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn read_single_rule() {
    let project = Project::baseline();
    project.add_rule("testing", "# Testing\n\nRun everything.\n");
    let state = test_state(Some(project.root().to_path_buf()));

    let response = read(&state, "context://rule/testing").await;
    assert_eq!(response.result.as_ref().unwrap()["contents"][0]["uri"], "context://rule/testing");

    let sections = extract(&text_of(&response)).unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].criticality(), Criticality::Critical);
    assert_eq!(sections[0].header("X-Name"), Some("testing"));
    assert_eq!(sections[0].content(), "# Testing\n\nRun everything.\n");
}

#[tokio::test]
async fn bare_keys_are_accepted() {
    let project = Project::baseline();
    project.add_workflow("deploy", "steps");
    let state = test_state(Some(project.root().to_path_buf()));

    let sections = extract(&text_of(&read(&state, "workflow/all").await)).unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].location().as_str(), ".context/workflows/deploy.md");
}

#[tokio::test]
async fn compliant_project_compliance_body_is_empty() {
    let project = Project::baseline();
    let state = test_state(Some(project.root().to_path_buf()));

    assert_eq!(text_of(&read(&state, "context://project/gitignore-compliance").await), "");
}

#[tokio::test]
async fn non_compliant_project_gets_diagnostic() {
    let project = Project::baseline();
    project.add_task("ship", "todo");
    let state = test_state(Some(project.root().to_path_buf()));

    let sections = extract(&text_of(&read(&state, "context://project/gitignore-compliance").await)).unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].status(), Status::DIAGNOSTIC);
    assert!(sections[0].writable());

    project.satisfy(FeatureId::Tasks);
    assert_eq!(text_of(&read(&state, "context://project/gitignore-compliance").await), "");
}

#[tokio::test]
async fn gitignore_files_are_returned_raw() {
    let project = Project::baseline();
    project.append(".gitignore", "target/\n");
    let state = test_state(Some(project.root().to_path_buf()));

    let sections = extract(&text_of(&read(&state, "context://project/gitignore-files").await)).unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].location().as_str(), ".gitignore");
    assert_eq!(sections[0].content_type(), "text/plain");
    assert_eq!(sections[0].content(), project.read(".gitignore"));
}

#[tokio::test]
async fn unknown_resource_is_not_found() {
    let project = Project::baseline();
    let state = test_state(Some(project.root().to_path_buf()));

    let error = read(&state, "context://bogus/thing").await.error.unwrap();
    assert_eq!(error.code, -32002);
    assert_eq!(error.data.unwrap()["error"]["code"], "resource_not_found");
}

#[tokio::test]
async fn missing_named_rule_is_not_found() {
    let project = Project::baseline();
    let state = test_state(Some(project.root().to_path_buf()));

    let error = read(&state, "context://rule/nope").await.error.unwrap();
    assert_eq!(error.code, -32002);
}

#[tokio::test]
async fn missing_knowledge_base_is_not_found() {
    let project = Project::baseline();
    let state = test_state(Some(project.root().to_path_buf()));

    let error = read(&state, "context://knowledge/api").await.error.unwrap();
    assert_eq!(error.code, -32002);
}

#[tokio::test]
async fn unreadable_knowledge_directory_is_a_provider_failure() {
    let project = Project::baseline();
    // `.context/knowledge` is a file, so stat on a base below it fails with ENOTDIR.
    project.write(".context/knowledge", "not a directory");
    let state = test_state(Some(project.root().to_path_buf()));

    let error = read(&state, "context://knowledge/api").await.error.unwrap();
    assert_eq!(error.code, -32603);
    assert_eq!(error.data.unwrap()["error"]["code"], "provider_failed");
}

#[tokio::test]
async fn malformed_key_is_invalid_params() {
    let state = test_state(None);
    for uri in ["context://rule", "context://rule/..", "context://a/b/c", ""] {
        let error = read(&state, uri).await.error.unwrap();
        assert_eq!(error.code, -32602, "uri {uri:?}");
        assert_eq!(error.data.unwrap()["error"]["code"], "invalid_key");
    }
}

#[tokio::test]
async fn missing_params_are_invalid_params() {
    let state = test_state(None);
    let response = handlers::dispatch(&request(4, "resources/read", None), &state, noop_progress())
        .await
        .unwrap();
    assert_eq!(response.error.unwrap().code, -32602);
}

#[tokio::test]
async fn missing_project_root_yields_setup_guidance() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(Some(tmp.path().join("does-not-exist")));

    let sections = extract(&text_of(&read(&state, "context://rule/all").await)).unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].status(), Status::SETUP_REQUIRED);
    assert_eq!(sections[0].criticality(), Criticality::Critical);
    assert_eq!(sections[0].header("X-Setup-Required"), Some("true"));
    assert!(sections[0].content().contains(".context"));
}

#[tokio::test]
async fn session_read_aggregates_and_reports_progress() {
    let project = Project::baseline();
    project.add_rule("core", "# Core\n");
    let state = test_state(Some(project.root().to_path_buf()));
    let progress = ProgressCollector::default();

    let req = request(9, "resources/read", Some(serde_json::json!({ "uri": "context://session/init-context" })));
    let response = handlers::dispatch(&req, &state, &progress).await.unwrap();

    let sections = extract(&text_of(&response)).unwrap();
    assert_eq!(sections[0].header("X-Name"), Some("core"));
    assert!(sections.iter().all(|s| !s.status().is_error()));

    let events = progress.take();
    assert_eq!(events.len(), 7);
    assert_eq!(events.last().map(|e| (e.completed, e.total)), Some((7, 7)));
}
