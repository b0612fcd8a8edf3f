//! MCP server for project context.
//!
//! Serves project rules, workflows, knowledge bases, tasks and `.gitignore`
//! compliance diagnostics as MCP resources over JSON-RPC 2.0 stdio. Resource
//! bodies are section-framed text (see [`section`]); the composite
//! `session/init-context` resource is assembled by the [`session`]
//! aggregator from independent [`providers`].

pub mod compliance;
pub mod config;
pub mod handlers;
pub mod project_root;
pub mod protocol;
pub mod providers;
pub mod section;
pub mod server;
pub mod session;

pub mod schema;
