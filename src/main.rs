use project_context_server::config::ServerConfig;
use project_context_server::server::McpServer;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr; stdout carries the protocol.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("project_context_server=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let mut server = McpServer::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}
