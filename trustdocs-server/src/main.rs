use clap::Parser;
use trustdocs_server::{ServerConfig, run_server, telemetry::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::parse();
    init_tracing(config.log_json);

    run_server(config).await
}
