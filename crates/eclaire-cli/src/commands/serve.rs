//! Web server command

use anyhow::Result;

use eclaire_core::AnalysisEngine;
use eclaire_server::ServerConfig;

pub async fn cmd_serve(
    engine: AnalysisEngine,
    host: &str,
    port: u16,
    cache_size: Option<usize>,
) -> Result<()> {
    let mut config = ServerConfig::from_env();
    if let Some(capacity) = cache_size {
        config.cache_capacity = capacity;
    }

    println!("🚀 Starting Eclaire web server...");
    println!("   URL: http://{}:{}/api", host, port);
    println!("   Rules: {}", engine.rules().len());
    if config.cache_capacity == 0 {
        println!("   Cache: disabled");
    } else {
        println!("   Cache: {} results", config.cache_capacity);
    }
    if !config.allowed_origins.is_empty() {
        println!("   CORS: {}", config.allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");
    println!();

    eclaire_server::serve_with_config(engine, host, port, config).await
}
