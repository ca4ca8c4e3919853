//! `paperforge serve`: start the HTTP API server.

use paperforge_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("📝 PaperForge Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.openai.model);
    println!("   Namespace: {}", config.pinecone.namespace);

    paperforge_gateway::start(config).await?;

    Ok(())
}
