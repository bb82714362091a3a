//! `copiloto serve` — Start the HTTP API server.

use copiloto_config::AppConfig;

pub async fn run(
    port_override: Option<u16>,
    host_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }
    if let Some(host) = host_override {
        config.gateway.host = host;
    }

    println!("Copiloto API");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Database:  {}", config.database.url);
    println!(
        "   Model:     {}",
        if config.model.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            config.model.model_id.as_str()
        } else {
            "canned (developer mode, no API key)"
        }
    );

    copiloto_gateway::start(config).await?;

    Ok(())
}
