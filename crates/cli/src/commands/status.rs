//! `copiloto status` — Show resolved configuration.

use copiloto_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let config_path = AppConfig::config_dir().join("config.toml");

    println!("Copiloto Status");
    println!("===============\n");

    println!("Config file: {}", config_path.display());
    println!(
        "  (present: {})",
        if config_path.exists() { "yes" } else { "no — using defaults" }
    );
    println!();
    println!("Database:  {}", config.database.url);
    println!("Gateway:   {}:{}", config.gateway.host, config.gateway.port);
    println!("Model id:  {}", config.model.model_id);
    println!(
        "API key:   {}",
        if config.model.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            "configured"
        } else {
            "not set (canned responses)"
        }
    );
    println!("Token TTL: {}h", config.auth.token_ttl_hours);

    Ok(())
}
