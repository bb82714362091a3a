//! `copiloto onboard` — First-time setup.

use copiloto_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("Copiloto — Configuración inicial");
    println!("================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if !config_path.exists() {
        let default_config = toml::to_string_pretty(&AppConfig::default())?;
        std::fs::write(&config_path, default_config)?;
        println!("✅ Created config file: {}", config_path.display());
        println!("\nNext steps:");
        println!("  1. Set your API key:  export ANTHROPIC_API_KEY=sk-ant-...");
        println!("     (without a key the copilot answers in developer mode)");
        println!("  2. Start the server:  copiloto serve");
    } else {
        println!("  Config file exists: {}", config_path.display());
    }

    Ok(())
}
