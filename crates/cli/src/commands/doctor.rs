//! `copiloto doctor` — Diagnose configuration and database health.

use copiloto_config::AppConfig;
use copiloto_store::Store;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Copiloto Doctor");
    println!("===============\n");

    let mut problems = 0usize;

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("✅ Configuration loads and validates");
            Some(config)
        }
        Err(e) => {
            println!("❌ Configuration error: {e}");
            problems += 1;
            None
        }
    };

    if let Some(config) = &config {
        match Store::new(&config.database.url).await {
            Ok(_) => println!("✅ Database reachable: {}", config.database.url),
            Err(e) => {
                println!("❌ Database error: {e}");
                problems += 1;
            }
        }

        if config.model.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            println!("✅ Model API key configured ({})", config.model.model_id);
        } else {
            println!("⚠️  No API key — the copilot will answer with canned responses");
        }

        if config.auth.jwt_secret == "dev-secret-change-me" {
            println!("⚠️  JWT secret is the development default; set COPILOTO_JWT_SECRET");
        }
    }

    println!();
    if problems == 0 {
        println!("All checks passed.");
    } else {
        println!("{problems} problem(s) found.");
    }

    Ok(())
}
