//! `paperforge doctor`: diagnose configuration and connectivity.

use paperforge_config::AppConfig;
use paperforge_engine::SyllabusRegistry;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 PaperForge Doctor");
    println!("====================\n");

    let mut issues = 0;

    match SyllabusRegistry::class10_science() {
        Ok(registry) => println!("  ✅ Syllabus loaded ({} chapters)", registry.len()),
        Err(e) => {
            println!("  ❌ Syllabus dataset invalid: {e}");
            issues += 1;
        }
    }

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file (using defaults and environment), run `paperforge init`");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  {} issue(s) found.", issues + 1);
            return Ok(());
        }
    };

    match paperforge_providers::build_from_config(&config) {
        Ok(provider) => {
            println!("  ✅ OpenAI API key configured (model: {})", config.openai.model);
            match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider reachable: {}", config.openai.api_url),
                Ok(false) => {
                    println!("  ❌ Provider rejected the request: {}", config.openai.api_url);
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider unreachable: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    match config.require_pinecone() {
        Ok(credentials) => println!(
            "  ✅ Pinecone configured (index: {}, namespace: {})",
            credentials.index_name, config.pinecone.namespace
        ),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
