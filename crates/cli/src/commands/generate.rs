//! `paperforge generate`: one-shot paper generation.

use paperforge_config::AppConfig;
use paperforge_engine::RawPaperRequest;
use serde_json::Value;

pub struct GenerateArgs {
    pub chapters: Vec<String>,
    pub difficulty: Option<String>,
    pub max_marks: Option<f64>,
    pub duration: Option<f64>,
    pub prompt: Option<String>,
    pub dry_run: bool,
}

impl GenerateArgs {
    fn to_raw_request(&self) -> RawPaperRequest {
        RawPaperRequest {
            chapters: (!self.chapters.is_empty()).then(|| Value::from(self.chapters.clone())),
            difficulty: self.difficulty.clone().map(Value::from),
            max_marks: self.max_marks.map(Value::from),
            duration_minutes: self.duration.map(Value::from),
            prompt: self.prompt.clone().map(Value::from),
            ..RawPaperRequest::default()
        }
    }
}

pub async fn run(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let generator = paperforge_gateway::build_generator(&config).await?;
    let raw = args.to_raw_request();

    if args.dry_run {
        let prepared = generator.prepare(&raw).await?;
        eprintln!(
            "Retrieved {} snippet(s) from {} match(es)\n",
            prepared.retrieved.snippets.len(),
            prepared.retrieved.matches.len()
        );
        println!("=== SYSTEM ===\n{}\n", prepared.prompt.system);
        println!("=== USER ===\n{}", prepared.prompt.user);
        return Ok(());
    }

    let result = generator.generate(&raw).await?;
    println!("{}", result.paper_text);
    eprintln!(
        "\nModel: {} | Reference snippets: {}",
        result.meta.model_id, result.meta.retrieved_snippet_count
    );

    Ok(())
}
