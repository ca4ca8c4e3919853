//! PaperForge CLI: the main entry point.
//!
//! Commands:
//! - `init`      Write a starter config file
//! - `serve`     Start the HTTP gateway
//! - `generate`  Generate one paper to stdout
//! - `ingest`    Embed and upsert past-paper questions
//! - `chapters`  List the syllabus
//! - `doctor`    Diagnose configuration and connectivity

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "paperforge",
    about = "PaperForge: CBSE Class 10 Science question papers grounded in past papers",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config directory and a starter config file
    Init,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate a single paper and print it
    Generate {
        /// Restrict to a chapter (repeatable)
        #[arg(short, long = "chapter")]
        chapters: Vec<String>,

        /// easy, balanced or hard
        #[arg(short, long)]
        difficulty: Option<String>,

        #[arg(long)]
        max_marks: Option<f64>,

        /// Duration in minutes
        #[arg(long)]
        duration: Option<f64>,

        /// Extra instructions for the model
        #[arg(short, long)]
        prompt: Option<String>,

        /// Print the composed prompt instead of calling the model
        #[arg(long)]
        dry_run: bool,
    },

    /// Embed past-paper questions from a JSON file and upsert them
    Ingest {
        /// Path to the JSON file
        path: PathBuf,

        #[arg(long)]
        namespace: Option<String>,

        /// Items per embedding batch
        #[arg(long)]
        batch: Option<usize>,

        #[arg(long)]
        embedding_model: Option<String>,

        /// Generate embeddings but do not upsert
        #[arg(long)]
        dry_run: bool,
    },

    /// List syllabus chapters and topics
    Chapters,

    /// Diagnose configuration and connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run()?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Generate {
            chapters,
            difficulty,
            max_marks,
            duration,
            prompt,
            dry_run,
        } => {
            let args = commands::generate::GenerateArgs {
                chapters,
                difficulty,
                max_marks,
                duration,
                prompt,
                dry_run,
            };
            commands::generate::run(args).await?
        }
        Commands::Ingest {
            path,
            namespace,
            batch,
            embedding_model,
            dry_run,
        } => {
            let args = commands::ingest::IngestArgs {
                path,
                namespace,
                batch,
                embedding_model,
                dry_run,
            };
            commands::ingest::run(args).await?
        }
        Commands::Chapters => commands::chapters::run()?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
