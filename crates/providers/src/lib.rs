//! LLM Provider implementations for PaperForge.
//!
//! All providers implement the `paperforge_core::Provider` trait.
//! `build_from_config` constructs the process-wide handle once at startup.

pub mod openai_compat;

use std::sync::Arc;

use paperforge_config::{AppConfig, ConfigError};
use paperforge_core::provider::Provider;

pub use openai_compat::OpenAiCompatProvider;

/// Build the LLM provider described by the configuration.
///
/// Fails when no API key is configured.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ConfigError> {
    let api_key = config.require_openai_key()?;
    let provider = OpenAiCompatProvider::new("openai", &config.openai.api_url, api_key);
    Ok(Arc::new(provider))
}
