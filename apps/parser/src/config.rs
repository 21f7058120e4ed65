use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::extract::DocumentFormat;

const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MiB

/// Parser configuration loaded from environment variables.
/// Every option has a default, so an empty environment is valid.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Directory of per-category skill vocabulary JSON files.
    /// Falls back to the built-in default vocabulary when unset or missing.
    pub skill_vocab_dir: Option<PathBuf>,
    /// Maximum accepted input size in bytes.
    pub max_file_size: u64,
    /// Accepted document formats for file-based parsing.
    pub allowed_formats: Vec<DocumentFormat>,
    /// Gate for the optional NER-model skill strategy. The strategy is
    /// active only when this is on and a model backend was injected.
    pub enable_ner_model: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            skill_vocab_dir: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_formats: vec![
                DocumentFormat::Pdf,
                DocumentFormat::Docx,
                DocumentFormat::Txt,
            ],
            enable_ner_model: false,
        }
    }
}

impl ParserConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Self::default();

        let skill_vocab_dir = std::env::var("SKILL_VOCAB_DIR").ok().map(PathBuf::from);

        let max_file_size = match std::env::var("MAX_FILE_SIZE") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("MAX_FILE_SIZE must be a byte count")?,
            Err(_) => defaults.max_file_size,
        };

        let allowed_formats = match std::env::var("ALLOWED_FILE_TYPES") {
            Ok(raw) => parse_format_list(&raw)?,
            Err(_) => defaults.allowed_formats,
        };

        let enable_ner_model = std::env::var("ENABLE_NER_MODEL")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(ParserConfig {
            skill_vocab_dir,
            max_file_size,
            allowed_formats,
            enable_ner_model,
        })
    }
}

/// Parses a comma-separated list of extensions, with or without leading dots.
fn parse_format_list(raw: &str) -> Result<Vec<DocumentFormat>> {
    raw.split(',')
        .map(|part| part.trim().trim_start_matches('.'))
        .filter(|part| !part.is_empty())
        .map(|part| {
            DocumentFormat::from_extension(part)
                .with_context(|| format!("Unknown file type '{part}' in ALLOWED_FILE_TYPES"))
        })
        .collect()
}
