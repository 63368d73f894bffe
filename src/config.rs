//! Environment-driven configuration.
//!
//! Endpoint, model identifiers and the credential are configuration, not part
//! of the contract logic. Values come from the environment (with `.env`
//! support via dotenvy); a missing credential is a normal state and routes
//! every parse through the local fallback.

use std::path::PathBuf;

use anyhow::Result;

use crate::glm::DEFAULT_ENDPOINT;

/// Default chat model for expense extraction.
pub const DEFAULT_PARSE_MODEL: &str = "glm-5";

/// Default vision model for image text recognition.
pub const DEFAULT_OCR_MODEL: &str = "glm-ocr";

/// Default retention for raw-input provenance rows, in days.
pub const DEFAULT_RAW_RETENTION_DAYS: u32 = 30;

/// Runtime settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    api_key: String,
    endpoint: String,
    parse_model: String,
    ocr_model: String,
    raw_retention_days: u32,
}

impl Settings {
    /// Loads settings from the environment, reading a `.env` file first when
    /// one exists.
    ///
    /// Recognized variables: `ZHIPU_API_KEY`, `GLM_ENDPOINT`,
    /// `GLM_PARSE_MODEL`, `GLM_OCR_MODEL`, `RAW_RETENTION_DAYS`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let api_key = std::env::var("ZHIPU_API_KEY")
            .unwrap_or_default()
            .trim()
            .to_string();
        let endpoint =
            std::env::var("GLM_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let parse_model =
            std::env::var("GLM_PARSE_MODEL").unwrap_or_else(|_| DEFAULT_PARSE_MODEL.to_string());
        let ocr_model =
            std::env::var("GLM_OCR_MODEL").unwrap_or_else(|_| DEFAULT_OCR_MODEL.to_string());
        let raw_retention_days = std::env::var("RAW_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RAW_RETENTION_DAYS)
            .max(1);

        Self {
            api_key,
            endpoint,
            parse_model,
            ocr_model,
            raw_retention_days,
        }
    }

    /// Returns true when a credential is configured; without one the remote
    /// extractor and the OCR adapter are unavailable.
    pub fn has_credential(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn parse_model(&self) -> &str {
        &self.parse_model
    }

    pub fn ocr_model(&self) -> &str {
        &self.ocr_model
    }

    /// Retention window for raw-input provenance, clamped to at least one day.
    pub fn raw_retention_days(&self) -> u32 {
        self.raw_retention_days
    }
}

/// Gets the cross-platform database path.
///
/// Returns the path as `{data_dir}/spendlog/expenses.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn database_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("spendlog").join("expenses.db"))
}
