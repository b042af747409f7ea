//! Externally supplied locations: stores, base corpus, model directory.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base corpus file (.hcc).
    pub base_corpus: PathBuf,
    /// Model artifact directory.
    pub model_dir: PathBuf,
    /// Feedback store directory (images + records.jsonl).
    pub feedback_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Config {
            base_corpus: cwd.join("data").join("base_corpus.hcc"),
            model_dir: cwd.join("model"),
            feedback_dir: cwd.join("feedback_data"),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Load from a file when given one, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, StoreError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Config::default()),
        }
    }
}
