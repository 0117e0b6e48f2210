//! Import configuration.
//!
//! # Responsibility
//! - Hold the classifier phrase lists as deployment data.
//! - Load overrides from TOML files.
//!
//! # Invariants
//! - A loaded classifier config always has at least one positive phrase.
//! - Keys missing from a TOML file fall back to the built-in lists.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_POSITIVE_PHRASES: &[&str] = &[
    "computer science",
    "software engineering",
    "cybersecurity",
    "cyber security",
    "artificial intelligence",
    "applied ai",
    "ai & robotics",
    "ai and robotics",
    "data science",
    "computer science research group",
];

const DEFAULT_NEGATIVE_PHRASES: &[&str] = &[
    "business school",
    "college of business",
    "forensic linguistics",
    "engineering for sustainable development",
    "college of engineering and physical sciences",
    "aston business school",
];

const DEFAULT_NEGATIVE_EXACT: &[&str] = &["aston university"];

/// Configuration-layer error.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        message: String,
    },
    EmptyPositivePhrases,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                message,
            } => write!(f, "invalid config `{}`: {message}", path.display()),
            Self::Parse {
                path: None,
                message,
            } => write!(f, "invalid config: {message}"),
            Self::EmptyPositivePhrases => write!(
                f,
                "classifier config must list at least one positive phrase"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Phrase lists driving [`crate::text::classify::DepartmentClassifier`].
///
/// ```toml
/// positive_phrases = ["computer science", "data science"]
/// negative_phrases = ["business school"]
/// negative_exact = ["aston university"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Substrings that mark a department as in the target discipline.
    pub positive_phrases: Vec<String>,
    /// Substrings that mark a department as unrelated.
    pub negative_phrases: Vec<String>,
    /// Whole names (case-insensitive) that are unrelated.
    pub negative_exact: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            positive_phrases: to_owned_list(DEFAULT_POSITIVE_PHRASES),
            negative_phrases: to_owned_list(DEFAULT_NEGATIVE_PHRASES),
            negative_exact: to_owned_list(DEFAULT_NEGATIVE_EXACT),
        }
    }
}

impl ClassifierConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|err| ConfigError::Parse {
            path: None,
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a classifier TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self
            .positive_phrases
            .iter()
            .all(|phrase| phrase.trim().is_empty())
        {
            return Err(ConfigError::EmptyPositivePhrases);
        }
        Ok(())
    }
}

/// Per-run switches for the reconciliation driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Reconcile inside a transaction that is rolled back afterwards.
    pub dry_run: bool,
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}
