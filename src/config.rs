//! Compilation settings, loadable from a `tern.toml`-style file.
//!
//! ```toml
//! [resolver]
//! extension = "tern"
//! main_file = "main"
//!
//! [checker]
//! void_policy = "discard"
//! builtin_widening = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {msg}")]
    Invalid { msg: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub resolver: ResolverConfig,
    pub checker: CheckerConfig,
}

/// How logical module paths map onto document paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Source file extension, without the leading dot.
    pub extension: String,
    /// Entry file name (without extension) of a directory module.
    pub main_file: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            extension: "tern".to_string(),
            main_file: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    pub void_policy: VoidPolicy,
    /// Accept `Nat` where `Int` is expected and `Nat`/`Int` where `Real` is expected.
    pub builtin_widening: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            void_policy: VoidPolicy::Discard,
            builtin_widening: true,
        }
    }
}

/// What a statement position (the first half of a sequence) accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoidPolicy {
    /// Any value is evaluated and discarded.
    #[default]
    Discard,
    /// Only `Void`-typed expressions may appear.
    RequireVoid,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.resolver;
        if r.extension.is_empty() || r.extension.starts_with('.') {
            return Err(ConfigError::Invalid {
                msg: format!("resolver.extension must be a bare extension, got '{}'", r.extension),
            });
        }
        if r.main_file.is_empty() || r.main_file.contains(['/', '\\', '.']) {
            return Err(ConfigError::Invalid {
                msg: format!("resolver.main_file must be a plain file stem, got '{}'", r.main_file),
            });
        }
        Ok(())
    }
}
