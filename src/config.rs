use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::dialect::Dialect;
use crate::model::identifier::looks_absolute;
use crate::namespaces::{self, NamespaceTable};

/// Source kinds understood by [`crate::source::factory::create_source`].
pub const SOURCE_KINDS: &[&str] = &["memory", "memory-transactional"];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Mapper configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct RdfMapConfig {
    /// Dialect used when a query does not name one
    pub default_dialect: Dialect,

    /// Projection variable synthesized around bare pattern fragments
    #[validate(custom(function = "validate_variable_name"))]
    pub default_variable: String,

    #[validate(nested)]
    pub source: SourceConfig,

    /// Prefixes registered in the global namespace table, in order
    #[validate(nested)]
    pub namespaces: Vec<NamespaceConfig>,
}

#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Backend name, one of [`SOURCE_KINDS`]
    #[validate(custom(function = "validate_source_kind"))]
    pub kind: String,

    /// Query language the backend accepts
    pub dialect: Dialect,

    /// Connect immediately after creation
    pub auto_connect: bool,
}

#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
pub struct NamespaceConfig {
    #[validate(custom(function = "validate_prefix"))]
    pub prefix: String,

    #[validate(custom(function = "validate_namespace_iri"))]
    pub iri: String,
}

impl Default for RdfMapConfig {
    fn default() -> Self {
        Self {
            default_dialect: Dialect::Sparql,
            default_variable: "x".to_string(),
            source: SourceConfig::default(),
            namespaces: Vec::new(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: "memory".to_string(),
            dialect: Dialect::Sparql,
            auto_connect: true,
        }
    }
}

impl RdfMapConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_dialect: Dialect = parse_env_var("RDFMAP_DIALECT", "sparql")?;
        let namespaces = match env::var("RDFMAP_NAMESPACES") {
            Ok(value) => parse_namespace_list(&value)?,
            Err(env::VarError::NotPresent) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let config = Self {
            default_dialect,
            default_variable: env::var("RDFMAP_DEFAULT_VARIABLE").unwrap_or_else(|_| "x".to_string()),
            source: SourceConfig {
                kind: env::var("RDFMAP_SOURCE").unwrap_or_else(|_| "memory".to_string()),
                dialect: default_dialect,
                auto_connect: parse_env_var("RDFMAP_SOURCE_AUTO_CONNECT", "true")?,
            },
            namespaces,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Configured prefixes as a standalone table
    pub fn namespace_table(&self) -> NamespaceTable {
        self.namespaces
            .iter()
            .map(|ns| (ns.prefix.clone(), ns.iri.clone()))
            .collect()
    }

    /// Register every configured prefix in the global namespace table
    pub fn apply_namespaces(&self) {
        for ns in &self.namespaces {
            namespaces::register(&ns.prefix, &ns.iri);
        }
    }
}

/// Parse `dc=http://purl.org/dc/terms/,foaf=http://xmlns.com/foaf/0.1/`
pub fn parse_namespace_list(value: &str) -> Result<Vec<NamespaceConfig>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((prefix, iri)) => Ok(NamespaceConfig {
                prefix: prefix.trim().to_string(),
                iri: iri.trim().trim_start_matches('<').trim_end_matches('>').to_string(),
            }),
            None => Err(ConfigError::Parse {
                field: "RDFMAP_NAMESPACES".to_string(),
                value: entry.to_string(),
                source: "expected `prefix=iri`".into(),
            }),
        })
        .collect()
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}

fn is_name(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn validate_variable_name(value: &str) -> Result<(), ValidationError> {
    let name = value.trim_start_matches(['?', '$']);
    if is_name(name) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_variable_name"))
    }
}

fn validate_prefix(value: &str) -> Result<(), ValidationError> {
    if is_name(value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_prefix"))
    }
}

fn validate_namespace_iri(value: &str) -> Result<(), ValidationError> {
    if looks_absolute(value) {
        Ok(())
    } else {
        Err(ValidationError::new("namespace_iri_not_absolute"))
    }
}

fn validate_source_kind(value: &str) -> Result<(), ValidationError> {
    if SOURCE_KINDS.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_source_kind"))
    }
}
