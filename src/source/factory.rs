use std::sync::Arc;

use log::info;

use super::errors::DataSourceError;
use super::memory::MemoryDataSource;
use super::transactional::TransactionalDataSource;
use super::DataSource;
use crate::config::SourceConfig;

/// Build the backend named by `config.kind`.
pub fn create_source(config: &SourceConfig) -> Result<Arc<dyn DataSource>, DataSourceError> {
    let source: Arc<dyn DataSource> = match config.kind.as_str() {
        "memory" => Arc::new(MemoryDataSource::new(config.dialect)),
        "memory-transactional" => Arc::new(TransactionalDataSource::new(MemoryDataSource::new(
            config.dialect,
        ))),
        other => {
            return Err(DataSourceError::Unsupported {
                source_kind: other.to_string(),
                operation: "create".to_string(),
            })
        }
    };
    info!("created `{}` source ({})", config.kind, config.dialect);

    if config.auto_connect {
        source.connect()?;
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn test_create_memory_sources() {
        let plain = create_source(&SourceConfig::default()).unwrap();
        assert!(plain.is_connected());
        assert!(plain.as_transactional().is_none());

        let config = SourceConfig {
            kind: "memory-transactional".to_string(),
            dialect: Dialect::Serql,
            auto_connect: false,
        };
        let tx = create_source(&config).unwrap();
        assert!(!tx.is_connected());
        assert_eq!(tx.dialect(), Dialect::Serql);
        assert!(tx.as_transactional().is_some());
    }

    #[test]
    fn test_unknown_kind() {
        let config = SourceConfig {
            kind: "jena".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_source(&config),
            Err(DataSourceError::Unsupported { ref source_kind, .. }) if source_kind == "jena"
        ));
    }
}
