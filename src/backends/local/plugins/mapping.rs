use super::Plugin;
use crate::error::Result;
use crate::models::{MappingConfig, parse_config};
use crate::pipeline::{Document, StrategyKind};
use async_trait::async_trait;
use serde_json::Value;

/// Triples mapping: publishes its prefixes and triples to the session
pub struct TriplesMapping {
    config: MappingConfig,
}

impl TriplesMapping {
    pub fn from_config(config: &Value) -> Result<Self> {
        Ok(Self {
            config: parse_config(StrategyKind::Mapping, config)?,
        })
    }
}

#[async_trait]
impl Plugin for TriplesMapping {
    async fn initialize(&self, _session: &Document) -> Result<Document> {
        let mut update = Document::new();
        update.insert(
            "prefixes".to_string(),
            serde_json::to_value(&self.config.prefixes)?,
        );
        update.insert(
            "triples".to_string(),
            serde_json::to_value(&self.config.triples)?,
        );
        Ok(update)
    }

    async fn get(&self, _session: &Document) -> Result<Document> {
        Ok(Document::new())
    }
}
