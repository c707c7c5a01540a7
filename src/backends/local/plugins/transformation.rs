use super::Plugin;
use crate::error::{OteError, Result};
use crate::models::{TransformationConfig, parse_config};
use crate::pipeline::{Document, StrategyKind};
use async_trait::async_trait;
use serde_json::Value;

/// Projects the session onto `configuration.keys`
pub struct SelectTransformation {
    keys: Vec<String>,
}

impl SelectTransformation {
    pub fn from_config(config: &Value) -> Result<Self> {
        let config: TransformationConfig = parse_config(StrategyKind::Transformation, config)?;
        let keys = config
            .configuration
            .get("keys")
            .cloned()
            .ok_or_else(|| OteError::plugin("transformation/select needs configuration.keys"))?;
        let keys: Vec<String> = serde_json::from_value(keys).map_err(|e| {
            OteError::plugin(format!("configuration.keys must be a list of strings: {e}"))
        })?;
        Ok(Self { keys })
    }
}

#[async_trait]
impl Plugin for SelectTransformation {
    async fn initialize(&self, _session: &Document) -> Result<Document> {
        Ok(Document::new())
    }

    async fn get(&self, session: &Document) -> Result<Document> {
        Ok(self
            .keys
            .iter()
            .filter_map(|key| session.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }
}
