use super::{Plugin, single};
use crate::error::{OteError, Result};
use crate::models::{FilterConfig, parse_config};
use crate::pipeline::{Document, StrategyKind};
use async_trait::async_trait;
use serde_json::Value;

/// SQL filter: hands its query to downstream stages under `sqlquery`
pub struct SqlFilter {
    query: String,
}

impl SqlFilter {
    pub fn from_config(config: &Value) -> Result<Self> {
        let config: FilterConfig = parse_config(StrategyKind::Filter, config)?;
        let query = config
            .query
            .ok_or_else(|| OteError::plugin("filter/sql needs a query"))?;
        Ok(Self { query })
    }
}

#[async_trait]
impl Plugin for SqlFilter {
    async fn initialize(&self, _session: &Document) -> Result<Document> {
        Ok(single("sqlquery", Value::String(self.query.clone())))
    }

    async fn get(&self, _session: &Document) -> Result<Document> {
        Ok(Document::new())
    }
}
