use super::{Plugin, PluginContext, single};
use crate::config::constants::CONTENT_KEY;
use crate::error::{OteError, Result};
use crate::models::{ResourceConfig, parse_config};
use crate::pipeline::{Document, StrategyKind};
use crate::util::{download, media};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Data resource downloaded from `downloadUrl` and decoded by `mediaType`
pub struct UrlResource {
    download_url: String,
    media_type: String,
    http: reqwest::Client,
}

impl UrlResource {
    pub fn from_config(config: &Value, context: &PluginContext) -> Result<Self> {
        let config: ResourceConfig = parse_config(StrategyKind::DataResource, config)?;
        match (config.download_url, config.media_type) {
            (Some(download_url), Some(media_type)) => Ok(Self {
                download_url,
                media_type,
                http: context.http.clone(),
            }),
            _ => Err(OteError::plugin(
                "the local backend only supports data resources with downloadUrl and mediaType",
            )),
        }
    }
}

#[async_trait]
impl Plugin for UrlResource {
    async fn initialize(&self, _session: &Document) -> Result<Document> {
        Ok(Document::new())
    }

    async fn get(&self, _session: &Document) -> Result<Document> {
        let bytes = download::download(&self.http, &self.download_url).await?;
        debug!(
            "Decoding {} bytes from {} as {}",
            bytes.len(),
            self.download_url,
            self.media_type
        );
        let content = media::decode(&bytes, &self.media_type)?;
        Ok(single(CONTENT_KEY, content))
    }
}
