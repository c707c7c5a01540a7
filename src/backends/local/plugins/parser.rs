use super::{Plugin, PluginContext, single};
use crate::config::constants::CONTENT_KEY;
use crate::error::{OteError, Result};
use crate::models::{ParserConfig, parse_config};
use crate::pipeline::{Document, StrategyKind};
use crate::util::download;
use async_trait::async_trait;
use serde_json::Value;

/// JSON parser.
///
/// Reads `configuration.downloadUrl` when given; otherwise parses the string left under
/// `content` by an upstream data resource.
pub struct JsonParser {
    download_url: Option<String>,
    http: reqwest::Client,
}

impl JsonParser {
    pub fn from_config(config: &Value, context: &PluginContext) -> Result<Self> {
        let config: ParserConfig = parse_config(StrategyKind::Parser, config)?;
        let download_url = match config.configuration.get("downloadUrl") {
            None => None,
            Some(Value::String(url)) => Some(url.clone()),
            Some(other) => {
                return Err(OteError::plugin(format!(
                    "parser downloadUrl must be a string, got {other}"
                )));
            }
        };
        Ok(Self {
            download_url,
            http: context.http.clone(),
        })
    }
}

#[async_trait]
impl Plugin for JsonParser {
    async fn initialize(&self, _session: &Document) -> Result<Document> {
        Ok(Document::new())
    }

    async fn get(&self, session: &Document) -> Result<Document> {
        let content: Value = match &self.download_url {
            Some(url) => {
                let bytes = download::download(&self.http, url).await?;
                serde_json::from_slice(&bytes)
                    .map_err(|e| OteError::plugin(format!("{url} is not valid JSON: {e}")))?
            }
            None => match session.get(CONTENT_KEY) {
                Some(Value::String(raw)) => serde_json::from_str(raw).map_err(|e| {
                    OteError::plugin(format!("session content is not valid JSON: {e}"))
                })?,
                Some(parsed) => parsed.clone(),
                None => {
                    return Err(OteError::plugin(
                        "parser has no downloadUrl and the session holds no content",
                    ));
                }
            },
        };
        Ok(single(CONTENT_KEY, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_parses_session_content() {
        let parser = JsonParser::from_config(
            &json!({"parserType": "parser/json"}),
            &PluginContext::default(),
        )
        .unwrap();

        let session = single(CONTENT_KEY, json!("{\"a\": [1, 2]}"));
        let update = parser.get(&session).await.unwrap();
        assert_eq!(update[CONTENT_KEY], json!({"a": [1, 2]}));
    }

    #[tokio::test]
    async fn test_without_any_source() {
        let parser = JsonParser::from_config(
            &json!({"parserType": "parser/json"}),
            &PluginContext::default(),
        )
        .unwrap();

        let err = parser.get(&Document::new()).await.unwrap_err();
        assert!(matches!(err, OteError::Plugin(_)));
        assert!(parser.initialize(&Document::new()).await.unwrap().is_empty());
    }
}
