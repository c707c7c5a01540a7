//! Strategy configuration models.
//!
//! Configurations travel as JSON documents; these types check the fields each kind
//! needs before a configuration is registered with a backend.

use crate::error::{OteError, Result};
use crate::pipeline::StrategyKind;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    pub resource_type: Option<String>,
    pub download_url: Option<String>,
    pub media_type: Option<String>,
    pub access_url: Option<String>,
    pub access_service: Option<String>,
    pub license: Option<String>,
    pub configuration: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserConfig {
    pub parser_type: String,
    pub entity: Option<String>,
    #[serde(default)]
    pub configuration: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    pub filter_type: String,
    pub query: Option<String>,
    pub condition: Option<String>,
    pub limit: Option<u64>,
    pub configuration: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfig {
    pub function_type: String,
    pub configuration: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
    pub mapping_type: String,
    #[serde(default)]
    pub prefixes: IndexMap<String, String>,
    #[serde(default)]
    pub triples: Vec<[String; 3]>,
    pub configuration: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationConfig {
    pub transformation_type: String,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub configuration: IndexMap<String, Value>,
}

impl ResourceConfig {
    fn check(&self) -> std::result::Result<(), String> {
        let download = self.download_url.is_some() && self.media_type.is_some();
        let access = self.access_url.is_some() && self.access_service.is_some();
        if download || access {
            Ok(())
        } else {
            Err("missing downloadUrl/mediaType or accessUrl/accessService".to_string())
        }
    }
}

/// Deserialize a configuration of the given kind, mapping failures to a creation error
pub fn parse_config<T: DeserializeOwned>(kind: StrategyKind, config: &Value) -> Result<T> {
    serde_json::from_value(config.clone())
        .map_err(|e| OteError::creation(kind.as_str(), format!("invalid configuration: {e}")))
}

/// Check that `config` is a valid configuration for `kind`
pub fn validate(kind: StrategyKind, config: &Value) -> Result<()> {
    if !config.is_object() {
        return Err(OteError::creation(
            kind.as_str(),
            format!("configuration must be a JSON object, got {config}"),
        ));
    }

    match kind {
        StrategyKind::DataResource => parse_config::<ResourceConfig>(kind, config)?
            .check()
            .map_err(|detail| OteError::creation(kind.as_str(), detail)),
        StrategyKind::Parser => parse_config::<ParserConfig>(kind, config).map(drop),
        StrategyKind::Filter => parse_config::<FilterConfig>(kind, config).map(drop),
        StrategyKind::Function => parse_config::<FunctionConfig>(kind, config).map(drop),
        StrategyKind::Mapping => parse_config::<MappingConfig>(kind, config).map(drop),
        StrategyKind::Transformation => {
            parse_config::<TransformationConfig>(kind, config).map(drop)
        }
    }
}
