// Plugin registry for the local backend: strategy type name -> executable plugin
use crate::error::{OteError, Result};
use crate::pipeline::{Document, StrategyKind};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

pub mod dataresource;
pub mod filter;
pub mod mapping;
pub mod parser;
pub mod transformation;

/// Strategy type assumed for data resources that do not name one
pub const DEFAULT_RESOURCE_TYPE: &str = "resource/url";

/// Executable behind a local strategy.
///
/// Both phases receive a snapshot of the session document and return the update to
/// merge back into it.
#[async_trait]
pub trait Plugin: Send + Sync {
    async fn initialize(&self, session: &Document) -> Result<Document>;

    async fn get(&self, session: &Document) -> Result<Document>;
}

/// Resources plugins may use while running
#[derive(Clone, Default)]
pub struct PluginContext {
    pub http: reqwest::Client,
}

/// Factory function type for creating plugins from a strategy configuration
pub type PluginFactory =
    Box<dyn Fn(&Value, &PluginContext) -> Result<Box<dyn Plugin>> + Send + Sync>;

/// Registry for local strategy plugins
pub struct PluginRegistry {
    plugins: HashMap<(StrategyKind, String), PluginFactory>,
}

impl PluginRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Registry holding the built-in plugins
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(StrategyKind::DataResource, DEFAULT_RESOURCE_TYPE, |config, ctx| {
            Ok(Box::new(dataresource::UrlResource::from_config(config, ctx)?))
        });
        registry.register(StrategyKind::Parser, "parser/json", |config, ctx| {
            Ok(Box::new(parser::JsonParser::from_config(config, ctx)?))
        });
        registry.register(StrategyKind::Filter, "filter/sql", |config, _| {
            Ok(Box::new(filter::SqlFilter::from_config(config)?))
        });
        registry.register(StrategyKind::Mapping, "triples", |config, _| {
            Ok(Box::new(mapping::TriplesMapping::from_config(config)?))
        });
        registry.register(
            StrategyKind::Transformation,
            "transformation/select",
            |config, _| {
                Ok(Box::new(transformation::SelectTransformation::from_config(
                    config,
                )?))
            },
        );
        registry
    }

    /// Register a plugin factory for a strategy kind and type name
    pub fn register<F>(&mut self, kind: StrategyKind, type_name: impl Into<String>, factory: F)
    where
        F: Fn(&Value, &PluginContext) -> Result<Box<dyn Plugin>> + Send + Sync + 'static,
    {
        self.plugins
            .insert((kind, type_name.into()), Box::new(factory));
    }

    /// Type name a configuration selects for a kind
    pub fn type_name(kind: StrategyKind, config: &Value) -> Result<String> {
        match config.get(kind.type_field()).and_then(Value::as_str) {
            Some(name) => Ok(name.to_string()),
            None if kind == StrategyKind::DataResource => Ok(DEFAULT_RESOURCE_TYPE.to_string()),
            None => Err(OteError::plugin(format!(
                "{kind} configuration has no {:?}",
                kind.type_field()
            ))),
        }
    }

    /// Create a plugin instance for a configuration
    pub fn create(
        &self,
        kind: StrategyKind,
        config: &Value,
        context: &PluginContext,
    ) -> Result<Box<dyn Plugin>> {
        let type_name = Self::type_name(kind, config)?;
        let factory = self
            .plugins
            .get(&(kind, type_name.clone()))
            .ok_or_else(|| {
                OteError::plugin(format!("no local {kind} plugin for type {type_name:?}"))
            })?;
        factory(config, context)
    }

    /// Check if a plugin is registered
    pub fn contains(&self, kind: StrategyKind, type_name: &str) -> bool {
        self.plugins.contains_key(&(kind, type_name.to_string()))
    }

    /// List all registered plugins, sorted
    pub fn list_plugins(&self) -> Vec<(StrategyKind, String)> {
        let mut plugins: Vec<_> = self.plugins.keys().cloned().collect();
        plugins.sort();
        plugins
    }

    /// Get the number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Single-key document
pub(crate) fn single(key: &str, value: Value) -> Document {
    let mut document = Document::new();
    document.insert(key.to_string(), value);
    document
}
