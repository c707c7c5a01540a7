use crate::backends::local::{PluginContext, PluginRegistry};
use crate::backends::remote::Transport;
use crate::backends::{Backend, StrategyTable};
use crate::config::constants::LOCAL_SOURCES;
use crate::config::{ClientConfig, Settings};
use crate::error::{OteError, Result};
use crate::pipeline::{Document, Strategy, StrategyKind};
use crate::session::{LocalStore, RemoteSessionStore, SessionStore};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Entry point for building strategies on one backend.
///
/// The source picks the backend: `"python"` (or `"local"`) runs everything in-process,
/// an `http(s)://` URL talks to an OTE service.
///
/// ```no_run
/// # async fn demo() -> otelib::Result<()> {
/// use otelib::{OteClient, Strategy, StrategyExt};
/// use serde_json::json;
///
/// let client = OteClient::new("python")?;
/// let resource = client
///     .create_dataresource(json!({
///         "downloadUrl": "https://example.org/sample2.json",
///         "mediaType": "application/json"
///     }))
///     .await?;
/// let filter = client
///     .create_filter(json!({"filterType": "filter/sql", "query": "DROP TABLE myTable;"}))
///     .await?;
///
/// let pipeline = resource.then(filter);
/// let output = pipeline.get(None).await?;
/// # let _ = output;
/// # Ok(())
/// # }
/// ```
pub struct OteClient {
    source: String,
    table: StrategyTable,
    sessions: Arc<dyn SessionStore>,
    store: Option<Arc<LocalStore>>,
}

impl OteClient {
    /// Client for `source` with settings read from the environment
    pub fn new(source: &str) -> Result<Self> {
        Self::with_config(source, ClientConfig::new(Settings::from_env()?))
    }

    pub fn with_config(source: &str, config: ClientConfig) -> Result<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(OteError::config("client source must not be empty"));
        }

        if LOCAL_SOURCES.contains(&trimmed.to_lowercase().as_str()) {
            if !config.headers.is_empty() {
                warn!(
                    "Ignoring {} HTTP header(s): the local backend makes no service requests",
                    config.headers.len()
                );
            }
            let mut client = Self::local_with_plugins(
                Arc::new(LocalStore::new()),
                Arc::new(PluginRegistry::with_builtins()),
            );
            client.source = trimmed.to_string();
            return Ok(client);
        }

        if !trimmed.contains("://") {
            return Err(OteError::InvalidBackend(trimmed.to_string()));
        }

        let transport = Arc::new(Transport::new(trimmed, &config)?);
        debug!("Client bound to OTE service at {}", transport.base_url());
        Ok(Self {
            source: transport.base_url().to_string(),
            table: StrategyTable::remote(Arc::clone(&transport)),
            sessions: Arc::new(RemoteSessionStore::new(transport)),
            store: None,
        })
    }

    /// Local client with its own store and the built-in plugins
    pub fn local() -> Self {
        Self::local_with_plugins(
            Arc::new(LocalStore::new()),
            Arc::new(PluginRegistry::with_builtins()),
        )
    }

    /// Local client sharing `store` with other clients
    pub fn local_with_store(store: Arc<LocalStore>) -> Self {
        Self::local_with_plugins(store, Arc::new(PluginRegistry::with_builtins()))
    }

    pub fn local_with_plugins(store: Arc<LocalStore>, plugins: Arc<PluginRegistry>) -> Self {
        Self {
            source: Backend::Local.to_string(),
            table: StrategyTable::local(Arc::clone(&store), plugins, PluginContext::default()),
            sessions: Arc::clone(&store) as Arc<dyn SessionStore>,
            store: Some(store),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn backend(&self) -> Backend {
        self.table.backend()
    }

    /// Kinds this client can build
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.table.list_kinds()
    }

    /// The in-process store, for local clients
    pub fn store(&self) -> Option<&Arc<LocalStore>> {
        self.store.as_ref()
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    pub async fn create_session(&self) -> Result<String> {
        self.sessions.create_session().await
    }

    pub async fn read_session(&self, session_id: &str) -> Result<Document> {
        self.sessions.read(session_id).await
    }

    /// Drop every local session and strategy configuration; no-op for remote clients
    pub async fn clear_cache(&self) {
        match &self.store {
            Some(store) => store.clear().await,
            None => debug!("Remote client has no local cache to clear"),
        }
    }

    /// Uncreated strategy of a kind, named as in `"filter"` or `"DataResource"`
    pub fn strategy(&self, kind: &str) -> Result<Box<dyn Strategy>> {
        self.table.create(kind)
    }

    /// Build and create a strategy from its configuration
    pub async fn create_strategy(&self, kind: &str, config: Value) -> Result<Box<dyn Strategy>> {
        let mut strategy = self.strategy(kind)?;
        strategy.create(config, None).await?;
        Ok(strategy)
    }

    /// Build and create a strategy, registering it in an existing session
    pub async fn create_strategy_in_session(
        &self,
        kind: &str,
        config: Value,
        session_id: &str,
    ) -> Result<Box<dyn Strategy>> {
        let mut strategy = self.strategy(kind)?;
        strategy.create(config, Some(session_id)).await?;
        Ok(strategy)
    }

    pub async fn create_dataresource(&self, config: Value) -> Result<Box<dyn Strategy>> {
        self.create_strategy(StrategyKind::DataResource.as_str(), config)
            .await
    }

    pub async fn create_parser(&self, config: Value) -> Result<Box<dyn Strategy>> {
        self.create_strategy(StrategyKind::Parser.as_str(), config)
            .await
    }

    pub async fn create_filter(&self, config: Value) -> Result<Box<dyn Strategy>> {
        self.create_strategy(StrategyKind::Filter.as_str(), config)
            .await
    }

    pub async fn create_function(&self, config: Value) -> Result<Box<dyn Strategy>> {
        self.create_strategy(StrategyKind::Function.as_str(), config)
            .await
    }

    pub async fn create_mapping(&self, config: Value) -> Result<Box<dyn Strategy>> {
        self.create_strategy(StrategyKind::Mapping.as_str(), config)
            .await
    }

    pub async fn create_transformation(&self, config: Value) -> Result<Box<dyn Strategy>> {
        self.create_strategy(StrategyKind::Transformation.as_str(), config)
            .await
    }
}
