use super::plugins::{PluginContext, PluginRegistry};
use crate::backends::stage::Stage;
use crate::error::{OteError, Result};
use crate::models::validate;
use crate::pipeline::{Document, Pipe, Strategy, StrategyKind};
use crate::session::{LocalStore, SessionStore};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum Phase {
    Initialize,
    Fetch,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Initialize => f.write_str("initialize"),
            Phase::Fetch => f.write_str("fetch"),
        }
    }
}

/// Strategy executed in-process by a plugin from the registry
pub struct LocalStrategy {
    stage: Stage,
    store: Arc<LocalStore>,
    plugins: Arc<PluginRegistry>,
    context: PluginContext,
}

impl LocalStrategy {
    pub fn new(
        kind: StrategyKind,
        store: Arc<LocalStore>,
        plugins: Arc<PluginRegistry>,
        context: PluginContext,
    ) -> Self {
        Self {
            stage: Stage::new(kind),
            store,
            plugins,
            context,
        }
    }

    async fn run(&self, phase: Phase, session_id: Option<&str>) -> Result<Vec<u8>> {
        let kind = self.stage.kind;
        let id = self.stage.require_id()?;
        let config = self
            .store
            .config(id)
            .await
            .ok_or_else(|| OteError::not_found(format!("configuration of {kind} {id:?}")))?;

        let session = match session_id {
            Some(session_id) => self.store.read(session_id).await?,
            None => Document::new(),
        };

        let plugin = self.plugins.create(kind, &config, &self.context)?;
        let update = match phase {
            Phase::Initialize => plugin.initialize(&session).await?,
            Phase::Fetch => plugin.get(&session).await?,
        };
        debug!("{} {} '{}' produced {} keys", kind, phase, id, update.len());

        let bytes = serde_json::to_vec(&update)?;
        if let Some(session_id) = session_id {
            self.store.merge(session_id, update).await?;
        }
        Ok(bytes)
    }
}

#[async_trait]
impl Strategy for LocalStrategy {
    fn kind(&self) -> StrategyKind {
        self.stage.kind
    }

    fn id(&self) -> Option<&str> {
        self.stage.id.as_deref()
    }

    fn sessions(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    fn upstream(&self) -> Option<&Pipe> {
        self.stage.upstream.as_ref()
    }

    fn upstream_mut(&mut self) -> Option<&mut Pipe> {
        self.stage.upstream.as_mut()
    }

    fn set_upstream(&mut self, pipe: Pipe) {
        self.stage.upstream = Some(pipe);
    }

    fn last_session_id(&self) -> Option<String> {
        self.stage.last_session_id()
    }

    fn record_session(&self, session_id: &str) {
        self.stage.record_session(session_id);
    }

    async fn create(&mut self, config: Value, session_id: Option<&str>) -> Result<()> {
        self.stage.ensure_uncreated()?;
        let kind = self.stage.kind;

        validate(kind, &config)?;
        self.plugins
            .create(kind, &config, &self.context)
            .map_err(|e| OteError::creation(kind.as_str(), e.to_string()))?;

        if let Some(session_id) = session_id {
            if !self.store.contains_session(session_id).await {
                return Err(OteError::creation(
                    kind.as_str(),
                    format!("unknown session {session_id:?}"),
                ));
            }
        }

        let id = format!("{}-{}", kind, uuid::Uuid::new_v4());
        self.store.insert_config(id.clone(), config).await;
        if let Some(session_id) = session_id {
            self.store
                .register_in_session(session_id, &kind.info_key(), &id)
                .await
                .map_err(|e| OteError::creation(kind.as_str(), e.to_string()))?;
        }

        debug!("Created local {} '{}'", kind, id);
        self.stage.id = Some(id);
        Ok(())
    }

    async fn initialize(&self, session_id: Option<&str>) -> Result<Vec<u8>> {
        self.run(Phase::Initialize, session_id).await
    }

    async fn fetch(&self, session_id: Option<&str>) -> Result<Vec<u8>> {
        self.run(Phase::Fetch, session_id).await
    }
}
