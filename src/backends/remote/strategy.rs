use super::Transport;
use crate::backends::stage::Stage;
use crate::error::{OteError, Result};
use crate::models::validate;
use crate::pipeline::{Pipe, Strategy, StrategyKind};
use crate::session::{RemoteSessionStore, SessionStore};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Strategy registered with and executed by an OTE service
pub struct RemoteStrategy {
    stage: Stage,
    transport: Arc<Transport>,
    sessions: RemoteSessionStore,
}

impl RemoteStrategy {
    pub fn new(kind: StrategyKind, transport: Arc<Transport>) -> Self {
        Self {
            stage: Stage::new(kind),
            sessions: RemoteSessionStore::new(Arc::clone(&transport)),
            transport,
        }
    }

    fn with_session(
        request: reqwest::RequestBuilder,
        session_id: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match session_id {
            Some(session_id) => request.query(&[("session_id", session_id)]),
            None => request,
        }
    }

    async fn call(
        &self,
        action: &str,
        request: reqwest::RequestBuilder,
        session_id: Option<&str>,
    ) -> Result<Vec<u8>> {
        let kind = self.stage.kind;
        let id = self.stage.require_id()?;
        let reply = self
            .transport
            .send(Self::with_session(request, session_id))
            .await?;
        if !reply.is_success() {
            return Err(self.transport.failure(
                format!(
                    "Cannot {action} {kind}: session_id={:?} {}={id:?}",
                    session_id.unwrap_or_default(),
                    kind.id_key()
                ),
                &reply,
            ));
        }
        Ok(reply.body)
    }
}

#[async_trait]
impl Strategy for RemoteStrategy {
    fn kind(&self) -> StrategyKind {
        self.stage.kind
    }

    fn id(&self) -> Option<&str> {
        self.stage.id.as_deref()
    }

    fn sessions(&self) -> &dyn SessionStore {
        &self.sessions
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

        let type_name = config
            .get(kind.type_field())
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let request = self.transport.post(&format!("/{kind}")).json(&config);
        let reply = self
            .transport
            .send(Self::with_session(request, session_id))
            .await
            .map_err(|e| OteError::creation(kind.as_str(), e.to_string()))?;
        if !reply.is_success() {
            return Err(OteError::creation(
                kind.as_str(),
                self.transport
                    .detail(format!("{type_name:?} status={}", reply.status.as_u16()), &reply),
            ));
        }

        let id_key = kind.id_key();
        let id = serde_json::from_slice::<Value>(&reply.body)
            .ok()
            .and_then(|body| body.get(&id_key).and_then(Value::as_str).map(String::from))
            .ok_or_else(|| {
                OteError::creation(
                    kind.as_str(),
                    self.transport
                        .detail(format!("response has no {id_key:?}"), &reply),
                )
            })?;

        debug!("Created remote {} '{}'", kind, id);
        self.stage.id = Some(id);
        Ok(())
    }

    async fn initialize(&self, session_id: Option<&str>) -> Result<Vec<u8>> {
        let id = self.stage.require_id()?;
        let request = self
            .transport
            .post(&format!("/{}/{id}/initialize", self.stage.kind));
        self.call("initialize", request, session_id).await
    }

    async fn fetch(&self, session_id: Option<&str>) -> Result<Vec<u8>> {
        let id = self.stage.require_id()?;
        let request = self.transport.get(&format!("/{}/{id}", self.stage.kind));
        self.call("fetch", request, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use serde_json::json;

    fn strategy(kind: StrategyKind) -> RemoteStrategy {
        // Nothing listens on port 9; calls that reach the network fail fast
        let transport = Transport::new("http://127.0.0.1:9", &ClientConfig::default()).unwrap();
        RemoteStrategy::new(kind, Arc::new(transport))
    }

    #[tokio::test]
    async fn test_phases_before_create() {
        let filter = strategy(StrategyKind::Filter);
        assert!(matches!(filter.initialize(None).await, Err(OteError::NotFound(_))));
        assert!(matches!(filter.fetch(Some("session-1")).await, Err(OteError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_config_is_a_creation_error() {
        let mut filter = strategy(StrategyKind::Filter);
        let err = filter.create(json!(["not", "an", "object"]), None).await.unwrap_err();
        assert!(matches!(err, OteError::Creation { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_creation_error() {
        let mut filter = strategy(StrategyKind::Filter);
        let err = filter
            .create(json!({"filterType": "filter/sql", "query": "SELECT 1;"}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OteError::Creation { ref kind, .. } if kind == "filter"));
        assert!(filter.id().is_none());
    }
}
