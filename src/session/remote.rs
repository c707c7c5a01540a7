//! Session store held by the OTE service
use super::SessionStore;
use crate::backends::remote::Transport;
use crate::error::{OteError, Result};
use crate::pipeline::{Document, parse_document};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Deserialize)]
struct CreatedSession {
    session_id: String,
}

/// Sessions of a remote OTE service; documents never live client-side
#[derive(Clone)]
pub struct RemoteSessionStore {
    transport: Arc<Transport>,
}

impl RemoteSessionStore {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl SessionStore for RemoteSessionStore {
    async fn create_session(&self) -> Result<String> {
        let reply = self
            .transport
            .send(self.transport.post("/session").json(&serde_json::json!({})))
            .await?;
        if !reply.is_success() {
            return Err(self.transport.failure(
                format!("Cannot create session: {}", reply.status.as_u16()),
                &reply,
            ));
        }

        let created: CreatedSession = serde_json::from_slice(&reply.body).map_err(|e| {
            OteError::transport(
                Some(reply.status.as_u16()),
                self.transport
                    .detail(format!("Unexpected session response: {e}"), &reply),
            )
        })?;
        debug!("Created remote session '{}'", created.session_id);
        Ok(created.session_id)
    }

    async fn read(&self, session_id: &str) -> Result<Document> {
        let reply = self
            .transport
            .send(self.transport.get(&format!("/session/{session_id}")))
            .await?;
        if reply.status == reqwest::StatusCode::NOT_FOUND {
            return Err(OteError::not_found(
                self.transport
                    .detail(format!("session {session_id:?}"), &reply),
            ));
        }
        if !reply.is_success() {
            return Err(self.transport.failure(
                format!("Cannot read session: session_id={session_id:?}"),
                &reply,
            ));
        }
        parse_document(&reply.body)
    }

    async fn merge(&self, session_id: &str, update: Document) -> Result<()> {
        let reply = self
            .transport
            .send(
                self.transport
                    .put(&format!("/session/{session_id}"))
                    .json(&update),
            )
            .await?;
        if reply.status == reqwest::StatusCode::NOT_FOUND {
            return Err(OteError::not_found(
                self.transport
                    .detail(format!("session {session_id:?}"), &reply),
            ));
        }
        if !reply.is_success() {
            return Err(self.transport.failure(
                format!("Cannot update session: session_id={session_id:?}"),
                &reply,
            ));
        }
        Ok(())
    }
}
