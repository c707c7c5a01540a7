//! In-process session store for the local backend
use super::SessionStore;
use crate::config::constants::SESSION_ID_PREFIX;
use crate::error::{OteError, Result};
use crate::pipeline::{Document, merge_document};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct StoreState {
    sessions: HashMap<String, Document>,
    configs: HashMap<String, Value>,
}

/// Session documents and strategy configurations of one local client.
///
/// Every read-merge-write runs under one lock, so pipelines sharing a store never lose
/// each other's keys. There is no size limit and nothing is evicted.
#[derive(Default)]
pub struct LocalStore {
    state: Mutex<StoreState>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every session and strategy configuration
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.sessions.clear();
        state.configs.clear();
        debug!("Local store cleared");
    }

    pub async fn contains_session(&self, session_id: &str) -> bool {
        self.state.lock().await.sessions.contains_key(session_id)
    }

    /// Ids of all sessions, sorted
    pub async fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state.lock().await.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Insert (or replace) a session under a caller-chosen id
    pub async fn insert_session(&self, session_id: impl Into<String>, document: Document) {
        self.state
            .lock()
            .await
            .sessions
            .insert(session_id.into(), document);
    }

    pub async fn insert_config(&self, strategy_id: impl Into<String>, config: Value) {
        self.state
            .lock()
            .await
            .configs
            .insert(strategy_id.into(), config);
    }

    /// Configuration registered for a strategy id
    pub async fn config(&self, strategy_id: &str) -> Option<Value> {
        self.state.lock().await.configs.get(strategy_id).cloned()
    }

    /// Append `strategy_id` to the list under `info_key` in a session, creating the list
    pub async fn register_in_session(
        &self,
        session_id: &str,
        info_key: &str,
        strategy_id: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| OteError::not_found(format!("session {session_id:?}")))?;

        match session
            .entry(info_key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(ids) => ids.push(Value::String(strategy_id.to_string())),
            other => {
                return Err(OteError::config(format!(
                    "session key {info_key:?} holds {other}, expected a list"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for LocalStore {
    async fn create_session(&self) -> Result<String> {
        let session_id = format!("{SESSION_ID_PREFIX}{}", uuid::Uuid::new_v4());
        self.state
            .lock()
            .await
            .sessions
            .insert(session_id.clone(), Document::new());
        debug!("Created local session '{}'", session_id);
        Ok(session_id)
    }

    async fn read(&self, session_id: &str) -> Result<Document> {
        self.state
            .lock()
            .await
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| OteError::not_found(format!("session {session_id:?}")))
    }

    async fn merge(&self, session_id: &str, update: Document) -> Result<()> {
        let mut state = self.state.lock().await;
        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| OteError::not_found(format!("session {session_id:?}")))?;
        merge_document(session, update);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_session() {
        let store = LocalStore::new();
        let id = store.create_session().await.unwrap();

        assert!(id.starts_with("session-"));
        assert!(store.contains_session(&id).await);
        assert!(store.read(&id).await.unwrap().is_empty());

        let other = store.create_session().await.unwrap();
        assert_ne!(id, other);
        assert_eq!(store.session_ids().await.len(), 2);
    }

    #[tokio::test]
    async fn test_merge_and_read() {
        let store = LocalStore::new();
        let id = store.create_session().await.unwrap();

        let mut update = Document::new();
        update.insert("sqlquery".to_string(), json!("DROP TABLE myTable;"));
        store.merge(&id, update).await.unwrap();

        let session = store.read(&id).await.unwrap();
        assert_eq!(session["sqlquery"], "DROP TABLE myTable;");
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = LocalStore::new();

        let err = store.read("session-missing").await.unwrap_err();
        assert!(matches!(err, OteError::NotFound(_)));

        let err = store.merge("session-missing", Document::new()).await.unwrap_err();
        assert!(matches!(err, OteError::NotFound(_)));

        let err = store
            .register_in_session("session-missing", "filter_info", "filter-1")
            .await
            .unwrap_err();
        assert!(matches!(err, OteError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_register_in_session_appends() {
        let store = LocalStore::new();
        let id = store.create_session().await.unwrap();

        store.register_in_session(&id, "filter_info", "filter-1").await.unwrap();
        store.register_in_session(&id, "filter_info", "filter-2").await.unwrap();

        let session = store.read(&id).await.unwrap();
        assert_eq!(session["filter_info"], json!(["filter-1", "filter-2"]));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = LocalStore::new();
        let id = store.create_session().await.unwrap();
        store.insert_config("filter-1", json!({"filterType": "filter/sql"})).await;

        store.clear().await;

        assert!(!store.contains_session(&id).await);
        assert!(store.config("filter-1").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_merges_keep_all_keys() {
        let store = Arc::new(LocalStore::new());
        let id = store.create_session().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                let mut update = Document::new();
                update.insert(format!("key{i}"), json!(i));
                store.merge(&id, update).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.read(&id).await.unwrap().len(), 16);
    }
}
