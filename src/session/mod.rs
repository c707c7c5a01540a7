//! Session stores: the pipeline-wide shared document, kept in-process or by the OTE service

pub mod local;
pub mod remote;

pub use local::LocalStore;
pub use remote::RemoteSessionStore;

use crate::error::Result;
use crate::pipeline::Document;
use async_trait::async_trait;

/// Storage of session documents, keyed by session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create an empty session and return its id
    async fn create_session(&self) -> Result<String>;

    /// Current document of a session
    async fn read(&self, session_id: &str) -> Result<Document>;

    /// Shallow-merge `update` into a session's document
    async fn merge(&self, session_id: &str, update: Document) -> Result<()>;
}
