//! Bookkeeping every backend strategy carries: kind, id, upstream pipe and last session

use crate::error::{OteError, Result};
use crate::pipeline::{Pipe, StrategyKind};
use std::sync::Mutex;

pub(crate) struct Stage {
    pub kind: StrategyKind,
    pub id: Option<String>,
    pub upstream: Option<Pipe>,
    last_session: Mutex<Option<String>>,
}

impl Stage {
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            id: None,
            upstream: None,
            last_session: Mutex::new(None),
        }
    }

    /// Id of a created strategy; `NotFound` before `create`
    pub fn require_id(&self) -> Result<&str> {
        self.id.as_deref().ok_or_else(|| {
            OteError::not_found(format!("{} has not been created", self.kind.class_name()))
        })
    }

    /// Fails when an id was already assigned
    pub fn ensure_uncreated(&self) -> Result<()> {
        match &self.id {
            Some(id) => Err(OteError::creation(
                self.kind.as_str(),
                format!("already created with id {id:?}"),
            )),
            None => Ok(()),
        }
    }

    pub fn last_session_id(&self) -> Option<String> {
        self.last_session
            .lock()
            .ok()
            .and_then(|session| session.clone())
    }

    pub fn record_session(&self, session_id: &str) {
        if let Ok(mut session) = self.last_session.lock() {
            *session = Some(session_id.to_string());
        }
    }
}
