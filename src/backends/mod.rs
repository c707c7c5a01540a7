//! Backends executing strategies and the dispatch from (backend, kind) to an implementation

pub mod local;
pub mod remote;
pub(crate) mod stage;

use crate::error::{OteError, Result};
use crate::pipeline::{Strategy, StrategyKind};
use crate::session::LocalStore;
use local::{LocalStrategy, PluginContext, PluginRegistry};
use remote::{RemoteStrategy, Transport};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Where strategies execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// An OTE service reached over HTTP
    Remote,
    /// In-process plugins
    Local,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "services",
            Self::Local => "python",
        }
    }

    /// Whether the backend has an implementation of `kind`
    pub fn supports(&self, kind: StrategyKind) -> bool {
        match self {
            Self::Remote => true,
            Self::Local => kind != StrategyKind::Function,
        }
    }

    /// Kinds the backend implements, in declaration order
    pub fn kinds(&self) -> Vec<StrategyKind> {
        StrategyKind::ALL
            .into_iter()
            .filter(|kind| self.supports(*kind))
            .collect()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = OteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "services" | "remote" => Ok(Self::Remote),
            "python" | "local" => Ok(Self::Local),
            _ => Err(OteError::InvalidBackend(s.to_string())),
        }
    }
}

/// Check that `backend` implements `kind`
pub fn resolve(backend: Backend, kind: StrategyKind) -> Result<StrategyKind> {
    if backend.supports(kind) {
        Ok(kind)
    } else {
        Err(OteError::NotImplemented {
            kind: kind.class_name().to_string(),
            backend: backend.to_string(),
        })
    }
}

/// Factory function type for creating uncreated strategies of one kind
pub type StrategyFactory = Box<dyn Fn() -> Box<dyn Strategy> + Send + Sync>;

/// Factory table of one client: strategy kind -> constructor on that client's backend
pub struct StrategyTable {
    backend: Backend,
    factories: HashMap<StrategyKind, StrategyFactory>,
}

impl StrategyTable {
    /// Create an empty table for a backend
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            factories: HashMap::new(),
        }
    }

    /// Table of every kind the remote backend implements
    pub fn remote(transport: Arc<Transport>) -> Self {
        let mut table = Self::new(Backend::Remote);
        for kind in Backend::Remote.kinds() {
            let transport = Arc::clone(&transport);
            table.register(kind, move || {
                Box::new(RemoteStrategy::new(kind, Arc::clone(&transport)))
            });
        }
        table
    }

    /// Table of every kind the local backend implements
    pub fn local(
        store: Arc<LocalStore>,
        plugins: Arc<PluginRegistry>,
        context: PluginContext,
    ) -> Self {
        let mut table = Self::new(Backend::Local);
        for kind in Backend::Local.kinds() {
            let store = Arc::clone(&store);
            let plugins = Arc::clone(&plugins);
            let context = context.clone();
            table.register(kind, move || {
                Box::new(LocalStrategy::new(
                    kind,
                    Arc::clone(&store),
                    Arc::clone(&plugins),
                    context.clone(),
                ))
            });
        }
        table
    }

    /// Register a strategy factory
    pub fn register<F>(&mut self, kind: StrategyKind, factory: F)
    where
        F: Fn() -> Box<dyn Strategy> + Send + Sync + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Uncreated strategy for a kind name such as `"filter"` or `"DataResource"`
    pub fn create(&self, kind: &str) -> Result<Box<dyn Strategy>> {
        self.create_kind(kind.parse()?)
    }

    pub fn create_kind(&self, kind: StrategyKind) -> Result<Box<dyn Strategy>> {
        let kind = resolve(self.backend, kind)?;
        let factory = self.factories.get(&kind).ok_or_else(|| OteError::NotImplemented {
            kind: kind.class_name().to_string(),
            backend: self.backend.to_string(),
        })?;
        Ok(factory())
    }

    /// Check if a kind has a factory
    pub fn contains(&self, kind: StrategyKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Kinds with a factory, sorted
    pub fn list_kinds(&self) -> Vec<StrategyKind> {
        let mut kinds: Vec<_> = self.factories.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_table() -> StrategyTable {
        StrategyTable::local(
            Arc::new(LocalStore::new()),
            Arc::new(PluginRegistry::with_builtins()),
            PluginContext::default(),
        )
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("services".parse::<Backend>().unwrap(), Backend::Remote);
        assert_eq!("python".parse::<Backend>().unwrap(), Backend::Local);
        assert_eq!("Local".parse::<Backend>().unwrap(), Backend::Local);

        let err = "java".parse::<Backend>().unwrap_err();
        assert!(matches!(err, OteError::InvalidBackend(ref name) if name == "java"));
    }

    #[test]
    fn test_resolve() {
        for kind in StrategyKind::ALL {
            assert!(resolve(Backend::Remote, kind).is_ok());
        }
        let err = resolve(Backend::Local, StrategyKind::Function).unwrap_err();
        assert!(matches!(err, OteError::NotImplemented { .. }));
        assert!(err.to_string().contains("Function"));
        assert!(err.to_string().contains("python"));
    }

    #[test]
    fn test_local_table() {
        let table = local_table();
        assert_eq!(table.backend(), Backend::Local);
        assert_eq!(table.len(), 5);
        assert!(!table.contains(StrategyKind::Function));

        let strategy = table.create("filter").unwrap();
        assert_eq!(strategy.kind(), StrategyKind::Filter);
        assert!(strategy.id().is_none());
    }

    #[test]
    fn test_table_dispatch_errors() {
        let table = local_table();
        assert!(matches!(
            table.create("function"),
            Err(OteError::NotImplemented { .. })
        ));
        assert!(matches!(
            table.create("crop"),
            Err(OteError::InvalidStrategy(_))
        ));
    }

    #[test]
    fn test_remote_table() {
        let transport =
            Transport::new("http://localhost:8080", &crate::config::ClientConfig::default())
                .unwrap();
        let table = StrategyTable::remote(Arc::new(transport));
        assert_eq!(table.list_kinds(), StrategyKind::ALL.to_vec());
        assert_eq!(
            table.create("function").unwrap().kind(),
            StrategyKind::Function
        );
    }

    #[test]
    fn test_empty_table() {
        let table = StrategyTable::new(Backend::Remote);
        assert!(table.is_empty());
        assert!(matches!(
            table.create_kind(StrategyKind::Filter),
            Err(OteError::NotImplemented { .. })
        ));
    }
}
