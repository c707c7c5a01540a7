use super::kind::StrategyKind;
use crate::error::Result;
use crate::session::SessionStore;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// A single pipeline stage.
///
/// Backends implement the lifecycle methods (`create`, `initialize`, `fetch`) and the
/// upstream bookkeeping; [`Strategy::get`] drives a whole chain through them.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Id assigned by a successful `create`
    fn id(&self) -> Option<&str>;

    /// Session store shared by every stage of the pipeline this strategy runs in
    fn sessions(&self) -> &dyn SessionStore;

    fn upstream(&self) -> Option<&Pipe>;

    fn upstream_mut(&mut self) -> Option<&mut Pipe>;

    fn set_upstream(&mut self, pipe: Pipe);

    /// Session id this strategy was last driven with by `get`
    fn last_session_id(&self) -> Option<String>;

    fn record_session(&self, session_id: &str);

    /// Register the configuration with the backend and assign the id.
    async fn create(&mut self, config: Value, session_id: Option<&str>) -> Result<()>;

    /// Run the kind-specific setup; called while propagating down the pipeline.
    async fn initialize(&self, session_id: Option<&str>) -> Result<Vec<u8>>;

    /// Produce this stage's result; called while propagating back up the pipeline.
    async fn fetch(&self, session_id: Option<&str>) -> Result<Vec<u8>>;

    /// Execute the pipeline ending at this strategy.
    ///
    /// Calls `initialize()`, then `get()` on the upstream pipe (which repeats the
    /// protocol for every strategy towards the head of the chain) and finally returns
    /// the output of `fetch()`. A session is created when none is given.
    async fn get(&self, session_id: Option<&str>) -> Result<Vec<u8>> {
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => {
                let id = self.sessions().create_session().await?;
                debug!("Created session '{}' for {} pipeline", id, self.kind());
                id
            }
        };
        self.record_session(&session_id);

        debug!("Initializing {} '{}'", self.kind(), self.id().unwrap_or_default());
        self.initialize(Some(&session_id)).await?;

        if let Some(pipe) = self.upstream() {
            pipe.get(Some(&session_id)).await?;
        }

        debug!("Fetching {} '{}'", self.kind(), self.id().unwrap_or_default());
        self.fetch(Some(&session_id)).await
    }
}

/// Pipe object in a pipe-and-filter pattern: the link to a strategy's upstream neighbour
pub struct Pipe {
    input: Box<dyn Strategy>,
}

impl Pipe {
    pub fn new(input: Box<dyn Strategy>) -> Self {
        Self { input }
    }

    pub fn input(&self) -> &dyn Strategy {
        self.input.as_ref()
    }

    pub fn input_mut(&mut self) -> &mut dyn Strategy {
        self.input.as_mut()
    }

    pub fn into_input(self) -> Box<dyn Strategy> {
        self.input
    }

    /// Run the full protocol on the input strategy
    pub async fn get(&self, session_id: Option<&str>) -> Result<Vec<u8>> {
        self.input.get(session_id).await
    }
}

/// Pipe `upstream` into `downstream` and return `downstream`.
///
/// When `downstream` already has an upstream chain the new pipe is attached at the
/// head of that chain, so composition never drops an existing link.
pub fn compose(upstream: Box<dyn Strategy>, mut downstream: Box<dyn Strategy>) -> Box<dyn Strategy> {
    debug!(
        "Piping {} '{}' into {} '{}'",
        upstream.kind(),
        upstream.id().unwrap_or_default(),
        downstream.kind(),
        downstream.id().unwrap_or_default()
    );
    attach_at_head(downstream.as_mut(), Pipe::new(upstream));
    downstream
}

fn attach_at_head(node: &mut dyn Strategy, pipe: Pipe) {
    if let Some(existing) = node.upstream_mut() {
        debug!(
            "Downstream already has an upstream, attaching {} '{}' further up",
            pipe.input().kind(),
            pipe.input().id().unwrap_or_default()
        );
        attach_at_head(existing.input_mut(), pipe);
        return;
    }
    node.set_upstream(pipe);
}

/// Strategies from `terminal` back to the head of its chain
pub fn chain(terminal: &dyn Strategy) -> Vec<&dyn Strategy> {
    let mut stages = vec![terminal];
    let mut current = terminal;
    while let Some(pipe) = current.upstream() {
        current = pipe.input();
        stages.push(current);
    }
    stages
}

/// Fluent composition for boxed strategies
pub trait StrategyExt {
    /// Pipe `self` into `next`, returning `next`
    fn then(self, next: Box<dyn Strategy>) -> Box<dyn Strategy>;
}

impl StrategyExt for Box<dyn Strategy> {
    fn then(self, next: Box<dyn Strategy>) -> Box<dyn Strategy> {
        compose(self, next)
    }
}

impl std::ops::Shr for Box<dyn Strategy> {
    type Output = Box<dyn Strategy>;

    fn shr(self, next: Box<dyn Strategy>) -> Self::Output {
        compose(self, next)
    }
}
