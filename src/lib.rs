//! Client for composing and running OTE translation-strategy pipelines.
//!
//! Strategies (data resources, parsers, filters, functions, mappings and transformations)
//! are piped together with `>>` and executed with [`Strategy::get`], either by a remote OTE
//! service or in-process.

pub mod backends;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod util;

pub use backends::{Backend, StrategyTable};
pub use client::OteClient;
pub use config::{ClientConfig, Settings};
pub use error::{OteError, Result};
pub use pipeline::{Document, Pipe, Strategy, StrategyExt, StrategyKind, chain, compose};
pub use session::{LocalStore, RemoteSessionStore, SessionStore};
