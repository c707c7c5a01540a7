//! In-process backend: strategies run by plugins against a [`LocalStore`](crate::session::LocalStore)

pub mod plugins;
pub mod strategy;

pub use plugins::{Plugin, PluginContext, PluginRegistry};
pub use strategy::LocalStrategy;
