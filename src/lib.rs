//! # syncable-mcp
//!
//! An MCP (Model Context Protocol) tool server exposing containerization and
//! deployment tooling as a chain of callable tools: analyze a repository,
//! generate and validate a Dockerfile, build/scan/tag/push the image,
//! generate and validate Kubernetes manifests, then prepare a cluster,
//! deploy, and verify. Every tool call flows through [`dispatch::Dispatcher`],
//! which looks the tool up in [`catalog`], checks its precondition against
//! the session's [`session::WorkflowState`], runs the tool body, and folds
//! the outcome into a [`dispatch::ToolOutput`].
//!
//! The binary (`src/main.rs`) wires a [`dispatch::Dispatcher`] to an
//! `rmcp`-based [`server::McpToolServer`] and serves it over stdio; this
//! library crate is structured so the dispatcher, catalog, and every
//! validator/generator underneath it can also be exercised directly in
//! tests without a live MCP transport.

pub mod analyzer;
pub mod catalog;
pub mod cli;
pub mod collaborators;
pub mod common;
pub mod config;
pub mod dispatch;
pub mod dockerfile;
pub mod engine;
pub mod error;
pub mod fsops;
pub mod k8s;
pub mod progress;
pub mod scan;
pub mod server;
pub mod session;
pub mod templates;
pub mod validate;

pub use dispatch::Dispatcher;
pub use error::{AppError, Result};
pub use server::McpToolServer;

/// The current version of the server.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
