//! # MSSQL Query Gateway
//!
//! A Model Context Protocol (MCP) server that brokers SQL against one or
//! more Microsoft SQL Server instances selected by logical connection name.
//!
//! This crate provides:
//! - **Connection registry**: named connections from numbered environment slots
//! - **Tools**: run SQL, list databases and tables, describe a table
//! - **PII masking**: manifest-driven masking of query results
//!
//! ## Architecture
//!
//! Each tool call opens one connection, runs one statement and closes the
//! connection. The registry and masking rules are built at startup and are
//! read-only afterwards.

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod handlers;
pub mod masking;
pub mod operations;
pub mod registry;
pub mod server;
pub mod state;
pub mod tools;

pub use config::ConnectionConfig;
pub use error::ServerError;
pub use registry::Registry;
pub use server::MssqlGatewayServer;
pub use state::{AppContext, SharedContext};
