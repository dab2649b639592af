//! # yaxserver - High-level Axum server wrapper
//!
//! This crate provides a small, ergonomic abstraction for building HTTP
//! servers with Axum, hiding router plumbing and lifecycle handling.
//!
//! ## Features
//!
//! - Simple JSON routes with `add_route()`
//! - Sub-router mounting with `add_router()`
//! - Graceful shutdown on Ctrl+C
//! - Logging bootstrap from configuration (`tracing-subscriber`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use yaxserver::{ServerBuilder, init_logging};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_logging();
//!
//!     let mut server = ServerBuilder::new("MyAPI", "localhost", 3000).build();
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await;
//!     server.wait().await;
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::init_logging;
pub use server::{Server, ServerBuilder, ServerInfo};
