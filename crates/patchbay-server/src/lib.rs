//! Patchbay server dispatcher.
//!
//! Consumes the shared route configuration and produces the serving-side
//! bindings: an axum HTTP surface with one `POST /<route>` endpoint per
//! function, query, and HTTP-exposed pub route, plus locally callable
//! publish/subscribe operations for broker-backed routes.
//!
//! # Example
//!
//! ```rust,ignore
//! use patchbay::{Config, FunctionRegistry, MemoryBroker};
//! use patchbay_server::Dispatcher;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> patchbay::Result<()> {
//!     let config = Config::from_path("patchbay.config.json")?;
//!     let mut functions = FunctionRegistry::new();
//!     functions.register("gameComplete", |args| async move {
//!         Ok(serde_json::json!({ "done": args["game_id"] }))
//!     });
//!
//!     let store = config.server.database.as_ref().map(patchbay::open_store).transpose()?;
//!     let dispatcher = Dispatcher::new(config, functions, store, Some(Arc::new(MemoryBroker::new())))?;
//!     let addr = dispatcher.serve("127.0.0.1", 4200).await?;
//!     println!("serving on {addr}");
//!     Ok(())
//! }
//! ```

mod bindings;
mod server;

pub use server::{AppState, Dispatcher};
