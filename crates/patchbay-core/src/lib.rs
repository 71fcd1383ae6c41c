//! Patchbay - declarative route-binding engine.
//!
//! One configuration object describes named routes, each tagged with a
//! kind: remote function call (`javascript/function`), parametrized data
//! query (`db/postgres`), or templated publish/subscribe channel
//! (`websockets/pub` / `websockets/sub`). This crate holds the shared
//! engine both sides are built from: route descriptors, argument
//! resolution, topic templating, statement building, and the collaborator
//! interfaces for the data store and the broker.
//!
//! The server dispatcher lives in `patchbay-server`, the client proxy in
//! `patchbay-client`. Both interpret the same descriptors with the same
//! validation, so adding a route to the configuration changes behavior on
//! both sides without code changes.
//!
//! # Example
//!
//! ```rust
//! use patchbay::{params, routes, topic};
//! use serde_json::json;
//!
//! let descriptors = routes::parse_routes(
//!     json!({
//!         "pubGame": { "type": "websockets/pub", "topic": "games/{game_id}", "http": true }
//!     })
//!     .as_object()
//!     .unwrap(),
//! )
//! .unwrap();
//! assert_eq!(descriptors[0].name(), "pubGame");
//!
//! let args = json!({"game_id": 1}).as_object().unwrap().clone();
//! assert_eq!(topic::render("/", "games/{game_id}", &args).unwrap(), "/games/1");
//! # let _ = params::resolve(&Default::default(), None).unwrap();
//! ```

pub mod broker;
pub mod config;
pub mod error;
pub mod functions;
pub mod params;
pub mod pubsub;
pub mod routes;
pub mod statement;
pub mod store;
pub mod topic;

// Re-export commonly used types
pub use broker::{Broker, BrokerConnection, MemoryBroker, MessageHandler, Subscription};
pub use config::{BrokerSection, ClientSection, Config, DatabaseSection, HttpSection, ServerSection};
pub use error::{PatchbayError, Result};
pub use functions::{Callable, FunctionRegistry};
pub use params::{ArgumentBag, ParamSpec};
pub use routes::{
    FunctionRoute, PubRoute, QueryMethod, QueryRoute, RouteDescriptor, SubRoute,
};
pub use statement::Statement;
pub use store::{open_store, Row, SqliteStore, Store};
