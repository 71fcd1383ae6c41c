//! Patchbay client proxy.
//!
//! The calling-side half of the route-binding engine: consumes the same
//! route configuration the server dispatches on and exposes each route as
//! a locally callable operation with identical validation semantics.
//! Function and query routes go over HTTP; pub/sub routes talk to the
//! broker directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use patchbay::Config;
//! use patchbay_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> patchbay::Result<()> {
//!     let config = Config::from_path("patchbay.config.json")?;
//!     let client = Client::new(config)?;
//!
//!     let args = serde_json::json!({"game_id": 2}).as_object().unwrap().clone();
//!     let result = client.call("gameComplete", Some(&args)).await?;
//!     println!("{result}");
//!     Ok(())
//! }
//! ```

mod http;
mod proxy;

pub use http::{HttpTransport, ReqwestTransport};
pub use proxy::Client;
