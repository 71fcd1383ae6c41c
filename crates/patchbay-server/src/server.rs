//! Server dispatcher and HTTP surface.
//!
//! The dispatcher turns parsed route descriptors into concrete bindings:
//! one `POST /<route>` endpoint per function, query, and HTTP-exposed pub
//! route, plus locally callable publish/subscribe operations for the
//! broker-backed routes.

use crate::bindings;
use axum::routing::get;
use axum::{Json, Router};
use patchbay::{
    pubsub, ArgumentBag, Broker, Config, FunctionRegistry, MessageHandler, PatchbayError, Result,
    RouteDescriptor, Store, Subscription,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared state every binding closes over.
pub struct AppState {
    /// Process configuration, immutable after construction.
    pub config: Config,
    /// Registered callables for function routes.
    pub functions: FunctionRegistry,
    /// Data-store collaborator, present when query routes exist.
    pub store: Option<Arc<dyn Store>>,
    /// Broker collaborator, present when pub/sub routes exist.
    pub broker: Option<Arc<dyn Broker>>,
}

impl AppState {
    pub(crate) fn broker(&self) -> Result<&Arc<dyn Broker>> {
        self.broker.as_ref().ok_or_else(|| PatchbayError::Config {
            message: "No broker configured".to_string(),
        })
    }

    pub(crate) fn store(&self) -> Result<&Arc<dyn Store>> {
        self.store.as_ref().ok_or_else(|| PatchbayError::Config {
            message: "No database configured".to_string(),
        })
    }
}

/// Server-side route dispatcher.
///
/// Construction parses the route mapping once; every binding afterwards
/// dispatches over the typed descriptors.
pub struct Dispatcher {
    state: Arc<AppState>,
    routes: Vec<RouteDescriptor>,
    by_name: HashMap<String, RouteDescriptor>,
}

impl Dispatcher {
    /// Build a dispatcher from configuration and collaborators.
    ///
    /// Fails fast on malformed routes, on query routes without a store,
    /// and on pub/sub routes without a broker. A function route whose
    /// callable is not registered only warns here; invoking it yields a
    /// structured error response instead of refusing to serve the rest.
    pub fn new(
        config: Config,
        functions: FunctionRegistry,
        store: Option<Arc<dyn Store>>,
        broker: Option<Arc<dyn Broker>>,
    ) -> Result<Self> {
        let routes = patchbay::routes::parse_routes(&config.routes)?;

        for route in &routes {
            match route {
                RouteDescriptor::Query(_) if store.is_none() => {
                    return Err(PatchbayError::Config {
                        message: format!(
                            "Route '{}' needs a database backend, none configured",
                            route.name()
                        ),
                    });
                }
                RouteDescriptor::Sub(_) | RouteDescriptor::Pub(_) if broker.is_none() => {
                    return Err(PatchbayError::Config {
                        message: format!(
                            "Route '{}' needs a broker, none configured",
                            route.name()
                        ),
                    });
                }
                RouteDescriptor::Function(r) if functions.get(&r.function).is_none() => {
                    warn!("Function route '{}' has no callable '{}' registered", r.name, r.function);
                }
                _ => {}
            }
        }

        let by_name = routes
            .iter()
            .map(|r| (r.name().to_string(), r.clone()))
            .collect();

        Ok(Self {
            state: Arc::new(AppState {
                config,
                functions,
                store,
                broker,
            }),
            routes,
            by_name,
        })
    }

    /// Parsed descriptors, in configuration order.
    pub fn descriptors(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Build the HTTP router: `GET /health` plus one `POST /<route>` per
    /// function route, query route, and HTTP-exposed pub route.
    pub fn router(&self) -> Router {
        let mut app = Router::new().route("/health", get(handle_health));

        for route in &self.routes {
            match route {
                RouteDescriptor::Function(r) => {
                    app = app.route(
                        &format!("/{}", r.name),
                        bindings::function_method(self.state.clone(), r.clone()),
                    );
                }
                RouteDescriptor::Query(r) => {
                    app = app.route(
                        &format!("/{}", r.name),
                        bindings::query_method(self.state.clone(), r.clone()),
                    );
                }
                RouteDescriptor::Pub(r) if r.http => {
                    app = app.route(
                        &format!("/{}", r.name),
                        bindings::publish_method(self.state.clone(), r.clone()),
                    );
                }
                // Sub routes and non-HTTP pub routes have no HTTP surface.
                RouteDescriptor::Pub(_) | RouteDescriptor::Sub(_) => {}
            }
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        app.layer(cors)
    }

    /// Bind the HTTP surface and serve it in the background.
    ///
    /// Returns the actual address (useful when port=0).
    pub async fn serve(&self, host: &str, port: u16) -> Result<SocketAddr> {
        let app = self.router();

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| PatchbayError::Config {
                message: format!("Invalid listen address: {}", e),
            })?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| PatchbayError::transport(format!("Failed to bind {}: {}", addr, e)))?;
        let actual_addr = listener
            .local_addr()
            .map_err(|e| PatchbayError::transport(e.to_string()))?;

        info!("Server listening on {}", actual_addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Ok(actual_addr)
    }

    /// Publish one message on a pub route.
    pub async fn publish(&self, route: &str, args: &ArgumentBag, message: &str) -> Result<()> {
        match self.lookup(route)? {
            RouteDescriptor::Pub(r) => {
                pubsub::publish(
                    self.state.broker()?.as_ref(),
                    self.state.config.topic_prefix(),
                    &r.topic,
                    args,
                    message,
                )
                .await
            }
            other => Err(PatchbayError::execution(format!(
                "Route '{}' is not a publish route",
                other.name()
            ))),
        }
    }

    /// Open a subscription on a sub route. The subscription lives as long
    /// as the returned handle.
    pub async fn subscribe(
        &self,
        route: &str,
        args: &ArgumentBag,
        handler: MessageHandler,
    ) -> Result<Subscription> {
        match self.lookup(route)? {
            RouteDescriptor::Sub(r) => {
                pubsub::subscribe(
                    self.state.broker()?.as_ref(),
                    self.state.config.topic_prefix(),
                    &r.topic,
                    args,
                    handler,
                )
                .await
            }
            other => Err(PatchbayError::execution(format!(
                "Route '{}' is not a subscribe route",
                other.name()
            ))),
        }
    }

    fn lookup(&self, route: &str) -> Result<&RouteDescriptor> {
        self.by_name
            .get(route)
            .ok_or_else(|| PatchbayError::UnknownRoute {
                name: route.to_string(),
            })
    }
}

/// Health check endpoint.
async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}
