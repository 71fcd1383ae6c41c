//! Client proxy generator.
//!
//! Builds locally invocable stubs from the same route mapping the server
//! dispatches on. Every stub validates with the shared resolver or
//! templater before touching a transport, so a malformed call fails
//! locally without a round trip, with exactly the error the server would
//! have produced.

use crate::http::{HttpTransport, ReqwestTransport};
use patchbay::{
    params, pubsub, ArgumentBag, Broker, Config, MessageHandler, PatchbayError, Result,
    RouteDescriptor, Subscription,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Calling-side proxy over a route configuration.
///
/// One instance exposes every configured route as an explicit operation:
/// [`call`](Client::call) for function and query routes,
/// [`publish`](Client::publish) / [`subscribe`](Client::subscribe) for
/// broker-backed routes.
pub struct Client {
    config: Config,
    by_name: HashMap<String, RouteDescriptor>,
    transport: Option<Arc<dyn HttpTransport>>,
    broker: Option<Arc<dyn Broker>>,
}

impl Client {
    /// Build a proxy from configuration.
    ///
    /// A reqwest transport is created when the configuration carries
    /// client HTTP settings; a broker is attached with
    /// [`with_broker`](Client::with_broker).
    pub fn new(config: Config) -> Result<Self> {
        let routes = patchbay::routes::parse_routes(&config.routes)?;
        let by_name = routes
            .into_iter()
            .map(|r| (r.name().to_string(), r))
            .collect();

        let transport: Option<Arc<dyn HttpTransport>> = config
            .client
            .http
            .as_ref()
            .map(|http| Arc::new(ReqwestTransport::new(http)) as Arc<dyn HttpTransport>);

        Ok(Self {
            config,
            by_name,
            transport,
            broker: None,
        })
    }

    /// Replace the HTTP transport.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Attach the broker used by pub/sub routes.
    pub fn with_broker(mut self, broker: Arc<dyn Broker>) -> Self {
        self.broker = Some(broker);
        self
    }

    /// Configured route names (order not guaranteed).
    pub fn route_names(&self) -> Vec<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }

    /// Invoke a function or query route.
    ///
    /// Arguments are resolved locally against the route's ParamSpec, then
    /// the resolved bag is posted to `POST /<route>`.
    pub async fn call(&self, route: &str, args: Option<&ArgumentBag>) -> Result<Value> {
        let spec = match self.lookup(route)? {
            RouteDescriptor::Function(r) => &r.params,
            RouteDescriptor::Query(r) => &r.params,
            other => {
                return Err(PatchbayError::execution(format!(
                    "Route '{}' is not callable over HTTP",
                    other.name()
                )));
            }
        };

        let resolved = params::resolve(spec, args)?;
        debug!("calling route '{}'", route);
        self.transport()?
            .post(&format!("/{}", route), &Value::Object(resolved))
            .await
    }

    /// Publish one message on a pub route, directly through the broker.
    pub async fn publish(&self, route: &str, args: &ArgumentBag, message: &str) -> Result<()> {
        match self.lookup(route)? {
            RouteDescriptor::Pub(r) => {
                pubsub::publish(
                    self.broker()?.as_ref(),
                    self.config.topic_prefix(),
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

    /// Open a subscription on a sub route. The handler fires once per
    /// inbound message for as long as the returned handle lives.
    pub async fn subscribe(
        &self,
        route: &str,
        args: &ArgumentBag,
        handler: MessageHandler,
    ) -> Result<Subscription> {
        match self.lookup(route)? {
            RouteDescriptor::Sub(r) => {
                pubsub::subscribe(
                    self.broker()?.as_ref(),
                    self.config.topic_prefix(),
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

    fn transport(&self) -> Result<&Arc<dyn HttpTransport>> {
        self.transport.as_ref().ok_or_else(|| PatchbayError::Config {
            message: "No HTTP client configured".to_string(),
        })
    }

    fn broker(&self) -> Result<&Arc<dyn Broker>> {
        self.broker.as_ref().ok_or_else(|| PatchbayError::Config {
            message: "No broker configured".to_string(),
        })
    }
}
