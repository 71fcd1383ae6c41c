//! Request-handling bindings, one shape per route kind.
//!
//! Each factory closes over the shared state and one descriptor and
//! yields the method router mounted at `POST /<route>`. Argument
//! resolution always completes before any transport action; any failure
//! becomes a structured 500 response, so no error escapes unconverted.

use crate::server::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{post, MethodRouter};
use axum::Json;
use patchbay::{
    params, pubsub, statement, ArgumentBag, FunctionRoute, PatchbayError, PubRoute, QueryRoute,
    Result, Row, Store,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

/// `POST /<route>` for a function route: resolve the body against the
/// ParamSpec, invoke the registered callable, reply with its result.
pub(crate) fn function_method(state: Arc<AppState>, route: FunctionRoute) -> MethodRouter {
    post(move |body: Option<Json<Value>>| {
        let state = state.clone();
        let route = route.clone();
        async move {
            let args = body_args(body);
            match invoke_function(&state, &route, args.as_ref()).await {
                Ok(value) => (StatusCode::OK, Json(value)).into_response(),
                Err(e) => {
                    error!("Function route '{}' failed: {}", route.name, e);
                    error_response("message", &e)
                }
            }
        }
    })
}

/// `POST /<route>` for a query route: resolve, build the statement,
/// execute against the store, reply with the row set.
pub(crate) fn query_method(state: Arc<AppState>, route: QueryRoute) -> MethodRouter {
    post(move |body: Option<Json<Value>>| {
        let state = state.clone();
        let route = route.clone();
        async move {
            let args = body_args(body);
            match run_query(&state, &route, args.as_ref()) {
                Ok(rows) => {
                    let rows: Vec<Value> = rows.into_iter().map(Value::Object).collect();
                    (StatusCode::OK, Json(Value::Array(rows))).into_response()
                }
                Err(e) => {
                    error!("Query route '{}' failed: {}", route.name, e);
                    error_response("error", &e)
                }
            }
        }
    })
}

/// `POST /<route>` for an HTTP-exposed pub route: accept `{args, message}`,
/// render the topic, publish, acknowledge with `{"success": true}`.
pub(crate) fn publish_method(state: Arc<AppState>, route: PubRoute) -> MethodRouter {
    post(move |body: Option<Json<Value>>| {
        let state = state.clone();
        let route = route.clone();
        async move {
            match publish_over_http(&state, &route, body).await {
                Ok(()) => (StatusCode::OK, Json(json!({"success": true}))).into_response(),
                Err(e) => {
                    error!("Pub route '{}' failed: {}", route.name, e);
                    error_response("message", &e)
                }
            }
        }
    })
}

async fn invoke_function(
    state: &AppState,
    route: &FunctionRoute,
    args: Option<&ArgumentBag>,
) -> Result<Value> {
    let resolved = params::resolve(&route.params, args)?;
    let callable =
        state
            .functions
            .get(&route.function)
            .ok_or_else(|| PatchbayError::UnknownFunction {
                name: route.function.clone(),
            })?;

    debug!("invoking callable '{}' for route '{}'", route.function, route.name);
    callable(resolved).await
}

fn run_query(
    state: &AppState,
    route: &QueryRoute,
    args: Option<&ArgumentBag>,
) -> Result<Vec<Row>> {
    let resolved = params::resolve(&route.params, args)?;
    let stmt = statement::build(route, state.config.default_table(), &resolved)?;
    state.store()?.execute(&stmt.sql, &stmt.params)
}

async fn publish_over_http(
    state: &AppState,
    route: &PubRoute,
    body: Option<Json<Value>>,
) -> Result<()> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let args = body
        .get("args")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let message = match body.get("message") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => {
            return Err(PatchbayError::MissingRequiredParameter {
                name: "message".to_string(),
            });
        }
        Some(other) => other.to_string(),
    };

    pubsub::publish(
        state.broker()?.as_ref(),
        state.config.topic_prefix(),
        &route.topic,
        &args,
        &message,
    )
    .await
}

/// The request body as an argument bag; non-object and absent bodies
/// count as an absent bag.
fn body_args(body: Option<Json<Value>>) -> Option<ArgumentBag> {
    body.and_then(|Json(value)| value.as_object().cloned())
}

/// Structured 500 response. Function and pub routes report under
/// `message`, query routes under `error`.
fn error_response(field: &'static str, err: &PatchbayError) -> Response {
    let mut body = serde_json::Map::new();
    body.insert(field.to_string(), Value::String(err.to_string()));
    (StatusCode::INTERNAL_SERVER_ERROR, Json(Value::Object(body))).into_response()
}
