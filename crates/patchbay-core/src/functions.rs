//! Callable registry for function routes.
//!
//! Function routes declare their parameter names in configuration; the
//! registry maps the declared callable name to an async closure that
//! receives the resolved argument bag. No runtime introspection of the
//! callable is involved.

use crate::error::Result;
use crate::params::ArgumentBag;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// An async callable bound to a function route.
///
/// Receives the fully resolved argument bag and completes with the
/// route's result. Synchronous work just resolves immediately.
pub type Callable = Arc<dyn Fn(ArgumentBag) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Name -> callable mapping consumed by the server dispatcher.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    inner: HashMap<String, Callable>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callable under a name, replacing any previous entry.
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(ArgumentBag) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.inner
            .insert(name.into(), Arc::new(move |args| func(args).boxed()));
    }

    /// Look up a callable by name.
    pub fn get(&self, name: &str) -> Option<Callable> {
        self.inner.get(name).cloned()
    }

    /// Registered callable names.
    pub fn names(&self) -> Vec<&str> {
        self.inner.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("names", &self.names())
            .finish()
    }
}
