//! The method table a server dispatches against.
//!
//! Dispatch is an explicit registration table, not reflection: the handler
//! set is built once, is auditable through [`MethodRegistry::methods`], and
//! lookup of an unregistered name yields `None` — which the dispatcher turns
//! into a method-not-found reply.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::HandlerError;

/// A remote-callable method.
///
/// Receives the request's `params` as its sole argument. No argument-shape
/// validation happens before invocation; a handler that cannot make sense of
/// its params decides itself whether that is a structured
/// [`HandlerError::Rpc`] (replied to the caller) or an
/// [`HandlerError::Internal`] fault (logged and dropped).
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, params: Value) -> Result<Value, HandlerError>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send,
{
    async fn call(&self, params: Value) -> Result<Value, HandlerError> {
        (self.0)(params).await
    }
}

/// Maps method-name strings to handlers, built once per server.
#[derive(Default)]
pub struct MethodRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `method`, replacing any previous entry.
    pub fn register<H>(mut self, method: impl Into<String>, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.handlers.insert(method.into(), Arc::new(handler));
        self
    }

    /// Registers an async closure as the handler for `method`.
    pub fn register_fn<F, Fut>(self, method: impl Into<String>, call: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.register(method, FnHandler(call))
    }

    pub fn get(&self, method: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// The registered method names, in no particular order.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods().collect();
        methods.sort_unstable();
        f.debug_struct("MethodRegistry")
            .field("methods", &methods)
            .finish()
    }
}
