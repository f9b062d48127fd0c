//! Middleware composition.
//!
//! A middleware is a [`tower::Layer`] from [`Handler`] to [`Handler`]. The
//! first middleware registered in a scope ends up outermost.

use std::fmt;
use std::sync::Arc;

use tower::layer::{layer_fn, Layer};

use crate::endpoint::Handler;
use crate::routing::context::RequestContext;
use crate::routing::response::Outcome;

type DynLayer = dyn Layer<Handler, Service = Handler> + Send + Sync;

/// A wrapper applied around route endpoints.
#[derive(Clone)]
pub struct Middleware {
    name: String,
    layer: Arc<DynLayer>,
}

impl Middleware {
    /// Wrap any layer producing handlers.
    pub fn new<L>(name: impl Into<String>, layer: L) -> Self
    where
        L: Layer<Handler, Service = Handler> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            layer: Arc::new(layer),
        }
    }

    /// Build from a function that wraps the inner handler.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self::new(name, layer_fn(f))
    }

    /// Build from a function that sees the request and the next handler.
    ///
    /// ```ignore
    /// Middleware::around("auth", |ctx, next| {
    ///     if ctx.env.contains_key("authorization") {
    ///         next.call(ctx)
    ///     } else {
    ///         Response::new(StatusCode::UNAUTHORIZED).into()
    ///     }
    /// });
    /// ```
    pub fn around<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut RequestContext, &Handler) -> Outcome + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::from_fn(name, move |inner: Handler| -> Handler {
            let f = f.clone();
            Arc::new(move |ctx: &mut RequestContext| f(ctx, &inner))
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wrap(&self, inner: Handler) -> Handler {
        self.layer.layer(inner)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Middleware").field(&self.name).finish()
    }
}

/// Compose `middlewares` around `endpoint`; index 0 becomes outermost.
pub fn build(endpoint: Handler, middlewares: &[Middleware]) -> Handler {
    middlewares
        .iter()
        .rev()
        .fold(endpoint, |inner, middleware| middleware.wrap(inner))
}
