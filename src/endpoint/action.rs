//! Inline action endpoints.

use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header::HeaderName, HeaderMap, HeaderValue, StatusCode};

use crate::endpoint::Endpoint;
use crate::error::RoutingResult;
use crate::routing::context::RequestContext;
use crate::routing::params::Params;
use crate::routing::response::{Outcome, Response};
use crate::routing::router::NamedRoutes;

/// Body of an inline action.
pub type ActionFn = Arc<dyn Fn(&mut ActionContext<'_>) + Send + Sync>;

/// The response under construction plus the request it answers.
pub struct ActionContext<'a> {
    params: Params,
    request: &'a mut RequestContext,
    names: &'a NamedRoutes,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl<'a> ActionContext<'a> {
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn request(&mut self) -> &mut RequestContext {
        self.request
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&mut self, body: impl Into<Bytes>) -> &mut Self {
        self.body = body.into();
        self
    }

    /// Render the path of a named route.
    pub fn expand(&self, name: &str, params: &Params) -> RoutingResult<String> {
        self.names.expand(name, params)
    }

    fn into_response(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

/// Runs an [`ActionFn`] against a fresh `200`, header-less, empty response.
pub struct ActionEndpoint {
    action: ActionFn,
    names: NamedRoutes,
    params_key: String,
}

impl ActionEndpoint {
    pub fn new(action: ActionFn, names: NamedRoutes, params_key: impl Into<String>) -> Self {
        Self {
            action,
            names,
            params_key: params_key.into(),
        }
    }
}

impl Endpoint for ActionEndpoint {
    fn call(&self, ctx: &mut RequestContext) -> Outcome {
        let params = ctx.params(&self.params_key).cloned().unwrap_or_default();
        let mut action = ActionContext {
            params,
            request: ctx,
            names: &self.names,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        (self.action)(&mut action);
        action.into_response().into()
    }
}

impl fmt::Debug for ActionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionEndpoint")
            .field("params_key", &self.params_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::context::DEFAULT_PARAMS_KEY;
    use crate::routing::method::Method;
    use axum::http::header;

    fn run(action: ActionFn, params: Params) -> Response {
        let endpoint = ActionEndpoint::new(action, NamedRoutes::new(), DEFAULT_PARAMS_KEY);
        let mut ctx = RequestContext::new(Method::Get, "/action");
        ctx.set_params(DEFAULT_PARAMS_KEY, params);
        endpoint.call(&mut ctx).into_response().unwrap()
    }

    #[test]
    fn test_defaults() {
        let response = run(Arc::new(|_: &mut ActionContext<'_>| {}), Params::new());
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.headers.is_empty());
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_setters_and_params() {
        let response = run(
            Arc::new(|ctx: &mut ActionContext<'_>| {
                let name = ctx.params().get_text("name").unwrap_or("nobody").to_string();
                ctx.status(StatusCode::CREATED)
                    .header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))
                    .body(format!("hello {name}"));
            }),
            Params::new().with("name", "smaug"),
        );
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.text(), "hello smaug");
    }

    #[test]
    fn test_expand_unknown_name_fails() {
        let response = run(
            Arc::new(|ctx: &mut ActionContext<'_>| {
                let body = match ctx.expand("nowhere", &Params::new()) {
                    Ok(path) => path,
                    Err(e) => e.to_string(),
                };
                ctx.body(body);
            }),
            Params::new(),
        );
        assert_eq!(response.text(), "no route named `nowhere`");
    }
}
