//! Per-request state handed down the middleware chain.

use std::collections::HashMap;

use axum::http::Extensions;

use crate::routing::method::Method;
use crate::routing::params::Params;

/// Default slot name for matched route parameters.
pub const DEFAULT_PARAMS_KEY: &str = "router.params";

/// The abstract request a [`Router`](crate::routing::Router) dispatches.
///
/// Every request gets its own context; middleware may read and annotate it.
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    path: String,
    query: Option<String>,
    /// Server variables and request headers (lower-cased names).
    pub env: HashMap<String, String>,
    /// Merged query parameters; pre-filled from the query string.
    pub query_params: Params,
    /// Typed annotations added by middleware.
    pub extensions: Extensions,
    slots: HashMap<String, Params>,
    params_key: String,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            env: HashMap::new(),
            query_params: Params::new(),
            extensions: Extensions::new(),
            slots: HashMap::new(),
            params_key: DEFAULT_PARAMS_KEY.to_string(),
        }
    }

    /// Build a context from a request target such as `/users?page=2`.
    ///
    /// The query string is decoded into [`RequestContext::query_params`].
    pub fn from_target(method: Method, target: &str) -> Self {
        match target.split_once('?') {
            Some((path, query)) => Self::new(method, path).with_query(query),
            None => Self::new(method, target),
        }
    }

    /// Attach a raw query string and decode it into the query slot.
    pub fn with_query(mut self, query: &str) -> Self {
        self.query_params = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        self.query = Some(query.to_string());
        self
    }

    /// Builder-style insert into [`RequestContext::env`].
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Parameters stored under `key`, if the router has set any.
    pub fn params(&self, key: &str) -> Option<&Params> {
        self.slots.get(key)
    }

    /// Slot the dispatching router wrote its matched params to.
    ///
    /// [`DEFAULT_PARAMS_KEY`] until a router with another key dispatches.
    pub fn params_key(&self) -> &str {
        &self.params_key
    }

    /// Parameters of the route currently being dispatched.
    pub fn route_params(&self) -> Option<&Params> {
        self.params(&self.params_key)
    }

    /// Returns the previous key so a passing route can put it back.
    pub(crate) fn set_params_key(&mut self, key: &str) -> String {
        std::mem::replace(&mut self.params_key, key.to_string())
    }

    pub fn set_params(&mut self, key: impl Into<String>, params: Params) {
        self.slots.insert(key.into(), params);
    }

    pub(crate) fn take_params(&mut self, key: &str) -> Option<Params> {
        self.slots.remove(key)
    }

    pub(crate) fn restore_params(&mut self, key: &str, previous: Option<Params>) {
        match previous {
            Some(p) => {
                self.slots.insert(key.to_string(), p);
            }
            None => {
                self.slots.remove(key);
            }
        }
    }
}
