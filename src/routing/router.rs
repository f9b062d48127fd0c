//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes per method, in declaration order
//! - Scan for the first route that matches and does not pass
//! - Answer 404 (root) or pass upward (nested) when nothing matched
//! - Expand named routes back into paths
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered scan per method (first match wins)
//! - A passing endpoint leaves no trace: the params and query slots are
//!   restored before the scan continues

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{RoutingError, RoutingResult};
use crate::observability::metrics::{self, DispatchOutcome};
use crate::routing::context::{RequestContext, DEFAULT_PARAMS_KEY};
use crate::routing::method::Method;
use crate::routing::params::Params;
use crate::routing::pattern::{AdditionalValues, Style};
use crate::routing::response::{Outcome, Response};
use crate::routing::route::{Route, TableEntry};

/// Options shared by every router in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Context slot matched params are stored under.
    pub params_key: String,
    /// Also merge matched params into the query slot.
    pub merge_query_params: bool,
    /// Template dialect for route paths.
    pub style: Style,
    /// Naming pattern for subjects, e.g. `%{name}Controller`.
    pub controller_format: Option<String>,
    /// Namespace qualifying every relative subject name.
    pub namespace: Option<String>,
    /// Redirect status used when a redirect does not pick one.
    pub default_redirect_status: u16,
    /// Leftover param policy for redirect templates.
    pub default_additional_values: AdditionalValues,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            params_key: DEFAULT_PARAMS_KEY.to_string(),
            merge_query_params: true,
            style: Style::Sinatra,
            controller_format: None,
            namespace: None,
            default_redirect_status: StatusCode::SEE_OTHER.as_u16(),
            default_additional_values: AdditionalValues::Ignore,
        }
    }
}

impl RouterOptions {
    /// The configured default redirect status, or 303 when out of range.
    pub fn redirect_status(&self) -> StatusCode {
        StatusCode::from_u16(self.default_redirect_status).unwrap_or(StatusCode::SEE_OTHER)
    }
}

/// Ordered route lists, one per method.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: [Vec<TableEntry>; Method::ALL.len()],
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, method: Method, entry: TableEntry) {
        self.routes[method.index()].push(entry);
    }

    pub fn get(&self, method: Method) -> &[TableEntry] {
        &self.routes[method.index()]
    }

    pub fn has_routes(&self, method: Method) -> bool {
        !self.routes[method.index()].is_empty()
    }

    /// Entries across all methods.
    pub fn len(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A name → route index that can be filled after the routes using it exist.
///
/// Redirect and action endpoints are built before their router is complete
/// but expand names at request time, so they hold a handle that the root
/// router fills once at the end of construction.
#[derive(Clone, Default)]
pub struct NamedRoutes(Arc<OnceLock<HashMap<String, Arc<Route>>>>);

impl NamedRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fill(&self, routes: HashMap<String, Arc<Route>>) {
        if self.0.set(routes).is_err() {
            tracing::warn!("Named route index was already filled");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Route>> {
        self.0.get().and_then(|routes| routes.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names in arbitrary order; empty until filled.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0
            .get()
            .into_iter()
            .flat_map(|routes| routes.keys().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.0.get().map(HashMap::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the path of route `name`.
    pub fn expand(&self, name: &str, params: &Params) -> RoutingResult<String> {
        let route = self
            .get(name)
            .ok_or_else(|| RoutingError::UnknownRouteName(name.to_string()))?;
        Ok(route.expand(params)?)
    }
}

impl fmt::Debug for NamedRoutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_tuple("NamedRoutes").field(&names).finish()
    }
}

/// An immutable, compiled router.
pub struct Router {
    table: RoutingTable,
    names: NamedRoutes,
    options: RouterOptions,
    root: bool,
}

impl Router {
    pub(crate) fn new(
        table: RoutingTable,
        names: NamedRoutes,
        options: RouterOptions,
        root: bool,
    ) -> Self {
        Self {
            table,
            names,
            options,
            root,
        }
    }

    /// Dispatch one request.
    ///
    /// Returns the first non-pass outcome of a matching route. When nothing
    /// answers, a root router responds 404 and a nested router passes.
    pub fn call(&self, ctx: &mut RequestContext) -> Outcome {
        let method = ctx.method();
        let path = ctx.path().to_string();
        let key = self.options.params_key.as_str();

        for entry in self.table.get(method) {
            let route = match entry {
                TableEntry::Nested(nested) => match nested.dispatch(&path, ctx) {
                    Some(outcome) => return outcome,
                    None => continue,
                },
                TableEntry::Simple(route) => route,
            };

            let Some(params) = route.match_path(&path, ctx) else {
                continue;
            };

            tracing::debug!(
                method = %method,
                path = %path,
                route = route.name().unwrap_or_default(),
                pattern = route.pattern(),
                "Route matched"
            );

            let saved_query = self.options.merge_query_params.then(|| {
                let saved = ctx.query_params.clone();
                ctx.query_params.merge(&params);
                saved
            });
            let saved_params = ctx.take_params(key);
            ctx.set_params(key, params);
            let saved_key = ctx.set_params_key(key);

            match route.endpoint().call(ctx) {
                Outcome::Pass => {
                    tracing::trace!(
                        method = %method,
                        path = %path,
                        pattern = route.pattern(),
                        "Endpoint passed, trying next route"
                    );
                    metrics::record_dispatch(DispatchOutcome::Pass);
                    if let Some(saved) = saved_query {
                        ctx.query_params = saved;
                    }
                    ctx.restore_params(key, saved_params);
                    ctx.set_params_key(&saved_key);
                }
                outcome => {
                    metrics::record_dispatch(DispatchOutcome::Matched);
                    return outcome;
                }
            }
        }

        if self.root {
            tracing::debug!(method = %method, path = %path, "No route matched");
            metrics::record_dispatch(DispatchOutcome::NotFound);
            Response::not_found().into()
        } else {
            Outcome::Pass
        }
    }

    /// Render the path of the route registered as `name`.
    pub fn expand(&self, name: &str, params: &Params) -> RoutingResult<String> {
        self.names.expand(name, params)
    }

    pub fn routes(&self) -> &RoutingTable {
        &self.table
    }

    pub fn named_routes(&self) -> &NamedRoutes {
        &self.names
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    /// One line per table entry, nested routers indented below their mount.
    pub fn listing(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for method in Method::ALL {
            self.list_method(method, 0, &mut lines);
        }
        lines
    }

    fn list_method(&self, method: Method, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        for entry in self.table.get(method) {
            match entry {
                TableEntry::Simple(route) => {
                    let name = route.name().map(|n| format!("  ({n})")).unwrap_or_default();
                    lines.push(format!("{indent}{:<8}{}{name}", method.as_str(), route.pattern()));
                }
                TableEntry::Nested(nested) => {
                    lines.push(format!("{indent}{:<8}{} =>", method.as_str(), nested.subpath()));
                    nested.router().list_method(method, depth + 1, lines);
                }
            }
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("root", &self.root)
            .field("routes", &self.table.len())
            .field("names", &self.names)
            .finish()
    }
}
