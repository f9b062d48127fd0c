//! Route descriptors accumulated by the [`Builder`](super::Builder).
//!
//! A descriptor ("sign") is inert data until the builder compiles it; the
//! fluent setters only record what was declared.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::builder::Builder;
use crate::endpoint::action::{ActionEndpoint, ActionFn};
use crate::endpoint::chain::{self, Middleware};
use crate::endpoint::inflect::camelize;
use crate::endpoint::redirect::{
    ComputeFn, RedirectContext, RedirectEndpoint, RedirectTarget, PERMANENT, TEMPORARY,
};
use crate::endpoint::{ActionContext, Endpoint, EndpointSpec, Registry, Resolver, ResolverConfig};
use crate::error::{RoutingError, RoutingResult};
use crate::routing::matcher::{Constraint, Constraints};
use crate::routing::method::Method;
use crate::routing::params::{ParamValue, Params};
use crate::routing::pattern::{AdditionalValues, Capture, Pattern, PatternOptions};
use crate::routing::route::Route;
use crate::routing::router::{NamedRoutes, RouterOptions};

/// One declared entry, in declaration order.
pub(crate) enum Sign {
    Path(PathSign),
    Redirect(RedirectSign),
    Nested(NestedSign),
}

impl Sign {
    /// Scope-local middleware that must run inside the builder's own stack.
    pub(crate) fn prepend_middlewares(&mut self, middlewares: &[Middleware]) {
        let target = match self {
            Sign::Path(sign) => &mut sign.middlewares,
            Sign::Nested(sign) => &mut sign.middlewares,
            Sign::Redirect(_) => return,
        };
        let mut combined = middlewares.to_vec();
        combined.append(target);
        *target = combined;
    }
}

/// Everything the compile step needs from the enclosing scope.
pub(crate) struct CompileScope<'a> {
    pub options: &'a RouterOptions,
    pub registry: &'a Arc<dyn Registry>,
    pub middlewares: &'a [Middleware],
    pub names: &'a NamedRoutes,
}

/// A route to an endpoint for one or more methods.
pub struct PathSign {
    pattern: String,
    methods: Vec<Method>,
    spec: Option<EndpointSpec>,
    action: Option<ActionFn>,
    name: Option<String>,
    params: Params,
    constraints: Constraints,
    capture: Option<Capture>,
    except: Option<String>,
    namespace: Vec<String>,
    middlewares: Vec<Middleware>,
}

impl PathSign {
    pub(crate) fn new(pattern: String, methods: Vec<Method>, namespace: Vec<String>) -> Self {
        Self {
            pattern,
            methods,
            spec: None,
            action: None,
            name: None,
            params: Params::new(),
            constraints: Constraints::default(),
            capture: None,
            except: None,
            namespace,
            middlewares: Vec::new(),
        }
    }

    /// The endpoint: `"users#show"`, a [`Handler`](crate::endpoint::Handler),
    /// an [`EndpointRef`](crate::endpoint::EndpointRef) or a pair.
    ///
    /// Without a target the route resolves `controller` / `action` from its
    /// params on every request.
    pub fn to(&mut self, spec: impl Into<EndpointSpec>) -> &mut Self {
        self.spec = Some(spec.into());
        self.action = None;
        self
    }

    /// Shorthand for `to` with any [`Endpoint`] value.
    pub fn to_endpoint(&mut self, endpoint: impl Endpoint + 'static) -> &mut Self {
        let handler: crate::endpoint::Handler = Arc::new(endpoint);
        self.to(handler)
    }

    /// Answer with an inline action.
    pub fn to_action<F>(&mut self, action: F) -> &mut Self
    where
        F: Fn(&mut ActionContext<'_>) + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self.spec = None;
        self
    }

    /// Name the route; inside namespaces the name is prefixed
    /// (`magic_dragons`).
    pub fn name(&mut self, name: &str) -> &mut Self {
        let mut parts = self.namespace.clone();
        parts.push(name.to_string());
        self.name = Some(parts.join("_"));
        self
    }

    /// Name the route with the namespace in the middle (`new_magic_dragon`).
    pub fn name_with_postfix(&mut self, name: &str, postfix: &str) -> &mut Self {
        let mut parts = vec![name.to_string()];
        parts.extend(self.namespace.iter().cloned());
        parts.push(postfix.to_string());
        self.name = Some(parts.join("_"));
        self
    }

    /// Default params; they override resolved `controller` / `action`
    /// and are themselves overridden by captures.
    pub fn params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        for (key, value) in params {
            self.params.insert(key, value);
        }
        self
    }

    pub fn constraint(&mut self, constraint: impl Constraint + 'static) -> &mut Self {
        self.constraints.push(Arc::new(constraint));
        self
    }

    pub fn capture(&mut self, capture: Capture) -> &mut Self {
        self.capture = Some(capture);
        self
    }

    /// Reject paths matching `pattern` even if the route pattern matches.
    pub fn except(&mut self, pattern: &str) -> &mut Self {
        self.except = Some(pattern.to_string());
        self
    }

    /// Restrict an `any` route to the given methods.
    pub fn via(&mut self, methods: &[Method]) -> &mut Self {
        let mut unique = Vec::new();
        for method in methods {
            if !unique.contains(method) {
                unique.push(*method);
            }
        }
        self.methods = unique;
        self
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn route_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn compile(self, scope: &CompileScope<'_>) -> RoutingResult<(Vec<Method>, Route)> {
        let options = scope.options;
        let matcher = Pattern::compile(
            &self.pattern,
            &PatternOptions {
                style: options.style,
                capture: self.capture,
                except: self.except,
                additional_values: AdditionalValues::Ignore,
            },
        )?;

        let spec = match (self.action, self.spec) {
            (Some(action), _) => EndpointSpec::Handler(Arc::new(ActionEndpoint::new(
                action,
                scope.names.clone(),
                options.params_key.clone(),
            ))),
            (None, Some(spec)) => spec,
            (None, None) => EndpointSpec::empty(),
        };

        let resolver = Resolver::new(
            scope.registry.clone(),
            ResolverConfig {
                namespace: qualify(options.namespace.as_deref(), &self.namespace),
                naming_pattern: options.controller_format.clone(),
            },
        )
        .with_params_key(options.params_key.clone());
        let resolved = resolver.resolve(&spec)?;

        let mut stack = scope.middlewares.to_vec();
        stack.extend(self.middlewares);
        let endpoint = chain::build(resolved.handler, &stack);

        let route = Route::new(Arc::new(matcher), endpoint)
            .with_params(resolved.params.merged(&self.params))
            .with_constraints(self.constraints)
            .with_name(self.name);

        Ok((self.methods, route))
    }
}

/// A route answering every method with a redirect.
pub struct RedirectSign {
    pattern: String,
    target: Option<RedirectTo>,
    status: Option<StatusCode>,
    additional: Option<AdditionalValues>,
    constraints: Constraints,
}

enum RedirectTo {
    Path(String),
    Named(String),
    Computed(ComputeFn),
}

impl RedirectSign {
    pub(crate) fn new(pattern: String) -> Self {
        Self {
            pattern,
            target: None,
            status: None,
            additional: None,
            constraints: Constraints::default(),
        }
    }

    /// Redirect to a template expanded with the matched params.
    pub fn to_path(&mut self, path: &str) -> &mut Self {
        self.target = Some(RedirectTo::Path(path.to_string()));
        self
    }

    /// Like [`RedirectSign::to_path`], choosing the leftover param policy.
    pub fn to_path_with(&mut self, path: &str, additional: AdditionalValues) -> &mut Self {
        self.additional = Some(additional);
        self.to_path(path)
    }

    /// Redirect to a named route.
    pub fn to_named(&mut self, name: &str) -> &mut Self {
        self.target = Some(RedirectTo::Named(name.to_string()));
        self
    }

    /// Redirect to a location computed per request.
    pub fn to_computed<F>(&mut self, compute: F) -> &mut Self
    where
        F: Fn(&RedirectContext<'_>) -> RoutingResult<String> + Send + Sync + 'static,
    {
        self.target = Some(RedirectTo::Computed(Arc::new(compute)));
        self
    }

    pub fn permanent(&mut self) -> &mut Self {
        self.status = Some(PERMANENT);
        self
    }

    pub fn temporary(&mut self) -> &mut Self {
        self.status = Some(TEMPORARY);
        self
    }

    pub fn with_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = Some(status);
        self
    }

    pub fn constraint(&mut self, constraint: impl Constraint + 'static) -> &mut Self {
        self.constraints.push(Arc::new(constraint));
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn compile(self, scope: &CompileScope<'_>) -> RoutingResult<Route> {
        let options = scope.options;
        let matcher = Pattern::compile(
            &self.pattern,
            &PatternOptions {
                style: options.style,
                ..PatternOptions::default()
            },
        )?;

        let target = match self.target {
            Some(RedirectTo::Path(path)) => {
                let expander = Pattern::compile(
                    &path,
                    &PatternOptions {
                        style: options.style,
                        additional_values: self
                            .additional
                            .unwrap_or(options.default_additional_values),
                        ..PatternOptions::default()
                    },
                )?;
                RedirectTarget::Path(Arc::new(expander))
            }
            Some(RedirectTo::Named(name)) => RedirectTarget::Named(name),
            Some(RedirectTo::Computed(compute)) => RedirectTarget::Computed(compute),
            None => {
                return Err(RoutingError::unresolved(format!(
                    "redirect from {}",
                    self.pattern
                )))
            }
        };

        let endpoint = RedirectEndpoint::new(
            target,
            self.status.unwrap_or_else(|| options.redirect_status()),
            scope.names.clone(),
            options.params_key.clone(),
        );

        Ok(Route::new(Arc::new(matcher), Arc::new(endpoint)).with_constraints(self.constraints))
    }
}

/// A sub-router mounted under a prefix.
pub(crate) struct NestedSign {
    pub subpath: String,
    pub builder: Builder,
    pub middlewares: Vec<Middleware>,
}

/// `Admin` + `["magic", "dragons"]` → `Admin::Magic::Dragons`.
fn qualify(global: Option<&str>, scope: &[String]) -> Option<String> {
    let parts: Vec<String> = global
        .into_iter()
        .map(str::to_string)
        .chain(scope.iter().cloned())
        .filter(|part| !part.is_empty())
        .map(|part| camelize(&part))
        .collect();

    (!parts.is_empty()).then(|| parts.join("::"))
}
