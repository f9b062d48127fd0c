//! Resolving endpoint specs to callable handlers.
//!
//! # Responsibilities
//! - Turn a declared [`EndpointSpec`] into a callable handler plus the
//!   `controller` / `action` parameters the route carries
//! - Apply the naming pattern and namespace when looking names up
//! - Defer resolution to request time when the spec leaves the subject open
//!
//! # Resolution order
//! ```text
//! Handler / Reference            → used as-is, no params
//! "subject#action" / Pair        → subject looked up (pattern + namespace)
//!     action member exists       → member handler, action = member ref
//!     otherwise                  → subject handler, action = text
//! "#action" inside a namespace   → namespace member, else namespace handler
//! "#action" / "" otherwise       → DynamicEndpoint
//! ```

use std::fmt;
use std::sync::Arc;

use crate::endpoint::dynamic::DynamicEndpoint;
use crate::endpoint::inflect::{camelize, pluralize, singularize};
use crate::endpoint::{EndpointRef, Handler, Registry};
use crate::error::{RoutingError, RoutingResult};
use crate::routing::context::DEFAULT_PARAMS_KEY;
use crate::routing::params::{Params, ACTION, CONTROLLER};

/// The subject half of a spec: a name to look up or a resolved reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    Name(String),
    Ref(EndpointRef),
}

/// The action half of a spec.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Name(String),
    Ref(EndpointRef),
}

/// What a route declares as its target.
#[derive(Clone)]
pub enum EndpointSpec {
    /// A ready handler, used as-is.
    Handler(Handler),
    /// A registry entry, used as-is when callable.
    Reference(EndpointRef),
    /// Structured `{controller, action}` form.
    Pair {
        subject: Option<Subject>,
        action: Option<Action>,
    },
    /// `"subject#action"`, `"subject"`, `"#action"` or `""`.
    Text(String),
}

impl EndpointSpec {
    pub fn pair(subject: &str, action: &str) -> Self {
        EndpointSpec::Pair {
            subject: Some(Subject::Name(subject.to_string())),
            action: Some(Action::Name(action.to_string())),
        }
    }

    pub fn subject(subject: &str) -> Self {
        EndpointSpec::Pair {
            subject: Some(Subject::Name(subject.to_string())),
            action: None,
        }
    }

    pub fn action(action: &str) -> Self {
        EndpointSpec::Pair {
            subject: None,
            action: Some(Action::Name(action.to_string())),
        }
    }

    /// Neither subject nor action: resolved per request from the params.
    pub fn empty() -> Self {
        EndpointSpec::Pair {
            subject: None,
            action: None,
        }
    }

    /// Normalize textual specs into the pair form.
    fn parts(&self) -> Option<(Option<Subject>, Option<Action>)> {
        match self {
            EndpointSpec::Pair { subject, action } => Some((subject.clone(), action.clone())),
            EndpointSpec::Text(text) => {
                let (subject, action) = match text.split_once('#') {
                    Some((subject, action)) => (subject.trim(), Some(action.trim())),
                    None => (text.trim(), None),
                };
                Some((
                    (!subject.is_empty()).then(|| Subject::Name(subject.to_string())),
                    action
                        .filter(|a| !a.is_empty())
                        .map(|a| Action::Name(a.to_string())),
                ))
            }
            EndpointSpec::Handler(_) | EndpointSpec::Reference(_) => None,
        }
    }
}

impl From<&str> for EndpointSpec {
    fn from(s: &str) -> Self {
        EndpointSpec::Text(s.to_string())
    }
}

impl From<String> for EndpointSpec {
    fn from(s: String) -> Self {
        EndpointSpec::Text(s)
    }
}

impl From<Handler> for EndpointSpec {
    fn from(h: Handler) -> Self {
        EndpointSpec::Handler(h)
    }
}

impl From<EndpointRef> for EndpointSpec {
    fn from(r: EndpointRef) -> Self {
        EndpointSpec::Reference(r)
    }
}

impl fmt::Display for EndpointSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointSpec::Handler(_) => f.write_str("<handler>"),
            EndpointSpec::Reference(r) => f.write_str(r.name()),
            EndpointSpec::Text(t) => f.write_str(t),
            EndpointSpec::Pair { subject, action } => {
                match subject {
                    Some(Subject::Name(n)) => f.write_str(n)?,
                    Some(Subject::Ref(r)) => f.write_str(r.name())?,
                    None => {}
                }
                match action {
                    Some(Action::Name(n)) => write!(f, "#{n}"),
                    Some(Action::Ref(r)) => write!(f, "#{}", r.name()),
                    None => Ok(()),
                }
            }
        }
    }
}

impl fmt::Debug for EndpointSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EndpointSpec({self})")
    }
}

/// Naming rules applied to subject names.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Qualifies relative names, e.g. `Magic::Dragons`.
    pub namespace: Option<String>,
    /// Format applied to subject names, e.g. `%{name}Controller`.
    pub naming_pattern: Option<String>,
}

/// A handler together with the params it contributes to the route.
#[derive(Clone)]
pub struct Resolved {
    pub handler: Handler,
    pub params: Params,
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved").field("params", &self.params).finish()
    }
}

pub(crate) enum Lookup {
    Found(Resolved),
    Dynamic,
    Unresolved,
}

/// Resolves [`EndpointSpec`]s against a [`Registry`].
#[derive(Clone)]
pub struct Resolver {
    registry: Arc<dyn Registry>,
    config: ResolverConfig,
    params_key: String,
}

impl Resolver {
    pub fn new(registry: Arc<dyn Registry>, config: ResolverConfig) -> Self {
        Self {
            registry,
            config,
            params_key: DEFAULT_PARAMS_KEY.to_string(),
        }
    }

    /// Slot the dynamic endpoints read their params from.
    pub fn with_params_key(mut self, key: impl Into<String>) -> Self {
        self.params_key = key.into();
        self
    }

    pub fn params_key(&self) -> &str {
        &self.params_key
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a spec declared on a route.
    ///
    /// Open specs produce a [`DynamicEndpoint`]; static specs naming nothing
    /// callable fail with [`RoutingError::UnresolvedEndpoint`].
    pub fn resolve(&self, spec: &EndpointSpec) -> RoutingResult<Resolved> {
        match self.lookup(spec) {
            Lookup::Found(resolved) => Ok(resolved),
            Lookup::Unresolved => Err(RoutingError::unresolved(spec)),
            Lookup::Dynamic => {
                let (subject, action) = spec.parts().unwrap_or((None, None));
                let mut params = Params::new();
                if let Some(Action::Name(name)) = &action {
                    params.insert(ACTION, name.as_str());
                }
                Ok(Resolved {
                    handler: Arc::new(DynamicEndpoint::new(self.clone(), subject, action)),
                    params,
                })
            }
        }
    }

    pub(crate) fn lookup(&self, spec: &EndpointSpec) -> Lookup {
        match spec {
            EndpointSpec::Handler(handler) => Lookup::Found(Resolved {
                handler: handler.clone(),
                params: Params::new(),
            }),
            EndpointSpec::Reference(reference) => match reference.handler() {
                Some(handler) => Lookup::Found(Resolved {
                    handler: handler.clone(),
                    params: Params::new(),
                }),
                None => Lookup::Unresolved,
            },
            _ => match spec.parts() {
                Some((subject, action)) => self.lookup_parts(subject, action),
                None => Lookup::Unresolved,
            },
        }
    }

    fn lookup_parts(&self, subject: Option<Subject>, action: Option<Action>) -> Lookup {
        let subject = match subject {
            Some(Subject::Ref(reference)) => reference,
            Some(Subject::Name(name)) => match self.lookup_subject(&name) {
                Some(reference) => reference,
                None => return Lookup::Unresolved,
            },
            None => return self.lookup_in_namespace(action),
        };

        let mut params = Params::new().with(CONTROLLER, subject.clone());
        let handler = match action {
            None => subject.handler().cloned(),
            Some(Action::Ref(member)) => {
                params.insert(ACTION, member.clone());
                member.handler().cloned()
            }
            Some(Action::Name(name)) => match self.member(&subject, &name) {
                Some(member) => {
                    params.insert(ACTION, member.clone());
                    member.handler().cloned()
                }
                None => {
                    params.insert(ACTION, name);
                    subject.handler().cloned()
                }
            },
        };

        match handler {
            Some(handler) => Lookup::Found(Resolved { handler, params }),
            None => Lookup::Unresolved,
        }
    }

    /// Action-only (or empty) specs.
    fn lookup_in_namespace(&self, action: Option<Action>) -> Lookup {
        let (Some(namespace), Some(action)) = (self.namespace_ref(), action) else {
            return Lookup::Dynamic;
        };

        let member = match &action {
            Action::Ref(member) => Some(member.clone()),
            Action::Name(name) => self.member(&namespace, name),
        };
        if let Some((member, handler)) =
            member.and_then(|m| m.handler().cloned().map(|h| (m, h)))
        {
            return Lookup::Found(Resolved {
                handler,
                params: Params::new()
                    .with(CONTROLLER, namespace)
                    .with(ACTION, member),
            });
        }

        match (namespace.handler().cloned(), action) {
            (Some(handler), Action::Name(name)) => Lookup::Found(Resolved {
                handler,
                params: Params::new()
                    .with(CONTROLLER, namespace)
                    .with(ACTION, name),
            }),
            _ => Lookup::Dynamic,
        }
    }

    /// Apply the naming pattern and namespace to `name` and look it up.
    fn lookup_subject(&self, name: &str) -> Option<EndpointRef> {
        let camel = camelize(name);
        let (absolute, camel) = match camel.strip_prefix("::") {
            Some(rest) => (true, rest.to_string()),
            None => (false, camel),
        };

        let formatted = match &self.config.naming_pattern {
            Some(pattern) => pattern
                .replace("%{plural_name}", &pluralize(&camel))
                .replace("%{singular_name}", &singularize(&camel))
                .replace("%{name}", &camel),
            None => camel,
        };

        let qualified = match (&self.config.namespace, absolute) {
            (Some(namespace), false) => format!("{}::{}", camelize(namespace), formatted),
            _ => formatted,
        };

        self.registry.lookup(&qualified)
    }

    /// A callable member `Parent::CamelAction`.
    fn member(&self, parent: &EndpointRef, action: &str) -> Option<EndpointRef> {
        self.registry
            .lookup(&format!("{}::{}", parent.name(), camelize(action)))
            .filter(EndpointRef::is_callable)
    }

    fn namespace_ref(&self) -> Option<EndpointRef> {
        let namespace = self.config.namespace.as_deref()?;
        self.registry.lookup(&camelize(namespace))
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .field("params_key", &self.params_key)
            .finish()
    }
}
