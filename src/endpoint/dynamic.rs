//! Request-time endpoint resolution.

use std::fmt;

use axum::http::StatusCode;

use crate::endpoint::resolver::{Action, EndpointSpec, Lookup, Resolved, Resolver, Subject};
use crate::endpoint::Endpoint;
use crate::error::{RoutingError, RoutingResult};
use crate::observability::metrics::{self, DispatchOutcome};
use crate::routing::context::RequestContext;
use crate::routing::params::{ParamValue, Params, ACTION, CONTROLLER};
use crate::routing::response::{Outcome, Response};

/// Resolves its target from the matched `controller` / `action` params on
/// every call. Fixed parts declared on the route take precedence.
pub struct DynamicEndpoint {
    resolver: Resolver,
    subject: Option<Subject>,
    action: Option<Action>,
}

impl DynamicEndpoint {
    pub fn new(resolver: Resolver, subject: Option<Subject>, action: Option<Action>) -> Self {
        Self {
            resolver,
            subject,
            action,
        }
    }

    /// Resolve against the params of one request.
    pub fn resolve(&self, params: &Params) -> RoutingResult<Resolved> {
        let subject = self.subject.clone().or_else(|| {
            params.get(CONTROLLER).and_then(|value| match value {
                ParamValue::Endpoint(r) => Some(Subject::Ref(r.clone())),
                ParamValue::Text(name) if !name.is_empty() => Some(Subject::Name(name.clone())),
                _ => None,
            })
        });
        let action = self.action.clone().or_else(|| {
            params.get(ACTION).and_then(|value| match value {
                ParamValue::Endpoint(r) => Some(Action::Ref(r.clone())),
                ParamValue::Text(name) if !name.is_empty() => Some(Action::Name(name.clone())),
                _ => None,
            })
        });

        let spec = EndpointSpec::Pair { subject, action };
        match self.resolver.lookup(&spec) {
            Lookup::Found(resolved) => Ok(resolved),
            Lookup::Dynamic | Lookup::Unresolved => Err(RoutingError::unresolved(&spec)),
        }
    }
}

impl Endpoint for DynamicEndpoint {
    fn call(&self, ctx: &mut RequestContext) -> Outcome {
        let params = ctx
            .params(self.resolver.params_key())
            .cloned()
            .unwrap_or_default();

        match self.resolve(&params) {
            Ok(resolved) => resolved.handler.call(ctx),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    method = %ctx.method(),
                    path = %ctx.path(),
                    "Dynamic endpoint resolution failed"
                );
                metrics::record_dispatch(DispatchOutcome::Unresolved);
                Response::new(StatusCode::INTERNAL_SERVER_ERROR).into()
            }
        }
    }
}

impl fmt::Debug for DynamicEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicEndpoint")
            .field("subject", &self.subject)
            .field("action", &self.action)
            .finish()
    }
}
