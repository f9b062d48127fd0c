//! Controllers: named action tables behind one endpoint.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::endpoint::Endpoint;
use crate::routing::context::RequestContext;
use crate::routing::params::{ParamValue, Params, ACTION};
use crate::routing::response::{Outcome, Response};

type ActionHandler = Arc<dyn Fn(&Params, &mut RequestContext) -> Outcome + Send + Sync>;

/// Dispatches on the textual `action` route param.
///
/// Params come from the slot of the router that is dispatching. A missing or
/// unknown action answers 404.
#[derive(Clone)]
pub struct Controller {
    name: String,
    actions: BTreeMap<String, ActionHandler>,
}

impl Controller {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: BTreeMap::new(),
        }
    }

    pub fn action<F, R>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Params, &mut RequestContext) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.actions.insert(
            name.to_string(),
            Arc::new(move |params: &Params, ctx: &mut RequestContext| f(params, ctx).into()),
        );
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl Endpoint for Controller {
    fn call(&self, ctx: &mut RequestContext) -> Outcome {
        let params = ctx.route_params().cloned().unwrap_or_default();
        let action = match params.get(ACTION) {
            Some(ParamValue::Text(action)) => self.actions.get(action.as_str()),
            _ => None,
        };

        match action {
            Some(handler) => handler(&params, ctx),
            None => {
                tracing::debug!(
                    controller = %self.name,
                    action = ?params.get(ACTION).map(ToString::to_string),
                    "Unknown controller action"
                );
                Response::not_found().into()
            }
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.name)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}
