//! Shared fixtures for integration tests.

#![allow(dead_code)]

use axum::http::StatusCode;
use signpost::endpoint::ActionContext;
use signpost::{
    Controller, EndpointRegistry, Method, Params, RequestContext, Response, Router,
};

/// A registry covering the names the integration tests route to.
///
/// ```text
/// Dragons               controller: index, show
/// Dragons::Types::Create  endpoint ("created type")
/// Unicorns              controller: index
/// Echo                  endpoint: "<METHOD> <path> <params>"
/// Magic                 namespace
/// Magic::Dragons        controller: index
/// Admin::UsersController  endpoint
/// ```
pub fn registry() -> EndpointRegistry {
    let mut registry = EndpointRegistry::new();
    registry
        .register(
            "Dragons",
            Controller::new("Dragons")
                .action("index", |_: &Params, _: &mut RequestContext| {
                    Response::ok("all dragons")
                })
                .action("show", |params: &Params, _: &mut RequestContext| {
                    Response::ok(format!(
                        "dragon {}",
                        params.get_text("id").unwrap_or("?")
                    ))
                }),
        )
        .register("Dragons::Types::Create", |_: &mut RequestContext| -> signpost::Outcome {
            Response::ok("created type").into()
        })
        .register(
            "Unicorns",
            Controller::new("Unicorns").action("index", |_: &Params, _: &mut RequestContext| {
                Response::ok("all unicorns")
            }),
        )
        .register("Echo", echo)
        .namespace("Magic")
        .register(
            "Magic::Dragons",
            Controller::new("Magic::Dragons").action(
                "index",
                |_: &Params, _: &mut RequestContext| Response::ok("magic dragons"),
            ),
        )
        .register("Admin::UsersController", |_: &mut RequestContext| -> signpost::Outcome {
            Response::ok("admin users").into()
        });
    registry
}

/// Answers `"<METHOD> <path> <sorted params>"`.
pub fn echo(ctx: &mut RequestContext) -> signpost::Outcome {
    let params = ctx
        .route_params()
        .map(|params| {
            params
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join("&")
        })
        .unwrap_or_default();
    Response::ok(format!("{} {} {}", ctx.method(), ctx.path(), params)).into()
}

/// An inline action answering `body`.
pub fn answer(body: &'static str) -> impl Fn(&mut ActionContext<'_>) + Send + Sync + 'static {
    move |action: &mut ActionContext<'_>| {
        action.body(body);
    }
}

/// The result of dispatching one request.
#[derive(Debug)]
pub struct Dispatched {
    pub status: StatusCode,
    pub body: String,
    pub location: Option<String>,
}

pub fn dispatch(router: &Router, method: Method, target: &str) -> Dispatched {
    dispatch_ctx(router, RequestContext::from_target(method, target))
}

pub fn dispatch_ctx(router: &Router, mut ctx: RequestContext) -> Dispatched {
    let response = router
        .call(&mut ctx)
        .into_response()
        .unwrap_or_else(|| Response::new(StatusCode::NOT_FOUND));
    Dispatched {
        status: response.status,
        body: response.text(),
        location: response.location().map(str::to_string),
    }
}

pub fn get(router: &Router, target: &str) -> Dispatched {
    dispatch(router, Method::Get, target)
}
