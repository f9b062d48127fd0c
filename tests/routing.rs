//! Dispatch behaviour of compiled routers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use signpost::endpoint::ActionContext;
use signpost::routing::HostConstraint;
use signpost::{
    from_fn, Builder, Endpoint, EndpointRegistry, Handler, Method, Middleware, Outcome, Params,
    RequestContext, RouterOptions, RoutingError,
};

mod common;
use common::{answer, dispatch, dispatch_ctx, get};

fn builder() -> Builder {
    Builder::new(common::registry())
}

#[test]
fn test_first_match_wins() {
    let mut b = builder();
    b.get("/dragons").to_action(answer("first"));
    b.get("/dragons").to_action(answer("second"));
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons").body, "first");
}

#[test]
fn test_literal_declared_before_pattern() {
    let mut b = builder();
    b.get("/dragons/new").to_action(answer("new form"));
    b.get("/dragons/:id").to("dragons#show");
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons/new").body, "new form");
    assert_eq!(get(&router, "/dragons/42").body, "dragon 42");
}

#[test]
fn test_pattern_declared_first_shadows_literal() {
    let mut b = builder();
    b.get("/dragons/:id").to("dragons#show");
    b.get("/dragons/new").to_action(answer("new form"));
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons/new").body, "dragon new");
}

#[test]
fn test_methods_dispatch_separately() {
    let mut b = builder();
    b.get("/dragons").to_action(answer("list"));
    b.post("/dragons").to_action(answer("create"));
    b.any("/unicorns")
        .via(&[Method::Put, Method::Patch])
        .to_action(answer("update"));
    let router = b.build().unwrap();

    assert_eq!(dispatch(&router, Method::Post, "/dragons").body, "create");
    assert_eq!(dispatch(&router, Method::Patch, "/unicorns").body, "update");
    assert_eq!(
        dispatch(&router, Method::Delete, "/dragons").status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        dispatch(&router, Method::Get, "/unicorns").status,
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_unmatched_path_is_404() {
    let router = builder().build().unwrap();
    let response = get(&router, "/nowhere");
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());
}

#[test]
fn test_constraint_failure_moves_on() {
    let mut b = builder();
    b.get("/dragons")
        .constraint(HostConstraint::new("dragons.example"))
        .to_action(answer("dragon host"));
    b.get("/dragons").to_action(answer("any host"));
    let router = b.build().unwrap();

    let ctx = RequestContext::new(Method::Get, "/dragons").with_env("host", "Dragons.Example");
    assert_eq!(dispatch_ctx(&router, ctx).body, "dragon host");
    assert_eq!(get(&router, "/dragons").body, "any host");
}

#[test]
fn test_constraints_only_run_on_path_match() {
    let mut b = builder();
    b.get("/dragons")
        .constraint(|_ctx: &RequestContext| -> bool { panic!("constraint must not run") })
        .to_action(answer("never"));
    b.get("/unicorns").to_action(answer("unicorns"));
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/unicorns").body, "unicorns");
}

#[test]
fn test_pass_falls_through_to_next_route() {
    let pass: Handler = from_fn(|_ctx: &mut RequestContext| Outcome::Pass);

    let mut b = builder();
    b.get("/dragons").to(pass.clone());
    b.get("/dragons").to_action(answer("second"));
    b.get("/unicorns").to(pass);
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons").body, "second");
    assert_eq!(get(&router, "/unicorns").status, StatusCode::NOT_FOUND);
}

#[test]
fn test_pass_restores_params() {
    let peek: Handler = from_fn(|ctx: &mut RequestContext| {
        assert_eq!(ctx.route_params().and_then(|p| p.get_text("id")), Some("7"));
        Outcome::Pass
    });

    let mut b = builder();
    b.get("/dragons/:id").to(peek);
    b.get("/dragons/:slug").to_action(|action: &mut ActionContext<'_>| {
        let id = action.params().contains_key("id");
        let query_id = action.request().query_params.contains_key("id");
        action.body(format!("id={id} query_id={query_id}"));
    });
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons/7").body, "id=false query_id=false");
}

#[test]
fn test_params_merge_into_query() {
    let mut b = builder();
    b.get("/dragons/:id").to_action(|action: &mut ActionContext<'_>| {
        let page = action.request().query_params.get_text("page").unwrap_or("-").to_string();
        let id = action.request().query_params.get_text("id").unwrap_or("-").to_string();
        action.body(format!("{id}/{page}"));
    });
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons/3?page=2").body, "3/2");
}

#[test]
fn test_params_stay_out_of_query_when_disabled() {
    let options = RouterOptions {
        merge_query_params: false,
        ..RouterOptions::default()
    };
    let mut b = Builder::with_options(Arc::new(common::registry()), options);
    b.get("/dragons/:id").to_action(|action: &mut ActionContext<'_>| {
        let merged = action.request().query_params.contains_key("id");
        action.body(format!("{merged}"));
    });
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons/3").body, "false");
}

#[test]
fn test_custom_params_key() {
    let options = RouterOptions {
        params_key: "signpost.params".into(),
        ..RouterOptions::default()
    };
    let mut b = Builder::with_options(Arc::new(common::registry()), options);
    b.get("/dragons/:id").to(from_fn(|ctx: &mut RequestContext| {
        let id = ctx
            .params("signpost.params")
            .and_then(|p| p.get_text("id"))
            .unwrap_or("-")
            .to_string();
        signpost::Response::ok(id)
    }));
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons/9").body, "9");
}

#[test]
fn test_defaults_and_captures() {
    let mut b = builder();
    b.get("/dragons/:id")
        .to("echo")
        .params([("id", "default"), ("format", "json")]);
    let router = b.build().unwrap();

    assert_eq!(
        get(&router, "/dragons/5").body,
        "GET /dragons/5 controller=Echo&format=json&id=5"
    );
}

#[test]
fn test_middleware_runs_in_registration_order() {
    fn tracer(label: &'static str) -> Middleware {
        Middleware::around(label, move |ctx: &mut RequestContext, next: &Handler| {
            push(ctx, &format!(">{label}"));
            let outcome = next.call(ctx);
            push(ctx, &format!("<{label}"));
            outcome
        })
    }

    fn push(ctx: &mut RequestContext, step: &str) {
        ctx.env.entry("trace".into()).or_default().push_str(step);
    }

    let mut b = builder();
    b.use_middleware(tracer("a"));
    b.get("/trace").to(from_fn(|ctx: &mut RequestContext| {
        push(ctx, "|handler|");
        Outcome::Pass
    }));
    // registered after the route, still wraps it
    b.use_middleware(tracer("b"));
    b.get("/trace").to_action(|action: &mut ActionContext<'_>| {
        let trace = action.request().env.get("trace").cloned().unwrap_or_default();
        action.body(trace);
    });
    let router = b.build().unwrap();

    // the first route passed; the second saw the full trace of the first
    assert_eq!(get(&router, "/trace").body, ">a>b|handler|<b<a>a>b");
}

#[test]
fn test_constraints_short_circuit() {
    let second_ran = Arc::new(AtomicBool::new(false));
    let spy = second_ran.clone();

    let mut b = builder();
    b.get("/dragons")
        .constraint(|_ctx: &RequestContext| -> bool { false })
        .constraint(move |_ctx: &RequestContext| -> bool {
            spy.store(true, Ordering::SeqCst);
            true
        })
        .to_action(answer("never"));
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons").status, StatusCode::NOT_FOUND);
    assert!(!second_ran.load(Ordering::SeqCst));
}

#[test]
fn test_expand_then_match_round_trip() {
    let mut b = builder();
    b.get("/users/:id").to("echo").name("show");
    let router = b.build().unwrap();

    let path = router.expand("show", &Params::new().with("id", 42)).unwrap();
    assert_eq!(path, "/users/42");
    assert_eq!(get(&router, &path).body, "GET /users/42 controller=Echo&id=42");
}

#[test]
fn test_expand_encodes_and_match_decodes() {
    let mut b = builder();
    b.get("/dragons/:id").to("dragons#show").name("dragon");
    let router = b.build().unwrap();

    let path = router.expand("dragon", &Params::new().with("id", "a/b")).unwrap();
    assert_eq!(path, "/dragons/a%2Fb");
    assert_eq!(get(&router, &path).body, "dragon a/b");

    let path = router
        .expand("dragon", &Params::new().with("id", "smaug é"))
        .unwrap();
    assert_eq!(path, "/dragons/smaug%20%C3%A9");
    assert_eq!(get(&router, &path).body, "dragon smaug é");

    assert_eq!(get(&router, "/dragons/john%20doe").body, "dragon john doe");
}

#[test]
fn test_middleware_can_short_circuit() {
    let auth = Middleware::around("auth", |ctx: &mut RequestContext, next: &Handler| {
        if ctx.env.contains_key("authorization") {
            next.call(ctx)
        } else {
            signpost::Response::new(StatusCode::UNAUTHORIZED).into()
        }
    });

    let mut b = builder();
    b.use_middleware(auth);
    b.get("/secret").to_action(answer("secret"));
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/secret").status, StatusCode::UNAUTHORIZED);
    let ctx = RequestContext::new(Method::Get, "/secret").with_env("authorization", "token");
    assert_eq!(dispatch_ctx(&router, ctx).body, "secret");
}

#[test]
fn test_expand_named_route() {
    let mut b = builder();
    b.get("/dragons/:id").to("dragons#show").name("dragon");
    let router = b.build().unwrap();

    let params = Params::new().with("id", 5);
    assert_eq!(router.expand("dragon", &params).unwrap(), "/dragons/5");
    assert!(matches!(
        router.expand("unicorn", &params),
        Err(RoutingError::UnknownRouteName(name)) if name == "unicorn"
    ));
    assert!(matches!(
        router.expand("dragon", &Params::new()),
        Err(RoutingError::Expand(_))
    ));
}

#[test]
fn test_action_expands_names() {
    let mut b = builder();
    b.get("/dragons/:id").to("dragons#show").name("dragon");
    b.post("/dragons").to_action(|action: &mut ActionContext<'_>| {
        let location = action
            .expand("dragon", &Params::new().with("id", "new"))
            .unwrap_or_default();
        action.status(StatusCode::CREATED).body(location);
    });
    let router = b.build().unwrap();

    let response = dispatch(&router, Method::Post, "/dragons");
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body, "/dragons/new");
}

#[test]
fn test_empty_registry_still_routes_handlers() {
    let mut b = Builder::new(EndpointRegistry::new());
    b.get("/").to(from_fn(|_ctx: &mut RequestContext| signpost::Response::ok("home")));
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/").body, "home");
}
