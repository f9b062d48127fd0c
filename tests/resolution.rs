//! Endpoint resolution through the builder.

use std::sync::Arc;

use axum::http::StatusCode;
use signpost::endpoint::EndpointSpec;
use signpost::{Builder, EndpointRegistry, RequestContext, Response, RouterOptions, RoutingError};

mod common;
use common::get;

fn with_options(options: RouterOptions) -> Builder {
    Builder::with_options(Arc::new(common::registry()), options)
}

#[test]
fn test_subject_and_action() {
    let mut b = Builder::new(common::registry());
    b.get("/dragons").to("dragons#index");
    b.get("/unicorns").to(EndpointSpec::pair("unicorns", "index"));
    b.get("/dragons/:id").to("dragons#show");
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons").body, "all dragons");
    assert_eq!(get(&router, "/unicorns").body, "all unicorns");
    assert_eq!(get(&router, "/dragons/3").body, "dragon 3");
}

#[test]
fn test_callable_member_preferred() {
    let mut b = Builder::new(common::registry());
    b.post("/dragons/types").to("dragons/types#create");
    b.get("/echo").to("echo#anything");
    let router = b.build().unwrap();

    assert_eq!(
        common::dispatch(&router, signpost::Method::Post, "/dragons/types").body,
        "created type"
    );
    // no Echo::Anything member: the subject answers with the action as a param
    assert_eq!(
        get(&router, "/echo").body,
        "GET /echo action=anything&controller=Echo"
    );
}

#[test]
fn test_unknown_subject_fails_at_build() {
    let mut b = Builder::new(common::registry());
    b.get("/ghosts").to("ghosts#index");
    match b.build() {
        Err(RoutingError::UnresolvedEndpoint { spec }) => assert_eq!(spec, "ghosts#index"),
        other => panic!("expected an unresolved endpoint, got {other:?}"),
    }
}

#[test]
fn test_namespace_entry_is_not_callable() {
    let mut b = Builder::new(common::registry());
    b.get("/magic").to("magic");
    assert!(matches!(
        b.build(),
        Err(RoutingError::UnresolvedEndpoint { .. })
    ));
}

#[test]
fn test_naming_pattern_and_namespace() {
    let mut b = with_options(RouterOptions {
        controller_format: Some("%{name}Controller".into()),
        namespace: Some("admin".into()),
        ..RouterOptions::default()
    });
    b.get("/users").to("users");
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/users").body, "admin users");
}

#[test]
fn test_namespace_does_not_fall_back_to_global() {
    let mut b = with_options(RouterOptions {
        namespace: Some("admin".into()),
        ..RouterOptions::default()
    });
    b.get("/dragons").to("dragons#index");
    assert!(matches!(
        b.build(),
        Err(RoutingError::UnresolvedEndpoint { .. })
    ));
}

#[test]
fn test_absolute_name_skips_namespace() {
    let mut b = with_options(RouterOptions {
        namespace: Some("admin".into()),
        ..RouterOptions::default()
    });
    b.get("/dragons").to("::dragons#index");
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons").body, "all dragons");
}

#[test]
fn test_action_only_resolves_in_namespace() {
    let mut b = with_options(RouterOptions {
        namespace: Some("dragons".into()),
        ..RouterOptions::default()
    });
    b.get("/").to("#index");
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/").body, "all dragons");
}

#[test]
fn test_dynamic_resolution_from_captures() {
    let mut b = Builder::new(common::registry());
    b.get("/:controller/:action");
    b.get("/:controller").params([("action", "index")]);
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons/index").body, "all dragons");
    assert_eq!(get(&router, "/unicorns").body, "all unicorns");
    assert_eq!(get(&router, "/dragons/unknown").status, StatusCode::NOT_FOUND);
    assert_eq!(
        get(&router, "/ghosts/index").status,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_dynamic_with_fixed_action() {
    let mut b = Builder::new(common::registry());
    b.get("/:controller/all").to("#index");
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/unicorns/all").body, "all unicorns");
}

#[test]
fn test_registry_shared_across_builders() {
    let registry: Arc<EndpointRegistry> = Arc::new(
        EndpointRegistry::new().with("Home", |_ctx: &mut RequestContext| -> signpost::Outcome {
            Response::ok("home").into()
        }),
    );

    let mut first = Builder::with_options(registry.clone(), RouterOptions::default());
    first.get("/").to("home");
    let mut second = Builder::with_options(registry, RouterOptions::default());
    second.get("/start").to("home");

    assert_eq!(get(&first.build().unwrap(), "/").body, "home");
    assert_eq!(get(&second.build().unwrap(), "/start").body, "home");
}

#[test]
fn test_handler_receives_subject_action_and_captures() {
    let registry = EndpointRegistry::new().with("Dragons", common::echo);
    let mut b = Builder::new(registry);
    b.get("/dragons/:id").to("dragons#show");
    b.get("/:controller/:action/:id");
    let router = b.build().unwrap();

    assert_eq!(
        get(&router, "/dragons/42").body,
        "GET /dragons/42 action=show&controller=Dragons&id=42"
    );
    // resolved from the captures at request time
    assert_eq!(
        get(&router, "/dragons/roar/7").body,
        "GET /dragons/roar/7 action=roar&controller=dragons&id=7"
    );
}

#[test]
fn test_controller_reads_configured_params_key() {
    let mut b = with_options(RouterOptions {
        params_key: "app.params".into(),
        ..RouterOptions::default()
    });
    b.get("/dragons/:id").to("dragons#show");
    b.get("/x/:controller/:action");
    b.get("/echo/:id").to("echo");
    let router = b.build().unwrap();

    assert_eq!(get(&router, "/dragons/42").body, "dragon 42");
    assert_eq!(get(&router, "/x/dragons/index").body, "all dragons");
    assert_eq!(
        get(&router, "/echo/7").body,
        "GET /echo/7 controller=Echo&id=7"
    );
}
