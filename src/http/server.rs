//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router that funnels every request into the router
//! - Wire up middleware (tracing)
//! - Bind server to listener and shut down gracefully

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::any,
    Router as AxumRouter,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::http::request::{context_from_parts, RequestBody};
use crate::routing::response::Response;
use crate::routing::router::Router;

/// Request bodies above this size are rejected.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Adapts a [`Router`] to HTTP requests.
#[derive(Clone)]
pub struct RouterService {
    router: Arc<Router>,
}

impl RouterService {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Dispatch one HTTP request.
    pub async fn handle(
        &self,
        request: Request<Body>,
        remote: Option<SocketAddr>,
    ) -> axum::response::Response {
        let (parts, body) = request.into_parts();

        let mut ctx = match context_from_parts(&parts, remote) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::debug!(error = %e, path = %parts.uri.path(), "Unsupported method");
                return IntoResponse::into_response(Response::not_found());
            }
        };

        match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => {
                ctx.extensions.insert(RequestBody(bytes));
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %ctx.path(), "Failed to read request body");
                return IntoResponse::into_response(Response::new(StatusCode::PAYLOAD_TOO_LARGE));
            }
        }

        IntoResponse::into_response(self.router.call(&mut ctx))
    }
}

/// HTTP server serving one router.
pub struct HttpServer {
    app: AxumRouter,
}

impl HttpServer {
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            app: Self::build_router(RouterService::new(router)),
        }
    }

    /// The Axum app, e.g. for `tower::ServiceExt::oneshot`.
    pub fn app(&self) -> AxumRouter {
        self.app.clone()
    }

    fn build_router(service: RouterService) -> AxumRouter {
        AxumRouter::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(service)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.app.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch_handler(
    State(service): State<RouterService>,
    request: Request<Body>,
) -> axum::response::Response {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    service.handle(request, remote).await
}

/// Wait for shutdown signal (Ctrl+C).
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::endpoint::{from_fn, EndpointRegistry};
    use crate::routing::context::RequestContext;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let mut builder = Builder::new(EndpointRegistry::new());
        builder.post("/echo").to(from_fn(|ctx: &mut RequestContext| {
            let body = ctx
                .extensions
                .get::<RequestBody>()
                .map(|b| b.0.clone())
                .unwrap_or_default();
            Response::ok(body)
        }));
        HttpServer::new(Arc::new(builder.build().unwrap()))
    }

    #[tokio::test]
    async fn test_body_reaches_endpoint() {
        let response = server()
            .app()
            .oneshot(Request::post("/echo").body(Body::from("roar")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"roar");
    }

    #[tokio::test]
    async fn test_unsupported_method_is_not_found() {
        let response = server()
            .app()
            .oneshot(Request::head("/echo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
