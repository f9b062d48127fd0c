//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn router outcomes into HTTP responses
//!
//! # Design Decisions
//! - A `Pass` reaching the HTTP boundary becomes an empty 404
//! - Status, headers and body are passed through untouched

use axum::body::Body;
use axum::response::IntoResponse;

use crate::routing::response::{Outcome, Response};

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let mut response = axum::response::Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> axum::response::Response {
        match self {
            Outcome::Response(response) => IntoResponse::into_response(response),
            Outcome::Pass => IntoResponse::into_response(Response::not_found()),
        }
    }
}
