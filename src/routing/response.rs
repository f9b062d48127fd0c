//! Responses produced by endpoints.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};

/// The `(status, headers, body)` triple an endpoint answers with.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A 200 response carrying `body`.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK).with_body(body)
    }

    /// The empty 404 a root router answers when nothing matched.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The `Location` header, if present and valid UTF-8.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The body as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// What an endpoint (or a router) hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Response(Response),
    /// Decline: the router keeps scanning with the next route.
    Pass,
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    /// The response, unless this is [`Outcome::Pass`].
    pub fn into_response(self) -> Option<Response> {
        match self {
            Outcome::Response(r) => Some(r),
            Outcome::Pass => None,
        }
    }
}

impl From<Response> for Outcome {
    fn from(r: Response) -> Self {
        Outcome::Response(r)
    }
}
