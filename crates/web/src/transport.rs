//! The seam between [`RequestContext`](crate::context::RequestContext) and
//! the HTTP stack.

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use zw_domain::error::{Error, Result};

/// What a request context needs from the transport: request facets in,
/// status/headers/body out.
#[async_trait]
pub trait Transport: Send {
    fn method(&self) -> &str;
    /// Parsed path, without the query string.
    fn path(&self) -> &str;
    /// Raw request-target, query string included.
    fn target(&self) -> &str;
    fn header(&self, name: &str) -> Option<&str>;
    /// Read the request body from the source.
    async fn read_body(&mut self) -> Result<Bytes>;
    fn set_status(&mut self, status: StatusCode);
    fn set_header(&mut self, name: &str, value: &str);
    fn write_body(&mut self, data: Bytes);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// axum
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`Transport`] over an axum request.
///
/// The body stream can only be consumed once, so it is collected on the
/// first read and the outcome (bytes or failure) is replayed on later
/// reads.
pub struct AxumTransport {
    parts: Parts,
    body: Option<Body>,
    read: Option<BodyRead>,
    max_body_bytes: usize,
    status: StatusCode,
    headers: HeaderMap,
    out: Vec<u8>,
}

impl AxumTransport {
    pub fn new(request: Request, max_body_bytes: usize) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            parts,
            body: Some(body),
            read: None,
            max_body_bytes,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            out: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

enum BodyRead {
    Complete(Bytes),
    TooLarge,
    Failed(String),
}

/// Collect `body`, refusing up front when `Content-Length` already
/// exceeds `limit`.
async fn collect(body: Body, declared_len: Option<usize>, limit: usize) -> BodyRead {
    if declared_len.is_some_and(|n| n > limit) {
        return BodyRead::TooLarge;
    }
    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => BodyRead::Complete(bytes),
        Err(e) => BodyRead::Failed(format!("reading request body: {e}")),
    }
}

#[async_trait]
impl Transport for AxumTransport {
    fn method(&self) -> &str {
        self.parts.method.as_str()
    }

    fn path(&self) -> &str {
        self.parts.uri.path()
    }

    fn target(&self) -> &str {
        self.parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| self.parts.uri.path())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    async fn read_body(&mut self) -> Result<Bytes> {
        if let Some(body) = self.body.take() {
            let declared_len = self
                .header("content-length")
                .and_then(|v| v.trim().parse::<usize>().ok());
            self.read = Some(collect(body, declared_len, self.max_body_bytes).await);
        }
        match &self.read {
            Some(BodyRead::Complete(bytes)) => Ok(bytes.clone()),
            Some(BodyRead::TooLarge) => Err(Error::PayloadTooLarge {
                limit: self.max_body_bytes,
            }),
            Some(BodyRead::Failed(msg)) => Err(Error::Transport(msg.clone())),
            None => Ok(Bytes::new()),
        }
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn set_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(n), Ok(v)) => {
                // Set-Cookie may repeat; everything else replaces.
                if n == axum::http::header::SET_COOKIE {
                    self.headers.append(n, v);
                } else {
                    self.headers.insert(n, v);
                }
            }
            _ => Error::InvalidArgument {
                name: "header",
                value: format!("{name}: {value}"),
            }
            .report(),
        }
    }

    fn write_body(&mut self, data: Bytes) {
        self.out.extend_from_slice(&data);
    }
}

impl IntoResponse for AxumTransport {
    fn into_response(self) -> Response {
        let mut response = (self.status, Body::from(self.out)).into_response();
        response.headers_mut().extend(self.headers);
        response
    }
}
