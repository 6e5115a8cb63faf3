//! Per-request wrapper binding an inbound request to its session.
//!
//! A [`RequestContext`] is built once per request, exposes normalized
//! request facets to the handler and sends exactly one reply.  After the
//! reply the context is terminal: further replies and body reads are
//! reported and ignored.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::StatusCode;

use zw_domain::error::{Error, Result};
use zw_domain::trace::TraceEvent;
use zw_sessions::{find_cookie, SessionHandle, SessionRegistry};

use crate::diagnostics::DiagnosticPermit;
use crate::media;
use crate::normalize;
use crate::runtime::WebRuntime;
use crate::transport::Transport;

/// Lifecycle of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Constructed,
    Replied,
}

pub struct RequestContext<T: Transport> {
    runtime: Arc<WebRuntime>,
    seq: u64,
    session: SessionHandle,
    transport: T,
    post_data: Option<Bytes>,
    state: ContextState,
    permit: Option<DiagnosticPermit>,
}

impl<T: Transport> RequestContext<T> {
    /// Wrap a request: number it, resolve its session from the cookie
    /// and, with diagnostics on, open its diagnostic window.
    ///
    /// With diagnostics on this waits until no other context holds the
    /// diagnostic lock.
    pub async fn new(runtime: Arc<WebRuntime>, mut transport: T) -> Self {
        let seq = runtime.next_seq();

        let cookie = transport
            .header("cookie")
            .and_then(|h| find_cookie(h, runtime.cookie_name()))
            .map(str::to_owned);
        let resolution = SessionRegistry::resolve_optional(runtime.registry(), cookie.as_deref());
        if let Some(id) = &resolution.issued_cookie {
            let set_cookie = runtime.session_cookie(id).to_string();
            transport.set_header("set-cookie", &set_cookie);
        }

        let mut ctx = Self {
            runtime,
            seq,
            session: resolution.session,
            transport,
            post_data: None,
            state: ContextState::Constructed,
            permit: None,
        };
        ctx.open_diagnostics().await;
        ctx
    }

    async fn open_diagnostics(&mut self) {
        let runtime = self.runtime.clone();
        let Some(recorder) = runtime.diagnostics() else {
            return;
        };
        match recorder.acquire(self.seq).await {
            Ok(permit) => self.permit = Some(permit),
            Err(e) => {
                e.report();
                return;
            }
        }
        let body = self.post_data().await;
        recorder.record_request(
            self.seq,
            self.session.id_prefix(8),
            &self.method(),
            self.transport.path(),
            self.transport.header("referer").unwrap_or(""),
            &body,
        );
    }

    // ── Request facets ───────────────────────────────────────────────

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_replied(&self) -> bool {
        self.state == ContextState::Replied
    }

    /// HTTP method, uppercased.
    pub fn method(&self) -> String {
        self.transport.method().to_uppercase()
    }

    /// Normalized, percent-decoded path without the query string
    /// (`"/a/b/"` → `"a/b"`, `"/caf%C3%A9/"` → `"café"`).
    pub fn href(&self) -> String {
        normalize::href(&normalize::decode_path(self.transport.path()))
    }

    /// Normalized request-target including the query string.
    pub fn uri(&self) -> String {
        normalize::uri(self.transport.target())
    }

    pub fn referer(&self) -> String {
        normalize::referer(self.transport.header("referer").unwrap_or(""))
    }

    /// Referer with trailing separators and numeric ids stripped.
    pub fn base_referer(&self) -> String {
        normalize::base_referer(self.transport.header("referer").unwrap_or(""))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.transport.header(name)
    }

    /// The request body.  Read from the transport on first use, then
    /// served from the cache until [`reset_post_data`](Self::reset_post_data).
    ///
    /// A failed read is reported and yields empty bytes; handlers that
    /// must tell the two apart use [`try_post_data`](Self::try_post_data).
    pub async fn post_data(&mut self) -> Bytes {
        match self.try_post_data().await {
            Ok(body) => body,
            Err(e) => {
                e.report();
                Bytes::new()
            }
        }
    }

    /// Like [`post_data`](Self::post_data) but hands read failures
    /// (oversized body, broken stream) back to the caller.
    pub async fn try_post_data(&mut self) -> Result<Bytes> {
        if let Some(cached) = &self.post_data {
            return Ok(cached.clone());
        }
        if self.is_replied() {
            return Err(Error::AlreadyReplied { seq: self.seq });
        }
        let body = self.transport.read_body().await?;
        self.post_data = Some(body.clone());
        Ok(body)
    }

    /// Drop the cached body so the next [`post_data`](Self::post_data)
    /// reads the transport again.
    pub fn reset_post_data(&mut self) {
        if self.is_replied() {
            Error::AlreadyReplied { seq: self.seq }.report();
            return;
        }
        self.post_data = None;
    }

    /// Multi-line dump of the request facets.
    pub async fn debug_string(&mut self) -> String {
        let post_data = self.post_data().await;
        format!(
            "BaseReferer(): {}\nMethod(): {}\nHREF(): {}\nPostData(): {}\nReferer(): {}\n",
            self.base_referer(),
            self.method(),
            self.href(),
            String::from_utf8_lossy(&post_data),
            self.referer(),
        )
    }

    // ── Reply ────────────────────────────────────────────────────────

    /// Send `data` with a `200 OK`.
    ///
    /// `media_type_hint` is a short token such as `"html"` or `"png"`.
    /// An unknown token is reported and the reply goes out without a
    /// `Content-Type` header.
    pub fn reply(&mut self, data: impl Into<Bytes>, media_type_hint: &str) {
        self.reply_with_status(StatusCode::OK, data, media_type_hint);
    }

    pub fn reply_with_status(
        &mut self,
        status: StatusCode,
        data: impl Into<Bytes>,
        media_type_hint: &str,
    ) {
        if self.is_replied() {
            Error::AlreadyReplied { seq: self.seq }.report();
            return;
        }
        let data = data.into();
        let mime = media::media_type(media_type_hint).to_owned();
        if mime.is_empty() {
            Error::InvalidArgument {
                name: "media_type",
                value: media_type_hint.to_owned(),
            }
            .report();
        } else {
            self.transport.set_header("content-type", &mime);
        }
        self.transport.set_status(status);

        if let Some(recorder) = self.runtime.diagnostics() {
            recorder.record_reply(self.seq, self.session.id_prefix(8), &mime, &data);
        }
        let len = data.len();
        self.transport.write_body(data);
        self.finish(status, &mime, len);
    }

    /// Send a `302 Found` to `url`.
    pub fn redirect(&mut self, url: &str) {
        if self.is_replied() {
            Error::AlreadyReplied { seq: self.seq }.report();
            return;
        }
        self.transport.set_status(StatusCode::FOUND);
        self.transport.set_header("location", url);
        if let Some(recorder) = self.runtime.diagnostics() {
            recorder.record_redirect(self.seq, self.session.id_prefix(8), url);
        }
        self.finish(StatusCode::FOUND, "", 0);
    }

    fn finish(&mut self, status: StatusCode, media_type: &str, len: usize) {
        self.state = ContextState::Replied;
        if let Some(permit) = self.permit.take() {
            permit.release();
        }
        TraceEvent::ReplySent {
            seq: self.seq,
            status: status.as_u16(),
            media_type: media_type.to_owned(),
            len,
        }
        .emit();
    }

    /// Give the transport back to the caller.  Without a prior reply the
    /// diagnostic window, if any, closes here.
    pub fn into_transport(self) -> T {
        self.transport
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Absent contexts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Request facets on a possibly-absent context.  `None` reports a
/// missing receiver and yields `""`.
pub trait OptionalContext {
    fn method(&self) -> String;
    fn href(&self) -> String;
    fn uri(&self) -> String;
    fn referer(&self) -> String;
    fn base_referer(&self) -> String;
}

impl<T: Transport> OptionalContext for Option<&RequestContext<T>> {
    fn method(&self) -> String {
        facet(*self, RequestContext::method)
    }

    fn href(&self) -> String {
        facet(*self, RequestContext::href)
    }

    fn uri(&self) -> String {
        facet(*self, RequestContext::uri)
    }

    fn referer(&self) -> String {
        facet(*self, RequestContext::referer)
    }

    fn base_referer(&self) -> String {
        facet(*self, RequestContext::base_referer)
    }
}

fn facet<T: Transport>(
    ctx: Option<&RequestContext<T>>,
    f: impl FnOnce(&RequestContext<T>) -> String,
) -> String {
    match ctx {
        Some(ctx) => f(ctx),
        None => {
            Error::MissingReceiver("request context").report();
            String::new()
        }
    }
}
