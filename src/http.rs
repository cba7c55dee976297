//! HTTP request/response logging middleware for axum
//!
//! Each exchange produces two records on the configured logger:
//!
//! - a DEBUG record before the inner service runs, with `remote`, `ua` and,
//!   when enabled, a capped `body` preview for POST/PUT/PATCH
//! - an access record once the response body has been sent, with `status`,
//!   `bytes` and `duration`, at INFO below 400, WARN for 4xx and ERROR for
//!   5xx; a body that fails midway is logged at ERROR with `error`, and one
//!   dropped before its end gets `aborted=true`
//!
//! Response bodies are streamed through untouched and counted frame by
//! frame. Request bodies are read only as far as the preview needs.
//!
//! Both messages read `METHOD /path`, with the method and path optionally
//! colored.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use multilog::http::{HttpLogOptions, HttpLogging};
//! use multilog::Logger;
//! use std::sync::Arc;
//!
//! let logger = Arc::new(Logger::default());
//! let logging = HttpLogging::new(logger, HttpLogOptions::default());
//! let app: Router = logging.wrap(Router::new().route("/", get(|| async { "ok" })));
//! ```

use crate::core::{Attr, Level, Logger};
use crate::handlers::{ColorMode, Paint};
use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{ConnectInfo, Request, State},
    http::{header::USER_AGENT, Method},
    middleware::{self, Next},
    response::Response,
    Router,
};
use colored::Color;
use http_body::{Frame, SizeHint};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::poll_fn;
use std::io::{self, IsTerminal};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

/// Body preview cap used when `max_body_bytes` is 0
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Appended to a body preview that hit the cap
pub const TRUNCATION_MARKER: &str = "…(truncated)";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpLogOptions {
    /// Coloring of the method and path tokens; `Auto` checks stdout
    pub mode: ColorMode,
    /// Show `?query` after the path
    pub include_query: bool,
    /// Log a preview of POST/PUT/PATCH request bodies
    pub log_body: bool,
    /// Preview cap in bytes, 0 means [`DEFAULT_MAX_BODY_BYTES`]
    pub max_body_bytes: usize,
}

impl HttpLogOptions {
    fn body_cap(&self) -> usize {
        if self.max_body_bytes == 0 {
            DEFAULT_MAX_BODY_BYTES
        } else {
            self.max_body_bytes
        }
    }
}

/// Shared state of the logging middleware
pub struct HttpLogging {
    logger: Arc<Logger>,
    opts: HttpLogOptions,
    color: bool,
}

impl HttpLogging {
    /// Color mode is resolved once here, against stdout and `NO_COLOR`
    pub fn new(logger: Arc<Logger>, opts: HttpLogOptions) -> Arc<Self> {
        Self::resolved(
            logger,
            opts,
            io::stdout().is_terminal(),
            crate::handlers::console::no_color_requested(),
        )
    }

    fn resolved(
        logger: Arc<Logger>,
        opts: HttpLogOptions,
        is_terminal: bool,
        no_color: bool,
    ) -> Arc<Self> {
        let color = opts.mode.resolve_with(is_terminal, no_color);
        Arc::new(Self {
            logger,
            opts,
            color,
        })
    }

    /// Layer the middleware over every route of `router`
    pub fn wrap<S>(self: &Arc<Self>, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(Arc::clone(self), log_exchange))
    }

    fn display(&self, method: &Method, path: &str) -> String {
        if !self.color {
            return format!("{} {}", method, path);
        }
        format!(
            "{} {}",
            method_paint(method).paint(method.as_str()),
            Paint::default().bold().paint(path)
        )
    }
}

fn method_paint(method: &Method) -> Paint {
    match *method {
        Method::GET => Paint::fg(Color::Green),
        Method::POST => Paint::fg(Color::Cyan),
        Method::PUT => Paint::fg(Color::Yellow),
        Method::DELETE => Paint::fg(Color::Red),
        Method::PATCH => Paint::fg(Color::Magenta),
        _ => Paint::default().bold(),
    }
}

fn status_level(status: u16) -> Level {
    match status {
        500.. => Level::ERROR,
        400..=499 => Level::WARN,
        _ => Level::INFO,
    }
}

fn logs_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// First `cap` bytes of `body`, lossily decoded, plus the marker when cut
fn body_preview(body: &[u8], cap: usize) -> String {
    if body.len() > cap {
        let mut preview = String::from_utf8_lossy(&body[..cap]).into_owned();
        preview.push_str(TRUNCATION_MARKER);
        preview
    } else {
        String::from_utf8_lossy(body).into_owned()
    }
}

/// axum middleware function; install with [`HttpLogging::wrap`] or
/// `middleware::from_fn_with_state`
pub async fn log_exchange(
    State(logging): State<Arc<HttpLogging>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri();
    let path = match uri.query() {
        Some(query) if logging.opts.include_query && !query.is_empty() => {
            format!("{}?{}", uri.path(), query)
        }
        _ => uri.path().to_string(),
    };
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut request = request;
    let mut preview = String::new();
    if logging.opts.log_body && logs_body(&method) {
        let (parts, body) = request.into_parts();
        let (head, body) = read_head(body, logging.opts.body_cap()).await;
        preview = head;
        request = Request::from_parts(parts, body);
    }

    let message = logging.display(&method, &path);
    let mut attrs = vec![Attr::new("remote", remote), Attr::new("ua", user_agent)];
    if !preview.is_empty() {
        attrs.push(Attr::new("body", preview));
    }
    logging.logger.log_with(Level::DEBUG, message.clone(), attrs);

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let (parts, body) = response.into_parts();
    let body = CountingBody {
        inner: body,
        access: Some(AccessLog {
            logging,
            message,
            status,
            start,
            bytes: 0,
        }),
    };
    Response::from_parts(parts, Body::new(body))
}

/// Read frames until more than `cap` data bytes have arrived, the body ends,
/// or it fails. Returns the preview and a body that replays what was read
/// (a read error included) before the unread remainder.
async fn read_head(body: Body, cap: usize) -> (String, Body) {
    let mut head = Vec::new();
    let mut buffered = VecDeque::new();
    let mut rest = Some(body);

    while head.len() <= cap {
        let Some(body) = rest.as_mut() else {
            break;
        };
        match poll_fn(|cx| Pin::new(&mut *body).poll_frame(cx)).await {
            Some(Ok(frame)) => {
                if let Some(data) = frame.data_ref() {
                    let room = cap + 1 - head.len();
                    head.extend_from_slice(&data[..data.len().min(room)]);
                }
                buffered.push_back(Ok(frame));
            }
            Some(Err(err)) => {
                buffered.push_back(Err(err));
                rest = None;
            }
            None => rest = None,
        }
    }

    let preview = body_preview(&head, cap);
    (preview, Body::new(ReplayBody { buffered, rest }))
}

type BodyFrame = Result<Frame<Bytes>, axum::Error>;

/// Request body handed to the inner service after a preview read
struct ReplayBody {
    buffered: VecDeque<BodyFrame>,
    rest: Option<Body>,
}

impl HttpBody for ReplayBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, axum::Error>>> {
        let this = self.get_mut();
        if let Some(frame) = this.buffered.pop_front() {
            return Poll::Ready(Some(frame));
        }
        match this.rest.as_mut() {
            Some(rest) => Pin::new(rest).poll_frame(cx),
            None => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.buffered.is_empty() && self.rest.as_ref().map_or(true, HttpBody::is_end_stream)
    }

    fn size_hint(&self) -> SizeHint {
        let buffered: u64 = self
            .buffered
            .iter()
            .filter_map(|frame| frame.as_ref().ok())
            .filter_map(Frame::data_ref)
            .map(|data| data.len() as u64)
            .sum();
        let Some(rest) = &self.rest else {
            return SizeHint::with_exact(buffered);
        };
        let inner = rest.size_hint();
        let mut hint = SizeHint::new();
        hint.set_lower(inner.lower() + buffered);
        if let Some(upper) = inner.upper() {
            hint.set_upper(upper + buffered);
        }
        hint
    }
}

/// How a response body stopped
enum Outcome {
    Complete,
    Aborted,
    Failed(String),
}

/// The pending access record of one exchange
struct AccessLog {
    logging: Arc<HttpLogging>,
    message: String,
    status: u16,
    start: Instant,
    bytes: u64,
}

impl AccessLog {
    fn emit(self, outcome: Outcome) {
        let mut level = status_level(self.status);
        let mut attrs = vec![
            Attr::new("status", self.status),
            Attr::new("bytes", self.bytes),
            Attr::new("duration", format!("{:?}", self.start.elapsed())),
        ];
        match outcome {
            Outcome::Complete => {}
            Outcome::Aborted => attrs.push(Attr::new("aborted", true)),
            Outcome::Failed(err) => {
                level = Level::ERROR;
                attrs.push(Attr::new("error", err));
            }
        }
        self.logging.logger.log_with(level, self.message, attrs);
    }
}

/// Response body wrapper that counts data bytes and writes the access
/// record exactly once: at the end of the stream, on error, or on drop
struct CountingBody {
    inner: Body,
    access: Option<AccessLog>,
}

impl CountingBody {
    fn finish(&mut self, outcome: Outcome) {
        if let Some(access) = self.access.take() {
            access.emit(outcome);
        }
    }
}

impl HttpBody for CountingBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, axum::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let (Some(access), Some(data)) = (this.access.as_mut(), frame.data_ref()) {
                    access.bytes += data.len() as u64;
                }
            }
            Poll::Ready(Some(Err(err))) => this.finish(Outcome::Failed(err.to_string())),
            Poll::Ready(None) => this.finish(Outcome::Complete),
            Poll::Pending => {}
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CountingBody {
    fn drop(&mut self) {
        // Servers may stop polling once the size hint says the body is done
        let outcome = if self.inner.is_end_stream() {
            Outcome::Complete
        } else {
            Outcome::Aborted
        };
        self.finish(outcome);
    }
}
