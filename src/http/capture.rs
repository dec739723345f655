//! HTTP access capture.
//!
//! # Responsibilities
//! - Snapshot request fields on entry (method, URL, version, client IP, headers)
//! - Time the wrapped service and snapshot the response (status, length)
//! - Emit exactly one access record per request, at a level derived from
//!   the status, whether the service answered or failed
//! - Return the service's error untouched after logging it
//! - Log requests whose future is dropped before completing (client gone,
//!   outer timeout) with [`CANCELLED_STATUS`]
//!
//! # Design Decisions
//! - Implemented as a tower `Layer` so any service, not only axum routers,
//!   can be wrapped, including services with real error types
//! - When capture is disabled the layer is never installed

use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Request, Response, Version};
use axum::Router;
use futures_util::future::BoxFuture;
use hyper::body::Body as HttpBody;
use tower::{Layer, Service};

use crate::config::schema::CaptureLevel;
use crate::level::Level;
use crate::router::{Channel, Logger};

/// Header consulted before the connection peer address.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Status assumed when none is available.
pub const DEFAULT_STATUS: u16 = 200;

/// Status recorded when the wrapped service fails.
pub const FAILURE_STATUS: u16 = 500;

/// Status recorded when the request future is dropped before a response.
pub const CANCELLED_STATUS: u16 = 499;

/// Level for an access record.
///
/// With `auto`: `>= 400` is `error`, `300..400` is `warn`, anything else
/// `info`. A fixed level always wins.
pub fn get_log_level(status: Option<u16>, configured: CaptureLevel) -> Level {
    let status = status.unwrap_or(DEFAULT_STATUS);
    match configured {
        CaptureLevel::Fixed(level) => level,
        CaptureLevel::Auto if status >= 400 => Level::Error,
        CaptureLevel::Auto if status >= 300 => Level::Warn,
        CaptureLevel::Auto => Level::Info,
    }
}

/// Request fields captured on entry.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,
    pub http_version: &'static str,
    pub ip: String,
    pub headers: HeaderMap,
}

impl RequestSnapshot {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let headers = req.headers().clone();
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let ip = forwarded
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "-".to_string());

        Self {
            method: req.method().to_string(),
            url: req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string()),
            http_version: version_str(req.version()),
            ip,
            headers,
        }
    }

    fn header_or<'a>(&'a self, name: header::HeaderName, fallback: &'a str) -> &'a str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(fallback)
    }
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
}

/// Response fields captured on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub content_length: u64,
}

impl ResponseSnapshot {
    /// Content length from the header, else the body's exact size, else 0.
    pub fn from_response<B: HttpBody>(res: &Response<B>) -> Self {
        let content_length = res
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .or_else(|| res.body().size_hint().exact())
            .unwrap_or(0);
        Self {
            status: res.status().as_u16(),
            content_length,
        }
    }

    pub fn failed() -> Self {
        Self {
            status: FAILURE_STATUS,
            content_length: 0,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: CANCELLED_STATUS,
            content_length: 0,
        }
    }
}

/// Everything known about one request/response cycle.
#[derive(Debug, Clone)]
pub struct CaptureMeta {
    pub start: Instant,
    pub request: RequestSnapshot,
    pub response: Option<ResponseSnapshot>,
    pub duration_ms: u128,
}

impl CaptureMeta {
    pub fn begin<B>(req: &Request<B>) -> Self {
        Self {
            start: Instant::now(),
            request: RequestSnapshot::from_request(req),
            response: None,
            duration_ms: 0,
        }
    }

    pub fn finish(&mut self, response: ResponseSnapshot) {
        self.duration_ms = self.start.elapsed().as_millis();
        self.response = Some(response);
    }

    pub fn status(&self) -> Option<u16> {
        self.response.map(|r| r.status)
    }

    /// `<ip> - - "<method> <url> HTTP/<version>" <status> <length> "<referer>" "<agent>" - <ms> ms`
    pub fn access_message(&self) -> String {
        let req = &self.request;
        let res = self.response.unwrap_or(ResponseSnapshot {
            status: DEFAULT_STATUS,
            content_length: 0,
        });
        format!(
            "{} - - \"{} {} HTTP/{}\" {} {} \"{}\" \"{}\" - {} ms",
            req.ip,
            req.method,
            req.url,
            req.http_version,
            res.status,
            res.content_length,
            req.header_or(header::REFERER, ""),
            req.header_or(header::USER_AGENT, "unknown"),
            self.duration_ms,
        )
    }
}

struct Capture {
    channel: Arc<Channel>,
    level: CaptureLevel,
}

impl Capture {
    fn emit(&self, meta: &CaptureMeta) {
        let level = get_log_level(meta.status(), self.level);
        self.channel.log(level, meta.access_message(), Vec::new());
    }
}

/// One in-flight request. Emits on completion, or on drop if it never completed.
struct Pending {
    capture: Arc<Capture>,
    meta: Option<CaptureMeta>,
}

impl Pending {
    fn complete(&mut self, response: ResponseSnapshot) {
        if let Some(mut meta) = self.meta.take() {
            meta.finish(response);
            self.capture.emit(&meta);
        }
    }
}

impl Drop for Pending {
    fn drop(&mut self) {
        self.complete(ResponseSnapshot::cancelled());
    }
}

/// Layer emitting one access record per request.
#[derive(Clone)]
pub struct CaptureLayer {
    capture: Arc<Capture>,
}

impl CaptureLayer {
    /// `None` when capture is disabled in the logger's configuration.
    pub fn new(logger: &Logger) -> Option<Self> {
        let config = logger.capture_config();
        if !config.enable {
            return None;
        }
        Some(Self {
            capture: Arc::new(Capture {
                channel: logger.category(&config.category),
                level: config.level,
            }),
        })
    }
}

impl<S> Layer<S> for CaptureLayer {
    type Service = CaptureService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CaptureService {
            inner,
            capture: self.capture.clone(),
        }
    }
}

/// Install capture on `router` unless disabled.
pub fn install<S>(router: Router<S>, logger: &Logger) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    match CaptureLayer::new(logger) {
        Some(layer) => {
            tracing::debug!(category = %logger.capture_config().category, "Enable capture http request");
            router.layer(layer)
        }
        None => router,
    }
}

/// Service produced by [`CaptureLayer`].
#[derive(Clone)]
pub struct CaptureService<S> {
    inner: S,
    capture: Arc<Capture>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CaptureService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // The clone may not be ready; keep the one that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let mut pending = Pending {
            capture: self.capture.clone(),
            meta: Some(CaptureMeta::begin(&req)),
        };

        Box::pin(async move {
            let result = inner.call(req).await;
            let snapshot = match &result {
                Ok(res) => ResponseSnapshot::from_response(res),
                Err(_) => ResponseSnapshot::failed(),
            };
            pending.complete(snapshot);
            result
        })
    }
}
