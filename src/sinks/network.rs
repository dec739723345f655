//! HTTP log shipper: POSTs each record as a JSON document.
//!
//! Records go through a bounded queue to a single worker task, which posts
//! them in order. The worker starts on the first record emitted inside a
//! tokio runtime; a full queue drops the record.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde_json::{json, Value};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use url::Url;

use crate::format::{RenderMode, RenderedRecord};
use crate::level::Level;
use crate::sinks::{DeliveryError, Sink};

/// Records waiting for the worker before new ones are dropped.
pub const QUEUE_CAPACITY: usize = 1024;

/// Per-request timeout for a single POST.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

enum Command {
    Post(Value),
    Flush(oneshot::Sender<()>),
}

pub struct HttpSink {
    client: reqwest::Client,
    url: Arc<Url>,
    level: Option<Level>,
    mode: Option<RenderMode>,
    queue: OnceLock<mpsc::Sender<Command>>,
}

impl HttpSink {
    pub fn new(url: Url, level: Option<Level>, mode: Option<RenderMode>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default http client");
                reqwest::Client::new()
            });
        Self {
            client,
            url: Arc::new(url),
            level,
            mode: mode.or(Some(RenderMode::Json)),
            queue: OnceLock::new(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The worker's queue, starting the worker if a runtime is available.
    fn queue(&self) -> Option<&mpsc::Sender<Command>> {
        if let Some(tx) = self.queue.get() {
            return Some(tx);
        }
        let handle = Handle::try_current().ok()?;
        Some(self.queue.get_or_init(|| {
            let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
            handle.spawn(Self::run(self.client.clone(), self.url.clone(), rx));
            tracing::debug!(url = %self.url, "Http sink worker started");
            tx
        }))
    }

    async fn run(client: reqwest::Client, url: Arc<Url>, mut rx: mpsc::Receiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                Command::Post(body) => {
                    if let Err(e) = Self::post(&client, &url, &body).await {
                        tracing::warn!(url = %url, error = %e, "Sink delivery failed");
                    }
                }
                Command::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
    }

    async fn post(client: &reqwest::Client, url: &Url, body: &Value) -> Result<(), DeliveryError> {
        client
            .post(url.as_str())
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl Sink for HttpSink {
    fn level(&self) -> Option<Level> {
        self.level
    }

    fn render_mode(&self) -> Option<RenderMode> {
        self.mode
    }

    fn emit(&self, record: RenderedRecord) {
        let body = match record {
            RenderedRecord::Document(doc) => serde_json::to_value(&doc).unwrap_or_else(|e| json!({ "message": e.to_string() })),
            RenderedRecord::Line(line) => json!({ "message": line }),
        };

        let Some(queue) = self.queue() else {
            tracing::warn!(url = %self.url, "No async runtime, dropping record for http sink");
            return;
        };
        match queue.try_send(Command::Post(body)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(url = %self.url, capacity = QUEUE_CAPACITY, "Http sink queue full, dropping record");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                let error = DeliveryError::Closed;
                tracing::warn!(url = %self.url, error = %error, "Sink delivery failed");
            }
        }
    }

    fn flush(&self) -> BoxFuture<'static, ()> {
        let Some(queue) = self.queue.get().cloned() else {
            return Box::pin(async {});
        };
        Box::pin(async move {
            let (done, finished) = oneshot::channel();
            if queue.send(Command::Flush(done)).await.is_ok() {
                let _ = finished.await;
            }
        })
    }
}
