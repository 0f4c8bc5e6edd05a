// src/delivery.rs
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::error::{PulseError, Result};
use crate::types::{DeliveryResult, HeartbeatPayload};

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Sends one payload. Implementations never fail: every outcome, including
/// transport errors, is folded into the returned [`DeliveryResult`].
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn post_json(&self, url: &str, payload: &HeartbeatPayload) -> DeliveryResult;
}

/// reqwest over rustls. Certificate verification stays on and redirects are
/// not followed: a 3xx is reported as-is, never replayed as a GET.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, payload: &HeartbeatPayload) -> DeliveryResult {
        // .json() sets Content-Type: application/json
        let res = self.client.post(url).json(payload).send().await;

        match res {
            Ok(r) => {
                let code = r.status().as_u16();
                match r.text().await {
                    Ok(body) => DeliveryResult::from_response(code, Some(body)),
                    Err(e) => DeliveryResult::from_error(Some(code), error_chain(&e)),
                }
            }
            Err(e) => DeliveryResult::from_error(e.status().map(|s| s.as_u16()), error_chain(&e)),
        }
    }
}

/// reqwest's Display stops at the top-level error; walk the sources so the
/// log shows e.g. the TLS or connect failure underneath.
fn error_chain(e: &(dyn StdError + 'static)) -> String {
    let mut out = e.to_string();
    let mut cur = e.source();
    while let Some(src) = cur {
        out.push_str(": ");
        out.push_str(&src.to_string());
        cur = src.source();
    }
    out
}

/// A finished delivery, tagged with the cycle that triggered it.
#[derive(Debug, Clone)]
pub struct Completion {
    pub cycle: u64,
    pub result: DeliveryResult,
}

/// Runs transmissions on `runtime` (normally a multi-thread runtime, so they
/// execute in parallel with the scheduler) and hands results back over a
/// channel owned by the scheduler.
#[derive(Clone)]
pub struct DeliveryWorker {
    url: Arc<str>,
    transport: Arc<dyn Transport>,
    runtime: Handle,
    completions: mpsc::UnboundedSender<Completion>,
}

impl DeliveryWorker {
    /// Spawns onto the runtime this is called from; errors outside one.
    pub fn new(
        url: impl Into<Arc<str>>,
        transport: Arc<dyn Transport>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Completion>)> {
        let runtime = Handle::try_current().map_err(|_| PulseError::NoRuntime)?;
        Ok(Self::with_runtime(url, transport, runtime))
    }

    pub fn with_runtime(
        url: impl Into<Arc<str>>,
        transport: Arc<dyn Transport>,
        runtime: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Self {
            url: url.into(),
            transport,
            runtime,
            completions: tx,
        };
        (worker, rx)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends inline and waits for the result.
    pub async fn deliver(&self, payload: &HeartbeatPayload) -> DeliveryResult {
        self.transport.post_json(&self.url, payload).await
    }

    /// Fire and forget. The completion is dropped if the receiver is gone.
    pub fn submit(&self, cycle: u64, payload: HeartbeatPayload) {
        let url = self.url.clone();
        let transport = self.transport.clone();
        let tx = self.completions.clone();

        self.runtime.spawn(async move {
            let result = transport.post_json(&url, &payload).await;
            let _ = tx.send(Completion { cycle, result });
        });
    }
}

impl std::fmt::Debug for DeliveryWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryWorker").field("url", &self.url).finish_non_exhaustive()
    }
}
