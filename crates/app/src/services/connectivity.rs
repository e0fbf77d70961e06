//! Network reachability monitor.
//!
//! Publishes [`Connectivity`] on a watch channel. Purely informational; it
//! never drives the location state machine.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ConnectivityConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    Online,
    Offline,
    #[default]
    Unknown,
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Connectivity::Online => write!(f, "online"),
            Connectivity::Offline => write!(f, "offline"),
            Connectivity::Unknown => write!(f, "unknown"),
        }
    }
}

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Whether the network is reachable right now.
    async fn probe(&self) -> bool;
}

/// Probes by issuing a GET against a known endpoint.
pub struct HttpProbe {
    client: Client,
    url: String,
}

impl HttpProbe {
    pub fn new(config: &ConnectivityConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            url: config.probe_url.clone(),
        })
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn probe(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status();
                status.is_success() || status.is_redirection()
            }
            Err(e) => {
                debug!(error = %e, "Connectivity probe failed");
                false
            }
        }
    }
}

pub struct ConnectivityMonitor {
    probe: Arc<dyn ConnectivityProbe>,
    interval: Duration,
    tx: watch::Sender<Connectivity>,
}

impl ConnectivityMonitor {
    pub fn new(probe: Arc<dyn ConnectivityProbe>, interval: Duration) -> Self {
        let (tx, _) = watch::channel(Connectivity::Unknown);
        Self {
            probe,
            interval,
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Connectivity {
        *self.tx.borrow()
    }

    /// Probes once and publishes the result. Also the manual "retry" action.
    pub async fn check_connection(&self) -> Connectivity {
        let status = if self.probe.probe().await {
            Connectivity::Online
        } else {
            Connectivity::Offline
        };
        metrics::gauge!("network_online").set(if status == Connectivity::Online { 1.0 } else { 0.0 });
        let previous = self.tx.send_replace(status);
        if previous != status {
            info!(from = %previous, to = %status, "Connectivity changed");
        }
        status
    }

    /// Probes on a fixed interval until the handle is aborted.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                self.check_connection().await;
            }
        })
    }
}
