use crate::auth::{Token, TokenProvider};
use crate::core::{AuthError, LaunchpadError, LaunchpadResult};
use crate::protocol::ProtocolClient;
use futures::future::{BoxFuture, FutureExt, Shared};
use futures::Stream;
use reqwest::Client;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Bytes buffered between progress reports and file writes
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Progress of one transfer
///
/// `total_bytes` is `None` when the server did not announce a length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub bytes_transferred: u64,
    pub total_bytes: Option<u64>,
}

/// A running download
///
/// Yields [`DownloadProgress`] in order, starting with zero bytes once the
/// transfer has begun. [`DownloadStream::finish`] waits for the outcome.
///
/// The transfer waits for each report to be consumed before reading on;
/// after `finish` it runs unthrottled. Dropping the stream stops the
/// transfer.
pub struct DownloadStream {
    events: mpsc::Receiver<DownloadProgress>,
    task: JoinHandle<LaunchpadResult<u64>>,
    cancel: CancellationToken,
}

impl DownloadStream {
    /// Wait for the download to end; returns the number of bytes written
    pub async fn finish(mut self) -> LaunchpadResult<u64> {
        self.events.close();
        (&mut self.task)
            .await
            .map_err(|e| LaunchpadError::Package(format!("Download task failed: {}", e)))?
    }
}

impl Drop for DownloadStream {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            debug!("Download stream dropped, stopping transfer");
        }
        self.cancel.cancel();
        self.task.abort();
    }
}

impl Stream for DownloadStream {
    type Item = DownloadProgress;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().events.poll_recv(cx)
    }
}

type LoginOutcome = Shared<BoxFuture<'static, Result<Token, AuthError>>>;

/// Single-flight login shared by every clone of a downloader
///
/// The broker call runs on its own blocking task, so a waiter that goes
/// away never restarts it.
struct LoginGate {
    provider: TokenProvider,
    outcome: OnceLock<LoginOutcome>,
}

impl LoginGate {
    fn new(provider: TokenProvider) -> Self {
        Self {
            provider,
            outcome: OnceLock::new(),
        }
    }

    async fn login(&self) -> Result<Token, AuthError> {
        self.outcome.get_or_init(|| self.start()).clone().await
    }

    fn start(&self) -> LoginOutcome {
        info!("Requesting user authorization");
        let provider = self.provider.clone();
        let call = tokio::task::spawn_blocking(move || {
            let result = provider.acquire_token();
            match &result {
                Ok(_) => info!("User authorization complete"),
                Err(e) => info!("User authorization failed: {}", e),
            }
            result
        });

        async move {
            call.await.unwrap_or_else(|e| {
                Err(AuthError::BrokerContractViolation {
                    status: 0,
                    detail: format!("broker call did not complete: {}", e),
                })
            })
        }
        .boxed()
        .shared()
    }
}

/// Downloads versions resolved through the update service
///
/// An authenticated downloader logs in at most once for its lifetime; a
/// failed login is remembered and returned to every later caller.
#[derive(Clone)]
pub struct VersionDownloader {
    http: Client,
    protocol: ProtocolClient,
    login: Option<Arc<LoginGate>>,
}

impl VersionDownloader {
    pub fn anonymous(http: Client, protocol: ProtocolClient) -> Self {
        Self {
            http,
            protocol,
            login: None,
        }
    }

    pub fn authenticated(http: Client, protocol: ProtocolClient, provider: TokenProvider) -> Self {
        Self {
            http,
            protocol,
            login: Some(Arc::new(LoginGate::new(provider))),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.login.is_some()
    }

    /// Log in through the identity broker
    ///
    /// Concurrent callers share one broker call. No-op for anonymous
    /// downloaders.
    pub async fn enable_user_authorization(&self) -> Result<(), AuthError> {
        match &self.login {
            Some(gate) => gate.login().await.map(|_| ()),
            None => Ok(()),
        }
    }

    async fn token(&self) -> LaunchpadResult<Option<Token>> {
        match &self.login {
            Some(gate) => Ok(Some(gate.login().await?)),
            None => Ok(None),
        }
    }

    /// Start downloading `update_id`/`revision` into `destination`
    ///
    /// Nothing is written to disk until the download URL has been resolved.
    /// On cancellation the partial file is left where it is.
    pub fn download(
        &self,
        update_id: &str,
        revision: &str,
        destination: &Path,
        cancel: CancellationToken,
    ) -> DownloadStream {
        let (tx, rx) = mpsc::channel(1);
        let this = self.clone();
        let update_id = update_id.to_string();
        let revision = revision.to_string();
        let destination = destination.to_path_buf();
        // Dropping the stream cancels this child only, never the caller's token.
        let cancel = cancel.child_token();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            this.run(&update_id, &revision, &destination, &tx, &task_cancel)
                .await
        });

        DownloadStream {
            events: rx,
            task,
            cancel,
        }
    }

    async fn run(
        &self,
        update_id: &str,
        revision: &str,
        destination: &Path,
        events: &mpsc::Sender<DownloadProgress>,
        cancel: &CancellationToken,
    ) -> LaunchpadResult<u64> {
        let token = self.token().await?;
        if cancel.is_cancelled() {
            return Err(LaunchpadError::Cancelled);
        }

        let url = self
            .protocol
            .resolve_download_url(update_id, revision, token.as_ref())
            .await?;
        debug!("Resolved download link: {}", url);

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        transfer(&self.http, &url, destination, events, cancel).await
    }
}

async fn transfer(
    http: &Client,
    url: &str,
    destination: &Path,
    events: &mpsc::Sender<DownloadProgress>,
    cancel: &CancellationToken,
) -> LaunchpadResult<u64> {
    let mut response = http.get(url).send().await?.error_for_status()?;
    let total_bytes = response.content_length();
    let mut file = tokio::fs::File::create(destination).await?;

    let report = |bytes_transferred| DownloadProgress {
        bytes_transferred,
        total_bytes,
    };
    // A closed receiver only means nobody watches progress.
    let _ = events.send(report(0)).await;

    let mut transferred = 0u64;
    let mut buffer: Vec<u8> = Vec::with_capacity(CHUNK_SIZE);
    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Download cancelled after {} bytes", transferred);
                return Err(LaunchpadError::Cancelled);
            }
            chunk = response.chunk() => chunk?,
        };

        match chunk {
            Some(bytes) => {
                buffer.extend_from_slice(&bytes);
                if buffer.len() >= CHUNK_SIZE {
                    file.write_all(&buffer).await?;
                    transferred += buffer.len() as u64;
                    buffer.clear();
                    let _ = events.send(report(transferred)).await;
                }
            }
            None => break,
        }
    }

    if !buffer.is_empty() {
        file.write_all(&buffer).await?;
        transferred += buffer.len() as u64;
        let _ = events.send(report(transferred)).await;
    }
    file.flush().await?;

    info!("Downloaded {} bytes to {}", transferred, destination.display());
    Ok(transferred)
}
