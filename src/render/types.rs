//! Render Types
//!
//! Call context, backend kinds and errors shared by all renderers.

use std::future::Future;
use std::process::ExitStatus;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Renderer backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Placeholder PDF built in-process
    Stub,
    /// Remote FOP sidecar over HTTP
    Remote,
    /// Local `fop` subprocess
    Command,
}

/// Cancellation scope for a single render call
///
/// Cloning shares the cancellation state. A context is cancelled when
/// [`cancel`](Self::cancel) is called, when a guard from
/// [`cancel_on_drop`](Self::cancel_on_drop) is dropped, or once its deadline
/// passes.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RenderContext {
    /// Context with no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that expires after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Derive a context that is cancelled with this one and expires no later
    /// than `timeout` from now
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancel the context and every child derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns a guard that cancels the context when dropped
    ///
    /// Handlers hold one for the lifetime of the request, so a client
    /// disconnect (which drops the handler future) aborts the render.
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    /// Resolves once the context is cancelled (not on deadline)
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Time left before the deadline, `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail fast if the context is already done
    pub fn check(&self) -> Result<(), RenderError> {
        if self.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        if self.remaining() == Some(Duration::ZERO) {
            return Err(RenderError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive `work` to completion unless the context ends first
    ///
    /// When the context wins, `work` is dropped before returning, which
    /// releases anything it owns (child processes, connections).
    pub async fn run<F, T>(&self, work: F) -> Result<T, RenderError>
    where
        F: Future<Output = Result<T, RenderError>>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(RenderError::Cancelled),
            _ = deadline => Err(RenderError::DeadlineExceeded),
            result = work => result,
        }
    }
}

/// Render error types
///
/// Each variant names the phase that failed so logs can be read without
/// reproducing the request.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("render cancelled")]
    Cancelled,

    #[error("render deadline exceeded")]
    DeadlineExceeded,

    #[error("build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("build request: {0}")]
    BuildRequest(#[source] reqwest::Error),

    #[error("call fop sidecar: {0}")]
    Send(#[source] reqwest::Error),

    #[error("read fop response: {0}")]
    ReadResponse(#[source] reqwest::Error),

    #[error("fop error: {message}")]
    Remote { status: u16, message: String },

    #[error("create temp dir: {0}")]
    WorkDir(#[source] std::io::Error),

    #[error("write {name}: {source}")]
    WriteInput {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("start fop: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("fop command failed: {status}: {output}")]
    CommandFailed { status: ExitStatus, output: String },

    #[error("read pdf: {0}")]
    ReadOutput(#[source] std::io::Error),
}

impl RenderError {
    /// True for errors caused by the caller giving up rather than the backend
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
