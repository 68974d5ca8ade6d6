//! Shutdown signalling.
//!
//! A [`ShutdownHandle`] owns a `watch<bool>` that only ever goes from
//! `false` to `true`. SIGTERM and SIGINT (Ctrl+C off unix) trigger it once
//! [`ShutdownHandle::listen_for_signals`] is running; tasks that must stop
//! hold a [`ShutdownSignal`].

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Triggers shutdown and hands out signals that observe it.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Triggers shutdown. Later calls are no-ops.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// A signal that completes once shutdown is triggered.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Spawns a task that triggers shutdown on SIGTERM or SIGINT.
    #[cfg(unix)]
    pub fn listen_for_signals(&self) -> JoinHandle<()> {
        let handle = self.clone();

        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};

            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        error!(error = %e, "Failed to install signal handlers");
                        return;
                    }
                };

            let name = tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            };
            info!(signal = name, "Shutting down");
            handle.trigger();
        })
    }

    /// Spawns a task that triggers shutdown on Ctrl+C.
    #[cfg(not(unix))]
    pub fn listen_for_signals(&self) -> JoinHandle<()> {
        let handle = self.clone();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!(signal = "ctrl-c", "Shutting down");
                    handle.trigger();
                }
                Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
            }
        })
    }
}

/// Completes when shutdown is triggered.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Waits for shutdown.
    ///
    /// Returns immediately if shutdown was already triggered. If every
    /// handle is dropped nothing can trigger anymore, so this never returns.
    pub async fn wait(mut self) {
        if self.rx.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
