//! Shutdown coordination
//!
//! Turns SIGINT/SIGTERM/SIGHUP/SIGQUIT into a broadcast the scan loop
//! selects on. A second signal exits immediately.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Coordinates graceful shutdown across the application
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
}

impl ShutdownCoordinator {
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);
        (Self { shutdown_tx }, shutdown_rx)
    }

    /// Install the signal handlers. Must be called inside a tokio runtime.
    ///
    /// Handlers are registered before this returns, so a signal delivered
    /// afterwards always reaches the broadcast.
    pub fn listen_for_signals(&self) {
        setup_signal_handlers(self.shutdown_tx.clone());
    }
}

fn notify(tx: &broadcast::Sender<()>, signal_count: &AtomicUsize, name: &str) {
    let prev = signal_count.fetch_add(1, Ordering::AcqRel);
    let _ = tx.send(());
    if prev >= 1 {
        log::warn!("{name} received again; exiting");
        std::process::exit(130);
    }
    log::info!("{name} received; finishing current cycle");
}

fn setup_signal_handlers(shutdown_tx: broadcast::Sender<()>) {
    let signal_count = Arc::new(AtomicUsize::new(0));

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        // SAFETY: restoring the default disposition of SIGPIPE has no
        // preconditions; it lets `kiosk | head` terminate quietly
        #[allow(unsafe_code)]
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        let signals = [
            (SignalKind::interrupt(), "SIGINT"),
            (SignalKind::terminate(), "SIGTERM"),
            (SignalKind::hangup(), "SIGHUP"),
            (SignalKind::quit(), "SIGQUIT"),
        ];

        for (kind, name) in signals {
            let mut sig = match signal(kind) {
                Ok(sig) => sig,
                Err(e) => {
                    log::warn!("cannot listen for {name}: {e}");
                    continue;
                }
            };
            let tx = shutdown_tx.clone();
            let sig_ctr = signal_count.clone();

            tokio::spawn(async move {
                while sig.recv().await.is_some() {
                    notify(&tx, &sig_ctr, name);
                }
            });
        }
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                notify(&shutdown_tx, &signal_count, "Ctrl-C");
            }
        });
    }
}
