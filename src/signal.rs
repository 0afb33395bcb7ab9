//! SIGINT/SIGTERM to [`CancellationToken`] bridge.
//!
//! The control loop is synchronous, so signals are awaited on a dedicated
//! thread running a current-thread tokio runtime. The first signal cancels
//! the token; the watcher then exits. Repeated signals after that are
//! absorbed by tokio's handler and have no further effect.

use std::io;
use std::thread::{self, JoinHandle};

use tokio::runtime::Builder;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

use crate::control::CancellationToken;

/// Start watching for termination signals
///
/// Handlers are installed before this returns, so a signal delivered any
/// time afterwards is never lost. The watcher also exits if `token` is
/// cancelled by someone else, which lets callers join it on shutdown.
pub fn spawn_termination_watcher(token: CancellationToken) -> io::Result<JoinHandle<()>> {
    let runtime = Builder::new_current_thread().enable_all().build()?;

    let (mut interrupt, mut terminate) = {
        let _guard = runtime.enter();
        (
            signal(SignalKind::interrupt())?,
            signal(SignalKind::terminate())?,
        )
    };

    thread::Builder::new()
        .name("signal-watcher".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                let name = tokio::select! {
                    _ = interrupt.recv() => "SIGINT",
                    _ = terminate.recv() => "SIGTERM",
                    _ = token.cancelled() => return,
                };
                if token.cancel() {
                    info!("[Signal] {} received, stopping at next checkpoint", name);
                }
            });
        })
}
