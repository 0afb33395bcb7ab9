use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;
use whiteboard_wiper::control::{acquire, run_wiper, CancellationToken, RunSummary};
use whiteboard_wiper::gpio::CdevChip;
use whiteboard_wiper::signal::spawn_termination_watcher;
use whiteboard_wiper::timing::SystemClock;
use whiteboard_wiper::{init_logging, realtime, WiperConfig};

fn main() -> ExitCode {
    init_logging(false);

    match run() {
        Ok(summary) => {
            info!(
                "[Wiper] Exiting: {:?} ({} polls, {} recoveries)",
                summary.reason, summary.polls, summary.recoveries
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("wiper error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<RunSummary> {
    let config = WiperConfig::load();
    config.validate().context("invalid configuration")?;

    realtime::apply(&config.realtime);

    let token = CancellationToken::new();
    let watcher =
        spawn_termination_watcher(token.clone()).context("failed to install signal handlers")?;

    let chip = CdevChip::new(config.gpio.chip_path.clone());
    let mut hw = acquire(&chip, &config, SystemClock).context("hardware initialization failed")?;

    let result = run_wiper(&mut hw, &config, &SystemClock, &token);
    let released = hw.shutdown();

    // Unblock the watcher if no signal arrived.
    token.cancel();
    let _ = watcher.join();

    let summary = result.context("control loop failed")?;
    released.context("failed to stop motors during shutdown")?;
    Ok(summary)
}
