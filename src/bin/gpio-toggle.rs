use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use whiteboard_wiper::config::GPIO_CHIP;
use whiteboard_wiper::control::CancellationToken;
use whiteboard_wiper::gpio::{toggle_line, CdevChip, LineValue, ToggleSpec};
use whiteboard_wiper::init_logging;
use whiteboard_wiper::signal::spawn_termination_watcher;
use whiteboard_wiper::timing::SystemClock;

#[derive(Parser, Debug)]
#[command(
    name = "gpio-toggle",
    about = "Request a GPIO line, toggle it on a fixed period, then release it"
)]
struct Cli {
    /// GPIO character device
    #[arg(long, default_value = GPIO_CHIP)]
    chip: String,
    /// Line offset on the chip
    #[arg(long)]
    line: u32,
    /// Time between toggles
    #[arg(long, default_value_t = 1000)]
    period_ms: u64,
    /// Stop after this many toggles (runs until Ctrl-C otherwise)
    #[arg(long)]
    count: Option<u64>,
    /// Level the line is requested with
    #[arg(long, value_enum, default_value_t = Level::Low)]
    initial: Level,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Level {
    Low,
    High,
}

impl From<Level> for LineValue {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => LineValue::Inactive,
            Level::High => LineValue::Active,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("gpio-toggle error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let token = CancellationToken::new();
    let _watcher =
        spawn_termination_watcher(token.clone()).context("failed to install signal handlers")?;

    let spec = ToggleSpec {
        initial: cli.initial.into(),
        period: Duration::from_millis(cli.period_ms),
        count: cli.count,
        ..ToggleSpec::new(cli.line)
    };
    let chip = CdevChip::new(cli.chip.clone());

    let toggles = toggle_line(&chip, &spec, &SystemClock, &token)
        .with_context(|| format!("failed to toggle line {} on {}", cli.line, cli.chip))?;

    println!("Toggled line {} {} times", cli.line, toggles);
    Ok(())
}
