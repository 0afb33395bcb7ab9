use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use whiteboard_wiper::config::{
    RealtimeConfig, SensorConfig, ECHO_GPIO_OFFSET, ECHO_TIMEOUT_US, GPIO_CHIP, TRIG_GPIO_OFFSET,
};
use whiteboard_wiper::control::CancellationToken;
use whiteboard_wiper::error::log_sensor_error;
use whiteboard_wiper::gpio::CdevChip;
use whiteboard_wiper::{init_logging, realtime};
use whiteboard_wiper::sensor::{Hcsr04, RangeSensor};
use whiteboard_wiper::signal::spawn_termination_watcher;
use whiteboard_wiper::timing::{Clock, SystemClock};

#[derive(Parser, Debug)]
#[command(
    name = "hcsr04-probe",
    about = "Take repeated HC-SR04 readings and print each one"
)]
struct Cli {
    /// Number of readings to take
    #[arg(long, default_value_t = 50)]
    samples: u32,
    /// Pause between readings
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,
    /// GPIO character device
    #[arg(long, default_value = GPIO_CHIP)]
    chip: String,
    #[arg(long, default_value_t = TRIG_GPIO_OFFSET)]
    trigger: u32,
    #[arg(long, default_value_t = ECHO_GPIO_OFFSET)]
    echo: u32,
    #[arg(long, default_value_t = ECHO_TIMEOUT_US)]
    echo_timeout_us: u64,
    /// Emit one JSON object per reading
    #[arg(long)]
    json: bool,
    /// Skip SCHED_FIFO and CPU pinning (echo timing will jitter more)
    #[arg(long)]
    no_realtime: bool,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct ProbeRecord {
    index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    echo_us: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance_cm: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("hcsr04-probe error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let token = CancellationToken::new();
    let _watcher =
        spawn_termination_watcher(token.clone()).context("failed to install signal handlers")?;

    realtime::apply(&RealtimeConfig {
        enabled: !cli.no_realtime,
        ..RealtimeConfig::default()
    });

    let chip = CdevChip::new(cli.chip.clone());
    let config = SensorConfig {
        echo_timeout_us: cli.echo_timeout_us,
    };
    let mut sensor = Hcsr04::init(&chip, cli.trigger, cli.echo, SystemClock, &config)
        .with_context(|| format!("failed to initialize HC-SR04 on {}", cli.chip))?;

    let interval = Duration::from_millis(cli.interval_ms);
    let mut ok = 0u32;
    let mut taken = 0u32;

    for index in 0..cli.samples {
        let record = match sensor.read() {
            Ok(sample) => {
                ok += 1;
                ProbeRecord {
                    index,
                    echo_us: Some(sample.echo_us),
                    distance_cm: Some(sample.distance_cm()),
                    error: None,
                }
            }
            Err(err) => {
                log_sensor_error(&err, "probe");
                ProbeRecord {
                    index,
                    echo_us: None,
                    distance_cm: None,
                    error: Some(err.to_string()),
                }
            }
        };
        taken += 1;
        print_record(&record, cli.json)?;

        SystemClock.delay(interval);
        if token.is_cancelled() {
            break;
        }
    }

    if !cli.json {
        println!("{}/{} readings succeeded", ok, taken);
    }
    Ok(())
}

fn print_record(record: &ProbeRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(record)?);
        return Ok(());
    }

    match (&record.echo_us, &record.distance_cm, &record.error) {
        (Some(echo_us), Some(distance_cm), _) => {
            println!("{:>4}: {:>6} us  {:>6.1} cm", record.index, echo_us, distance_cm)
        }
        (_, _, Some(error)) => println!("{:>4}: error: {}", record.index, error),
        _ => {}
    }
    Ok(())
}
