//! Trains the reference spatial pooler and SDR classifier on MNIST and
//! prints the test accuracy.
//!
//! Run with:
//!   cargo run --release
//!
//! Data files must be present at ./mnist_data/ (IDX binary format). Set
//! `MNIST_SP_CONFIG` to a JSON file to override any `HarnessConfig` field,
//! and `RUST_LOG` to change the log level.

use std::backtrace::Backtrace;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use mnist_sp_bench::harness::reference_models;
use mnist_sp_bench::{run, HarnessConfig, HarnessError};

const CONFIG_ENV: &str = "MNIST_SP_CONFIG";

fn main() -> ExitCode {
    init_tracing();
    install_crash_hook();

    match run_benchmark() {
        Ok(accuracy) => {
            println!("Score: {}", accuracy);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_benchmark() -> Result<f64, HarnessError> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => HarnessConfig::load_json(path)?,
        None => HarnessConfig::default(),
    };
    let (recognizer, predictor) = reference_models(&config)?;
    let report = run(&config, recognizer, predictor)?;
    Ok(report.accuracy)
}

/// Logs go to stderr so stdout only carries the score.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints the panic message and a stack trace before the process dies.
fn install_crash_hook() {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = Backtrace::force_capture();
        error!("{}", info);
        eprintln!("{}", backtrace);
    }));
}
