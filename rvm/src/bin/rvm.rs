//! Interpreter CLI: `rvm <input.rvm>`.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use rvm::{image, Vm};

#[derive(Parser)]
#[command(name = "rvm", about = "Runs a ReflectVM image")]
struct Args {
    /// Path to the raw VM image.
    input: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let bytes = match image::load(&args.input) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut vm = match Vm::load_bytes(&bytes) {
        Ok(vm) => vm,
        Err(err) => {
            tracing::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match vm.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
