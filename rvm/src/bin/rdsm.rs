//! Static disassembler CLI: `rdsm <input.rvm> <output.rsm>`.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use rvm::disasm;
use rvm::error::DisasmError;
use rvm::image;

#[derive(Parser)]
#[command(name = "rdsm", about = "Disassembles a ReflectVM image by reachability sweep")]
struct Args {
    /// Path to the raw VM image.
    input: PathBuf,
    /// Path to the output listing; overwritten if it already exists.
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // §6: "Two positional arguments required; otherwise print
            // usage and exit with code 1" — clap's own exit code for a
            // usage error is 2, so print its message ourselves and exit
            // with the code the spec names instead of letting clap exit.
            let _ = err.print();
            return ExitCode::from(1);
        }
    };

    let bytes = match image::load(&args.input) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let disassembly = disasm::sweep(&bytes);
    let listing = disasm::format_output(&bytes, &disassembly);

    if let Err(err) = std::fs::write(&args.output, listing).map_err(DisasmError::from) {
        tracing::error!("{err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
