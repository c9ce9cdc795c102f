//! Interactive debugger CLI: `rdbg <input.rvm>` (§4.5, §6).
//!
//! A line-oriented REPL over [`rvm::debugger::Debugger`]: each iteration
//! prints the `[rdbg@0xPPPP] > ` prompt, reads one line of stdin, parses it
//! into a [`rvm::debugger::Command`], and dispatches. Three commands (`ba`,
//! `rb`, `pm`) need an address they don't carry inline, so they print their
//! own sub-prompt and read a second line before acting.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use rvm::debugger::{parse_address, parse_command, Command, DebugStop, Debugger};
use rvm::image;
use rvm::vm::StepOutcome;
use rvm::Vm;

#[derive(Parser)]
#[command(name = "rdbg", about = "Interactive single-step debugger for ReflectVM images")]
struct Args {
    /// Path to the raw VM image.
    input: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // §6: "Exit codes: ... 1 on startup errors" — clap's default
            // exit code for a usage error is 2, so print its message
            // ourselves and exit with the code the spec names.
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

    let vm = match Vm::load_bytes(&bytes) {
        Ok(vm) => vm,
        Err(err) => {
            tracing::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    run_repl(Debugger::new(vm))
}

fn run_repl(mut dbg: Debugger) -> ExitCode {
    let stdin = io::stdin();

    loop {
        print!("[rdbg@0x{:04X}] > ", dbg.vm.pc);
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            // EOF on stdin: behave like `exit`.
            return ExitCode::SUCCESS;
        }

        let Some(command) = parse_command(&line) else {
            println!("[-] Unrecognized command. Type 'help' for help.");
            continue;
        };

        match command {
            Command::Step => {
                if let Ok(instr) = dbg.vm.peek_instruction() {
                    if let Some(text) = rvm_asm::render(&instr) {
                        println!("{text}");
                    }
                }
                match dbg.step() {
                    Ok(StepOutcome::InvalidOpcode { byte }) => {
                        println!("[-] invalid opcode: {byte:#04x}");
                    }
                    Ok(StepOutcome::Executed { .. }) => {}
                    Err(err) => println!("[-] {err}"),
                }
            }
            Command::Continue => match dbg.continue_() {
                Ok(DebugStop::Breakpoint(addr)) => println!("[+] hit breakpoint at 0x{addr:04X}"),
                Ok(DebugStop::Halted) => {}
                Err(err) => println!("[-] {err}"),
            },
            Command::BreakHere => {
                dbg.set_breakpoint(dbg.vm.pc);
            }
            Command::AddBreakpoint => {
                let addr = prompt_address(&stdin);
                dbg.set_breakpoint(addr);
            }
            Command::ListBreakpoints => {
                for addr in dbg.breakpoints() {
                    println!("[+] 0x{addr:04X}");
                }
            }
            Command::RemoveBreakpoint => {
                let addr = prompt_address(&stdin);
                dbg.remove_breakpoint(addr);
            }
            Command::PrintMemory => {
                let addr = prompt_address(&stdin);
                println!("0x{:02X}", dbg.vm.memory[addr as usize]);
            }
            Command::PrintRegisters => {
                for (i, value) in dbg.vm.registers.iter().enumerate() {
                    println!("r{i:x}: 0x{value:02X}");
                }
            }
            Command::Help => print_help(),
            Command::Exit => return ExitCode::SUCCESS,
        }

        if !dbg.vm.r {
            println!("[!] VM halted");
            return ExitCode::SUCCESS;
        }
    }
}

fn prompt_address(stdin: &io::Stdin) -> u16 {
    print!("Enter address: ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = stdin.read_line(&mut line);
    parse_address(&line)
}

fn print_help() {
    println!("s          step one instruction");
    println!("c          continue until breakpoint or halt");
    println!("br         add a breakpoint at the current PC");
    println!("ba         add a breakpoint at a prompted address");
    println!("lb         list breakpoints");
    println!("rb         remove breakpoints at a prompted address");
    println!("pm         print the byte at a prompted address");
    println!("pr         print all registers");
    println!("help       print this message");
    println!("exit       quit the debugger");
}
