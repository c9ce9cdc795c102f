//! Error types shared by the image loader, execution engine, and
//! disassembler. One enum per layer, in the style of
//! `fuel_vm::error::InterpreterError`.

use std::io;

/// Failures loading a VM image from disk into memory.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The image is larger than the 64 KiB address space (§6).
    #[error("image is {len} bytes, which exceeds the 65535-byte limit")]
    ImageTooLarge {
        /// The offending file length.
        len: usize,
    },
    /// The image file could not be read.
    #[error("failed to read image: {0}")]
    Io(#[from] io::Error),
}

/// Failures during execution. Invalid opcodes and divide-by-zero are
/// deliberately *not* represented here: both are defined, non-fatal
/// conditions per §7 and §9, handled in-band by [`crate::vm::Vm::step`].
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// A `sys` instruction's stdin/stdout access failed.
    #[error("I/O failure servicing a system call: {0}")]
    Io(#[from] io::Error),
}

/// Failures writing the disassembler's output file.
#[derive(Debug, thiserror::Error)]
pub enum DisasmError {
    /// Opening, writing, or overwriting the output file failed (§7: "All
    /// I/O errors on the disassembler output file are fatal").
    #[error("failed to write disassembly: {0}")]
    Io(#[from] io::Error),
}
