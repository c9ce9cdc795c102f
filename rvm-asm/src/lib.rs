//! The ReflectVM instruction set: opcode table, decoder, and renderer.
//!
//! This crate has no I/O and no knowledge of VM state; it is the shared
//! contract the interpreter, disassembler, and debugger all decode and
//! render through, so that no tool can silently diverge from another.

pub mod instruction;
pub mod opcode;

pub use instruction::{decode, render, DecodeError, Extra, Instruction};
pub use opcode::{ControlFlowClass, InvalidOpcode, Opcode, SysCall, SysFormat, SysOperand};
