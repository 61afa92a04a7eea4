//! Asynchronous library to run a local command with piped input.
//!
//! The core concept of this library is to simplify the execution of
//! a single local program, following these rules:
//!
//! 1. Commands are executed asynchronously, using the [tokio] async
//! runtime.
//!
//! 2. Commands are spawned directly, without going through a shell,
//! so arguments never need escaping.
//!
//! 3. The standard output and the standard error are both captured,
//! so a failing command can be reported with its combined output.

mod command;
mod error;
mod output;

#[doc(inline)]
pub use crate::{
    command::Command,
    error::{Error, Result},
    output::Output,
};
