//! # Output
//!
//! Module dedicated to command output. It only exposes an [`Output`]
//! struct, holding what the command wrote on its standard output and
//! standard error.

use crate::{Error, Result};

/// The command output.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Output {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Output {
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        Self { stdout, stderr }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }

    /// Returns the standard output followed by the standard error.
    pub fn combined(&self) -> Vec<u8> {
        [self.stdout.as_slice(), self.stderr.as_slice()].concat()
    }

    /// Reads the combined output as string lossy.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.combined()).to_string()
    }
}

impl TryFrom<Output> for String {
    type Error = Error;

    fn try_from(output: Output) -> Result<Self> {
        String::from_utf8(output.combined()).map_err(Error::ParseOutputAsUtf8StringError)
    }
}
