use std::{fmt, io, process::Stdio};

use tokio::{io::AsyncWriteExt as _, process::Command as AsyncCommand};
use tracing::{debug, info};

use crate::{Error, Output, Result};

/// The command structure.
///
/// Represents a local program with its arguments. The program is
/// spawned directly, not interpreted by a shell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
    program: String,
    args: Vec<String>,
}

impl Command {
    pub fn new(program: impl ToString) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl ToString>) -> Self {
        self.args.extend(args.into_iter().map(|arg| arg.to_string()));
        self
    }

    pub async fn run(&self) -> Result<Output> {
        self.run_with([]).await
    }

    /// Runs the command with the given input.
    ///
    /// The input is written to the standard input channel while the
    /// standard output and standard error are collected, then the
    /// standard input is closed. A command exiting before reading
    /// its whole input is not an error as such: only its exit status
    /// code matters.
    pub async fn run_with(&self, input: impl AsRef<[u8]>) -> Result<Output> {
        info!(cmd = %self, "run command");

        let input = input.as_ref();

        let mut child = AsyncCommand::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| Error::SpawnCommandError(err, self.to_string()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::GetStdinError(self.to_string()))?;

        let write_stdin = async move {
            let res = stdin.write_all(input).await;
            drop(stdin);
            res
        };

        let (written, output) = tokio::join!(write_stdin, child.wait_with_output());

        match written {
            Ok(()) => debug!(bytes = input.len(), "stdin written"),
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                debug!("command closed its standard input early");
            }
            Err(err) => return Err(Error::WriteStdinError(err, self.to_string())),
        }

        let output = output.map_err(|err| Error::GetOutputError(err, self.to_string()))?;

        let code = output
            .status
            .code()
            .ok_or_else(|| Error::GetExitStatusCodeNotAvailableError(self.to_string()))?;

        let output = Output::new(output.stdout, output.stderr);

        if code == 0 {
            debug!(code, "command gracefully exited");
        } else {
            let cmd = self.to_string();
            let out = output.to_string_lossy();
            debug!(code, out, "command ungracefully exited");
            return Err(Error::GetExitStatusCodeNonZeroError(cmd, code, out));
        }

        Ok(output)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Parses a whitespace-separated command line.
///
/// The first word is the program, the following ones its arguments.
/// Quoting is not supported.
impl From<&str> for Command {
    fn from(cmd: &str) -> Self {
        let mut words = cmd.split_whitespace();
        let program = words.next().unwrap_or_default();
        Self::new(program).args(words)
    }
}
