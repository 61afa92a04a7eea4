//! # Sendmail
//!
//! Module dedicated to the sendmail transport. The message is piped
//! to a local sendmail-compatible command, which reads the recipients
//! from the `To` header itself.

use process::Command;
use tracing::{debug, info};

use crate::{Error, Identity, MailerConfig, Message, Result};

/// The sendmail transport.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SendmailTransport {
    cmd: Command,
}

impl SendmailTransport {
    pub fn new(config: &MailerConfig, from: &Identity) -> Self {
        let cmd = config
            .sendmail_cmd()
            .args(["-F", from.name.as_str(), "-f", from.addr.as_str(), "-t"]);

        Self { cmd }
    }

    /// The full command line, sender arguments included.
    pub fn cmd(&self) -> &Command {
        &self.cmd
    }

    /// Pipes the given message to the sendmail command.
    pub async fn send(&self, msg: &Message) -> Result<()> {
        info!(cmd = %self.cmd, "sending sendmail message");

        let out = self
            .cmd
            .run_with(msg.to_vec())
            .await
            .map_err(Error::RunSendmailCommandError)?;

        debug!(out = out.to_string_lossy(), "sendmail command succeeded");
        Ok(())
    }
}
