//! # Error
//!
//! Module dedicated to mailer errors. It contains an [`Error`] enum
//! based on [`thiserror::Error`] and a type alias [`Result`].

use thiserror::Error;

/// The global `Result` alias of the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot send message via smtp: host, port, username and password must be set")]
    MissingSmtpCredentialsError,
    #[error("cannot send message via smtp: invalid username {0:?}")]
    InvalidSmtpUsernameError(String),
    #[error("cannot send message without a recipient")]
    MissingRecipientError,
    #[error("cannot send message to invalid recipient {0:?}")]
    InvalidRecipientError(String),
    #[error("cannot connect to smtp server {1}")]
    ConnectSmtpError(#[source] mail_send::Error, String),
    #[error("cannot send message to smtp server {1}")]
    SendSmtpMessageError(#[source] mail_send::Error, String),
    #[error("cannot run sendmail command")]
    RunSendmailCommandError(#[source] process::Error),
}

impl Error {
    /// Returns `true` if the error comes from an incomplete or invalid
    /// configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingSmtpCredentialsError | Self::InvalidSmtpUsernameError(_)
        )
    }

    /// Returns `true` if the error comes from the arguments given to
    /// a send.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingRecipientError | Self::InvalidRecipientError(_)
        )
    }

    /// Returns `true` if the error comes from the SMTP exchange.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectSmtpError(..) | Self::SendSmtpMessageError(..)
        )
    }

    /// Returns `true` if the error comes from the sendmail command.
    pub fn is_command_error(&self) -> bool {
        matches!(self, Self::RunSendmailCommandError(_))
    }
}
