//! # Config
//!
//! Module dedicated to the mailer configuration. The configuration
//! is built (or deserialized) by the host application, then given to
//! [`Mailer::new`](crate::Mailer::new) or
//! [`Mailer::update_config`](crate::Mailer::update_config).

use std::fmt;

use process::Command;

use crate::Identity;

/// The default sendmail command, looked up in `PATH`.
pub const SENDMAIL_DEFAULT_COMMAND: &str = "sendmail";

/// The mailer configuration.
#[derive(Clone, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case", default)
)]
pub struct MailerConfig {
    /// The SMTP server host name or IP address.
    pub host: String,

    /// The SMTP server port, 0 means unset.
    pub port: u16,

    /// The SMTP encryption to use.
    ///
    /// Defaults to none: the session stays in plain text.
    pub encryption: SmtpEncryptionKind,

    /// The SMTP login, usually the full email address.
    ///
    /// It is also used as envelope sender, and as the `From` address
    /// when [`MailerConfig::from_addr`] is empty.
    pub username: String,

    /// The SMTP password.
    pub password: String,

    /// The `From` address, overrides the username.
    pub from_addr: String,

    /// The `From` display name.
    ///
    /// When empty and in SMTP mode, the part of the username before
    /// `@` is used.
    pub from_alias: String,

    /// Sends messages with the local sendmail command instead of
    /// SMTP. Host, port and password are then ignored.
    ///
    /// Only for UNIX-like systems.
    pub use_command: bool,

    /// The sendmail command line, defaults to
    /// [`SENDMAIL_DEFAULT_COMMAND`].
    ///
    /// Words are separated by whitespaces. The arguments `-F <name>
    /// -f <addr> -t` are appended to it.
    #[cfg_attr(feature = "derive", serde(skip_serializing_if = "Option::is_none"))]
    pub sendmail_cmd: Option<String>,
}

impl MailerConfig {
    /// Returns `true` if the configuration is complete enough to send
    /// messages.
    pub fn is_valid(&self) -> bool {
        let smtp = !self.host.is_empty()
            && self.port > 0
            && !self.username.is_empty()
            && !self.password.is_empty();

        smtp || self.use_command
    }

    /// Derives the sender identity.
    pub fn identity(&self) -> Identity {
        let addr = if self.from_addr.is_empty() {
            &self.username
        } else {
            &self.from_addr
        };

        let name = if !self.from_alias.is_empty() {
            self.from_alias.as_str()
        } else if !self.use_command {
            self.username
                .split_once('@')
                .map(|(name, _)| name)
                .unwrap_or_default()
        } else {
            ""
        };

        Identity::new(name, addr)
    }

    /// Builds the sendmail command, without the sender arguments.
    pub fn sendmail_cmd(&self) -> Command {
        match self.sendmail_cmd.as_deref().map(str::trim) {
            Some(cmd) if !cmd.is_empty() => Command::from(cmd),
            _ => Command::new(SENDMAIL_DEFAULT_COMMAND),
        }
    }
}

impl fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("encryption", &self.encryption)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_addr", &self.from_addr)
            .field("from_alias", &self.from_alias)
            .field("use_command", &self.use_command)
            .field("sendmail_cmd", &self.sendmail_cmd)
            .finish()
    }
}

/// The SMTP encryption kind.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum SmtpEncryptionKind {
    /// Plain text session, no TLS negotiation.
    #[default]
    None,

    /// Plain text session upgraded with STARTTLS.
    #[cfg_attr(feature = "derive", serde(alias = "starttls"))]
    StartTls,

    /// Implicit TLS session.
    #[cfg_attr(feature = "derive", serde(alias = "ssl"))]
    Tls,
}

impl fmt::Display for SmtpEncryptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::StartTls => write!(f, "StartTLS"),
            Self::Tls => write!(f, "SSL/TLS"),
        }
    }
}
