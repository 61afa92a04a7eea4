//! Asynchronous library to send emails.
//!
//! The main purpose of this library is to send a simple HTML message
//! to a list of recipients without caring about how the message is
//! delivered. Two transports are available:
//!
//! - SMTP: the message is sent to an SMTP server, authenticated with
//! the configured username and password.
//!
//! - Sendmail: the message is piped to a local sendmail-compatible
//! command (UNIX-like systems only), which reads the recipients from
//! the message headers.
//!
//! The transport is chosen from the [`MailerConfig`], and can be
//! changed at runtime with [`Mailer::update_config`].
//!
//! ```rust,no_run
//! use mailer::{Mailer, MailerConfig};
//!
//! # async fn run() -> mailer::Result<()> {
//! let mailer = Mailer::new(MailerConfig {
//!     host: "smtp.example.com".into(),
//!     port: 25,
//!     username: "alice@example.com".into(),
//!     password: "password".into(),
//!     ..Default::default()
//! });
//!
//! mailer
//!     .send("Hello", "<h1>Hello, world!</h1>", ["bob@example.com"])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
pub mod identity;
pub mod mailer;
pub mod message;
pub mod sendmail;
pub mod smtp;

#[doc(inline)]
pub use crate::{
    config::{MailerConfig, SmtpEncryptionKind},
    error::{Error, Result},
    identity::Identity,
    mailer::{Mailer, Sender, Transport},
    message::Message,
};

/// The current version of the library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
