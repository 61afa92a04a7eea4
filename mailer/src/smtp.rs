//! # SMTP
//!
//! Module dedicated to the SMTP transport. Each send opens its own
//! session, authenticates, sends the envelope and the message, then
//! quits.

use mail_send::{
    smtp::message::{Address as SmtpAddress, Message as SmtpMessage},
    Credentials, SmtpClient, SmtpClientBuilder,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::{message::has_line_break, Error, MailerConfig, Message, Result, SmtpEncryptionKind};

/// Builds the SMTP credentials from the given configuration.
///
/// Fails if the host, the port, the username or the password is
/// missing. The username is also the envelope sender, so it cannot
/// contain line breaks.
pub fn credentials(config: &MailerConfig) -> Result<Credentials<String>> {
    if config.username.is_empty()
        || config.password.is_empty()
        || config.host.is_empty()
        || config.port == 0
    {
        return Err(Error::MissingSmtpCredentialsError);
    }

    if has_line_break(&config.username) {
        return Err(Error::InvalidSmtpUsernameError(config.username.clone()));
    }

    Ok(Credentials::new(config.username.clone(), config.password.clone()))
}

/// The SMTP transport.
#[derive(Clone)]
pub struct SmtpTransport {
    host: String,
    port: u16,
    encryption: SmtpEncryptionKind,
    credentials: Credentials<String>,
    envelope_from: String,
}

impl SmtpTransport {
    pub fn new(config: &MailerConfig, credentials: Credentials<String>) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            encryption: config.encryption,
            credentials,
            envelope_from: config.username.clone(),
        }
    }

    /// The `host:port` address of the SMTP server.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Sends the given message to the given recipients.
    ///
    /// The envelope sender is the SMTP username, whatever the `From`
    /// header of the message says.
    pub async fn send(&self, msg: &Message, to: &[String]) -> Result<()> {
        let addr = self.addr();
        info!(addr, "sending smtp message");
        debug!(encryption = %self.encryption, rcpts = to.len(), "smtp envelope");

        let smtp_msg = SmtpMessage {
            mail_from: SmtpAddress {
                email: self.envelope_from.as_str().into(),
                ..Default::default()
            },
            rcpt_to: to
                .iter()
                .map(|email| SmtpAddress {
                    email: email.as_str().into(),
                    ..Default::default()
                })
                .collect(),
            body: msg.to_vec().into(),
        };

        let builder = SmtpClientBuilder::new(self.host.clone(), self.port)
            .credentials(self.credentials.clone())
            .implicit_tls(self.encryption == SmtpEncryptionKind::Tls);

        match self.encryption {
            SmtpEncryptionKind::None => {
                let client = builder
                    .connect_plain()
                    .await
                    .map_err(|err| Error::ConnectSmtpError(err, addr.clone()))?;
                send_then_quit(client, smtp_msg, &addr).await
            }
            SmtpEncryptionKind::StartTls | SmtpEncryptionKind::Tls => {
                let client = builder
                    .connect()
                    .await
                    .map_err(|err| Error::ConnectSmtpError(err, addr.clone()))?;
                send_then_quit(client, smtp_msg, &addr).await
            }
        }
    }
}

async fn send_then_quit<T>(
    mut client: SmtpClient<T>,
    msg: SmtpMessage<'_>,
    addr: &str,
) -> Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    client
        .send(msg)
        .await
        .map_err(|err| Error::SendSmtpMessageError(err, addr.to_owned()))?;

    client
        .quit()
        .await
        .map_err(|err| Error::SendSmtpMessageError(err, addr.to_owned()))?;

    debug!(addr, "smtp session closed");
    Ok(())
}
