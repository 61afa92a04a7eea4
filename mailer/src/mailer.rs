//! # Mailer
//!
//! Module dedicated to the mailer. The [`Mailer`] owns a context
//! made of the configuration, the sender identity and the lazily
//! built SMTP credentials. The context is replaced as
//! a whole on every reconfiguration.

use async_trait::async_trait;
use mail_send::Credentials;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    message::has_line_break, sendmail::SendmailTransport, smtp, smtp::SmtpTransport, Error,
    Identity, MailerConfig, Message, Result,
};

/// The capability of sending messages.
///
/// The body can be HTML. The transport (SMTP or sendmail command) can
/// be changed at runtime by updating the configuration.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Sends a message to the given recipients.
    async fn send(&self, subject: &str, body: &str, to: &[String]) -> Result<()>;

    /// Replaces the current configuration.
    async fn update_config(&self, config: MailerConfig);
}

/// The delivery strategy, selected once per send.
#[derive(Clone)]
pub enum Transport {
    Smtp(SmtpTransport),
    Sendmail(SendmailTransport),
}

impl Transport {
    /// Builds the message for this transport then delivers it.
    ///
    /// Only the SMTP message carries a `From` header: the sendmail
    /// command receives the sender as arguments.
    pub async fn deliver(
        &self,
        subject: &str,
        body: &str,
        to: &[String],
        from: &Identity,
    ) -> Result<()> {
        match self {
            Self::Smtp(smtp) => {
                let msg = Message::new(subject, body, to).with_from(from);
                smtp.send(&msg, to).await
            }
            Self::Sendmail(sendmail) => {
                let msg = Message::new(subject, body, to);
                sendmail.send(&msg).await
            }
        }
    }
}

/// The mailer context.
///
/// Holds everything derived from one configuration. Only
/// [`Mailer::update_config`] can change it, by replacing it.
pub(crate) struct MailerContext {
    pub(crate) config: MailerConfig,
    pub(crate) identity: Identity,
    credentials: Option<Credentials<String>>,
}

impl MailerContext {
    pub(crate) fn new(config: MailerConfig) -> Self {
        Self {
            identity: config.identity(),
            config,
            credentials: None,
        }
    }

    /// Returns `true` once SMTP credentials have been built.
    pub(crate) fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Selects the transport matching the configuration.
    ///
    /// In SMTP mode, the credentials are built and cached on first
    /// call.
    pub(crate) fn transport(&mut self) -> Result<Transport> {
        if self.config.use_command {
            let sendmail = SendmailTransport::new(&self.config, &self.identity);
            return Ok(Transport::Sendmail(sendmail));
        }

        let credentials = match &self.credentials {
            Some(credentials) => credentials.clone(),
            None => {
                debug!(host = self.config.host, "building smtp credentials");
                let credentials = smtp::credentials(&self.config)?;
                self.credentials = Some(credentials.clone());
                credentials
            }
        };

        Ok(Transport::Smtp(SmtpTransport::new(&self.config, credentials)))
    }
}

/// The mailer.
///
/// Built once from a configuration, then shared across callers. The
/// context lock is only held to select the transport, never while
/// sending.
pub struct Mailer {
    ctx: Mutex<MailerContext>,
}

impl Mailer {
    /// Creates a new mailer.
    ///
    /// The configuration is not validated, see
    /// [`MailerConfig::is_valid`].
    pub fn new(config: MailerConfig) -> Self {
        Self {
            ctx: Mutex::new(MailerContext::new(config)),
        }
    }

    /// Sends a message to the given recipients.
    ///
    /// Fails without any I/O if there is no recipient or if a
    /// recipient contains a line break.
    pub async fn send(
        &self,
        subject: &str,
        body: &str,
        to: impl IntoIterator<Item = impl ToString>,
    ) -> Result<()> {
        let to = to
            .into_iter()
            .map(|rcpt| rcpt.to_string())
            .collect::<Vec<_>>();

        if to.is_empty() {
            return Err(Error::MissingRecipientError);
        }

        if let Some(rcpt) = to.iter().find(|rcpt| has_line_break(rcpt)) {
            return Err(Error::InvalidRecipientError(rcpt.clone()));
        }

        let (transport, identity) = {
            let mut ctx = self.ctx.lock().await;
            (ctx.transport()?, ctx.identity.clone())
        };

        info!(rcpts = to.len(), "sending message");
        transport.deliver(subject, body, &to, &identity).await
    }

    /// Replaces the current configuration.
    ///
    /// The identity is derived again from the new configuration and
    /// the cached SMTP credentials are dropped.
    pub async fn update_config(&self, config: MailerConfig) {
        debug!(use_command = config.use_command, "updating mailer config");
        *self.ctx.lock().await = MailerContext::new(config);
    }

    /// Returns a copy of the current configuration.
    pub async fn config(&self) -> MailerConfig {
        self.ctx.lock().await.config.clone()
    }

    /// Returns the current sender identity.
    pub async fn identity(&self) -> Identity {
        self.ctx.lock().await.identity.clone()
    }

    /// Returns `true` once SMTP credentials have been built.
    pub async fn is_authenticated(&self) -> bool {
        self.ctx.lock().await.is_authenticated()
    }
}

#[async_trait]
impl Sender for Mailer {
    async fn send(&self, subject: &str, body: &str, to: &[String]) -> Result<()> {
        Mailer::send(self, subject, body, to).await
    }

    async fn update_config(&self, config: MailerConfig) {
        Mailer::update_config(self, config).await
    }
}
