use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use iels_domain::email::Email;

use crate::config::IdentityConfig;
use crate::domain::repository::Mailer;
use crate::error::DeliveryError;

// ── SMTP ──────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Port 465 uses implicit TLS; any other port negotiates STARTTLS.
    pub fn new(
        host: &str,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        from: &str,
    ) -> Result<Self, DeliveryError> {
        let from: Mailbox = from
            .parse()
            .map_err(|e| DeliveryError::InvalidAddress(format!("{from}: {e}")))?;

        let builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        };
        let mut builder = builder
            .map_err(|e| DeliveryError::Transport(format!("smtp relay {host}: {e}")))?
            .port(port);

        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, to: &Email, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let to: Mailbox = to
            .as_str()
            .parse()
            .map_err(|e| DeliveryError::InvalidAddress(format!("{to}: {e}")))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_owned())
            .map_err(|e| DeliveryError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(())
    }
}

// ── Log-only (development) ────────────────────────────────────────────────────

/// Writes messages to the log instead of sending them. The body, which
/// contains the plaintext code, is only emitted at `debug`.
#[derive(Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, to: &Email, subject: &str, body: &str) -> Result<(), DeliveryError> {
        tracing::info!(%to, subject, "smtp not configured, message logged instead of sent");
        tracing::debug!(%to, body, "undelivered message body");
        Ok(())
    }
}

// ── Selected at startup ───────────────────────────────────────────────────────

#[derive(Clone)]
pub enum AppMailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl AppMailer {
    /// SMTP when `SMTP_HOST` is set, otherwise log-only.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, DeliveryError> {
        match config.smtp_host.as_deref() {
            Some(host) => Ok(Self::Smtp(SmtpMailer::new(
                host,
                config.smtp_port,
                config.smtp_username.clone(),
                config.smtp_password.clone(),
                &config.mail_from,
            )?)),
            None => Ok(Self::Log(LogMailer)),
        }
    }
}

impl Mailer for AppMailer {
    async fn send(&self, to: &Email, subject: &str, body: &str) -> Result<(), DeliveryError> {
        match self {
            Self::Smtp(mailer) => mailer.send(to, subject, body).await,
            Self::Log(mailer) => mailer.send(to, subject, body).await,
        }
    }
}
