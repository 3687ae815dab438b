//! SMTP mailer.
//!
//! Wraps lettre's async SMTP transport behind the [`Mailer`] trait. The
//! transport is verified (connectivity + auth) before the pipeline's first
//! send, per the notification contract.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use intake_core::Config;

/// Mail transport errors
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Message build failed: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Notification mail abstraction.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Connectivity/auth check against the relay.
    async fn verify(&self) -> Result<(), MailError>;

    /// Send an HTML email to a single recipient.
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

/// SMTP-backed mailer.
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl SmtpMailer {
    /// Build the transport from config: STARTTLS relay when `smtp_tls` is
    /// set, plain builder otherwise, with credentials if provided.
    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let mailer = if config.smtp_tls {
            let b = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);
            let b = if let (Some(u), Some(p)) = (&config.smtp_user, &config.smtp_password) {
                b.credentials(Credentials::new(u.clone(), p.clone()))
            } else {
                b
            };
            tracing::info!(
                host = %config.smtp_host,
                port = config.smtp_port,
                "Mailer initialized (SMTP with STARTTLS)"
            );
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port);
            let b = if let (Some(u), Some(p)) = (&config.smtp_user, &config.smtp_password) {
                b.credentials(Credentials::new(u.clone(), p.clone()))
            } else {
                b
            };
            tracing::info!(host = %config.smtp_host, port = config.smtp_port, "Mailer initialized (SMTP)");
            b.build()
        };

        Ok(Self {
            mailer: Arc::new(mailer),
            from: config.smtp_from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn verify(&self) -> Result<(), MailError> {
        let ok = self
            .mailer
            .test_connection()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        if !ok {
            return Err(MailError::Transport(
                "SMTP connection test returned false".to_string(),
            ));
        }
        Ok(())
    }

    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let from_addr: Mailbox = self
            .from
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("Invalid SMTP_FROM: {}", e)))?;
        let to_addr: Mailbox = to
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("Invalid recipient: {}", e)))?;

        let email = Message::builder()
            .from(from_addr)
            .to(to_addr)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        info!(to = %to, subject = %subject, "Notification email sent");
        Ok(())
    }
}
