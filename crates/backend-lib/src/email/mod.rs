// ============================
// crates/backend-lib/src/email/mod.rs
// ============================
//! Outbound email delivery.

pub mod templates;

use crate::config::SmtpSettings;
use crate::error::AppError;
use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::PoolConfig;
use lettre::{Message, SmtpTransport, Transport};

/// Capability to send one email to one recipient
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), AppError>;
}

/// SMTP relay mailer
pub struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    fn build_message(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<Message, AppError> {
        Message::builder()
            .from(
                format!("Songa <{}>", self.settings.from)
                    .parse()
                    .map_err(|e| AppError::Internal(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                text.to_string(),
                html.to_string(),
            ))
            .map_err(|e| AppError::Internal(format!("Failed to create email: {e}")))
    }

    fn build_transport(&self) -> Result<SmtpTransport, AppError> {
        let tls_parameters = TlsParameters::builder(self.settings.host.clone())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build TLS parameters: {e}")))?;

        let mailer = SmtpTransport::relay(&self.settings.host)
            .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {e}")))?
            .credentials(Credentials::new(
                self.settings.username.clone(),
                self.settings.password.clone(),
            ))
            .port(self.settings.port)
            .tls(Tls::Required(tls_parameters))
            .pool_config(PoolConfig::new().max_size(1))
            .timeout(Some(std::time::Duration::from_secs(10)))
            .build();

        Ok(mailer)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), AppError> {
        let message = self.build_message(to, subject, html, text)?;
        let transport = self.build_transport()?;

        // lettre's SMTP transport is blocking
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {e}")))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}

/// Mailer used when no SMTP settings are configured; logs instead of
/// sending so the reset flow stays exercisable in development.
pub struct NullMailer;

#[async_trait]
impl Mailer for NullMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        _html: &str,
        text: &str,
    ) -> Result<(), AppError> {
        tracing::info!(%to, %subject, body = %text, "smtp not configured, dropping email");
        Ok(())
    }
}
