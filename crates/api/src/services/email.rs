//! Email service for verification and password-reset links.
//!
//! Uses SMTP via lettre for delivery. When SMTP is not configured the
//! service logs the message body instead of sending, which is the behavior
//! local development wants.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use mangrove_core::Email;

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for transactional account mail.
#[derive(Clone)]
pub struct EmailService {
    transport: Option<Transport>,
}

#[derive(Clone)]
struct Transport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create an email service; `None` config yields a log-only service.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: Option<&EmailConfig>) -> Result<Self, SmtpError> {
        let transport = match config {
            Some(config) => {
                let credentials = Credentials::new(
                    config.smtp_username.clone(),
                    config.smtp_password.expose_secret().to_string(),
                );

                let mailer =
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                        .port(config.smtp_port)
                        .credentials(credentials)
                        .build();

                Some(Transport {
                    mailer,
                    from_address: config.from_address.clone(),
                })
            }
            None => None,
        };

        Ok(Self { transport })
    }

    /// Send the email-verification link to a new registrant.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or sent.
    pub async fn send_verification_link(
        &self,
        to: &Email,
        first_name: &str,
        link: &str,
    ) -> Result<(), EmailError> {
        let body = format!(
            "Hi {first_name},\nPlease use the link below to verify your email\n{link}\n"
        );

        self.send(to, "Verify Your Email", &body).await
    }

    /// Send a password-reset link.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or sent.
    pub async fn send_reset_link(
        &self,
        to: &Email,
        first_name: &str,
        link: &str,
    ) -> Result<(), EmailError> {
        let body = format!(
            "Hi {first_name},\nPlease use the link below to reset your password\n{link}\n"
        );

        self.send(to, "Reset Your Password", &body).await
    }

    async fn send(&self, to: &Email, subject: &str, body: &str) -> Result<(), EmailError> {
        let Some(transport) = &self.transport else {
            tracing::info!(to = %to, subject = %subject, body = %body, "SMTP not configured; logging email instead");
            return Ok(());
        };

        let message = Message::builder()
            .from(
                transport
                    .from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(transport.from_address.clone()))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .body(body.to_string())?;

        transport.mailer.send(message).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_only_service_accepts_sends() {
        let service = EmailService::new(None).expect("log-only service");
        let to = Email::parse("user@example.com").expect("valid email");

        service
            .send_verification_link(&to, "Ada", "https://shop.example.com/verify?token=abc")
            .await
            .expect("log-only send");
    }
}
