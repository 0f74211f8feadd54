use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, Message, SmtpTransport,
    Transport,
};

use crate::config::SmtpConfig;
use crate::error::{Error, Result};

/// SMTP mail delivery. Built without credentials when SMTP env vars are
/// absent; sending then fails with Unconfigured instead of attempting a
/// connection.
#[derive(Clone)]
pub struct MailService {
    smtp: Option<SmtpConfig>,
}

impl MailService {
    pub fn new(smtp: Option<SmtpConfig>) -> Self {
        if smtp.is_none() {
            tracing::warn!("SMTP is not configured, outgoing mail is disabled");
        }
        Self { smtp }
    }

    pub fn is_configured(&self) -> bool {
        self.smtp.is_some()
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let Some(smtp) = self.smtp.clone() else {
            return Err(Error::Unconfigured(
                "Mail delivery is not configured".to_string(),
            ));
        };

        let from: Mailbox = smtp
            .from_address
            .parse()
            .map_err(|e| Error::Config(format!("Invalid SMTP_FROM address: {}", e)))?;
        let to: Mailbox = to
            .parse()
            .map_err(|e| Error::BadRequest(format!("Invalid recipient address: {}", e)))?;
        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| Error::Internal(format!("Failed to build email: {}", e)))?;

        // SmtpTransport is blocking; keep it off the async runtime.
        tokio::task::spawn_blocking(move || {
            let mailer = SmtpTransport::relay(&smtp.host)
                .map_err(|e| Error::Internal(format!("SMTP relay error: {}", e)))?
                .credentials(Credentials::new(smtp.username, smtp.password))
                .build();
            mailer
                .send(&email)
                .map_err(|e| Error::Internal(format!("Failed to send email: {}", e)))?;
            Ok::<(), Error>(())
        })
        .await
        .map_err(|e| Error::Internal(format!("Mail task panicked: {}", e)))??;

        tracing::info!(subject = subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sending_without_smtp_config_fails_with_unconfigured() {
        let mail = MailService::new(None);
        assert!(!mail.is_configured());
        let err = mail
            .send("student@example.com", "Hello", "Body")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unconfigured(_)));
    }
}
