// Mailer - outbound email seam

use async_trait::async_trait;
use tracing::info;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> AppResult<()>;
}

/// Writes outgoing mail to the log instead of delivering it
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Outgoing email:\n{}",
            message.body
        );
        Ok(())
    }
}

pub fn password_reset_email(
    from: &str,
    to: &str,
    username: &str,
    reset_link: &str,
    valid_hours: i64,
) -> EmailMessage {
    EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Password Reset Request".to_string(),
        body: format!(
            "Hello {username},\n\n\
             You requested a password reset for your account.\n\n\
             Click the link below to reset your password:\n\
             {reset_link}\n\n\
             This link will expire in {valid_hours} hours.\n\n\
             If you did not request this reset, you can ignore this email.\n"
        ),
    }
}
