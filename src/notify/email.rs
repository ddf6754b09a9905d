use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::NotifyError;
use crate::settings::EmailSettings;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one HTML email and returns the server's reply.
    async fn send(&self, subject: &str, html_body: &str) -> Result<String, NotifyError>;
}

/// Delivers through an authenticated SMTP relay (Gmail by default).
pub struct GmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl GmailNotifier {
    pub fn new(settings: &EmailSettings) -> Result<Self, NotifyError> {
        let credentials =
            Credentials::new(settings.gmail_user.to_string(), settings.gmail_pass.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from: Mailbox::new(Some(settings.sender_name.clone()), settings.gmail_user.clone()),
            to: Mailbox::new(None, settings.recipient.clone()),
        })
    }

    fn message(&self, subject: &str, html_body: &str) -> Result<Message, NotifyError> {
        Ok(Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?)
    }
}

#[async_trait]
impl Notifier for GmailNotifier {
    async fn send(&self, subject: &str, html_body: &str) -> Result<String, NotifyError> {
        let message = self.message(subject, html_body)?;
        let response = self.transport.send(message).await?;
        Ok(format!(
            "{} {}",
            response.code(),
            response.message().collect::<Vec<_>>().join(" ")
        ))
    }
}
