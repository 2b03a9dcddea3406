//! SMTP message service implementation using Lettre.

use crate::config::SmtpConfig;
use crate::error::{AccountError, Result};
use crate::providers::{MessageCategory, MessageService};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// SMTP message service using Lettre.
///
/// Sends plain-text messages over SMTP. Rendering rich templates is left to
/// the caller; the workflows hand over a body that already contains the link.
///
/// # Examples
///
/// ```ignore
/// use composable_rust_accounts::config::SmtpConfig;
/// use composable_rust_accounts::providers::SmtpMessageService;
///
/// let messages = SmtpMessageService::new(SmtpConfig::from_env());
/// ```
#[derive(Clone)]
pub struct SmtpMessageService {
    /// SMTP server address.
    server: String,

    /// SMTP server port.
    port: u16,

    /// SMTP credentials.
    credentials: Credentials,

    /// Sender email address.
    from_email: String,

    /// Sender display name.
    from_name: String,
}

impl SmtpMessageService {
    /// Create a new SMTP message service.
    #[must_use]
    pub fn new(config: SmtpConfig) -> Self {
        Self {
            server: config.server,
            port: config.port,
            credentials: Credentials::new(config.username, config.password),
            from_email: config.from_email,
            from_name: config.from_name,
        }
    }

    /// Build SMTP transport for sending messages.
    ///
    /// Creates a new transport for each message to avoid connection pooling issues.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be configured.
    fn build_transport(&self) -> Result<SmtpTransport> {
        Ok(SmtpTransport::relay(&self.server)
            .map_err(|e| AccountError::Messaging(format!("SMTP relay error: {e}")))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }

    /// Build the "From" header.
    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Build the message envelope.
    fn build_message(&self, to: &str, subject: &str, content: &str) -> Result<Message> {
        Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| AccountError::Messaging(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| AccountError::Messaging(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(content.to_string())
            .map_err(|e| AccountError::Messaging(format!("Failed to build message: {e}")))
    }
}

impl MessageService for SmtpMessageService {
    async fn send(
        &self,
        to: &str,
        category: MessageCategory,
        subject: &str,
        content: &str,
    ) -> Result<()> {
        let message = self.build_message(to, subject, content)?;
        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&message)
                .map_err(|e| AccountError::Messaging(format!("Failed to send message: {e}")))
        })
        .await
        .map_err(|e| AccountError::Messaging(format!("Message task failed: {e}")))??;

        tracing::info!(to = %to, category = %category, "Message sent via SMTP");
        Ok(())
    }
}
