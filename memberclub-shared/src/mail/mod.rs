/// Operator notification delivery
///
/// Every successful registration dispatches one transactional message to the
/// configured operator contact, summarizing the new account and its chosen
/// tier. Delivery sits behind the [`Notifier`] trait so the workflow stays
/// testable without an SMTP server: production uses [`SmtpNotifier`] (lettre
/// over async SMTP), tests use [`MemoryNotifier`].
///
/// Delivery is best-effort from the workflow's point of view: a failed send
/// is logged and never rolls back the account that triggered it.

use async_trait::async_trait;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

/// Error type for notification delivery
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// An address or the message itself could not be built
    #[error("Failed to build message: {0}")]
    BuildError(String),

    /// The SMTP transport rejected or failed the send
    #[error("Failed to send message: {0}")]
    SendError(String),
}

/// Delivery seam for transactional notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one message to the given recipient
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// SMTP transport configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP relay hostname
    pub smtp_host: String,

    /// SMTP relay port
    pub smtp_port: u16,

    /// SMTP username (None for unauthenticated relays)
    pub smtp_username: Option<String>,

    /// SMTP password
    pub smtp_password: Option<String>,

    /// Sender address for all outbound messages
    pub from_address: String,
}

/// Production notifier over async SMTP
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Builds the transport from configuration
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| MailError::BuildError(e.to_string()))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| MailError::BuildError(e.to_string()))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse::<Mailbox>()
                .map_err(|e| MailError::BuildError(e.to_string()))?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| MailError::BuildError(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::SendError(e.to_string()))?;

        Ok(())
    }
}

/// A message captured by [`MemoryNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Recipient address
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub body: String,
}

/// Test notifier that records messages instead of delivering them
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: std::sync::Mutex<Vec<SentMessage>>,
}

impl MemoryNotifier {
    /// Creates an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages recorded so far
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("notifier lock poisoned").clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        self.sent.lock().expect("notifier lock poisoned").push(SentMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Composes the operator-facing summary of a new registration
///
/// The operators read French; the wording mirrors the message they have
/// always received for new signups.
pub fn registration_notice(
    first_name: &str,
    last_name: &str,
    email: &str,
    phone_number: &str,
    tier_label: &str,
) -> String {
    format!(
        "L'utilisateur {first_name} {last_name}, avec l'email {email} et le numéro: \
         {phone_number}, vient de créer un compte avec un abonnement {tier_label}"
    )
}
