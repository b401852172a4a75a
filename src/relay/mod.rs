mod notification;

pub use notification::{escape_html, render_notification};

use crate::configuration::Environment;
use crate::domain::{ContactAddress, ContactSubmission, Sanitizer, ValidationErrors};
use crate::email_client::{DeliveryId, EmailSender, OutgoingEmail};
use crate::routes::error_chain_fmt;

pub const GENERIC_FAILURE_MESSAGE: &str = "Internal server error";

#[derive(thiserror::Error)]
pub enum RelayError {
    #[error("{}", .0.summary())]
    Validation(ValidationErrors),
    /// `client_message` is what may be shown to the visitor; the source keeps
    /// the full provider error for the logs.
    #[error("{client_message}")]
    Delivery {
        client_message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl std::fmt::Debug for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Validates, sanitizes and forwards contact submissions to the site owner.
pub struct ContactRelay<E> {
    sender: E,
    recipient: ContactAddress,
    sanitizer: Sanitizer,
    environment: Environment,
}

impl<E: EmailSender> ContactRelay<E> {
    pub fn new(
        sender: E,
        recipient: ContactAddress,
        sanitizer: Sanitizer,
        environment: Environment,
    ) -> Self {
        Self {
            sender,
            recipient,
            sanitizer,
            environment,
        }
    }

    /// Makes at most one delivery attempt. Invalid submissions never reach
    /// the email sender.
    #[tracing::instrument(
        name = "Relaying a contact submission",
        skip(self, submission),
        fields(
            sender_email = tracing::field::Empty,
            message_id = tracing::field::Empty
        )
    )]
    pub async fn relay(&self, submission: ContactSubmission) -> Result<DeliveryId, RelayError> {
        let validated = submission.validate().map_err(|errors| {
            tracing::info!(errors = %errors, "Rejected an invalid contact submission");
            RelayError::Validation(errors)
        })?;

        let sanitized = validated.sanitize(&self.sanitizer);
        if let Some(email) = &sanitized.sender_email {
            tracing::Span::current().record("sender_email", tracing::field::display(email));
        }

        let html = render_notification(&sanitized).map_err(|e| {
            self.delivery_failure(
                anyhow::Error::new(e).context("Failed to render the notification"),
            )
        })?;
        let subject = format!("Portfolio Contact: {}", sanitized.subject);

        let message_id = self
            .sender
            .send_email(OutgoingEmail {
                to: &self.recipient,
                reply_to: sanitized.sender_email.as_deref(),
                subject: &subject,
                html: &html,
            })
            .await
            .map_err(|e| self.delivery_failure(anyhow::Error::new(e)))?;

        tracing::Span::current().record(
            "message_id",
            tracing::field::display(message_id.as_ref()),
        );
        tracing::info!("Contact email sent");
        Ok(message_id)
    }

    fn delivery_failure(&self, error: anyhow::Error) -> RelayError {
        tracing::error!(
            error.cause_chain = ?error,
            error.message = %error,
            "Failed to deliver a contact email"
        );
        let client_message = if self.environment.exposes_error_details() {
            error.to_string()
        } else {
            GENERIC_FAILURE_MESSAGE.to_owned()
        };
        RelayError::Delivery {
            client_message,
            source: error,
        }
    }
}
