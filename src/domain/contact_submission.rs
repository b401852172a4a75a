use super::{ContactMessage, ContactSubject, Sanitizer, SenderEmail, SenderName};

/// Contact form payload exactly as the browser sent it.
///
/// Every field is optional at this stage so that a missing subject surfaces as
/// "Subject is required" rather than a body deserialization failure.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub subject: Option<String>,
    pub message: Option<String>,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub subject: ContactSubject,
    pub message: ContactMessage,
    pub sender_name: Option<SenderName>,
    pub sender_email: Option<SenderEmail>,
}

/// Free-text fields after [`Sanitizer::sanitize`], ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSubmission {
    pub subject: String,
    pub message: String,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
}

/// Every rule a submission broke, in rule order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn summary(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ContactSubmission {
    /// Runs every field rule and collects all failures instead of stopping at
    /// the first one.
    pub fn validate(self) -> Result<ValidatedSubmission, ValidationErrors> {
        let subject = ContactSubject::parse(self.subject);
        let message = ContactMessage::parse(self.message);
        let sender_email = SenderEmail::parse(self.sender_email);
        let sender_name = SenderName::parse(self.sender_name);

        match (subject, message, sender_email, sender_name) {
            (Ok(subject), Ok(message), Ok(sender_email), Ok(sender_name)) => {
                Ok(ValidatedSubmission {
                    subject,
                    message,
                    sender_name,
                    sender_email,
                })
            }
            (subject, message, sender_email, sender_name) => {
                let errors = [
                    subject.err(),
                    message.err(),
                    sender_email.err(),
                    sender_name.err(),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(ValidationErrors(errors))
            }
        }
    }
}

impl ValidatedSubmission {
    pub fn sanitize(&self, sanitizer: &Sanitizer) -> SanitizedSubmission {
        SanitizedSubmission {
            subject: sanitizer.sanitize(self.subject.as_ref()),
            message: sanitizer.sanitize(self.message.as_ref()),
            sender_name: self
                .sender_name
                .as_ref()
                .map(|name| sanitizer.sanitize(name.as_ref())),
            sender_email: self
                .sender_email
                .as_ref()
                .map(|email| sanitizer.sanitize(email.as_ref())),
        }
    }
}
