mod contact_address;
mod contact_message;
mod contact_subject;
mod contact_submission;
mod sanitize;
mod sender_email;
mod sender_name;

pub use contact_address::ContactAddress;
pub use contact_message::ContactMessage;
pub use contact_subject::ContactSubject;
pub use contact_submission::{
    ContactSubmission, SanitizedSubmission, ValidatedSubmission, ValidationErrors,
};
pub use sanitize::{MAX_SANITIZED_LENGTH, Sanitizer};
pub use sender_email::SenderEmail;
pub use sender_name::SenderName;
