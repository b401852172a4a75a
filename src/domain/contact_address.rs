use validator::ValidateEmail;

/// A server-configured mailbox: the notification recipient or the sender
/// address the email provider sends from.
///
/// Values usually come from environment variables, so surrounding whitespace
/// is dropped. The display name is configured separately
/// (`email_client.sender_name`), so `Name <addr>` is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactAddress(String);

impl ContactAddress {
    pub fn parse(s: String) -> Result<Self, String> {
        let address = s.trim();

        if address.contains('<') || address.contains('>') {
            return Err(format!(
                "{address} must be a bare address; set the display name in `sender_name`."
            ));
        }
        if !address.validate_email() {
            return Err(format!("{address} is not a valid email address."));
        }

        Ok(Self(address.to_owned()))
    }
}

impl AsRef<str> for ContactAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
