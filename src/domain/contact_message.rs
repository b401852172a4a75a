use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage(String);

impl ContactMessage {
    pub const MIN_LENGTH: usize = 10;
    pub const MAX_LENGTH: usize = 5000;

    pub fn parse(s: Option<String>) -> Result<Self, String> {
        let trimmed = s.as_deref().map(str::trim).unwrap_or_default();

        if trimmed.is_empty() {
            return Err("Message is required".into());
        }

        let length = trimmed.graphemes(true).count();
        if length < Self::MIN_LENGTH {
            return Err(format!(
                "Message must be at least {} characters",
                Self::MIN_LENGTH
            ));
        }
        if length > Self::MAX_LENGTH {
            return Err(format!(
                "Message must be less than {} characters",
                Self::MAX_LENGTH
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ContactMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
