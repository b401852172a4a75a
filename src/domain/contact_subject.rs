use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubject(String);

impl ContactSubject {
    pub const MAX_LENGTH: usize = 200;

    /// Accepts a subject of 1 to 200 graphemes once surrounding whitespace is
    /// trimmed. The error is the message shown to the visitor.
    pub fn parse(s: Option<String>) -> Result<Self, String> {
        let trimmed = s.as_deref().map(str::trim).unwrap_or_default();

        if trimmed.is_empty() {
            return Err("Subject is required".into());
        }
        if trimmed.graphemes(true).count() > Self::MAX_LENGTH {
            return Err(format!(
                "Subject must be less than {} characters",
                Self::MAX_LENGTH
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ContactSubject {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
