use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderName(String);

impl SenderName {
    pub const MAX_LENGTH: usize = 100;

    /// An empty or whitespace-only name is treated as not given.
    pub fn parse(s: Option<String>) -> Result<Option<Self>, String> {
        let Some(trimmed) = s.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        if trimmed.graphemes(true).count() > Self::MAX_LENGTH {
            return Err(format!(
                "Name must be less than {} characters",
                Self::MAX_LENGTH
            ));
        }

        Ok(Some(Self(trimmed.to_owned())))
    }
}

impl AsRef<str> for SenderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
