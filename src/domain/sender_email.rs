use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Email shape pattern must compile")
});

/// Reply-to address supplied by the visitor. Only the `local@domain.tld`
/// shape is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderEmail(String);

impl SenderEmail {
    pub fn parse(s: Option<String>) -> Result<Option<Self>, String> {
        let Some(trimmed) = s.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        if !EMAIL_SHAPE.is_match(trimmed) {
            return Err("Invalid email format".into());
        }

        Ok(Some(Self(trimmed.to_owned())))
    }
}

impl AsRef<str> for SenderEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
