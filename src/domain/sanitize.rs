use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

pub const MAX_SANITIZED_LENGTH: usize = 5000;

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<\s*script\b[^>]*>.*?<\s*/\s*script\s*>")
        .expect("Script block pattern must compile")
});

/// Lossy clean-up of visitor supplied text before it is embedded in an email.
///
/// The output never contains `<` or `>`, has no surrounding whitespace and is
/// at most [`MAX_SANITIZED_LENGTH`] graphemes long. Sanitizing already
/// sanitized text returns it unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer {
    strip_script_blocks: bool,
}

impl Sanitizer {
    pub fn new(strip_script_blocks: bool) -> Self {
        Self {
            strip_script_blocks,
        }
    }

    pub fn sanitize(&self, input: &str) -> String {
        let mut text = input.to_owned();

        if self.strip_script_blocks {
            loop {
                let stripped = SCRIPT_BLOCK.replace_all(&text, "").into_owned();
                if stripped == text {
                    break;
                }
                text = stripped;
            }
        }

        text.retain(|c| c != '<' && c != '>');

        let trimmed = text.trim();
        match trimmed.grapheme_indices(true).nth(MAX_SANITIZED_LENGTH) {
            Some((cut, _)) => trimmed[..cut].trim_end().to_owned(),
            None => trimmed.to_owned(),
        }
    }
}
