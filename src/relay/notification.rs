use std::collections::HashMap;

use once_cell::sync::Lazy;
use tera::{Tera, Value};

use crate::domain::SanitizedSubmission;

const TEMPLATE_NAME: &str = "contact_notification.html";

static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.register_filter("escape_html", escape_html_filter);
    tera.add_raw_template(TEMPLATE_NAME, include_str!("contact_notification.html"))
        .expect("Failed to parse the contact notification template");
    tera
});

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn escape_html_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = tera::try_get_value!("escape_html", "value", String, value);
    Ok(Value::String(escape_html(&text)))
}

/// Renders the owner notification for an accepted submission. Every field is
/// escaped again here, independently of the sanitizer.
pub fn render_notification(submission: &SanitizedSubmission) -> Result<String, tera::Error> {
    let mut ctx = tera::Context::new();
    ctx.insert("subject", &submission.subject);
    ctx.insert("message", &submission.message);
    ctx.insert("sender_name", &submission.sender_name);
    ctx.insert("sender_email", &submission.sender_email);
    TEMPLATES.render(TEMPLATE_NAME, &ctx)
}
