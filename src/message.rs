//! Message construction and validation
//!
//! Templates use brace-format syntax: `{date}` is replaced with the resolved
//! date and `{{` / `}}` are literal braces. Anything else inside braces is a
//! format error.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Post length ceiling, in characters
pub const MAX_MESSAGE_CHARS: usize = 280;

/// Characters shown when reporting an over-long message
pub const PREVIEW_CHARS: usize = 80;

/// The only recognised placeholder name
pub const DATE_PLACEHOLDER: &str = "date";

/// Escaped braces, a complete field, or a stray brace
static TEMPLATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|\{|\}").expect("Invalid template regex"));

/// Substitute `date` into every `{date}` field of `template`
pub fn build_message(template: &str, date: &str) -> Result<String> {
    let mut out = String::with_capacity(template.len() + date.len());
    let mut last = 0;

    for cap in TEMPLATE_TOKEN.captures_iter(template) {
        let Some(token) = cap.get(0) else {
            continue;
        };
        out.push_str(&template[last..token.start()]);
        last = token.end();

        match token.as_str() {
            "{{" => out.push('{'),
            "}}" => out.push('}'),
            "{" => {
                return Err(Error::TemplateFormat(format!(
                    "unclosed '{{' at byte {}",
                    token.start()
                )))
            }
            "}" => {
                return Err(Error::TemplateFormat(format!(
                    "single '}}' encountered at byte {}",
                    token.start()
                )))
            }
            _ => {
                let field = cap.get(1).map(|m| m.as_str()).unwrap_or("");
                out.push_str(substitute_field(field, date)?);
            }
        }
    }

    out.push_str(&template[last..]);
    Ok(out)
}

fn substitute_field<'a>(field: &str, date: &'a str) -> Result<&'a str> {
    if field == DATE_PLACEHOLDER {
        return Ok(date);
    }

    let name = field.split(['!', ':']).next().unwrap_or("");
    if field.is_empty() || name.chars().all(|c| c.is_ascii_digit()) {
        Err(Error::TemplateFormat(format!(
            "positional field '{{{}}}' is not supported; use {{{}}}",
            field, DATE_PLACEHOLDER
        )))
    } else if name == DATE_PLACEHOLDER {
        Err(Error::TemplateFormat(format!(
            "conversion or format spec in '{{{}}}' is not supported",
            field
        )))
    } else {
        Err(Error::TemplateFormat(format!(
            "unknown placeholder '{}'",
            name
        )))
    }
}

/// Number of characters, as counted against the ceiling
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// First `PREVIEW_CHARS` characters, with an ellipsis when cut
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Reject messages longer than `MAX_MESSAGE_CHARS`
pub fn validate_length(text: &str) -> Result<()> {
    let count = char_count(text);
    if count > MAX_MESSAGE_CHARS {
        return Err(Error::MessageTooLong {
            count,
            preview: preview(text),
        });
    }
    Ok(())
}
