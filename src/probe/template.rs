//! Description template rendering.
//!
//! Templates use `{name}` placeholders bound to collection attributes, with
//! `{{` and `}}` as literal braces. The rendered text has its whitespace runs
//! collapsed so multi-line descriptions fit on one report line.

use crate::error::ConfigurationError;

use super::Attributes;

/// Render `template` for the probe named `probe` using `attributes`.
pub fn render_description(
    probe: &str,
    template: &str,
    attributes: &Attributes,
) -> Result<String, ConfigurationError> {
    let malformed = |details: &str| ConfigurationError::MalformedTemplate {
        probe: probe.to_string(),
        details: details.to_string(),
    };

    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                rendered.push('{');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => return Err(malformed("nested '{' inside a placeholder")),
                        Some(c) => key.push(c),
                        None => return Err(malformed("unterminated placeholder")),
                    }
                }
                if key.is_empty() {
                    return Err(malformed("empty placeholder"));
                }
                let value = attributes.get(&key).ok_or_else(|| {
                    ConfigurationError::MissingAttribute {
                        probe: probe.to_string(),
                        attribute: key.clone(),
                    }
                })?;
                rendered.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                rendered.push('}');
            }
            '}' => return Err(malformed("single '}' encountered")),
            c => rendered.push(c),
        }
    }

    Ok(rendered.split_whitespace().collect::<Vec<_>>().join(" "))
}
