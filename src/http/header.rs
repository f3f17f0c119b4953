//! Splitting raw header values into named elements.
//!
//! A value such as `max-age=60, private; a=1` yields the elements
//! `max-age -> 60`, `private -> ""` and `a -> 1`. Elements are separated by
//! `,`, an element's parts by `;`, and each part contributes its own entry.
//! Separators inside double quotes do not split.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderParseError {
    #[error("header value is not valid UTF-8")]
    NotUtf8,
    #[error("unterminated quoted string")]
    UnterminatedQuote,
    #[error("header element has an empty name")]
    EmptyName,
}

/// Parses `value` into `(name, value)` elements, in order.
pub fn parse_elements(value: &[u8]) -> Result<Vec<(String, String)>, HeaderParseError> {
    let value = std::str::from_utf8(value).map_err(|_| HeaderParseError::NotUtf8)?;

    let mut elements = Vec::new();
    for part in split_unquoted(value)? {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, value) = match part.split_once('=') {
            Some((name, value)) => (name.trim(), unquote(value.trim())),
            None => (part, String::new()),
        };
        if name.is_empty() {
            return Err(HeaderParseError::EmptyName);
        }
        elements.push((name.to_string(), value));
    }
    Ok(elements)
}

fn split_unquoted(value: &str) -> Result<Vec<&str>, HeaderParseError> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' | ';' if !in_quotes => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(HeaderParseError::UnterminatedQuote);
    }
    parts.push(&value[start..]);
    Ok(parts)
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
