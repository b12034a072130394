//! `.properties` translation bundles.

use std::collections::BTreeMap;

/// A `\u` escape is not followed by four hex digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid unicode escape at line {line}")]
pub struct PropertiesError {
    pub line: usize,
}

/// Physical lines joined into logical ones, with the number of the line each
/// starts on.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;
    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim_start();
        let (number, mut line) = match current.take() {
            Some(pending) => pending,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (index + 1, String::new())
            }
        };
        let trailing = trimmed.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 1 {
            line.push_str(&trimmed[..trimmed.len() - 1]);
            current = Some((number, line));
        } else {
            line.push_str(trimmed);
            lines.push((number, line));
        }
    }
    if let Some(pending) = current {
        lines.push(pending);
    }
    lines
}

fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or(PropertiesError { line })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

/// Byte offset where the key of `line` ends: the first unescaped `=`, `:`
/// or whitespace.
fn key_end(line: &str) -> usize {
    let mut escaped = false;
    for (offset, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            return offset;
        }
    }
    line.len()
}

/// Parse the `key = value` entries of a properties file.
///
/// Supports `#`/`!` comments, `=`/`:`/whitespace separators, `\`
/// continuation lines, and `\t \n \r \f \uXXXX` escapes. A later entry
/// replaces an earlier one with the same key.
///
/// # Errors
///
/// [`PropertiesError`] for a malformed `\u` escape.
pub fn parse_properties(text: &str) -> Result<BTreeMap<String, String>, PropertiesError> {
    let mut entries = BTreeMap::new();
    for (number, line) in logical_lines(text) {
        let end = key_end(&line);
        let key = unescape(&line[..end], number)?;
        let rest = line[end..].trim_start();
        let rest = rest
            .strip_prefix('=')
            .or_else(|| rest.strip_prefix(':'))
            .unwrap_or(rest)
            .trim_start();
        entries.insert(key, unescape(rest, number)?);
    }
    Ok(entries)
}

fn is_language(segment: &str) -> bool {
    (2..=3).contains(&segment.len()) && segment.chars().all(|c| c.is_ascii_lowercase())
}

fn is_country(segment: &str) -> bool {
    segment.len() == 2 && segment.chars().all(|c| c.is_ascii_uppercase())
}

/// Locale tag of a bundle named `<name>_<language>[_<COUNTRY>].properties`.
///
/// Returns `None` for other file names, including the locale-less default
/// bundle.
#[must_use]
pub fn bundle_locale(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(".properties")?;
    let segments: Vec<&str> = stem.split('_').collect();
    match segments.as_slice() {
        [_, .., language, country] if is_language(language) && is_country(country) => {
            Some(format!("{language}_{country}"))
        }
        [_, .., language] if is_language(language) => Some((*language).to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_entries_and_skip_comments() {
        let entries = parse_properties(
            "# comment\n! other comment\n\nthing-type.acme.sensor.label = Sensor\nthing-type.acme.sensor.description:Climate\nkey value\n",
        )
        .unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries["thing-type.acme.sensor.label"], "Sensor");
        assert_eq!(entries["thing-type.acme.sensor.description"], "Climate");
        assert_eq!(entries["key"], "value");
    }

    #[test]
    fn should_join_continuation_lines() {
        let entries = parse_properties("greeting = Hello \\\n    world\n").unwrap();
        assert_eq!(entries["greeting"], "Hello world");
    }

    #[test]
    fn should_decode_escapes() {
        let entries = parse_properties("a\\=b = Gr\\u00fc\\u00dfe\\tend\npath = c:\\\\temp\n").unwrap();
        assert_eq!(entries["a=b"], "Grüße\tend");
        assert_eq!(entries["path"], "c:\\temp");
    }

    #[test]
    fn should_report_line_of_bad_unicode_escape() {
        let result = parse_properties("ok = fine\nbad = \\u12\n");
        assert_eq!(result, Err(PropertiesError { line: 2 }));
    }

    #[test]
    fn should_extract_bundle_locale() {
        assert_eq!(bundle_locale("acme_de.properties").as_deref(), Some("de"));
        assert_eq!(bundle_locale("acme_de_CH.properties").as_deref(), Some("de_CH"));
        assert_eq!(bundle_locale("my_binding_fr.properties").as_deref(), Some("fr"));
        assert_eq!(bundle_locale("acme.properties"), None);
        assert_eq!(bundle_locale("acme_de.txt"), None);
    }
}
