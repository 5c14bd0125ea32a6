//! Identifier casing.
//!
//! Generated code must name things consistently regardless of how the
//! schema author cased them, so identifiers are tokenized on case
//! boundaries with a fixed table of well-known initialisms: `"APIKeyID"`
//! splits into `["API", "Key", "ID"]`, not `["APIKey", "ID"]` or
//! `["A", "P", "I", ...]`.

/// Common initialisms kept intact when splitting identifiers.
///
/// Table follows the Go lint convention; longest entry is 5 bytes.
const INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID",
    "IP", "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS",
    "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML",
];

/// Returns the longest initialism `s` starts with, if any.
fn leading_initialism(s: &str) -> Option<&'static str> {
    let mut found = None;
    for i in 2..=5.min(s.len()) {
        if let Some(hit) = INITIALISMS.iter().find(|init| init.len() == i && s.starts_with(*init)) {
            found = Some(*hit);
        }
    }
    found
}

/// Splits an identifier into words.
///
/// Underscores, hyphens and spaces separate words outright; within a
/// segment, words break on lower-to-upper case boundaries, preferring
/// known multi-letter initialisms.
#[must_use]
pub fn split_words(identifier: &str) -> Vec<String> {
    let mut words = Vec::new();
    for segment in identifier.split(['_', '-', ' ']) {
        split_camel(segment, &mut words);
    }
    words
}

fn split_camel(segment: &str, words: &mut Vec<String>) {
    let bytes = segment.as_bytes();
    let mut last = 0;
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i].is_ascii_uppercase() && i > last {
            if let Some(init) = leading_initialism(&segment[last..]) {
                words.push(init.to_string());
                i = last + init.len();
                last = i;
                continue;
            }
            words.push(segment[last..i].to_string());
            last = i;
        }
        i += 1;
    }
    if last < segment.len() {
        // The tail may itself be an initialism ("KeyID" tail "ID").
        if let Some(init) = leading_initialism(&segment[last..]) {
            if init.len() == segment.len() - last {
                words.push(init.to_string());
                return;
            }
        }
        words.push(segment[last..].to_string());
    }
}

/// Converts an identifier to snake_case.
#[must_use]
pub fn to_snake(identifier: &str) -> String {
    split_words(identifier)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Converts an identifier to PascalCase, keeping initialisms uppercase.
#[must_use]
pub fn to_pascal(identifier: &str) -> String {
    let mut out = String::new();
    for word in split_words(identifier) {
        let upper = word.to_ascii_uppercase();
        if INITIALISMS.contains(&upper.as_str()) {
            out.push_str(&upper);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(&chars.as_str().to_ascii_lowercase());
            }
        }
    }
    out
}

/// Pluralizes a (snake_case) word.
#[must_use]
pub fn pluralize(word: &str) -> String {
    match word {
        "person" => return "people".to_string(),
        "child" => return "children".to_string(),
        _ => {}
    }
    if word.ends_with('s') || word.ends_with('x') || word.ends_with('z')
        || word.ends_with("ch") || word.ends_with("sh")
    {
        format!("{word}es")
    } else if word.ends_with('y')
        && !matches!(word.as_bytes().get(word.len().wrapping_sub(2)), Some(b'a' | b'e' | b'i' | b'o' | b'u'))
    {
        format!("{}ies", &word[..word.len() - 1])
    } else {
        format!("{word}s")
    }
}
