//! Identifier clean-up applied to text typed into declaration fields.

use crate::scope::Snapshot;

/// Identifier characters only, no leading digits, lowercase first letter.
pub fn sanitize_name(raw: &str) -> String {
    let kept: String = raw.chars().filter(is_identifier_char).collect();
    let trimmed = kept.trim_start_matches(|c: char| c.is_ascii_digit());
    lead_with(trimmed, |c| c.to_ascii_lowercase())
}

/// Identifier characters only, no leading digits or underscores, uppercase
/// first letter.
pub fn sanitize_process_name(raw: &str) -> String {
    let kept: String = raw.chars().filter(is_identifier_char).collect();
    let trimmed = kept.trim_start_matches(|c: char| c.is_ascii_digit() || c == '_');
    lead_with(trimmed, |c| c.to_ascii_uppercase())
}

/// Sanitized process name that does not collide with a process defined by
/// another node. The smallest free integer suffix is appended on collision.
pub fn unique_process_name(raw: &str, node_id: &str, snapshot: &Snapshot) -> String {
    let name = sanitize_process_name(raw);
    match snapshot.raw_process_id(&name) {
        None => name,
        Some(owner) if owner == node_id => name,
        Some(_) => (0..)
            .map(|i| format!("{}{}", name, i))
            .find(|candidate| !snapshot.has_process(candidate))
            .unwrap_or(name),
    }
}

fn is_identifier_char(c: &char) -> bool {
    c.is_ascii_alphanumeric() || *c == '_'
}

fn lead_with(text: &str, convert: impl Fn(char) -> char) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => std::iter::once(convert(first)).chain(chars).collect(),
        None => String::new(),
    }
}

