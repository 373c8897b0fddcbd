//! Escaping of values placed in LDAP filters and DNs.

/// Escape a value for use inside a search filter (RFC 4515).
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\5c"),
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape an attribute value for use in a DN (RFC 4514).
///
/// Leading and trailing spaces and a leading `#` are hex-escaped.
pub fn escape_dn_value(value: &str) -> String {
    let count = value.chars().count();
    let mut escaped = String::with_capacity(value.len() * 2);

    for (i, ch) in value.chars().enumerate() {
        let is_first = i == 0;
        let is_last = i + 1 == count;

        match ch {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '\0' => escaped.push_str("\\00"),
            ' ' if is_first || is_last => escaped.push_str("\\20"),
            '#' if is_first => escaped.push_str("\\23"),
            _ => escaped.push(ch),
        }
    }

    escaped
}
