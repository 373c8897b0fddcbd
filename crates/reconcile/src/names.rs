//! Name resolution for directory display names

/// Given name and surname as they should appear in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    pub given_name: String,
    pub sn: String,
}

impl ResolvedNames {
    /// Resolve names from HR first/last name and an optional preferred name.
    ///
    /// A one-word preferred name replaces the first name only. With two or
    /// more words, the first replaces the first name and the second replaces
    /// the last name; further words are dropped. Each word of both results is
    /// then capitalized with [`capitalize_words`].
    pub fn resolve(first_name: &str, last_name: &str, preferred_name: Option<&str>) -> Self {
        let mut given_name = first_name;
        let mut sn = last_name;

        if let Some(preferred) = preferred_name {
            let mut tokens = preferred.split_whitespace();
            if let Some(first) = tokens.next() {
                given_name = first;
            }
            if let Some(second) = tokens.next() {
                sn = second;
            }
        }

        Self {
            given_name: capitalize_words(given_name),
            sn: capitalize_words(sn),
        }
    }

    /// `cn` value: `"<givenName> <sn>"`
    pub fn cn(&self) -> String {
        format!("{} {}", self.given_name, self.sn)
    }
}

/// Uppercase the first character of every space-separated word.
///
/// The rest of each word is left as is, so `"mcDonald"` becomes `"McDonald"`.
pub fn capitalize_words(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("alice"), "Alice");
        assert_eq!(capitalize_words("mary ann"), "Mary Ann");
        assert_eq!(capitalize_words("mcDonald"), "McDonald");
        assert_eq!(capitalize_words("ÉLODIE"), "ÉLODIE");
        assert_eq!(capitalize_words("élodie"), "Élodie");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn test_capitalize_keeps_spacing() {
        assert_eq!(capitalize_words("van  der"), "Van  Der");
    }

    #[test]
    fn test_resolve_without_preferred() {
        let names = ResolvedNames::resolve("alice", "jones", None);
        assert_eq!(names.given_name, "Alice");
        assert_eq!(names.sn, "Jones");
        assert_eq!(names.cn(), "Alice Jones");
    }

    #[test]
    fn test_resolve_single_token_preferred() {
        let names = ResolvedNames::resolve("Robert", "Smith", Some("bob"));
        assert_eq!(names.given_name, "Bob");
        assert_eq!(names.sn, "Smith");
    }

    #[test]
    fn test_resolve_two_token_preferred() {
        let names = ResolvedNames::resolve("Robert", "Smith", Some("bob  jones"));
        assert_eq!(names.given_name, "Bob");
        assert_eq!(names.sn, "Jones");
    }

    #[test]
    fn test_resolve_drops_extra_tokens() {
        let names = ResolvedNames::resolve("Robert", "Smith", Some("Bob Van Dyke"));
        assert_eq!(names.given_name, "Bob");
        assert_eq!(names.sn, "Van");
    }

    #[test]
    fn test_resolve_blank_preferred_is_ignored() {
        let names = ResolvedNames::resolve("Robert", "Smith", Some("   "));
        assert_eq!(names.cn(), "Robert Smith");
    }
}
