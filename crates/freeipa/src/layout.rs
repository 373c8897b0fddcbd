//! Where FreeIPA keeps user entries, and how servers are addressed.

use crate::escape::escape_dn_value;
use reconcile::Namespace;

/// Default LDAP port
pub const DEFAULT_PORT: u16 = 389;
/// Default LDAPS port
pub const DEFAULT_LDAPS_PORT: u16 = 636;

/// Container DNs of the three user namespaces under a domain suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLayout {
    suffix: String,
}

impl DirectoryLayout {
    /// Derive the suffix from a DNS domain: `ipa.example.com` becomes
    /// `dc=ipa,dc=example,dc=com`.
    pub fn from_domain(domain: &str) -> Self {
        let suffix = domain
            .trim()
            .trim_matches('.')
            .split('.')
            .filter(|label| !label.is_empty())
            .map(|label| format!("dc={}", escape_dn_value(label)))
            .collect::<Vec<_>>()
            .join(",");
        Self { suffix }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Search base holding the accounts of `namespace`.
    pub fn base(&self, namespace: Namespace) -> String {
        let container = match namespace {
            Namespace::Active => "cn=users,cn=accounts",
            Namespace::Staged => "cn=staged users,cn=accounts,cn=provisioning",
            Namespace::Preserved => "cn=deleted users,cn=accounts,cn=provisioning",
        };
        format!("{container},{}", self.suffix)
    }

    /// DN of `uid` in `namespace`.
    pub fn user_dn(&self, uid: &str, namespace: Namespace) -> String {
        format!("uid={},{}", escape_dn_value(uid), self.base(namespace))
    }
}

/// Split a server list on commas and whitespace, qualifying bare host
/// names with `domain`.
pub fn parse_servers(list: &str, domain: &str) -> Vec<String> {
    let domain = domain.trim().trim_matches('.');
    list.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(|host| {
            if host.contains('.') || host.contains("://") || domain.is_empty() {
                host.to_string()
            } else {
                format!("{host}.{domain}")
            }
        })
        .collect()
}

/// LDAP URL for a server entry. Entries that already carry a scheme are
/// used as given.
pub fn ldap_url(server: &str, port: Option<u16>, use_ldaps: bool) -> String {
    if server.contains("://") {
        return server.to_string();
    }
    let (scheme, default_port) = if use_ldaps {
        ("ldaps", DEFAULT_LDAPS_PORT)
    } else {
        ("ldap", DEFAULT_PORT)
    };
    format!("{scheme}://{server}:{}", port.unwrap_or(default_port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_from_domain() {
        let layout = DirectoryLayout::from_domain("ipa.example.com");
        assert_eq!(layout.suffix(), "dc=ipa,dc=example,dc=com");
        assert_eq!(DirectoryLayout::from_domain(" example.com. ").suffix(), "dc=example,dc=com");
    }

    #[test]
    fn test_bases() {
        let layout = DirectoryLayout::from_domain("ipa.co.com");
        assert_eq!(
            layout.base(Namespace::Active),
            "cn=users,cn=accounts,dc=ipa,dc=co,dc=com"
        );
        assert_eq!(
            layout.base(Namespace::Staged),
            "cn=staged users,cn=accounts,cn=provisioning,dc=ipa,dc=co,dc=com"
        );
        assert_eq!(
            layout.base(Namespace::Preserved),
            "cn=deleted users,cn=accounts,cn=provisioning,dc=ipa,dc=co,dc=com"
        );
    }

    #[test]
    fn test_user_dn_escapes_uid() {
        let layout = DirectoryLayout::from_domain("co.com");
        assert_eq!(
            layout.user_dn("alice.jones", Namespace::Staged),
            "uid=alice.jones,cn=staged users,cn=accounts,cn=provisioning,dc=co,dc=com"
        );
        assert!(layout.user_dn("a,b", Namespace::Active).starts_with("uid=a\\,b,"));
    }

    #[test]
    fn test_parse_servers() {
        assert_eq!(
            parse_servers("ipa01, ipa02.co.com ldaps://ipa03.co.com", "ipa.co.com"),
            vec!["ipa01.ipa.co.com", "ipa02.co.com", "ldaps://ipa03.co.com"]
        );
        assert!(parse_servers(" , ", "co.com").is_empty());
    }

    #[test]
    fn test_ldap_url() {
        assert_eq!(ldap_url("ipa01.co.com", None, false), "ldap://ipa01.co.com:389");
        assert_eq!(ldap_url("ipa01.co.com", None, true), "ldaps://ipa01.co.com:636");
        assert_eq!(ldap_url("ipa01.co.com", Some(1389), false), "ldap://ipa01.co.com:1389");
        assert_eq!(ldap_url("ldap://x:10", Some(1), true), "ldap://x:10");
    }
}
