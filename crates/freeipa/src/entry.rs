//! Conversion between LDAP entries and sync engine types.

use ldap3::{Mod, SearchEntry};
use reconcile::{AttributeChange, DirectoryAccount, Namespace, NewAccount};
use std::collections::HashSet;

/// Object classes of a new staged user
pub const USER_OBJECT_CLASSES: &[&str] = &[
    "top",
    "posixaccount",
    "person",
    "inetorgperson",
    "organizationalperson",
];

/// `uidNumber` placeholder; the server assigns the real number on activation
pub const AUTO_UID_NUMBER: &str = "-1";

/// Build an account from a search entry.
///
/// Entries without a `uid` value are not user accounts and yield `None`.
pub fn account_from_entry(entry: SearchEntry, namespace: Namespace) -> Option<DirectoryAccount> {
    let uid = entry
        .attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("uid"))
        .and_then(|(_, values)| values.first())
        .cloned()?;

    let mut account = DirectoryAccount::new(uid, entry.dn, namespace);
    for (name, values) in entry.attrs {
        account.set_values(&name, values);
    }
    Some(account)
}

/// Attributes of the add request for a new account; empty values are left out.
pub fn add_attributes(account: &NewAccount) -> Vec<(String, HashSet<String>)> {
    let mut attrs = vec![
        (
            "objectClass".to_string(),
            USER_OBJECT_CLASSES.iter().map(|c| (*c).to_string()).collect(),
        ),
        (
            "uidNumber".to_string(),
            HashSet::from([AUTO_UID_NUMBER.to_string()]),
        ),
    ];
    attrs.extend(
        account
            .attributes()
            .into_iter()
            .map(|(name, value)| (name.to_string(), HashSet::from([value]))),
    );
    attrs
}

/// Modification for one attribute change: replace, or delete when the new
/// value is empty.
pub fn modification(change: &AttributeChange) -> Mod<String> {
    let name = change.attribute.ldap_name().to_string();
    if change.new.is_empty() {
        Mod::Delete(name, HashSet::new())
    } else {
        Mod::Replace(name, HashSet::from([change.new.clone()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::Attribute;
    use std::collections::HashMap;

    fn entry(dn: &str, attrs: Vec<(&str, Vec<&str>)>) -> SearchEntry {
        SearchEntry {
            dn: dn.to_string(),
            attrs: attrs
                .into_iter()
                .map(|(name, values)| {
                    (
                        name.to_string(),
                        values.into_iter().map(str::to_string).collect(),
                    )
                })
                .collect::<HashMap<_, _>>(),
            bin_attrs: HashMap::new(),
        }
    }

    fn new_account() -> NewAccount {
        NewAccount {
            uid: "alice.jones".to_string(),
            given_name: "Alice".to_string(),
            sn: "Jones".to_string(),
            title: "Engineer".to_string(),
            mobile: String::new(),
            mail: "alice.jones@co.com".to_string(),
            department_number: "R&D".to_string(),
            ou: "UK".to_string(),
            employee_number: "101".to_string(),
            gid_number: "707".to_string(),
            home_directory: "/home/alice.jones".to_string(),
            login_shell: "/usr/sbin/nologin".to_string(),
        }
    }

    #[test]
    fn test_account_from_entry() {
        let account = account_from_entry(
            entry(
                "uid=alice,cn=users,dc=co",
                vec![
                    ("uid", vec!["alice"]),
                    ("givenName", vec!["Alice"]),
                    ("mail", vec!["alice@co.com", "a.jones@co.com"]),
                    ("telephoneNumber", vec!["1", "2"]),
                ],
            ),
            Namespace::Active,
        )
        .unwrap();

        assert_eq!(account.uid, "alice");
        assert_eq!(account.dn, "uid=alice,cn=users,dc=co");
        assert_eq!(account.get(Attribute::GivenName), "Alice");
        assert_eq!(account.get(Attribute::TelephoneNumber), "1");
        assert!(account.has_mail("A.Jones@co.com"));
    }

    #[test]
    fn test_entry_without_uid_is_ignored() {
        let result = account_from_entry(entry("cn=users,dc=co", vec![("cn", vec!["users"])]), Namespace::Active);
        assert!(result.is_none());
    }

    #[test]
    fn test_add_attributes() {
        let attrs = add_attributes(&new_account());
        let get = |name: &str| attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone());

        assert_eq!(get("objectClass").unwrap().len(), 5);
        assert!(get("objectClass").unwrap().contains("inetorgperson"));
        assert_eq!(get("uidNumber"), Some(HashSet::from(["-1".to_string()])));
        assert_eq!(get("cn"), Some(HashSet::from(["Alice Jones".to_string()])));
        assert_eq!(get("gidNumber"), Some(HashSet::from(["707".to_string()])));
        assert_eq!(get("loginShell"), Some(HashSet::from(["/usr/sbin/nologin".to_string()])));
        assert_eq!(get("mobile"), None);
    }

    #[test]
    fn test_modification() {
        let change = AttributeChange::new(Attribute::Mobile, "111", "222");
        match modification(&change) {
            Mod::Replace(name, values) => {
                assert_eq!(name, "mobile");
                assert_eq!(values, HashSet::from(["222".to_string()]));
            }
            _ => panic!("expected Replace"),
        }

        let change = AttributeChange::new(Attribute::TelephoneNumber, "111", "");
        assert!(matches!(modification(&change), Mod::Delete(name, values) if name == "telephoneNumber" && values.is_empty()));
    }
}
