use anyhow::Result;
use reconcile::{Attribute, DirectoryAccount, EmployeeRecord, Roster, match_by_email};
use std::collections::BTreeSet;

use crate::Context;
use crate::commands::{bamboo_client, connect_directory, fetch_active, fetch_roster};
use crate::ui;

/// Attributes an unmatched account is searched on
const ACCOUNT_SEARCH_FIELDS: [Attribute; 6] = [
    Attribute::Uid,
    Attribute::GivenName,
    Attribute::Sn,
    Attribute::Title,
    Attribute::TelephoneNumber,
    Attribute::Mail,
];

/// Search hits: HR records with their accounts, then accounts found on their own.
#[derive(Debug, Default)]
pub struct SearchHits<'a> {
    pub records: Vec<(&'a EmployeeRecord, Vec<&'a DirectoryAccount>)>,
    pub accounts: Vec<&'a DirectoryAccount>,
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub fn record_matches(record: &EmployeeRecord, needle: &str) -> bool {
    [
        record.id.as_str(),
        record.work_email.as_deref().unwrap_or(""),
        record.first_name.as_str(),
        record.last_name.as_str(),
        record.preferred_name.as_deref().unwrap_or(""),
        record.job_title.as_str(),
        record.mobile_phone.as_str(),
        record.division.as_str(),
    ]
    .iter()
    .any(|field| contains(field, needle))
}

pub fn account_matches(account: &DirectoryAccount, needle: &str) -> bool {
    contains(&account.dn, needle)
        || ACCOUNT_SEARCH_FIELDS.iter().any(|attribute| {
            account
                .values(attribute.ldap_name())
                .iter()
                .any(|value| contains(value, needle))
        })
}

pub fn search<'a>(
    roster: &'a Roster,
    accounts: &'a [DirectoryAccount],
    keyword: &str,
) -> SearchHits<'a> {
    let needle = keyword.trim().to_lowercase();
    let mut hits = SearchHits::default();
    let mut shown: BTreeSet<&str> = BTreeSet::new();

    for record in roster.values().filter(|r| record_matches(r, &needle)) {
        let matched = record
            .email_key()
            .map(|email| match_by_email(&email, accounts.iter()))
            .unwrap_or_default();
        shown.extend(matched.iter().copied().map(|a| a.dn.as_str()));
        hits.records.push((record, matched));
    }

    hits.accounts = accounts
        .iter()
        .filter(|a| !shown.contains(a.dn.as_str()) && account_matches(a, &needle))
        .collect();
    hits
}

/// Field-by-field comparison rows for a record and its account
pub fn comparison_rows(
    record: &EmployeeRecord,
    account: Option<&DirectoryAccount>,
) -> Vec<Vec<String>> {
    let ipa = |attribute: Attribute| {
        account
            .map(|a| a.values(attribute.ldap_name()).join(","))
            .unwrap_or_default()
    };
    vec![
        vec!["Id".to_string(), record.id.clone(), ipa(Attribute::EmployeeNumber)],
        vec!["First".to_string(), record.first_name.clone(), ipa(Attribute::GivenName)],
        vec!["Last".to_string(), record.last_name.clone(), ipa(Attribute::Sn)],
        vec![
            "Preferred".to_string(),
            record.preferred_name.clone().unwrap_or_default(),
            String::new(),
        ],
        vec![
            "Email".to_string(),
            record.work_email.clone().unwrap_or_default(),
            ipa(Attribute::Mail),
        ],
        vec!["Job Title".to_string(), record.job_title.clone(), ipa(Attribute::Title)],
        vec!["Mobile".to_string(), record.mobile_phone.clone(), ipa(Attribute::Mobile)],
        vec![
            "Department".to_string(),
            record.department.clone(),
            ipa(Attribute::DepartmentNumber),
        ],
        vec!["Division".to_string(), record.division.clone(), ipa(Attribute::Ou)],
        vec!["Uid".to_string(), String::new(), ipa(Attribute::Uid)],
    ]
}

fn account_rows(account: &DirectoryAccount) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["dn".to_string(), account.dn.clone()]];
    rows.extend(ACCOUNT_SEARCH_FIELDS.iter().map(|attribute| {
        vec![
            attribute.ldap_name().to_string(),
            account.values(attribute.ldap_name()).join(","),
        ]
    }));
    rows
}

pub fn run(ctx: &Context, keyword: &str) -> Result<()> {
    let config = ctx.config()?;
    let roster = fetch_roster(&bamboo_client(&config))?;
    let mut directory = connect_directory(&config)?;
    let accounts = fetch_active(&mut directory)?;

    let hits = search(&roster, &accounts, keyword);
    if hits.records.is_empty() && hits.accounts.is_empty() {
        ui::info(&format!("Nothing matches '{keyword}'"));
        return Ok(());
    }

    for (record, matched) in &hits.records {
        ui::section(&format!("{} {}", record.first_name, record.last_name));
        if matched.is_empty() {
            ui::table(&["Field", "BambooHR", "FreeIPA"], &comparison_rows(record, None));
        }
        for account in matched {
            ui::table(
                &["Field", "BambooHR", "FreeIPA"],
                &comparison_rows(record, Some(*account)),
            );
        }
    }

    for account in &hits.accounts {
        ui::section(&format!("{} (FreeIPA only)", account.uid));
        ui::table(&["Attribute", "Value"], &account_rows(account));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::Namespace;

    fn record(id: &str, first: &str, last: &str, email: &str) -> EmployeeRecord {
        EmployeeRecord {
            id: id.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            work_email: Some(email.to_string()),
            ..EmployeeRecord::default()
        }
    }

    fn account(uid: &str, mail: &str) -> DirectoryAccount {
        DirectoryAccount::new(uid, format!("uid={uid},cn=users,cn=accounts"), Namespace::Active)
            .with(Attribute::Mail, mail)
    }

    fn roster(records: Vec<EmployeeRecord>) -> Roster {
        records.into_iter().map(|r| (r.id.clone(), r)).collect()
    }

    #[test]
    fn test_record_matches_is_case_insensitive() {
        let r = record("1", "Alice", "Jones", "alice.jones@co.com");
        assert!(record_matches(&r, "jones"));
        assert!(!record_matches(&r, "smith"));
    }

    #[test]
    fn test_search_pairs_records_with_accounts() {
        let roster = roster(vec![
            record("1", "Alice", "Jones", "Alice.Jones@co.com"),
            record("2", "Bob", "Smith", "bob.smith@co.com"),
        ]);
        let accounts = vec![
            account("alice.jones", "alice.jones@co.com"),
            account("bob.smith", "bob.smith@co.com"),
        ];

        let hits = search(&roster, &accounts, "JONES");
        assert_eq!(hits.records.len(), 1);
        assert_eq!(hits.records[0].0.id, "1");
        assert_eq!(hits.records[0].1[0].uid, "alice.jones");
        assert!(hits.accounts.is_empty());
    }

    #[test]
    fn test_search_lists_directory_only_accounts() {
        let roster = roster(vec![record("1", "Alice", "Jones", "alice.jones@co.com")]);
        let accounts = vec![
            account("alice.jones", "alice.jones@co.com"),
            account("svc-jones", "ops@co.com"),
        ];

        let hits = search(&roster, &accounts, "jones");
        assert_eq!(hits.records.len(), 1);
        assert_eq!(hits.accounts.len(), 1);
        assert_eq!(hits.accounts[0].uid, "svc-jones");
    }

    #[test]
    fn test_account_matches_dn() {
        let a = account("x", "x@co.com");
        assert!(account_matches(&a, "cn=accounts"));
    }

    #[test]
    fn test_comparison_rows_without_account() {
        let r = record("1", "Alice", "Jones", "alice.jones@co.com");
        let rows = comparison_rows(&r, None);
        assert!(rows.iter().all(|row| row[2].is_empty()));
        assert_eq!(rows[4][1], "alice.jones@co.com");
    }
}
