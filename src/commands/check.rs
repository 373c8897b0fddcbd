use anyhow::Result;
use reconcile::{DirectoryAccount, EmployeeRecord, Roster, match_by_email};
use std::collections::HashMap;

use crate::Context;
use crate::commands::list::{BAMBOO_HEADERS, bamboo_row, ipa_headers, ipa_row};
use crate::commands::{bamboo_client, connect_directory, fetch_active, fetch_roster};
use crate::ui;

/// FreeIPA users checked against the roster
#[derive(Debug, Default)]
pub struct IpaCheck<'a> {
    /// Accounts no HR record points at
    pub unmatched: Vec<&'a DirectoryAccount>,
    /// Accounts whose mail values belong to several HR records
    pub ambiguous: Vec<(&'a DirectoryAccount, Vec<&'a EmployeeRecord>)>,
}

/// Roster records checked against FreeIPA
#[derive(Debug, Default)]
pub struct BambooCheck<'a> {
    /// Records with no active account for their work email
    pub unmatched: Vec<&'a EmployeeRecord>,
    /// Records whose email is on more than one account
    pub ambiguous: Vec<(&'a EmployeeRecord, Vec<&'a DirectoryAccount>)>,
}

pub fn check_ipa<'a>(roster: &'a Roster, accounts: &'a [DirectoryAccount]) -> IpaCheck<'a> {
    let mut by_email: HashMap<String, Vec<&EmployeeRecord>> = HashMap::new();
    for record in roster.values() {
        if let Some(email) = record.email_key() {
            by_email.entry(email).or_default().push(record);
        }
    }

    let mut check = IpaCheck::default();
    for account in accounts {
        let mut records: Vec<&EmployeeRecord> = account
            .mail()
            .iter()
            .filter_map(|mail| by_email.get(&mail.trim().to_lowercase()))
            .flatten()
            .copied()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records.dedup_by(|a, b| a.id == b.id);

        match records.len() {
            0 => check.unmatched.push(account),
            1 => {}
            _ => check.ambiguous.push((account, records)),
        }
    }
    check
}

pub fn check_bamboo<'a>(roster: &'a Roster, accounts: &'a [DirectoryAccount]) -> BambooCheck<'a> {
    let mut check = BambooCheck::default();
    for record in roster.values() {
        let matched = record
            .email_key()
            .map(|email| match_by_email(&email, accounts.iter()))
            .unwrap_or_default();
        match matched.len() {
            0 => check.unmatched.push(record),
            1 => {}
            _ => check.ambiguous.push((record, matched)),
        }
    }
    check
}

pub fn ipa(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let roster = fetch_roster(&bamboo_client(&config))?;
    let mut directory = connect_directory(&config)?;
    let accounts = fetch_active(&mut directory)?;

    let check = check_ipa(&roster, &accounts);
    for (account, records) in &check.ambiguous {
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        ui::warn(&format!(
            "{} matches more than one BambooHR employee: {}",
            account.uid,
            ids.join(", ")
        ));
    }

    if check.unmatched.is_empty() {
        ui::success("Every FreeIPA user has a BambooHR record");
        return Ok(());
    }

    ui::header("FreeIPA users not in BambooHR");
    let headers = ipa_headers();
    let rows: Vec<Vec<String>> = check.unmatched.iter().map(|a| ipa_row(a)).collect();
    ui::table(&headers, &rows);
    ui::dim(&format!("{} of {} users", rows.len(), accounts.len()));
    Ok(())
}

pub fn bamboo(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let roster = fetch_roster(&bamboo_client(&config))?;
    let mut directory = connect_directory(&config)?;
    let accounts = fetch_active(&mut directory)?;

    let check = check_bamboo(&roster, &accounts);
    for (record, matched) in &check.ambiguous {
        let uids: Vec<&str> = matched.iter().map(|a| a.uid.as_str()).collect();
        ui::warn(&format!(
            "More than one FreeIPA user for {}: {}",
            record.work_email.as_deref().unwrap_or(&record.id),
            uids.join(", ")
        ));
    }

    if check.unmatched.is_empty() {
        ui::success("Every BambooHR employee has a FreeIPA user");
        return Ok(());
    }

    ui::header("BambooHR employees not in FreeIPA");
    let rows: Vec<Vec<String>> = check.unmatched.iter().map(|r| bamboo_row(r)).collect();
    ui::table(&BAMBOO_HEADERS, &rows);
    ui::dim(&format!("{} of {} employees", rows.len(), roster.len()));
    Ok(())
}
