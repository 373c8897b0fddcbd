use anyhow::Result;
use reconcile::{Attribute, DirectoryAccount, EmployeeRecord};

use crate::Context;
use crate::commands::{bamboo_client, connect_directory, fetch_active, fetch_roster};
use crate::ui;

const IPA_COLUMNS: [Attribute; 8] = [
    Attribute::EmployeeNumber,
    Attribute::GivenName,
    Attribute::Sn,
    Attribute::Mail,
    Attribute::DepartmentNumber,
    Attribute::Title,
    Attribute::Ou,
    Attribute::Uid,
];

pub const BAMBOO_HEADERS: [&str; 9] = [
    "Id",
    "First",
    "Last",
    "Preferred",
    "Department",
    "Job Title",
    "Mobile",
    "Email",
    "Division",
];

pub fn ipa_headers() -> Vec<&'static str> {
    IPA_COLUMNS.iter().map(Attribute::ldap_name).collect()
}

pub fn ipa_row(account: &DirectoryAccount) -> Vec<String> {
    IPA_COLUMNS
        .iter()
        .map(|attribute| match attribute {
            Attribute::Mail => account.mail().join(","),
            other => account.get(*other).to_string(),
        })
        .collect()
}

pub fn bamboo_row(record: &EmployeeRecord) -> Vec<String> {
    vec![
        record.id.clone(),
        record.first_name.clone(),
        record.last_name.clone(),
        record.preferred_name.clone().unwrap_or_default(),
        record.department.clone(),
        record.job_title.clone(),
        record.mobile_phone.clone(),
        record.work_email.clone().unwrap_or_default(),
        record.division.clone(),
    ]
}

/// Sort by surname, then given name, ignoring case
fn sort_accounts(accounts: &mut [DirectoryAccount]) {
    accounts.sort_by_cached_key(|a| {
        (
            a.get(Attribute::Sn).to_lowercase(),
            a.get(Attribute::GivenName).to_lowercase(),
            a.uid.clone(),
        )
    });
}

pub fn ls_ipa(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let mut directory = connect_directory(&config)?;
    let mut accounts = fetch_active(&mut directory)?;
    sort_accounts(&mut accounts);

    let headers = ipa_headers();
    let rows: Vec<Vec<String>> = accounts.iter().map(ipa_row).collect();
    ui::header("FreeIPA users");
    ui::table(&headers, &rows);
    ui::dim(&format!("{} users", rows.len()));
    Ok(())
}

pub fn ls_bamboo(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let roster = fetch_roster(&bamboo_client(&config))?;

    let mut records: Vec<&EmployeeRecord> = roster.values().collect();
    records.sort_by_cached_key(|r| (r.last_name.to_lowercase(), r.first_name.to_lowercase()));

    let rows: Vec<Vec<String>> = records.into_iter().map(bamboo_row).collect();
    ui::header("BambooHR employees");
    ui::table(&BAMBOO_HEADERS, &rows);
    ui::dim(&format!("{} employees", rows.len()));
    Ok(())
}
