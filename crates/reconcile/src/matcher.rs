//! Email matching between HR records and directory accounts

use crate::types::DirectoryAccount;

/// Find every account whose `mail` values contain `email`, ignoring case.
///
/// Matches are returned in the order of `accounts`.
pub fn match_by_email<'a, I>(email: &str, accounts: I) -> Vec<&'a DirectoryAccount>
where
    I: IntoIterator<Item = &'a DirectoryAccount>,
{
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Vec::new();
    }
    accounts
        .into_iter()
        .filter(|account| account.has_mail(&email))
        .collect()
}
