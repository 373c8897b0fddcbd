//! In-memory providers for testing without network access.
//!
//! ```ignore
//! use reconcile::mock::{MockDirectory, MockHr};
//!
//! let hr = MockHr::with_records([record]);
//! let mut directory = MockDirectory::with_accounts([account]);
//! ```

use crate::context::{Directory, HrSource, Mailer};
use crate::diff::AttributeChange;
use crate::notify::Notification;
use crate::planner::NewAccount;
use crate::types::{Attribute, DirectoryAccount, EmployeeRecord, Namespace, Roster, Supplement};
use anyhow::{Result, bail};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

/// Mock HR source backed by a roster held in memory.
#[derive(Debug, Clone, Default)]
pub struct MockHr {
    pub roster: Roster,
    /// Supplementary fields per HR identifier
    pub supplements: BTreeMap<String, Supplement>,
    /// Raw field values per HR identifier, served by `fetch_fields`
    pub fields: BTreeMap<String, BTreeMap<String, Option<String>>>,
    /// Fail every call
    pub fail: bool,
    supplement_requests: RefCell<Vec<String>>,
}

impl MockHr {
    /// Create an empty mock HR source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock HR source holding the given records.
    pub fn with_records(records: impl IntoIterator<Item = EmployeeRecord>) -> Self {
        Self {
            roster: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
            ..Self::default()
        }
    }

    /// Set the supplement returned for `id`.
    pub fn set_supplement(&mut self, id: impl Into<String>, supplement: Supplement) {
        self.supplements.insert(id.into(), supplement);
    }

    /// Set one raw field value for `id`.
    pub fn set_field(&mut self, id: &str, name: &str, value: Option<&str>) {
        self.fields
            .entry(id.to_string())
            .or_default()
            .insert(name.to_string(), value.map(str::to_string));
    }

    /// Identifiers supplements were requested for, in call order.
    pub fn supplement_requests(&self) -> Vec<String> {
        self.supplement_requests.borrow().clone()
    }
}

impl HrSource for MockHr {
    fn fetch_roster(&self) -> Result<Roster> {
        if self.fail {
            bail!("mock HR source unavailable");
        }
        Ok(self.roster.clone())
    }

    fn fetch_fields(&self, id: &str, fields: &[&str]) -> Result<BTreeMap<String, Option<String>>> {
        if self.fail {
            bail!("mock HR source unavailable");
        }
        let known = self.fields.get(id);
        Ok(fields
            .iter()
            .map(|name| {
                let value = known.and_then(|f| f.get(*name)).cloned().flatten();
                ((*name).to_string(), value)
            })
            .collect())
    }

    fn fetch_supplement(&self, id: &str) -> Result<Supplement> {
        if self.fail {
            bail!("mock HR source unavailable");
        }
        self.supplement_requests.borrow_mut().push(id.to_string());
        Ok(self.supplements.get(id).cloned().unwrap_or_default())
    }
}

/// Mock directory that applies mutations to its in-memory accounts.
#[derive(Debug, Clone, Default)]
pub struct MockDirectory {
    pub accounts: Vec<DirectoryAccount>,
    /// Accounts created, in call order
    pub created: Vec<NewAccount>,
    /// Successful modifications as `(dn, change)`
    pub modified: Vec<(String, AttributeChange)>,
    /// Fail `fetch_accounts`
    pub fail_fetch: bool,
    /// Fail `create_account`
    pub fail_create: bool,
    /// Fail `modify_attribute` for these attributes
    pub fail_attributes: BTreeSet<Attribute>,
    calls: usize,
}

impl MockDirectory {
    /// Create an empty mock directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock directory holding the given accounts.
    pub fn with_accounts(accounts: impl IntoIterator<Item = DirectoryAccount>) -> Self {
        Self {
            accounts: accounts.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Number of create and modify calls received, failed ones included.
    pub fn mutation_calls(&self) -> usize {
        self.calls
    }
}

impl Directory for MockDirectory {
    fn fetch_accounts(&mut self, namespace: Namespace) -> Result<Vec<DirectoryAccount>> {
        if self.fail_fetch {
            bail!("mock directory unavailable");
        }
        Ok(self
            .accounts
            .iter()
            .filter(|a| a.namespace == namespace)
            .cloned()
            .collect())
    }

    fn create_account(&mut self, account: &NewAccount) -> Result<()> {
        self.calls += 1;
        if self.fail_create {
            bail!("mock create rejected for {}", account.uid);
        }
        let mut entry = DirectoryAccount::new(
            account.uid.as_str(),
            format!("uid={},cn=staged users", account.uid),
            Namespace::Staged,
        );
        for (name, value) in account.attributes() {
            entry.set_values(name, [value]);
        }
        self.accounts.push(entry);
        self.created.push(account.clone());
        Ok(())
    }

    fn modify_attribute(&mut self, dn: &str, change: &AttributeChange) -> Result<()> {
        self.calls += 1;
        if self.fail_attributes.contains(&change.attribute) {
            bail!("mock modify of {} rejected", change.attribute);
        }
        let Some(account) = self.accounts.iter_mut().find(|a| a.dn == dn) else {
            bail!("no such entry: {dn}");
        };
        let values: Vec<&str> = if change.new.is_empty() {
            vec![]
        } else {
            vec![change.new.as_str()]
        };
        account.set_values(change.attribute.ldap_name(), values);
        self.modified.push((dn.to_string(), change.clone()));
        Ok(())
    }
}

/// Mock mailer recording every notification it is asked to send.
#[derive(Debug, Default)]
pub struct MockMailer {
    pub fail: bool,
    sent: RefCell<Vec<Notification>>,
    attempts: Cell<usize>,
}

impl MockMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Notifications sent successfully.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.borrow().clone()
    }

    /// Send attempts, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl Mailer for MockMailer {
    fn send(&self, notification: &Notification) -> Result<()> {
        self.attempts.set(self.attempts.get() + 1);
        if self.fail {
            bail!("mock mailer refused message");
        }
        self.sent.borrow_mut().push(notification.clone());
        Ok(())
    }
}
