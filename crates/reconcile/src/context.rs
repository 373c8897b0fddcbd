//! Provider and reporting traits
//!
//! These traits let the sync engine run without depending on a specific
//! HR system, directory server or mail transport. The engine only ever
//! talks to these seams; see [`crate::mock`] for in-memory versions.

use crate::diff::AttributeChange;
use crate::executor::{ApplyResult, ExecutionOutcome};
use crate::notify::Notification;
use crate::planner::{NewAccount, SyncDecision};
use crate::types::{DirectoryAccount, EmployeeRecord, Namespace, Roster, Supplement};
use anyhow::Result;
use std::collections::BTreeMap;

/// Source of HR records.
///
/// Any error returned here is fatal for the run.
pub trait HrSource {
    /// Fetch the full roster, keyed by HR identifier.
    fn fetch_roster(&self) -> Result<Roster>;

    /// Fetch selected fields of one employee.
    ///
    /// Fields the HR system has no value for map to `None`.
    fn fetch_fields(&self, id: &str, fields: &[&str]) -> Result<BTreeMap<String, Option<String>>>;

    /// Fetch the fields needed to decide on and announce a new account.
    fn fetch_supplement(&self, id: &str) -> Result<Supplement>;
}

/// Directory service holding user accounts.
///
/// Mutating calls fail independently; the executor reports a failure and
/// moves on.
pub trait Directory {
    /// All accounts of one namespace.
    fn fetch_accounts(&mut self, namespace: Namespace) -> Result<Vec<DirectoryAccount>>;

    /// Create a staged account.
    fn create_account(&mut self, account: &NewAccount) -> Result<()>;

    /// Replace one attribute of the account at `dn`.
    fn modify_attribute(&mut self, dn: &str, change: &AttributeChange) -> Result<()>;
}

/// Mail transport for new starter notifications.
pub trait Mailer {
    fn send(&self, notification: &Notification) -> Result<()>;
}

/// Receives decisions and outcomes as a sync run progresses.
///
/// All methods have empty defaults so implementors only override what
/// they render.
pub trait Reporter {
    /// A decision was made for a record
    fn on_record(&mut self, _record: &EmployeeRecord, _decision: &SyncDecision) {}

    /// A decision was executed
    fn on_apply(&mut self, _record: &EmployeeRecord, _outcome: &ExecutionOutcome) {}

    /// A notification was sent, or failed to send
    fn on_notification(
        &mut self,
        _record: &EmployeeRecord,
        _notification: &Notification,
        _result: &ApplyResult,
    ) {
    }
}

/// Silent reporter
pub struct NoReport;

impl Reporter for NoReport {}
