//! Sync driver - walks the roster and runs every record through the engine
//!
//! For each record, in HR identifier order:
//!
//! 1. match its work email against active accounts
//! 2. enrich unmatched, non-excluded records with supplementary HR fields
//! 3. plan a [`SyncDecision`] and report it
//! 4. execute the decision and report the outcome
//! 5. send a new starter notification when the trigger fires
//!
//! The interrupt flag is checked before each record, never in the middle of one.

use crate::context::{Directory, HrSource, Mailer, Reporter};
use crate::error::{Error, Result};
use crate::executor::{ApplyResult, ChangeExecutor};
use crate::notify::{NotificationSettings, NotificationTrigger};
use crate::planner::{PlannerOptions, SyncDecision, SyncPlanner};
use crate::resolver::{DirectorySnapshot, StateResolver};
use crate::types::{EmployeeRecord, Roster, SyncSummary};
use std::sync::atomic::{AtomicBool, Ordering};

/// HR field holding a work email
const WORK_EMAIL_FIELD: &str = "workEmail";

/// Options for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub planner: PlannerOptions,
    /// Compute decisions without touching the directory or sending mail
    pub dry_run: bool,
    /// Send new starter notifications
    pub notify: bool,
    pub notification: NotificationSettings,
}

/// The external systems a run talks to.
pub struct Providers<'a> {
    pub hr: &'a dyn HrSource,
    pub directory: &'a mut dyn Directory,
    pub mailer: &'a dyn Mailer,
}

/// Reconcile `roster` against `snapshot`.
///
/// The supervisor's email is only looked up for notifications that will be
/// sent, so a run without `notify` or in dry-run never asks HR for it.
///
/// # Errors
///
/// Returns [`Error::Hr`] when supplementary HR data cannot be fetched and
/// [`Error::Interrupted`] when `interrupt` is raised. Failed directory
/// calls and failed notifications are counted, not returned.
pub fn run(
    providers: Providers<'_>,
    roster: &Roster,
    snapshot: &DirectorySnapshot,
    options: &SyncOptions,
    reporter: &mut dyn Reporter,
    interrupt: &AtomicBool,
) -> Result<SyncSummary> {
    let Providers {
        hr,
        directory,
        mailer,
    } = providers;
    let planner = SyncPlanner::new(&options.planner, StateResolver::new(snapshot));
    let trigger = NotificationTrigger::new(
        options.notification.clone(),
        options.notify,
        options.dry_run,
    );
    let mut executor = ChangeExecutor::new(directory, options.dry_run);
    let mut summary = SyncSummary::default();

    log::info!(
        "Syncing {} HR records{}",
        roster.len(),
        if options.dry_run { " (dry run)" } else { "" }
    );

    for record in roster.values() {
        if interrupt.load(Ordering::SeqCst) {
            log::warn!("Interrupted after {} records", summary.records);
            return Err(Error::Interrupted);
        }

        let mut record = record.clone();
        let matches = record
            .email_key()
            .map(|email| snapshot.find_by_email(&email))
            .unwrap_or_default();

        if matches.is_empty() && record.email_key().is_some() && !planner.is_excluded(&record) {
            let supplement = hr.fetch_supplement(&record.id).map_err(Error::Hr)?;
            record.apply_supplement(supplement);
        }

        let decision = planner.plan(&record, &matches);
        if trigger.should_fire(&decision) && record.supervisor_email.is_none() {
            record.supervisor_email = resolve_supervisor_email(hr, roster, &record)?;
        }
        reporter.on_record(&record, &decision);

        if let SyncDecision::Conflict { email, accounts } = &decision {
            let uids: Vec<&str> = accounts.iter().map(|a| a.uid.as_str()).collect();
            log::warn!(
                "More than one directory account found with email address {email}: {}",
                uids.join(", ")
            );
        }

        let outcome = executor.execute(&decision);
        reporter.on_apply(&record, &outcome);
        summary.add_outcome(&decision, &outcome);

        if let SyncDecision::Create { account } = &decision
            && trigger.should_fire(&decision)
        {
            let notification = trigger.compose(&record, account, outcome.account_created());
            let result = match mailer.send(&notification) {
                Ok(()) => {
                    summary.notified += 1;
                    ApplyResult::Applied
                }
                Err(e) => {
                    log::debug!("Notification for {} failed: {e:#}", account.uid);
                    summary.notify_failed += 1;
                    ApplyResult::Failed {
                        error: format!("{e:#}"),
                    }
                }
            };
            reporter.on_notification(&record, &notification, &result);
        }
    }

    Ok(summary)
}

/// Work email of the record's supervisor, from the roster when possible.
fn resolve_supervisor_email(
    hr: &dyn HrSource,
    roster: &Roster,
    record: &EmployeeRecord,
) -> Result<Option<String>> {
    let Some(supervisor_id) = record.supervisor_id.as_deref().filter(|id| !id.is_empty()) else {
        return Ok(None);
    };

    if let Some(email) = roster.get(supervisor_id).and_then(EmployeeRecord::email_key) {
        return Ok(Some(email));
    }

    log::debug!("Supervisor {supervisor_id} not in roster, fetching work email");
    let mut fields = hr
        .fetch_fields(supervisor_id, &[WORK_EMAIL_FIELD])
        .map_err(Error::Hr)?;
    Ok(fields
        .remove(WORK_EMAIL_FIELD)
        .flatten()
        .filter(|e| !e.trim().is_empty()))
}
