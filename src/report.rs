//! Console rendering of sync decisions and outcomes

use crate::ui;
use colored::Colorize;
use reconcile::{
    ApplyResult, EmployeeRecord, ExecutionOutcome, Notification, Reporter, SkipReason,
    SyncDecision, SyncSummary,
};

/// Prints every decision and outcome as the run progresses.
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

fn colored_label(result: &ApplyResult) -> String {
    match result {
        ApplyResult::Applied => result.label().green().to_string(),
        ApplyResult::DryRun => result.label().yellow().to_string(),
        ApplyResult::Failed { .. } => result.label().red().bold().to_string(),
    }
}

fn email_of(record: &EmployeeRecord) -> &str {
    record.work_email.as_deref().unwrap_or("")
}

/// The line announcing a skipped record, if it is worth printing
pub fn skip_line(record: &EmployeeRecord, reason: &SkipReason) -> Option<String> {
    match reason {
        SkipReason::MissingEmail => None,
        SkipReason::Excluded => Some(format!("{}: {reason}", email_of(record))),
        _ => Some(format!(
            "{}: email found in BambooHR but not in FreeIPA: {reason}",
            email_of(record)
        )),
    }
}

impl Reporter for ConsoleReporter {
    fn on_record(&mut self, record: &EmployeeRecord, decision: &SyncDecision) {
        match decision {
            SyncDecision::Skip { reason } => {
                if let Some(line) = skip_line(record, reason) {
                    log::info!("{line}");
                    if !self.quiet && !matches!(reason, SkipReason::Excluded) {
                        println!("{line}");
                    }
                } else {
                    log::debug!("Record {} has no work email", record.id);
                }
            }
            SyncDecision::Create { account } => {
                ui::section(&format!(
                    "{}: email found in BambooHR but not in FreeIPA",
                    account.mail
                ));
                ui::kv("Name", &account.cn());
                ui::kv("Job Title", &record.job_title);
                ui::kv("Department", &record.department);
                ui::kv(
                    "Location",
                    record.onboarding.location.as_deref().unwrap_or(""),
                );
                ui::kv("Division", &record.division);
                ui::kv("Manager", record.supervisor.as_deref().unwrap_or(""));
                ui::kv("Start Date", &record.hire_date.to_string());
            }
            SyncDecision::Conflict { email, accounts } => {
                let uids: Vec<&str> = accounts.iter().map(|a| a.uid.as_str()).collect();
                ui::error(&format!(
                    "More than one entry found in FreeIPA for email {email}: {}",
                    uids.join(", ")
                ));
            }
            SyncDecision::UpdateFields { .. } => {}
        }
    }

    fn on_apply(&mut self, _record: &EmployeeRecord, outcome: &ExecutionOutcome) {
        match outcome {
            ExecutionOutcome::Created { uid, result } => {
                println!("Creating stage account {uid}: {}", colored_label(result));
                if let ApplyResult::Failed { error } = result {
                    ui::dim(error);
                }
            }
            ExecutionOutcome::Updated { uid, fields } => {
                for field in fields {
                    println!(
                        "{uid}: updating {}: {}",
                        field.change,
                        colored_label(&field.result)
                    );
                    if let ApplyResult::Failed { error } = &field.result {
                        ui::dim(error);
                    }
                }
            }
            ExecutionOutcome::NotApplicable => {}
        }
    }

    fn on_notification(
        &mut self,
        _record: &EmployeeRecord,
        notification: &Notification,
        result: &ApplyResult,
    ) {
        println!(
            "Sending new starter notification to {}: {}",
            notification.recipients.join(", "),
            colored_label(result)
        );
        if let ApplyResult::Failed { error } = result {
            ui::dim(error);
        }
    }
}

/// Print run totals
pub fn print_summary(summary: &SyncSummary, dry_run: bool) {
    ui::header(if dry_run { "Summary (dry run)" } else { "Summary" });
    ui::kv("Records", &summary.records.to_string());
    ui::kv("Accounts created", &summary.created.to_string());
    ui::kv("Fields updated", &summary.updated.to_string());
    if dry_run {
        ui::kv("Changes pending", &summary.dry_run.to_string());
    }
    ui::kv("Unchanged", &summary.unchanged.to_string());
    ui::kv("Skipped", &summary.skipped.to_string());
    ui::kv("Conflicts", &summary.conflicts.to_string());
    ui::kv("Failed", &summary.failed.to_string());
    if summary.notified + summary.notify_failed > 0 {
        ui::kv(
            "Notifications",
            &format!("{} sent, {} failed", summary.notified, summary.notify_failed),
        );
    }
    println!();

    if !summary.is_success() {
        ui::warn("Some changes failed, see above");
    } else if dry_run && summary.dry_run > 0 {
        ui::info("Dry run, nothing was changed");
    } else if summary.total_changes() == 0 {
        ui::success("FreeIPA is in sync with BambooHR");
    } else {
        ui::success(&format!("{} changes applied", summary.total_changes()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::{HrDate, Namespace};

    fn record() -> EmployeeRecord {
        EmployeeRecord {
            id: "42".to_string(),
            work_email: Some("alice.jones@co.com".to_string()),
            ..EmployeeRecord::default()
        }
    }

    #[test]
    fn test_skip_line_missing_email_is_silent() {
        assert_eq!(skip_line(&record(), &SkipReason::MissingEmail), None);
    }

    #[test]
    fn test_skip_line_already_exists() {
        let line = skip_line(
            &record(),
            &SkipReason::AlreadyExists {
                uid: "alice.jones".to_string(),
                namespace: Namespace::Staged,
            },
        )
        .unwrap();
        assert!(line.starts_with("alice.jones@co.com: email found in BambooHR but not in FreeIPA: "));
        assert!(line.contains("alice.jones already exists"));
    }

    #[test]
    fn test_skip_line_leaving() {
        let line = skip_line(
            &record(),
            &SkipReason::Leaving {
                termination_date: "2024-03-01".parse::<HrDate>().unwrap(),
            },
        )
        .unwrap();
        assert!(line.contains("user leaving on 2024-03-01"));
    }

    #[test]
    fn test_skip_line_excluded() {
        let line = skip_line(&record(), &SkipReason::Excluded).unwrap();
        assert_eq!(line, "alice.jones@co.com: email is on the exclusion list");
    }
}
