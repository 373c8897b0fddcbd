//! Change executor - applies sync decisions through a [`Directory`]
//!
//! Failures of individual calls are captured as [`ApplyResult::Failed`] and
//! never escalated. In dry-run mode no directory method is called at all.

use crate::context::Directory;
use crate::diff::AttributeChange;
use crate::planner::SyncDecision;
use crate::types::SyncSummary;

/// Result of one directory call (or one notification).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// The call succeeded
    Applied,
    /// The call would have been made
    DryRun,
    /// The call failed
    Failed { error: String },
}

impl ApplyResult {
    fn from_call(result: anyhow::Result<()>) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(e) => Self::Failed {
                error: format!("{e:#}"),
            },
        }
    }

    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Short status marker for console output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied => "OK",
            Self::DryRun => "DRY-RUN",
            Self::Failed { .. } => "FAIL",
        }
    }
}

/// Result of one attribute update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOutcome {
    pub change: AttributeChange,
    pub result: ApplyResult,
}

/// What executing a decision did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Skips and conflicts carry no action
    NotApplicable,
    /// A staged account was (or would have been) created
    Created { uid: String, result: ApplyResult },
    /// Attribute updates, one outcome per change; empty when unchanged
    Updated { uid: String, fields: Vec<FieldOutcome> },
}

impl ExecutionOutcome {
    /// Uid an outcome applies to, if any.
    pub fn uid(&self) -> Option<&str> {
        match self {
            Self::NotApplicable => None,
            Self::Created { uid, .. } | Self::Updated { uid, .. } => Some(uid.as_str()),
        }
    }

    /// Whether a new account now exists in the directory.
    pub fn account_created(&self) -> bool {
        matches!(
            self,
            Self::Created {
                result: ApplyResult::Applied,
                ..
            }
        )
    }
}

/// Applies decisions to a directory, honoring dry-run.
pub struct ChangeExecutor<'a, D: Directory + ?Sized> {
    directory: &'a mut D,
    dry_run: bool,
}

impl<'a, D: Directory + ?Sized> ChangeExecutor<'a, D> {
    pub fn new(directory: &'a mut D, dry_run: bool) -> Self {
        Self { directory, dry_run }
    }

    /// Apply a decision.
    pub fn execute(&mut self, decision: &SyncDecision) -> ExecutionOutcome {
        match decision {
            SyncDecision::Skip { .. } | SyncDecision::Conflict { .. } => {
                ExecutionOutcome::NotApplicable
            }
            SyncDecision::Create { account } => {
                let result = if self.dry_run {
                    ApplyResult::DryRun
                } else {
                    log::debug!("Creating staged account {}", account.uid);
                    ApplyResult::from_call(self.directory.create_account(account))
                };
                ExecutionOutcome::Created {
                    uid: account.uid.clone(),
                    result,
                }
            }
            SyncDecision::UpdateFields { target, changes } => {
                let fields = changes
                    .iter()
                    .map(|change| {
                        let result = if self.dry_run {
                            ApplyResult::DryRun
                        } else {
                            log::debug!("Modifying {} on {}", change.attribute, target.dn);
                            ApplyResult::from_call(
                                self.directory.modify_attribute(&target.dn, change),
                            )
                        };
                        FieldOutcome {
                            change: change.clone(),
                            result,
                        }
                    })
                    .collect();
                ExecutionOutcome::Updated {
                    uid: target.uid.clone(),
                    fields,
                }
            }
        }
    }
}

impl SyncSummary {
    /// Count a decision and its execution outcome.
    pub fn add_outcome(&mut self, decision: &SyncDecision, outcome: &ExecutionOutcome) {
        self.records += 1;
        match (decision, outcome) {
            (SyncDecision::Skip { .. }, _) => self.skipped += 1,
            (SyncDecision::Conflict { .. }, _) => self.conflicts += 1,
            (_, ExecutionOutcome::Created { result, .. }) => self.add_result(result, true),
            (_, ExecutionOutcome::Updated { fields, .. }) if fields.is_empty() => {
                self.unchanged += 1;
            }
            (_, ExecutionOutcome::Updated { fields, .. }) => {
                for field in fields {
                    self.add_result(&field.result, false);
                }
            }
            (_, ExecutionOutcome::NotApplicable) => {}
        }
    }

    fn add_result(&mut self, result: &ApplyResult, create: bool) {
        match result {
            ApplyResult::Applied if create => self.created += 1,
            ApplyResult::Applied => self.updated += 1,
            ApplyResult::DryRun => self.dry_run += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
        }
    }
}
