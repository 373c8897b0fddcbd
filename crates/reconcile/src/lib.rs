//! # Reconcile
//!
//! Decision engine that reconciles an HR roster against directory accounts.
//!
//! The engine never talks to a network itself. It reads two snapshots, an
//! HR [`Roster`] and a [`DirectorySnapshot`], and turns every HR record into
//! a [`SyncDecision`]. Decisions are then applied through the [`Directory`]
//! trait and announced through the [`Mailer`] trait.
//!
//! ## Core Concepts
//!
//! - **Matching**: an HR record matches an active account when its work email
//!   equals one of the account's `mail` values, ignoring case
//! - **Namespaces**: accounts live in one of active, staged or preserved;
//!   a uid present in any of them is never created again
//! - **Creation gates**: exclusion, existence, leaving and start date, in
//!   that order; `--force` only lifts the start date gate
//! - **Field diff**: a matched account gets one update per mismatching attribute
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{sync, DirectorySnapshot, NoReport};
//! use std::sync::atomic::AtomicBool;
//!
//! let roster = hr.fetch_roster()?;
//! let snapshot = DirectorySnapshot::fetch(&mut directory)?;
//! let summary = sync::run(
//!     sync::Providers { hr: &hr, directory: &mut directory, mailer: &mailer },
//!     &roster,
//!     &snapshot,
//!     &options,
//!     &mut NoReport,
//!     &AtomicBool::new(false),
//! )?;
//! ```
//!
//! ## Provider Traits
//!
//! - [`HrSource`]: roster and per-employee fields
//! - [`Directory`]: account listing and mutation
//! - [`Mailer`]: new starter notifications
//! - [`Reporter`]: receives decisions and outcomes for display
//!
//! [`mock`] holds in-memory implementations of the first three.

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod matcher;
pub mod mock;
pub mod names;
pub mod notify;
pub mod planner;
pub mod resolver;
pub mod sync;
pub mod types;

// Re-export main types at crate root
pub use context::{Directory, HrSource, Mailer, NoReport, Reporter};
pub use diff::{AttributeChange, field_changes};
pub use error::{Error, Result};
pub use executor::{ApplyResult, ChangeExecutor, ExecutionOutcome, FieldOutcome};
pub use matcher::match_by_email;
pub use names::{ResolvedNames, capitalize_words};
pub use notify::{Notification, NotificationSettings, NotificationTrigger, RegionalCc};
pub use planner::{
    AccountRef, ForcePolicy, NewAccount, PlannerOptions, SkipReason, SyncDecision, SyncPlanner,
};
pub use resolver::{DirectorySnapshot, StateResolver, derive_uid};
pub use sync::{Providers, SyncOptions};
pub use types::{
    Attribute, DirectoryAccount, EmployeeRecord, ExclusionSet, HrDate, Namespace,
    OnboardingFields, Roster, Supplement, SyncSummary,
};
