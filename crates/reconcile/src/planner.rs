//! Sync planner - decides what to do for each HR record
//!
//! The planner is pure: it reads an HR record, the accounts matched to it and
//! the directory snapshot, and returns a [`SyncDecision`]. Nothing is mutated
//! here; see [`crate::executor`] for applying decisions.

use crate::diff::{AttributeChange, field_changes};
use crate::names::ResolvedNames;
use crate::resolver::{StateResolver, derive_uid};
use crate::types::{DirectoryAccount, EmployeeRecord, ExclusionSet, HrDate, Namespace};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;

/// Login shell for new accounts
pub const DEFAULT_LOGIN_SHELL: &str = "/usr/sbin/nologin";

/// Which identifiers may bypass the future-start gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ForcePolicy {
    /// Nobody
    #[default]
    None,
    /// Every record
    All,
    /// Only the listed uids
    Uids(BTreeSet<String>),
}

impl ForcePolicy {
    /// Build from a `--force [uid...]` argument: absent, empty (all) or a list.
    pub fn from_args(uids: Option<&[String]>) -> Self {
        match uids {
            None => Self::None,
            Some([]) => Self::All,
            Some(uids) => Self::Uids(uids.iter().map(|u| u.trim().to_lowercase()).collect()),
        }
    }

    /// Whether `uid` is forced.
    pub fn covers(&self, uid: &str) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Uids(uids) => uids.contains(&uid.to_lowercase()),
        }
    }
}

/// Inputs that shape planning for a whole run.
#[derive(Debug, Clone)]
pub struct PlannerOptions {
    pub exclusions: ExclusionSet,
    pub force: ForcePolicy,
    /// Local calendar date the run treats as today
    pub today: NaiveDate,
    /// `gidNumber` for new accounts
    pub default_gid: String,
}

impl PlannerOptions {
    /// Options with no exclusions, no force and today's local date.
    pub fn new(default_gid: impl Into<String>) -> Self {
        Self {
            exclusions: ExclusionSet::new(),
            force: ForcePolicy::None,
            today: chrono::Local::now().date_naive(),
            default_gid: default_gid.into(),
        }
    }
}

/// Why no action is taken for a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The HR record has no work email
    MissingEmail,
    /// The work email is on the exclusion list
    Excluded,
    /// The derived uid already exists in a namespace
    AlreadyExists { uid: String, namespace: Namespace },
    /// A termination date is recorded
    Leaving { termination_date: HrDate },
    /// The hire date is after today
    FutureStart { hire_date: NaiveDate },
    /// The hire date could not be parsed
    InvalidHireDate { value: String },
}

impl SkipReason {
    /// Whether `--force` would have lifted this skip.
    pub fn is_forceable(&self) -> bool {
        matches!(self, Self::FutureStart { .. } | Self::InvalidHireDate { .. })
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEmail => f.write_str("no work email in HR record"),
            Self::Excluded => f.write_str("email is on the exclusion list"),
            Self::AlreadyExists { uid, namespace } => {
                write!(f, "{} FreeIPA account {} already exists", namespace.label(), uid)
            }
            Self::Leaving { termination_date } => write!(
                f,
                "user leaving on {termination_date}, skipping account creation"
            ),
            Self::FutureStart { hire_date } => write!(
                f,
                "start date {} is in the future, skipping account creation (use --force to override)",
                hire_date.format("%Y-%m-%d")
            ),
            Self::InvalidHireDate { value } => write!(
                f,
                "start date '{value}' is not a valid date, skipping account creation (use --force to override)"
            ),
        }
    }
}

/// Fields of an account to be created in the staged namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub uid: String,
    pub given_name: String,
    pub sn: String,
    pub title: String,
    pub mobile: String,
    pub mail: String,
    pub department_number: String,
    pub ou: String,
    pub employee_number: String,
    pub gid_number: String,
    pub home_directory: String,
    pub login_shell: String,
}

impl NewAccount {
    /// `cn` value: `"<givenName> <sn>"`
    pub fn cn(&self) -> String {
        format!("{} {}", self.given_name, self.sn)
    }

    /// Attribute name/value pairs, in LDAP naming, skipping empty values.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        [
            ("uid", self.uid.clone()),
            ("cn", self.cn()),
            ("givenName", self.given_name.clone()),
            ("sn", self.sn.clone()),
            ("title", self.title.clone()),
            ("mobile", self.mobile.clone()),
            ("mail", self.mail.clone()),
            ("departmentNumber", self.department_number.clone()),
            ("ou", self.ou.clone()),
            ("employeeNumber", self.employee_number.clone()),
            ("gidNumber", self.gid_number.clone()),
            ("homeDirectory", self.home_directory.clone()),
            ("loginShell", self.login_shell.clone()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
    }
}

/// The account a field update targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRef {
    pub uid: String,
    pub dn: String,
}

impl From<&DirectoryAccount> for AccountRef {
    fn from(account: &DirectoryAccount) -> Self {
        Self {
            uid: account.uid.clone(),
            dn: account.dn.clone(),
        }
    }
}

/// What should happen for one HR record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncDecision {
    /// Nothing to do, for a policy reason
    Skip { reason: SkipReason },
    /// Create a staged account
    Create { account: NewAccount },
    /// Update a matched account; an empty list means it is in sync
    UpdateFields {
        target: AccountRef,
        changes: Vec<AttributeChange>,
    },
    /// Several accounts share the record's email
    Conflict { email: String, accounts: Vec<AccountRef> },
}

impl SyncDecision {
    fn skip(reason: SkipReason) -> Self {
        Self::Skip { reason }
    }

    /// Whether applying this decision would touch the directory.
    pub fn is_mutation(&self) -> bool {
        match self {
            Self::Create { .. } => true,
            Self::UpdateFields { changes, .. } => !changes.is_empty(),
            Self::Skip { .. } | Self::Conflict { .. } => false,
        }
    }

    /// A matched account that needs no changes.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::UpdateFields { changes, .. } if changes.is_empty())
    }
}

/// Turns an HR record plus its matched accounts into a [`SyncDecision`].
pub struct SyncPlanner<'a> {
    options: &'a PlannerOptions,
    resolver: StateResolver<'a>,
}

impl<'a> SyncPlanner<'a> {
    pub fn new(options: &'a PlannerOptions, resolver: StateResolver<'a>) -> Self {
        Self { options, resolver }
    }

    /// Whether the record's email is on the exclusion list.
    pub fn is_excluded(&self, record: &EmployeeRecord) -> bool {
        record
            .email_key()
            .is_some_and(|email| self.options.exclusions.contains(&email))
    }

    /// Decide what to do for `record` given the active accounts matching its email.
    pub fn plan(&self, record: &EmployeeRecord, matches: &[&DirectoryAccount]) -> SyncDecision {
        let Some(email) = record.email_key() else {
            return SyncDecision::skip(SkipReason::MissingEmail);
        };

        match matches {
            [] => self.plan_creation(record, &email),
            [account] => self.plan_update(record, account),
            accounts => SyncDecision::Conflict {
                email,
                accounts: accounts.iter().map(|a| AccountRef::from(*a)).collect(),
            },
        }
    }

    /// Creation gates, first match wins: exclusion, existence, leaving, start date.
    fn plan_creation(&self, record: &EmployeeRecord, email: &str) -> SyncDecision {
        if self.options.exclusions.contains(email) {
            return SyncDecision::skip(SkipReason::Excluded);
        }

        let Some(uid) = derive_uid(email) else {
            return SyncDecision::skip(SkipReason::MissingEmail);
        };

        if let Some(namespace) = self.resolver.resolve(&uid) {
            return SyncDecision::skip(SkipReason::AlreadyExists { uid, namespace });
        }

        if record.termination_date.is_set() {
            return SyncDecision::skip(SkipReason::Leaving {
                termination_date: record.termination_date.clone(),
            });
        }

        if !self.options.force.covers(&uid) {
            match &record.hire_date {
                HrDate::Date(hire_date) if *hire_date > self.options.today => {
                    return SyncDecision::skip(SkipReason::FutureStart {
                        hire_date: *hire_date,
                    });
                }
                HrDate::Invalid(value) => {
                    return SyncDecision::skip(SkipReason::InvalidHireDate {
                        value: value.clone(),
                    });
                }
                _ => {}
            }
        }

        let names = resolve_names(record);
        SyncDecision::Create {
            account: NewAccount {
                home_directory: format!("/home/{uid}"),
                uid,
                given_name: names.given_name,
                sn: names.sn,
                title: record.job_title.clone(),
                mobile: record.mobile_phone.clone(),
                mail: email.to_string(),
                department_number: record.department.clone(),
                ou: record.division.clone(),
                employee_number: record.id.clone(),
                gid_number: self.options.default_gid.clone(),
                login_shell: DEFAULT_LOGIN_SHELL.to_string(),
            },
        }
    }

    fn plan_update(&self, record: &EmployeeRecord, account: &DirectoryAccount) -> SyncDecision {
        let names = resolve_names(record);
        SyncDecision::UpdateFields {
            target: AccountRef::from(account),
            changes: field_changes(record, &names, account),
        }
    }
}

/// Resolved directory names for a record.
pub fn resolve_names(record: &EmployeeRecord) -> ResolvedNames {
    ResolvedNames::resolve(
        &record.first_name,
        &record.last_name,
        record.preferred_name.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::DirectorySnapshot;
    use crate::types::Attribute;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn options() -> PlannerOptions {
        PlannerOptions {
            exclusions: ExclusionSet::new(),
            force: ForcePolicy::None,
            today: today(),
            default_gid: "707".to_string(),
        }
    }

    fn alice() -> EmployeeRecord {
        EmployeeRecord {
            id: "101".to_string(),
            first_name: "alice".to_string(),
            last_name: "jones".to_string(),
            work_email: Some("Alice.Jones@co.com".to_string()),
            job_title: "Engineer".to_string(),
            department: "R&D".to_string(),
            division: "UK".to_string(),
            mobile_phone: "+44 7700 900000".to_string(),
            hire_date: HrDate::from_field(Some("2024-01-10")),
            ..Default::default()
        }
    }

    fn plan_with(
        options: &PlannerOptions,
        snapshot: &DirectorySnapshot,
        record: &EmployeeRecord,
        matches: &[&DirectoryAccount],
    ) -> SyncDecision {
        SyncPlanner::new(options, StateResolver::new(snapshot)).plan(record, matches)
    }

    fn plan(record: &EmployeeRecord) -> SyncDecision {
        plan_with(&options(), &DirectorySnapshot::new(), record, &[])
    }

    fn tomorrow() -> HrDate {
        HrDate::Date(today().succ_opt().unwrap())
    }

    #[test]
    fn test_create_when_started() {
        let decision = plan(&alice());
        let SyncDecision::Create { account } = decision else {
            panic!("expected Create, got {decision:?}");
        };
        assert_eq!(account.uid, "alice.jones");
        assert_eq!(account.given_name, "Alice");
        assert_eq!(account.sn, "Jones");
        assert_eq!(account.cn(), "Alice Jones");
        assert_eq!(account.mail, "alice.jones@co.com");
        assert_eq!(account.employee_number, "101");
        assert_eq!(account.gid_number, "707");
        assert_eq!(account.home_directory, "/home/alice.jones");
        assert_eq!(account.login_shell, "/usr/sbin/nologin");
        assert_eq!(account.ou, "UK");
        assert_eq!(account.department_number, "R&D");
    }

    #[test]
    fn test_create_when_hire_date_is_today_or_unset() {
        let mut record = alice();
        record.hire_date = HrDate::Date(today());
        assert!(matches!(plan(&record), SyncDecision::Create { .. }));

        record.hire_date = HrDate::Unset;
        assert!(matches!(plan(&record), SyncDecision::Create { .. }));
    }

    #[test]
    fn test_future_start_skipped() {
        let mut record = alice();
        record.hire_date = tomorrow();
        assert_eq!(
            plan(&record),
            SyncDecision::Skip {
                reason: SkipReason::FutureStart {
                    hire_date: today().succ_opt().unwrap()
                }
            }
        );
    }

    #[test]
    fn test_force_all_bypasses_future_start() {
        let mut record = alice();
        record.hire_date = tomorrow();
        let mut options = options();
        options.force = ForcePolicy::All;
        let decision = plan_with(&options, &DirectorySnapshot::new(), &record, &[]);
        assert!(matches!(decision, SyncDecision::Create { .. }));
    }

    #[test]
    fn test_force_uid_bypasses_future_start() {
        let mut record = alice();
        record.hire_date = tomorrow();
        let mut options = options();
        options.force = ForcePolicy::from_args(Some(&["Alice.Jones".to_string()][..]));
        let decision = plan_with(&options, &DirectorySnapshot::new(), &record, &[]);
        assert!(matches!(decision, SyncDecision::Create { .. }));

        options.force = ForcePolicy::from_args(Some(&["bob".to_string()][..]));
        let decision = plan_with(&options, &DirectorySnapshot::new(), &record, &[]);
        assert!(matches!(
            decision,
            SyncDecision::Skip {
                reason: SkipReason::FutureStart { .. }
            }
        ));
    }

    #[test]
    fn test_invalid_hire_date_skipped_unless_forced() {
        let mut record = alice();
        record.hire_date = HrDate::Invalid("next monday".to_string());
        let decision = plan(&record);
        let SyncDecision::Skip { reason } = decision else {
            panic!("expected Skip");
        };
        assert!(reason.is_forceable());

        let mut options = options();
        options.force = ForcePolicy::All;
        let decision = plan_with(&options, &DirectorySnapshot::new(), &record, &[]);
        assert!(matches!(decision, SyncDecision::Create { .. }));
    }

    #[test]
    fn test_leaving_skipped_even_when_forced() {
        let mut record = alice();
        record.termination_date = HrDate::from_field(Some("2024-05-31"));
        let mut options = options();
        options.force = ForcePolicy::All;

        let decision = plan_with(&options, &DirectorySnapshot::new(), &record, &[]);
        let SyncDecision::Skip { reason } = decision else {
            panic!("expected Skip");
        };
        assert!(matches!(reason, SkipReason::Leaving { .. }));
        assert!(!reason.is_forceable());
        assert!(reason.to_string().contains("2024-05-31"));
    }

    #[test]
    fn test_leaving_gate_before_future_start() {
        let mut record = alice();
        record.hire_date = tomorrow();
        record.termination_date = HrDate::Invalid("unknown".to_string());
        assert!(matches!(
            plan(&record),
            SyncDecision::Skip {
                reason: SkipReason::Leaving { .. }
            }
        ));
    }

    #[test]
    fn test_excluded_skipped_even_when_forced() {
        let mut options = options();
        options.exclusions = ExclusionSet::parse("alice.jones@CO.com");
        options.force = ForcePolicy::All;
        let decision = plan_with(&options, &DirectorySnapshot::new(), &alice(), &[]);
        assert_eq!(
            decision,
            SyncDecision::Skip {
                reason: SkipReason::Excluded
            }
        );
    }

    #[test]
    fn test_excluded_record_still_gets_field_updates() {
        let mut options = options();
        options.exclusions = ExclusionSet::parse("alice.jones@co.com");
        let account = DirectoryAccount::new("alice.jones", "uid=alice.jones", Namespace::Active)
            .with_values("mail", ["alice.jones@co.com"]);

        let decision = plan_with(&options, &DirectorySnapshot::new(), &alice(), &[&account]);
        let SyncDecision::UpdateFields { target, changes } = decision else {
            panic!("expected UpdateFields");
        };
        assert_eq!(target.uid, "alice.jones");
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_already_exists_in_each_namespace() {
        for namespace in Namespace::ALL {
            let snapshot: DirectorySnapshot = [DirectoryAccount::new(
                "alice.jones",
                "uid=alice.jones",
                namespace,
            )]
            .into_iter()
            .collect();
            let mut options = options();
            options.force = ForcePolicy::All;

            let decision = plan_with(&options, &snapshot, &alice(), &[]);
            assert_eq!(
                decision,
                SyncDecision::Skip {
                    reason: SkipReason::AlreadyExists {
                        uid: "alice.jones".to_string(),
                        namespace,
                    }
                }
            );
        }
    }

    #[test]
    fn test_exclusion_checked_before_existence() {
        let snapshot: DirectorySnapshot = [DirectoryAccount::new(
            "alice.jones",
            "uid=alice.jones",
            Namespace::Staged,
        )]
        .into_iter()
        .collect();
        let mut options = options();
        options.exclusions = ExclusionSet::parse("alice.jones@co.com");

        let decision = plan_with(&options, &snapshot, &alice(), &[]);
        assert_eq!(
            decision,
            SyncDecision::Skip {
                reason: SkipReason::Excluded
            }
        );
    }

    #[test]
    fn test_missing_email() {
        let mut record = alice();
        record.work_email = None;
        assert_eq!(
            plan(&record),
            SyncDecision::Skip {
                reason: SkipReason::MissingEmail
            }
        );
    }

    #[test]
    fn test_single_match_field_diff() {
        let account = DirectoryAccount::new("alice.jones", "uid=alice.jones,cn=users", Namespace::Active)
            .with_values("mail", ["alice.jones@co.com"])
            .with(Attribute::GivenName, "Alice")
            .with(Attribute::Sn, "Jones")
            .with(Attribute::Cn, "Alice Jones")
            .with(Attribute::Mobile, "111")
            .with(Attribute::TelephoneNumber, "222")
            .with(Attribute::Title, "Engineer")
            .with(Attribute::EmployeeNumber, "101")
            .with(Attribute::DepartmentNumber, "R&D")
            .with(Attribute::Ou, "UK");
        let mut record = alice();
        record.mobile_phone = "222".to_string();

        let decision = plan_with(&options(), &DirectorySnapshot::new(), &record, &[&account]);
        assert_eq!(
            decision,
            SyncDecision::UpdateFields {
                target: AccountRef {
                    uid: "alice.jones".to_string(),
                    dn: "uid=alice.jones,cn=users".to_string(),
                },
                changes: vec![AttributeChange::new(Attribute::Mobile, "111", "222")],
            }
        );
    }

    #[test]
    fn test_conflict_on_multiple_matches() {
        let a = DirectoryAccount::new("bob", "uid=bob", Namespace::Active);
        let b = DirectoryAccount::new("bob2", "uid=bob2", Namespace::Active);
        let mut record = alice();
        record.work_email = Some("bob@co.com".to_string());

        let decision = plan_with(&options(), &DirectorySnapshot::new(), &record, &[&a, &b]);
        let SyncDecision::Conflict { email, accounts } = &decision else {
            panic!("expected Conflict");
        };
        assert_eq!(email, "bob@co.com");
        assert_eq!(accounts.len(), 2);
        assert!(!decision.is_mutation());
    }

    #[test]
    fn test_force_policy_from_args() {
        assert_eq!(ForcePolicy::from_args(None), ForcePolicy::None);
        assert_eq!(ForcePolicy::from_args(Some(&[][..])), ForcePolicy::All);
        let policy = ForcePolicy::from_args(Some(&["Bob".to_string()][..]));
        assert!(policy.covers("bob"));
        assert!(policy.covers("BOB"));
        assert!(!policy.covers("alice"));
    }

    #[test]
    fn test_new_account_attributes_skip_empty_values() {
        let mut record = alice();
        record.mobile_phone = String::new();
        let SyncDecision::Create { account } = plan(&record) else {
            panic!("expected Create");
        };
        let attrs = account.attributes();
        assert!(attrs.iter().all(|(name, _)| *name != "mobile"));
        assert!(attrs.contains(&("cn", "Alice Jones".to_string())));
        assert!(attrs.contains(&("gidNumber", "707".to_string())));
    }
}
