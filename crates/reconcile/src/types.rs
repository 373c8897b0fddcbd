//! Core types: HR records, directory accounts and run summaries

use crate::error::Error;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// HR side
// ============================================================================

/// A date field from the HR system.
///
/// BambooHR reports "no date" either as an empty field or as `0000-00-00`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HrDate {
    /// No date recorded
    #[default]
    Unset,
    /// A calendar date
    Date(NaiveDate),
    /// A value that is present but not a valid date
    Invalid(String),
}

impl HrDate {
    /// Sentinel the HR system uses for "no date"
    pub const UNSET_SENTINEL: &'static str = "0000-00-00";

    /// Parse an optional raw field, keeping unparseable values as [`HrDate::Invalid`].
    pub fn from_field(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Unset,
            Some(value) => value
                .parse()
                .unwrap_or_else(|_| Self::Invalid(value.trim().to_string())),
        }
    }

    /// Whether any value (valid or not) other than the sentinel is present.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// The calendar date, if valid.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl FromStr for HrDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == Self::UNSET_SENTINEL {
            return Ok(Self::Unset);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| Error::InvalidDate {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for HrDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str(Self::UNSET_SENTINEL),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Invalid(raw) => f.write_str(raw),
        }
    }
}

/// Free-form onboarding fields, only used to fill the new starter notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingFields {
    pub location: Option<String>,
    pub requested_phone: Option<String>,
    pub requested_laptop: Option<String>,
    pub requested_monitor: Option<String>,
    pub teams: Option<String>,
    pub systems: Option<String>,
    pub notes: Option<String>,
}

/// One employee from the HR roster.
///
/// Text fields that the HR system left empty are empty strings; fields that
/// are only fetched for new starters (see [`Supplement`]) default to unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeRecord {
    /// HR identifier, mirrored into `employeeNumber`
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub preferred_name: Option<String>,
    pub work_email: Option<String>,
    pub job_title: String,
    pub department: String,
    pub division: String,
    pub mobile_phone: String,
    pub hire_date: HrDate,
    pub termination_date: HrDate,
    /// Supervisor display name
    pub supervisor: Option<String>,
    /// Supervisor HR identifier
    pub supervisor_id: Option<String>,
    pub supervisor_email: Option<String>,
    pub onboarding: OnboardingFields,
}

impl EmployeeRecord {
    /// Lowercased, trimmed work email, or `None` when the record has none.
    pub fn email_key(&self) -> Option<String> {
        self.work_email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
    }

    /// Merge fields fetched separately for records without a directory account.
    pub fn apply_supplement(&mut self, supplement: Supplement) {
        self.hire_date = supplement.hire_date;
        self.termination_date = supplement.termination_date;
        if supplement.supervisor.is_some() {
            self.supervisor = supplement.supervisor;
        }
        if supplement.supervisor_id.is_some() {
            self.supervisor_id = supplement.supervisor_id;
        }
        self.onboarding = supplement.onboarding;
    }
}

/// Per-employee fields that the roster listing does not include.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Supplement {
    pub hire_date: HrDate,
    pub termination_date: HrDate,
    pub supervisor: Option<String>,
    pub supervisor_id: Option<String>,
    pub onboarding: OnboardingFields,
}

/// The full HR roster keyed by HR identifier.
pub type Roster = BTreeMap<String, EmployeeRecord>;

/// Email addresses that are never eligible for account creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    emails: HashSet<String>,
}

impl ExclusionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma and/or whitespace separated list of addresses.
    pub fn parse(list: &str) -> Self {
        list.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Check an address, ignoring case.
    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            emails: iter
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

// ============================================================================
// Directory side
// ============================================================================

/// Directory container an account lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    /// Regular, enabled accounts
    Active,
    /// Pending accounts created ahead of a hire
    Staged,
    /// Accounts retained after deletion
    Preserved,
}

impl Namespace {
    /// All namespaces in existence-check priority order.
    pub const ALL: [Namespace; 3] = [Self::Active, Self::Staged, Self::Preserved];

    /// Short lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Staged => "stage",
            Self::Preserved => "preserved",
        }
    }

    /// Capitalized label for messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Staged => "Stage",
            Self::Preserved => "Preserved",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory attributes the engine reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    Uid,
    Cn,
    GivenName,
    Sn,
    Mobile,
    TelephoneNumber,
    Title,
    EmployeeNumber,
    DepartmentNumber,
    Ou,
    Mail,
}

impl Attribute {
    /// LDAP attribute name
    pub fn ldap_name(&self) -> &'static str {
        match self {
            Self::Uid => "uid",
            Self::Cn => "cn",
            Self::GivenName => "givenName",
            Self::Sn => "sn",
            Self::Mobile => "mobile",
            Self::TelephoneNumber => "telephoneNumber",
            Self::Title => "title",
            Self::EmployeeNumber => "employeeNumber",
            Self::DepartmentNumber => "departmentNumber",
            Self::Ou => "ou",
            Self::Mail => "mail",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ldap_name())
    }
}

/// A directory account snapshot.
///
/// Every attribute is an ordered sequence of values, keyed by its lowercased
/// name. Single-valued reads use the first value, or the empty string when
/// the attribute is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryAccount {
    pub uid: String,
    pub dn: String,
    pub namespace: Namespace,
    attributes: BTreeMap<String, Vec<String>>,
}

impl DirectoryAccount {
    /// Create an account with no attributes besides `uid`.
    pub fn new(uid: impl Into<String>, dn: impl Into<String>, namespace: Namespace) -> Self {
        let uid = uid.into();
        let mut attributes = BTreeMap::new();
        attributes.insert("uid".to_string(), vec![uid.clone()]);
        Self {
            uid,
            dn: dn.into(),
            namespace,
            attributes,
        }
    }

    /// Builder form of [`DirectoryAccount::set_values`].
    pub fn with_values<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_values(name, values);
        self
    }

    /// Builder shortcut for a single-valued attribute.
    pub fn with(self, attribute: Attribute, value: impl Into<String>) -> Self {
        self.with_values(attribute.ldap_name(), [value.into()])
    }

    /// Replace all values of an attribute.
    pub fn set_values<I, S>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.insert(
            name.to_lowercase(),
            values.into_iter().map(Into::into).collect(),
        );
    }

    /// All values of an attribute (empty when absent).
    pub fn values(&self, name: &str) -> &[String] {
        self.attributes
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Effective scalar value: the first value, or `""`.
    pub fn first(&self, name: &str) -> &str {
        self.values(name).first().map(String::as_str).unwrap_or("")
    }

    /// Effective scalar value of a known attribute.
    pub fn get(&self, attribute: Attribute) -> &str {
        self.first(attribute.ldap_name())
    }

    /// All mail values.
    pub fn mail(&self) -> &[String] {
        self.values(Attribute::Mail.ldap_name())
    }

    /// Whether any mail value equals `email`, ignoring case.
    pub fn has_mail(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.mail().iter().any(|m| m.trim().to_lowercase() == email)
    }

    /// Attribute names present on this account (lowercased).
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Counters for one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Records processed
    pub records: usize,
    /// Accounts created
    pub created: usize,
    /// Attribute updates applied
    pub updated: usize,
    /// Creates and updates computed but not applied (dry run)
    pub dry_run: usize,
    /// Matched records with nothing to change
    pub unchanged: usize,
    /// Policy skips
    pub skipped: usize,
    /// Email shared by several accounts
    pub conflicts: usize,
    /// Failed creates and attribute updates
    pub failed: usize,
    /// Notifications sent
    pub notified: usize,
    /// Notifications that could not be sent
    pub notify_failed: usize,
}

impl SyncSummary {
    /// Total number of changes made to the directory
    pub fn total_changes(&self) -> usize {
        self.created + self.updated
    }

    /// Whether every attempted action succeeded
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.notify_failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hr_date_parse() {
        assert_eq!(
            "2024-01-10".parse::<HrDate>().unwrap(),
            HrDate::Date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        );
        assert_eq!("0000-00-00".parse::<HrDate>().unwrap(), HrDate::Unset);
        assert_eq!("".parse::<HrDate>().unwrap(), HrDate::Unset);
        assert!("10/01/2024".parse::<HrDate>().is_err());
    }

    #[test]
    fn test_hr_date_from_field() {
        assert_eq!(HrDate::from_field(None), HrDate::Unset);
        assert_eq!(
            HrDate::from_field(Some("soon")),
            HrDate::Invalid("soon".to_string())
        );
        assert!(HrDate::from_field(Some("soon")).is_set());
        assert!(!HrDate::from_field(Some("0000-00-00")).is_set());
    }

    #[test]
    fn test_hr_date_display() {
        assert_eq!(HrDate::Unset.to_string(), "0000-00-00");
        assert_eq!(
            HrDate::from_field(Some("2024-03-01")).to_string(),
            "2024-03-01"
        );
    }

    #[test]
    fn test_email_key() {
        let mut record = EmployeeRecord {
            work_email: Some(" Alice.Jones@Co.com ".to_string()),
            ..Default::default()
        };
        assert_eq!(record.email_key().as_deref(), Some("alice.jones@co.com"));

        record.work_email = Some("   ".to_string());
        assert_eq!(record.email_key(), None);

        record.work_email = None;
        assert_eq!(record.email_key(), None);
    }

    #[test]
    fn test_apply_supplement_keeps_roster_supervisor() {
        let mut record = EmployeeRecord {
            supervisor: Some("Jane Boss".to_string()),
            ..Default::default()
        };
        record.apply_supplement(Supplement {
            hire_date: HrDate::from_field(Some("2024-01-10")),
            ..Default::default()
        });
        assert_eq!(record.supervisor.as_deref(), Some("Jane Boss"));
        assert!(record.hire_date.is_set());
    }

    #[test]
    fn test_exclusion_set_parse() {
        let set = ExclusionSet::parse("a@co.com, B@CO.com\n  c@co.com,,");
        assert_eq!(set.len(), 3);
        assert!(set.contains("b@co.com"));
        assert!(set.contains("A@co.com"));
        assert!(!set.contains("d@co.com"));
        assert!(ExclusionSet::parse("").is_empty());
    }

    #[test]
    fn test_account_effective_scalar() {
        let account = DirectoryAccount::new("bob", "uid=bob,cn=users", Namespace::Active)
            .with_values("mobile", ["111", "222"])
            .with(Attribute::Title, "Engineer");

        assert_eq!(account.get(Attribute::Mobile), "111");
        assert_eq!(account.get(Attribute::Title), "Engineer");
        assert_eq!(account.get(Attribute::TelephoneNumber), "");
        assert_eq!(account.get(Attribute::Uid), "bob");
        assert_eq!(account.values("MOBILE").len(), 2);
    }

    #[test]
    fn test_account_has_mail_ignores_case() {
        let account = DirectoryAccount::new("bob", "uid=bob", Namespace::Active)
            .with_values("mail", ["Bob@Co.com", "robert@co.com"]);
        assert!(account.has_mail("bob@co.com"));
        assert!(account.has_mail("ROBERT@co.com"));
        assert!(!account.has_mail("rob@co.com"));
    }

    #[test]
    fn test_namespace_priority_order() {
        assert_eq!(
            Namespace::ALL,
            [Namespace::Active, Namespace::Staged, Namespace::Preserved]
        );
        assert_eq!(Namespace::Staged.label(), "Stage");
    }
}
