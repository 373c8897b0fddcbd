//! BambooHR wire types and their conversion into sync engine records.

use crate::error::{Error, Result};
use reconcile::{EmployeeRecord, HrDate, OnboardingFields, Roster, Supplement};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

// =============================================================================
// Field names
// =============================================================================

pub const HIRE_DATE: &str = "hireDate";
pub const TERMINATION_DATE: &str = "terminationDate";
pub const SUPERVISOR: &str = "supervisor";
pub const SUPERVISOR_EID: &str = "supervisorEid";
pub const LOCATION: &str = "location";
pub const ONBOARDING_NOTES: &str = "customonboardingNotes";
pub const REQUESTED_PHONE: &str = "customrequestedPhone";
pub const REQUESTED_LAPTOP: &str = "customrequestedLaptop";
pub const REQUESTED_MONITOR: &str = "customrequestedMonitor";
pub const TEAMS: &str = "customTeams";
pub const SYSTEMS: &str = "customSystems";

/// Fields fetched for employees that have no directory account yet.
pub const SUPPLEMENT_FIELDS: &[&str] = &[
    HIRE_DATE,
    TERMINATION_DATE,
    SUPERVISOR,
    SUPERVISOR_EID,
    LOCATION,
    ONBOARDING_NOTES,
    REQUESTED_PHONE,
    REQUESTED_LAPTOP,
    REQUESTED_MONITOR,
    TEAMS,
    SYSTEMS,
];

// =============================================================================
// API response types
// =============================================================================

/// Response of `GET /directory`.
#[derive(Debug, Deserialize)]
pub struct DirectoryResponse {
    #[serde(default)]
    pub employees: Vec<DirectoryEmployee>,
}

/// One employee in the directory listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEmployee {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_name: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub division: Option<String>,
    pub mobile_phone: Option<String>,
    pub work_email: Option<String>,
    pub supervisor: Option<String>,
    pub location: Option<String>,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Trimmed text, `None` when blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<DirectoryEmployee> for EmployeeRecord {
    fn from(e: DirectoryEmployee) -> Self {
        let text = |value: Option<String>| non_blank(value).unwrap_or_default();
        Self {
            id: e.id.trim().to_string(),
            first_name: text(e.first_name),
            last_name: text(e.last_name),
            preferred_name: non_blank(e.preferred_name),
            work_email: non_blank(e.work_email),
            job_title: text(e.job_title),
            department: text(e.department),
            division: text(e.division),
            mobile_phone: text(e.mobile_phone),
            supervisor: non_blank(e.supervisor),
            onboarding: OnboardingFields {
                location: non_blank(e.location),
                ..OnboardingFields::default()
            },
            ..Self::default()
        }
    }
}

/// Build a roster from a directory listing.
///
/// # Errors
///
/// Returns [`Error::EmptyRoster`] when the listing holds no employees.
pub fn roster_from_directory(response: DirectoryResponse) -> Result<Roster> {
    if response.employees.is_empty() {
        return Err(Error::EmptyRoster);
    }
    Ok(response
        .employees
        .into_iter()
        .map(EmployeeRecord::from)
        .map(|record| (record.id.clone(), record))
        .collect())
}

/// Flatten a per-employee field response.
///
/// Strings are trimmed; blanks and nulls become `None`. Requested fields the
/// response omits are also `None`. The `id` echo is dropped unless asked for.
pub fn field_values(
    response: BTreeMap<String, serde_json::Value>,
    requested: &[&str],
) -> BTreeMap<String, Option<String>> {
    let mut values: BTreeMap<String, Option<String>> = requested
        .iter()
        .map(|name| ((*name).to_string(), None))
        .collect();
    for (name, value) in response {
        if !values.contains_key(&name) {
            continue;
        }
        let value = match value {
            serde_json::Value::String(s) => non_blank(Some(s)),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        };
        values.insert(name, value);
    }
    values
}

/// Build a supplement from the values of [`SUPPLEMENT_FIELDS`].
pub fn supplement_from_fields(fields: &BTreeMap<String, Option<String>>) -> Supplement {
    let get = |name: &str| fields.get(name).cloned().flatten();
    Supplement {
        hire_date: HrDate::from_field(get(HIRE_DATE).as_deref()),
        termination_date: HrDate::from_field(get(TERMINATION_DATE).as_deref()),
        supervisor: get(SUPERVISOR),
        supervisor_id: get(SUPERVISOR_EID),
        onboarding: OnboardingFields {
            location: get(LOCATION),
            requested_phone: get(REQUESTED_PHONE),
            requested_laptop: get(REQUESTED_LAPTOP),
            requested_monitor: get(REQUESTED_MONITOR),
            teams: get(TEAMS),
            systems: get(SYSTEMS),
            notes: get(ONBOARDING_NOTES),
        },
    }
}
