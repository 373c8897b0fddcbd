//! Field-level comparison between an HR record and a directory account

use crate::names::ResolvedNames;
use crate::types::{Attribute, DirectoryAccount, EmployeeRecord};
use std::fmt;

/// HR mobile value that must never be pushed to `mobile`.
const MOBILE_PLACEHOLDER: &str = "None";

/// A single attribute update: `attribute` goes from `old` to `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub attribute: Attribute,
    pub old: String,
    pub new: String,
}

impl AttributeChange {
    pub fn new(attribute: Attribute, old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            attribute,
            old: old.into(),
            new: new.into(),
        }
    }
}

impl fmt::Display for AttributeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} from '{}' to '{}'",
            self.attribute, self.old, self.new
        )
    }
}

/// Compute the updates needed to bring `account` in line with `record`.
///
/// Only mismatching attributes are returned, in a fixed order. `mobile` is
/// left alone when HR has no usable number; `telephoneNumber` always follows
/// the HR mobile number.
pub fn field_changes(
    record: &EmployeeRecord,
    names: &ResolvedNames,
    account: &DirectoryAccount,
) -> Vec<AttributeChange> {
    let mobile = record.mobile_phone.as_str();
    let mut changes = Vec::new();

    let mut compare = |attribute: Attribute, desired: &str| {
        let current = account.get(attribute);
        if current != desired {
            changes.push(AttributeChange::new(attribute, current, desired));
        }
    };

    compare(Attribute::GivenName, &names.given_name);
    compare(Attribute::Sn, &names.sn);
    compare(Attribute::Cn, &names.cn());
    if !mobile.is_empty() && mobile != MOBILE_PLACEHOLDER {
        compare(Attribute::Mobile, mobile);
    }
    compare(Attribute::TelephoneNumber, mobile);
    compare(Attribute::Title, &record.job_title);
    compare(Attribute::EmployeeNumber, &record.id);
    compare(Attribute::DepartmentNumber, &record.department);
    compare(Attribute::Ou, &record.division);

    changes
}
