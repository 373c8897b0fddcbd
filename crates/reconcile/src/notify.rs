//! New starter notifications
//!
//! [`NotificationTrigger`] decides whether a notification goes out for a
//! decision and composes it. Sending is left to a [`crate::Mailer`].

use crate::planner::{NewAccount, SyncDecision};
use crate::types::EmployeeRecord;

/// Extra CC recipient for employees of one division.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionalCc {
    /// Division name, compared exactly
    pub division: String,
    pub address: String,
}

/// Where notifications go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Primary recipient, and fallback sender when the supervisor has no email
    pub to: String,
    pub regional_cc: Option<RegionalCc>,
}

/// A composed message, ready for a mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub sender: String,
    pub recipients: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Decides when a notification fires and what it says.
#[derive(Debug, Clone)]
pub struct NotificationTrigger {
    settings: NotificationSettings,
    requested: bool,
    dry_run: bool,
}

impl NotificationTrigger {
    pub fn new(settings: NotificationSettings, requested: bool, dry_run: bool) -> Self {
        Self {
            settings,
            requested,
            dry_run,
        }
    }

    /// Fires only for creations, when requested, outside dry-run.
    pub fn should_fire(&self, decision: &SyncDecision) -> bool {
        self.requested && !self.dry_run && matches!(decision, SyncDecision::Create { .. })
    }

    /// Compose the notification for a planned account.
    ///
    /// `created` records whether the directory accepted the account.
    pub fn compose(&self, record: &EmployeeRecord, account: &NewAccount, created: bool) -> Notification {
        let supervisor_email = record
            .supervisor_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let sender = supervisor_email.unwrap_or(&self.settings.to).to_string();

        let mut cc = vec![sender.clone()];
        if let Some(regional) = &self.settings.regional_cc
            && record.division == regional.division
        {
            cc.push(regional.address.clone());
        }

        Notification {
            recipients: vec![self.settings.to.clone()],
            cc,
            subject: format!(
                "New Starter Notification: {} {}",
                account.given_name, account.sn
            ),
            body: render_body(record, account, supervisor_email.unwrap_or(""), created),
            sender,
        }
    }
}

fn render_body(
    record: &EmployeeRecord,
    account: &NewAccount,
    supervisor_email: &str,
    created: bool,
) -> String {
    let onboarding = &record.onboarding;
    let field = |value: &Option<String>| value.as_deref().unwrap_or_default().to_string();

    format!(
        "*Personal Information*\n\
         Name: {given_name} {sn}\n\
         Job Title: {job_title}\n\
         Work Email: {mail}\n\
         Start Date: {hire_date}\n\
         \n\
         *Department Information*\n\
         Department: {department}\n\
         Location: {location}\n\
         Division: {division}\n\
         Manager Name: {manager}\n\
         Manager Email: {supervisor_email}\n\
         \n\
         *Requirements*\n\
         Phone: {phone}\n\
         Laptop: {laptop}\n\
         Monitor: {monitor}\n\
         Teams: {teams}\n\
         Systems: {systems}\n\
         \n\
         *Onboarding Notes*\n\
         {notes}\n\
         \n\
         *LDAP uid:* {uid}\n\
         \n\
         *Stage FreeIPA user created:* {created}\n",
        given_name = account.given_name,
        sn = account.sn,
        job_title = record.job_title,
        mail = account.mail,
        hire_date = record.hire_date,
        department = record.department,
        location = field(&onboarding.location),
        division = record.division,
        manager = field(&record.supervisor),
        phone = field(&onboarding.requested_phone),
        laptop = field(&onboarding.requested_laptop),
        monitor = field(&onboarding.requested_monitor),
        teams = field(&onboarding.teams),
        systems = field(&onboarding.systems),
        notes = field(&onboarding.notes),
        uid = account.uid,
        created = if created { "Yes" } else { "No" },
    )
}
