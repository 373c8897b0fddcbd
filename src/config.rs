//! Configuration file
//!
//! A single TOML file holds everything the tool needs to reach BambooHR,
//! FreeIPA and the mail relay:
//!
//! ```toml
//! bamboo_url = "https://api.bamboohr.com/api/gateway.php/acme/v1/employees"
//! bamboo_api_key = "..."
//! bamboo_exclude_list = ["ceo@acme.com", "board@acme.com"]
//! bind_dn = "uid=sync,cn=sysaccounts,cn=etc,dc=ipa,dc=acme,dc=com"
//! bind_pw = "..."
//! ipa_server = "ipa1, ipa2"
//! ipa_domain = "ipa.acme.com"
//! notification_to = "it@acme.com"
//! notification_cc = "uk-office@acme.com"
//! default_gid = 10000
//! ```

use anyhow::{Context, Result};
use freeipa::ConnectOptions;
use reconcile::{ExclusionSet, NotificationSettings, RegionalCc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Division that receives the regional CC unless configured otherwise
pub const DEFAULT_CC_DIVISION: &str = "UK";

/// Mail transfer agent used for notifications
pub const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration key {}", quoted(.0))]
    MissingKeys(Vec<&'static str>),

    #[error("configuration key '{key}' must not be empty")]
    EmptyValue { key: &'static str },
}

fn quoted(keys: &[&str]) -> String {
    keys.iter()
        .map(|k| format!("'{k}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// File format
// ============================================================================

/// A value written either as a TOML string or as a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(i64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Exclusion list, as an array or one comma/space separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExcludeList {
    List(Vec<String>),
    Text(String),
}

impl ExcludeList {
    fn into_set(self) -> ExclusionSet {
        match self {
            Self::List(emails) => emails.into_iter().collect(),
            Self::Text(list) => ExclusionSet::parse(&list),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    bamboo_url: Option<String>,
    bamboo_api_key: Option<String>,
    bamboo_exclude_list: Option<ExcludeList>,
    bind_dn: Option<String>,
    bind_pw: Option<String>,
    ipa_server: Option<String>,
    ipa_domain: Option<String>,
    notification_to: Option<String>,
    notification_cc: Option<String>,
    notification_cc_division: Option<String>,
    default_gid: Option<Scalar>,
    sendmail: Option<String>,
    ldap_port: Option<u16>,
    use_ldaps: Option<bool>,
}

// ============================================================================
// AppConfig
// ============================================================================

/// Loaded configuration. Built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bamboo_url: String,
    pub bamboo_api_key: String,
    pub exclusions: ExclusionSet,
    pub bind_dn: String,
    pub bind_pw: String,
    /// Server list as written, see [`freeipa::parse_servers`]
    pub ipa_server: String,
    pub ipa_domain: String,
    pub notification_to: String,
    /// Regional CC address; `None` when configured empty
    pub notification_cc: Option<String>,
    pub notification_cc_division: String,
    pub default_gid: String,
    pub sendmail: PathBuf,
    pub ldap_port: Option<u16>,
    pub use_ldaps: bool,
}

impl AppConfig {
    /// Load and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate config text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).context("Invalid TOML format")?;
        Ok(Self::from_raw(raw)?)
    }

    fn from_raw(raw: RawConfig) -> std::result::Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut required = |key: &'static str, value: Option<String>| {
            let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let bamboo_url = required("bamboo_url", raw.bamboo_url);
        let bamboo_api_key = required("bamboo_api_key", raw.bamboo_api_key);
        let bind_dn = required("bind_dn", raw.bind_dn);
        let bind_pw = required("bind_pw", raw.bind_pw);
        let ipa_server = required("ipa_server", raw.ipa_server);
        let ipa_domain = required("ipa_domain", raw.ipa_domain);
        let notification_to = required("notification_to", raw.notification_to);
        let default_gid = required("default_gid", raw.default_gid.map(Scalar::into_string));

        // Required but may be empty
        if raw.notification_cc.is_none() {
            missing.push("notification_cc");
        }
        if raw.bamboo_exclude_list.is_none() {
            missing.push("bamboo_exclude_list");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        if freeipa::parse_servers(&ipa_server, &ipa_domain).is_empty() {
            return Err(ConfigError::EmptyValue { key: "ipa_server" });
        }

        Ok(Self {
            bamboo_url,
            bamboo_api_key,
            exclusions: raw
                .bamboo_exclude_list
                .map(ExcludeList::into_set)
                .unwrap_or_default(),
            bind_dn,
            bind_pw,
            ipa_server,
            ipa_domain,
            notification_to,
            notification_cc: raw
                .notification_cc
                .map(|cc| cc.trim().to_string())
                .filter(|cc| !cc.is_empty()),
            notification_cc_division: raw
                .notification_cc_division
                .unwrap_or_else(|| DEFAULT_CC_DIVISION.to_string()),
            default_gid,
            sendmail: crate::paths::expand(raw.sendmail.as_deref().unwrap_or(DEFAULT_SENDMAIL)),
            ldap_port: raw.ldap_port,
            use_ldaps: raw.use_ldaps.unwrap_or(false),
        })
    }

    /// LDAP URLs in the order they should be tried
    pub fn ldap_urls(&self) -> Vec<String> {
        freeipa::parse_servers(&self.ipa_server, &self.ipa_domain)
            .iter()
            .map(|server| freeipa::ldap_url(server, self.ldap_port, self.use_ldaps))
            .collect()
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            urls: self.ldap_urls(),
            bind_dn: self.bind_dn.clone(),
            bind_pw: self.bind_pw.clone(),
            domain: self.ipa_domain.clone(),
        }
    }

    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings {
            to: self.notification_to.clone(),
            regional_cc: self.notification_cc.as_ref().map(|address| RegionalCc {
                division: self.notification_cc_division.clone(),
                address: address.clone(),
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
