//! BambooHR REST client.
//!
//! Authenticates with HTTP Basic, the API key as user name and `x` as
//! password, and asks for JSON.

use crate::error::{Error, Result};
use crate::types::{
    DirectoryResponse, SUPPLEMENT_FIELDS, field_values, roster_from_directory,
    supplement_from_fields,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reconcile::{HrSource, Roster, Supplement};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// Blocking BambooHR client.
///
/// `base_url` is the employees endpoint, for example
/// `https://api.bamboohr.com/api/gateway.php/<company>/v1/employees`.
pub struct BambooClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
}

impl BambooClient {
    /// Create a client for `base_url` using `api_key`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: &str) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url,
            authorization: basic_authorization(api_key),
        }
    }

    /// Get the employees endpoint URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn directory_url(&self) -> String {
        format!("{}/directory", self.base_url)
    }

    fn employee_url(&self, id: &str, fields: &[&str]) -> Result<String> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidEmployeeId(id.to_string()));
        }
        Ok(format!("{}/{}?fields={}", self.base_url, id, fields.join(",")))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        log::debug!("GET {url}");
        let value = self
            .agent
            .get(url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .call()?
            .body_mut()
            .read_json()?;
        Ok(value)
    }

    /// Fetch the employee directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the directory is empty.
    pub fn fetch_directory(&self) -> Result<Roster> {
        let response: DirectoryResponse = self.get_json(&self.directory_url())?;
        let roster = roster_from_directory(response)?;
        log::debug!("Fetched {} BambooHR employees", roster.len());
        Ok(roster)
    }

    /// Fetch selected fields of one employee.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmployeeNotFound`] for an unknown id, or an error if
    /// the request fails.
    pub fn fetch_employee_fields(
        &self,
        id: &str,
        fields: &[&str],
    ) -> Result<BTreeMap<String, Option<String>>> {
        let url = self.employee_url(id, fields)?;
        let response: BTreeMap<String, serde_json::Value> =
            self.get_json(&url).map_err(|e| match e {
                Error::Http {
                    status: Some(404), ..
                } => Error::EmployeeNotFound(id.to_string()),
                other => other,
            })?;
        Ok(field_values(response, fields))
    }
}

impl HrSource for BambooClient {
    fn fetch_roster(&self) -> anyhow::Result<Roster> {
        Ok(self.fetch_directory()?)
    }

    fn fetch_fields(
        &self,
        id: &str,
        fields: &[&str],
    ) -> anyhow::Result<BTreeMap<String, Option<String>>> {
        Ok(self.fetch_employee_fields(id, fields)?)
    }

    fn fetch_supplement(&self, id: &str) -> anyhow::Result<Supplement> {
        let fields = self.fetch_employee_fields(id, SUPPLEMENT_FIELDS)?;
        Ok(supplement_from_fields(&fields))
    }
}

/// `Authorization` header value for an API key.
fn basic_authorization(api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{api_key}:x")))
}
