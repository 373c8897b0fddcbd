//! LDAP connection to a FreeIPA server.

use crate::entry::{account_from_entry, add_attributes, modification};
use crate::error::{Error, RC_NO_SUCH_OBJECT, Result};
use crate::escape::escape_filter_value;
use crate::layout::DirectoryLayout;
use ldap3::{LdapConn, LdapConnSettings, LdapResult, Scope, SearchEntry, SearchResult};
use reconcile::{AttributeChange, Directory, DirectoryAccount, Namespace, NewAccount};
use std::time::Duration;

/// Connection timeout per server
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How to reach and authenticate to the directory.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// LDAP URLs, tried in order
    pub urls: Vec<String>,
    pub bind_dn: String,
    pub bind_pw: String,
    /// DNS domain the directory suffix is derived from
    pub domain: String,
}

/// A bound connection to FreeIPA.
pub struct IpaDirectory {
    conn: LdapConn,
    layout: DirectoryLayout,
    url: String,
}

impl IpaDirectory {
    /// Connect and bind to the first server that accepts the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoServers`] for an empty server list, otherwise
    /// [`Error::AllServersFailed`] carrying the last server's error.
    pub fn connect(options: &ConnectOptions) -> Result<Self> {
        let mut last_error: Option<Error> = None;

        for url in &options.urls {
            match bind(url, &options.bind_dn, &options.bind_pw) {
                Ok(conn) => {
                    log::info!("Bound to {url} as {}", options.bind_dn);
                    return Ok(Self {
                        conn,
                        layout: DirectoryLayout::from_domain(&options.domain),
                        url: url.clone(),
                    });
                }
                Err(e) => {
                    log::warn!("Directory server {url} failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(last) => Err(Error::AllServersFailed {
                last: Box::new(last),
            }),
            None => Err(Error::NoServers),
        }
    }

    /// URL of the server in use.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn layout(&self) -> &DirectoryLayout {
        &self.layout
    }

    fn search(&mut self, base: &str, filter: &str, namespace: Namespace) -> Result<Vec<DirectoryAccount>> {
        log::debug!("Searching {base} for {filter}");
        let SearchResult(entries, result) =
            self.conn.search(base, Scope::Subtree, filter, vec!["*"])?;

        if result.rc == RC_NO_SUCH_OBJECT {
            log::debug!("Search base {base} does not exist");
            return Ok(Vec::new());
        }
        check("search", base, result)?;

        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .filter_map(|entry| account_from_entry(entry, namespace))
            .collect())
    }

    /// Every user account in `namespace`.
    pub fn users(&mut self, namespace: Namespace) -> Result<Vec<DirectoryAccount>> {
        let base = self.layout.base(namespace);
        self.search(&base, "(uid=*)", namespace)
    }

    /// Active accounts whose `mail` equals `email`.
    pub fn find_by_email(&mut self, email: &str) -> Result<Vec<DirectoryAccount>> {
        let base = self.layout.base(Namespace::Active);
        let filter = format!("(mail={})", escape_filter_value(email.trim()));
        self.search(&base, &filter, Namespace::Active)
    }

    /// Add a staged user.
    pub fn add_user(&mut self, account: &NewAccount) -> Result<()> {
        let dn = self.layout.user_dn(&account.uid, Namespace::Staged);
        log::debug!("Adding {dn}");
        let result = self.conn.add(&dn, add_attributes(account))?;
        check("add", &dn, result)
    }

    /// Replace (or delete) one attribute of the entry at `dn`.
    pub fn modify_user(&mut self, dn: &str, change: &AttributeChange) -> Result<()> {
        log::debug!("Modifying {} of {dn}", change.attribute);
        let result = self.conn.modify(dn, vec![modification(change)])?;
        check("modify", dn, result)
    }
}

impl Drop for IpaDirectory {
    fn drop(&mut self) {
        if let Err(e) = self.conn.unbind() {
            log::debug!("Unbind from {} failed: {e}", self.url);
        }
    }
}

impl Directory for IpaDirectory {
    fn fetch_accounts(&mut self, namespace: Namespace) -> anyhow::Result<Vec<DirectoryAccount>> {
        Ok(self.users(namespace)?)
    }

    fn create_account(&mut self, account: &NewAccount) -> anyhow::Result<()> {
        Ok(self.add_user(account)?)
    }

    fn modify_attribute(&mut self, dn: &str, change: &AttributeChange) -> anyhow::Result<()> {
        Ok(self.modify_user(dn, change)?)
    }
}

fn bind(url: &str, bind_dn: &str, bind_pw: &str) -> Result<LdapConn> {
    log::debug!("Connecting to {url}");
    let settings = LdapConnSettings::new().set_conn_timeout(CONNECT_TIMEOUT);
    let mut conn = LdapConn::with_settings(settings, url).map_err(|source| Error::Connect {
        url: url.to_string(),
        source,
    })?;

    let result = conn.simple_bind(bind_dn, bind_pw)?;
    if result.rc != 0 {
        return Err(Error::Bind {
            dn: bind_dn.to_string(),
            rc: result.rc,
            text: result.text,
        });
    }
    Ok(conn)
}

fn check(operation: &'static str, dn: &str, result: LdapResult) -> Result<()> {
    if result.rc == 0 {
        Ok(())
    } else {
        Err(Error::Operation {
            operation,
            dn: dn.to_string(),
            rc: result.rc,
            text: result.text,
        })
    }
}
