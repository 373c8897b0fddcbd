//! Directory snapshot and namespace resolution

use crate::context::Directory;
use crate::matcher::match_by_email;
use crate::types::{DirectoryAccount, Namespace};
use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// Derive the canonical account identifier from a work email.
///
/// The identifier is the lowercased local part (everything before `@`).
pub fn derive_uid(email: &str) -> Option<String> {
    let local = email.trim().split('@').next().unwrap_or("").to_lowercase();
    if local.is_empty() { None } else { Some(local) }
}

/// All directory accounts, grouped by namespace and keyed by lowercased uid.
///
/// Taken once at the start of a run and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    namespaces: BTreeMap<Namespace, BTreeMap<String, DirectoryAccount>>,
}

impl DirectorySnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every namespace from a directory.
    pub fn fetch<D: Directory + ?Sized>(directory: &mut D) -> Result<Self> {
        let mut snapshot = Self::new();
        for namespace in Namespace::ALL {
            let accounts = directory
                .fetch_accounts(namespace)
                .with_context(|| format!("Failed to fetch {namespace} accounts"))?;
            log::debug!("Fetched {} {} accounts", accounts.len(), namespace);
            snapshot.extend(accounts);
        }
        Ok(snapshot)
    }

    /// Add an account under its own namespace.
    pub fn insert(&mut self, account: DirectoryAccount) {
        self.namespaces
            .entry(account.namespace)
            .or_default()
            .insert(account.uid.to_lowercase(), account);
    }

    /// Accounts of one namespace, ordered by uid.
    pub fn accounts(&self, namespace: Namespace) -> impl Iterator<Item = &DirectoryAccount> {
        self.namespaces
            .get(&namespace)
            .into_iter()
            .flat_map(BTreeMap::values)
    }

    /// Look up an account by uid.
    pub fn get(&self, namespace: Namespace, uid: &str) -> Option<&DirectoryAccount> {
        self.namespaces.get(&namespace)?.get(&uid.to_lowercase())
    }

    /// Whether `uid` exists in `namespace`.
    pub fn exists(&self, uid: &str, namespace: Namespace) -> bool {
        self.get(namespace, uid).is_some()
    }

    /// Active accounts carrying `email`.
    pub fn find_by_email(&self, email: &str) -> Vec<&DirectoryAccount> {
        match_by_email(email, self.accounts(Namespace::Active))
    }

    /// Number of accounts in a namespace
    pub fn len(&self, namespace: Namespace) -> usize {
        self.namespaces.get(&namespace).map_or(0, BTreeMap::len)
    }

    /// Whether the snapshot holds no accounts at all
    pub fn is_empty(&self) -> bool {
        self.namespaces.values().all(BTreeMap::is_empty)
    }
}

impl Extend<DirectoryAccount> for DirectorySnapshot {
    fn extend<I: IntoIterator<Item = DirectoryAccount>>(&mut self, iter: I) {
        for account in iter {
            self.insert(account);
        }
    }
}

impl FromIterator<DirectoryAccount> for DirectorySnapshot {
    fn from_iter<I: IntoIterator<Item = DirectoryAccount>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        snapshot.extend(iter);
        snapshot
    }
}

/// Finds the namespace an identifier already lives in.
pub struct StateResolver<'a> {
    snapshot: &'a DirectorySnapshot,
}

impl<'a> StateResolver<'a> {
    pub fn new(snapshot: &'a DirectorySnapshot) -> Self {
        Self { snapshot }
    }

    /// First namespace (active, staged, preserved) containing `uid`.
    pub fn resolve(&self, uid: &str) -> Option<Namespace> {
        Namespace::ALL
            .into_iter()
            .find(|namespace| self.snapshot.exists(uid, *namespace))
    }
}
