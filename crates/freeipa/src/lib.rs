//! # FreeIPA
//!
//! Access to FreeIPA's user directory over LDAP, implementing
//! [`reconcile::Directory`].
//!
//! FreeIPA keeps users in three containers under the domain suffix:
//!
//! - active: `cn=users,cn=accounts`
//! - staged: `cn=staged users,cn=accounts,cn=provisioning`
//! - preserved: `cn=deleted users,cn=accounts,cn=provisioning`
//!
//! New accounts are always added to the staged container; FreeIPA assigns
//! the uid number when an administrator activates them.

pub mod client;
pub mod entry;
pub mod error;
pub mod escape;
pub mod layout;

pub use client::{ConnectOptions, IpaDirectory};
pub use error::{Error, ErrorCategory, Result};
pub use layout::{DirectoryLayout, ldap_url, parse_servers};
