//! # BambooHR
//!
//! Blocking client for the BambooHR employees API, implementing
//! [`reconcile::HrSource`].
//!
//! ```no_run
//! use bamboohr::BambooClient;
//!
//! let client = BambooClient::new(
//!     "https://api.bamboohr.com/api/gateway.php/company/v1/employees",
//!     "api-key",
//! );
//! let roster = client.fetch_directory().unwrap();
//! println!("{} employees", roster.len());
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::BambooClient;
pub use error::{Error, ErrorCategory, Result};
pub use types::SUPPLEMENT_FIELDS;
