pub mod check;
pub mod list;
pub mod search;
pub mod sync;

use anyhow::{Context as _, Result};
use bamboohr::BambooClient;
use freeipa::IpaDirectory;
use reconcile::{DirectoryAccount, Namespace, Roster};

use crate::config::AppConfig;
use crate::progress;

// ============================================================================
// Shared provider setup
// ============================================================================

pub fn bamboo_client(config: &AppConfig) -> BambooClient {
    BambooClient::new(config.bamboo_url.as_str(), &config.bamboo_api_key)
}

/// Fetch the whole BambooHR roster behind a spinner
pub fn fetch_roster(client: &BambooClient) -> Result<Roster> {
    progress::with_spinner(
        "Fetching BambooHR employees",
        |roster: &Roster| format!("Fetched {} BambooHR employees", roster.len()),
        || client.fetch_directory(),
    )
    .with_context(|| format!("Could not fetch BambooHR roster from {}", client.base_url()))
}

/// Bind to the first FreeIPA server that accepts the configured credentials
pub fn connect_directory(config: &AppConfig) -> Result<IpaDirectory> {
    let options = config.connect_options();
    let directory = progress::with_spinner(
        "Connecting to FreeIPA",
        |directory: &IpaDirectory| format!("Connected to {}", directory.url()),
        || IpaDirectory::connect(&options),
    )
    .with_context(|| format!("Could not bind to FreeIPA as {}", config.bind_dn))?;
    Ok(directory)
}

/// Active FreeIPA users
pub fn fetch_active(directory: &mut IpaDirectory) -> Result<Vec<DirectoryAccount>> {
    progress::with_spinner(
        "Fetching active FreeIPA users",
        |users: &Vec<DirectoryAccount>| format!("Fetched {} active FreeIPA users", users.len()),
        || directory.users(Namespace::Active),
    )
    .context("Could not list FreeIPA users")
}
