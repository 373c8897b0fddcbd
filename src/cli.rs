use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bamboo-ipa-sync")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Keep FreeIPA user accounts in line with the BambooHR roster", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/bamboo-ipa-sync/config.toml)
    #[arg(short, long, global = true, env = "BAMBOO_IPA_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create staged accounts for new starters and update changed fields
    Sync(SyncArgs),

    /// List active FreeIPA users
    #[command(name = "ls-ipa")]
    LsIpa,

    /// List BambooHR employees
    #[command(name = "ls-bamboo")]
    LsBamboo,

    /// Search BambooHR and FreeIPA for a keyword
    Search {
        /// Case-insensitive text to look for
        keyword: String,
    },

    /// Find FreeIPA users with no BambooHR record
    #[command(name = "check-ipa")]
    CheckIpa,

    /// Find BambooHR employees with no FreeIPA user
    #[command(name = "check-bamboo")]
    CheckBamboo,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Sync
// ============================================================================

#[derive(clap::Args)]
pub struct SyncArgs {
    /// Email a new starter notification for each account created
    #[arg(short, long)]
    pub notify: bool,

    /// Create accounts even when the start date is in the future.
    /// With no uids, applies to everyone
    #[arg(short, long, num_args = 0.., value_name = "UID")]
    pub force: Option<Vec<String>>,

    /// Show what would change without touching FreeIPA or sending mail
    #[arg(short = 'N', long, alias = "dry-run")]
    pub noop: bool,
}
