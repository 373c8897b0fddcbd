use anyhow::{Context as _, Result};
use reconcile::{DirectorySnapshot, ForcePolicy, PlannerOptions, Providers, SyncOptions, sync};
use std::sync::atomic::AtomicBool;

use crate::Context;
use crate::cli::SyncArgs;
use crate::commands::{bamboo_client, connect_directory, fetch_roster};
use crate::config::AppConfig;
use crate::mailer::SendmailMailer;
use crate::report::{self, ConsoleReporter};
use crate::{progress, ui};

/// Options for one run, from the config file and command line
pub fn sync_options(config: &AppConfig, args: &SyncArgs) -> SyncOptions {
    let mut planner = PlannerOptions::new(config.default_gid.as_str());
    planner.exclusions = config.exclusions.clone();
    planner.force = ForcePolicy::from_args(args.force.as_deref());

    SyncOptions {
        planner,
        dry_run: args.noop,
        notify: args.notify,
        notification: config.notification_settings(),
    }
}

pub fn run(ctx: &Context, args: SyncArgs, interrupt: &AtomicBool) -> Result<()> {
    let config = ctx.config()?;
    let options = sync_options(&config, &args);

    if !ctx.quiet {
        ui::header(if options.dry_run {
            "Syncing BambooHR to FreeIPA (dry run)"
        } else {
            "Syncing BambooHR to FreeIPA"
        });
        match &options.planner.force {
            ForcePolicy::None => {}
            ForcePolicy::All => ui::warn("Forcing account creation for all future starters"),
            ForcePolicy::Uids(uids) => ui::warn(&format!(
                "Forcing account creation for: {}",
                uids.iter().cloned().collect::<Vec<_>>().join(", ")
            )),
        }
    }

    let hr = bamboo_client(&config);
    let roster = fetch_roster(&hr)?;

    let mut directory = connect_directory(&config)?;
    let snapshot = progress::with_spinner(
        "Fetching FreeIPA users",
        |snapshot: &DirectorySnapshot| {
            format!(
                "Fetched {} active, {} stage and {} preserved FreeIPA users",
                snapshot.len(reconcile::Namespace::Active),
                snapshot.len(reconcile::Namespace::Staged),
                snapshot.len(reconcile::Namespace::Preserved),
            )
        },
        || DirectorySnapshot::fetch(&mut directory),
    )
    .context("Could not list FreeIPA users")?;

    let mailer = SendmailMailer::new(config.sendmail.clone());
    let mut reporter = ConsoleReporter::new(ctx.quiet);

    let summary = sync::run(
        Providers {
            hr: &hr,
            directory: &mut directory,
            mailer: &mailer,
        },
        &roster,
        &snapshot,
        &options,
        &mut reporter,
        interrupt,
    )?;

    log::info!(
        "Sync finished: {} created, {} fields updated, {} failed",
        summary.created,
        summary.updated,
        summary.failed
    );
    if !ctx.quiet {
        report::print_summary(&summary, options.dry_run);
    }
    Ok(())
}
