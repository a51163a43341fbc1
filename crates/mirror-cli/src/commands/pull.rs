//! The pull command: discover, filter, reconcile

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use mirror_core::{ConfigResolver, OptionKey, PullReport, ReconcileFlags, Session};
use mirror_fs::NormalizedPath;

use crate::cli::PullArgs;
use crate::error::Result;
use crate::snapshot::SnapshotDirectoryClient;

/// Apply every switch set on the command line as an explicit override.
pub fn apply_overrides(mut resolver: ConfigResolver, args: &PullArgs) -> ConfigResolver {
    if let Some(state) = &args.state {
        resolver = resolver.with_override(OptionKey::State, state.to_string_lossy().into_owned());
    }
    let switches = [
        (args.invalidate_cache, OptionKey::InvalidateCache),
        (args.generalize_templates, OptionKey::GeneralizeTemplates),
        (args.export_raw_templates, OptionKey::ExportRawTemplates),
        (args.skip_policy, OptionKey::SkipPolicy),
        (args.skip_resource_group, OptionKey::SkipResourceGroup),
    ];
    for (set, key) in switches {
        if set {
            resolver = resolver.with_override(key, true);
        }
    }
    resolver
}

pub fn run_pull(cwd: &Path, args: &PullArgs) -> Result<()> {
    let resolver = apply_overrides(super::resolver(cwd), args);
    let mut settings = resolver.resolve_settings()?;
    if settings.state.is_relative() {
        settings.state = cwd.join(&settings.state);
    }

    let client = SnapshotDirectoryClient::load(&NormalizedPath::new(cwd.join(&args.snapshot)))?;
    let mut session = Session::initialize(Arc::new(settings), &client)?;
    let report = session.pull(
        &client,
        ReconcileFlags {
            force: args.force,
            rebuild: args.rebuild,
        },
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &session.settings().state);
    }
    Ok(())
}

fn print_report(report: &PullReport, state: &Path) {
    let reconcile = &report.reconcile;
    println!(
        "{} Pulled tenant {} into {}",
        "OK".green().bold(),
        report.tenant_id.cyan(),
        state.display()
    );
    println!(
        "   {} scopes, {} subscriptions, mode {}",
        report.scopes, report.subscriptions, reconcile.mode
    );
    if reconcile.migration_detected {
        println!("   {} Legacy layout migrated", "!".yellow());
    }
    if reconcile.is_noop() {
        println!("   {} State tree already up to date", "=".dimmed());
    } else {
        println!(
            "   {} {} written, {} unchanged, {} removed",
            "+".green(),
            reconcile.written.len(),
            reconcile.unchanged.len(),
            reconcile.removed.len()
        );
    }
    for skipped in &report.skipped {
        println!("   {} Skipped {}: {}", "!".red(), skipped.id, skipped.reason);
    }
}
