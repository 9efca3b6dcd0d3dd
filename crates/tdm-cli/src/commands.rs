//! Track, refresh, and apply command implementations

use std::path::{Path, PathBuf};

use colored::Colorize;
use tdm_core::{Operation, Settings, SyncEngine, SyncOptions, SyncReport};

use crate::error::{CliError, Result};

/// Root and settings-file selection shared by every command.
#[derive(Debug, Clone, Default)]
pub struct RootArgs {
    pub config: Option<PathBuf>,
    pub tracked_root: Option<PathBuf>,
    pub mirror_root: Option<PathBuf>,
}

/// Combine the settings file with command-line overrides.
///
/// An explicit settings file must exist; the default one is optional.
pub fn resolve_settings(roots: &RootArgs) -> Result<Settings> {
    let file = match &roots.config {
        Some(path) => Settings::load(&tdm_fs::expand_home(path))?,
        None => Settings::load_default()?,
    };

    Ok(file.merge(Settings {
        tracked_root: roots.tracked_root.clone(),
        mirror_root: roots.mirror_root.clone(),
    }))
}

/// Build the engine for one invocation from `working_dir`.
pub fn build_engine(settings: &Settings, working_dir: &Path, dry_run: bool) -> Result<SyncEngine> {
    let translator = settings.translator(working_dir)?;
    tracing::debug!(
        tracked = %translator.tracked_root().display(),
        mirror = %translator.mirror_root().display(),
        "resolved roots"
    );
    Ok(SyncEngine::new(translator).with_options(SyncOptions { dry_run }))
}

/// Run the track command
pub fn run_track(engine: &SyncEngine, path: &Path) -> Result<()> {
    run_operation(engine, Operation::Track(path.to_path_buf()))
}

/// Run the refresh command
pub fn run_refresh(engine: &SyncEngine) -> Result<()> {
    run_operation(engine, Operation::Refresh)
}

/// Run the apply command
pub fn run_apply(engine: &SyncEngine) -> Result<()> {
    run_operation(engine, Operation::Apply)
}

fn run_operation(engine: &SyncEngine, operation: Operation) -> Result<()> {
    let dry_run = engine.options().dry_run;
    let translator = engine.translator();
    println!(
        "{} {} ({} <-> {})",
        "=>".blue().bold(),
        operation,
        translator.tracked_root().display(),
        translator.mirror_root().display()
    );

    let report = engine.run(operation);
    print_report(&report, dry_run);

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::Reconcile {
            failed: report.errors.len(),
        })
    }
}

fn print_report(report: &SyncReport, dry_run: bool) {
    if dry_run {
        for action in &report.actions {
            println!("   {} {}", "would".yellow(), action);
        }
    }

    for error in &report.errors {
        eprintln!("   {} {}", "!".red(), error);
    }

    if report.is_success() {
        let verb = if dry_run { "planned" } else { "done" };
        println!(
            "{} {} {}",
            "OK".green().bold(),
            action_count(report.actions.len()),
            verb
        );
    }
}

fn action_count(n: usize) -> String {
    if n == 1 {
        "1 action".to_string()
    } else {
        format!("{n} actions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdm_test_utils::TestTrees;

    fn roots(trees: &TestTrees) -> RootArgs {
        RootArgs {
            config: None,
            tracked_root: Some(trees.tracked_root()),
            mirror_root: Some(trees.mirror_root()),
        }
    }

    fn settings(trees: &TestTrees) -> Settings {
        Settings {
            tracked_root: Some(trees.tracked_root()),
            mirror_root: Some(trees.mirror_root()),
        }
    }

    #[test]
    fn explicit_config_supplies_roots() {
        let trees = TestTrees::new();
        let config = trees.root().join("tdm.toml");
        std::fs::write(
            &config,
            format!(
                "tracked_root = {:?}\nmirror_root = {:?}\n",
                trees.tracked_root(),
                trees.mirror_root()
            ),
        )
        .unwrap();

        let resolved = resolve_settings(&RootArgs {
            config: Some(config),
            ..RootArgs::default()
        })
        .unwrap();

        assert_eq!(resolved, settings(&trees));
    }

    #[test]
    fn flags_override_config() {
        let trees = TestTrees::new();
        let config = trees.root().join("tdm.toml");
        std::fs::write(&config, "mirror_root = \"/somewhere/else\"\n").unwrap();

        let resolved = resolve_settings(&RootArgs {
            config: Some(config),
            ..roots(&trees)
        })
        .unwrap();

        assert_eq!(resolved.mirror_root, Some(trees.mirror_root()));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let trees = TestTrees::new();
        let result = resolve_settings(&RootArgs {
            config: Some(trees.root().join("absent.toml")),
            ..RootArgs::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn track_reports_success() {
        let trees = TestTrees::new();
        trees.write_tracked(".bashrc", "alias ll='ls -l'");
        let engine = build_engine(&settings(&trees), &trees.tracked_root(), false).unwrap();

        run_track(&engine, Path::new(".bashrc")).unwrap();

        assert_eq!(trees.read_mirror(".bashrc"), "alias ll='ls -l'");
    }

    #[test]
    fn failures_become_reconcile_error() {
        let trees = TestTrees::new();
        let engine = build_engine(&settings(&trees), &trees.tracked_root(), false).unwrap();

        let err = run_track(&engine, Path::new("missing")).unwrap_err();

        assert!(matches!(err, CliError::Reconcile { failed: 1 }), "got {err:?}");
    }

    #[test]
    fn dry_run_apply_changes_nothing() {
        let trees = TestTrees::new();
        trees.write_mirror(".vimrc", "set nu");
        let engine = build_engine(&settings(&trees), &trees.tracked_root(), true).unwrap();

        run_apply(&engine).unwrap();

        trees.assert_tracked_missing(".vimrc");
    }

    #[test]
    fn refresh_runs_on_empty_mirror() {
        let trees = TestTrees::new();
        let engine = build_engine(&settings(&trees), &trees.tracked_root(), false).unwrap();
        run_refresh(&engine).unwrap();
    }

    #[test]
    fn overlapping_roots_are_rejected() {
        let trees = TestTrees::new();
        let overlapping = Settings {
            tracked_root: Some(trees.mirror("inner")),
            mirror_root: Some(trees.mirror_root()),
        };

        assert!(build_engine(&overlapping, &trees.tracked_root(), false).is_err());
    }

    #[test]
    fn action_count_pluralizes() {
        assert_eq!(action_count(0), "0 actions");
        assert_eq!(action_count(1), "1 action");
        assert_eq!(action_count(12), "12 actions");
    }
}
