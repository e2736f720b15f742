//! CLI entry point.
//!
//! # Responsibility
//! - Wire a SQLite note store into one backlink update run.
//! - Keep all run semantics inside `relink_core`; this binary only parses
//!   arguments, initializes logging and prints the report.

use log::error;
use relink_core::{
    init_logging, open_store, run_backlink_update, RunConfig, RunReport, RunTimestamp,
    TrashedRefPolicy,
};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "usage: relink <db-path> <backups-root> \
[--drop-trashed-refs] [--json] [--log-level <level>] [--version]";

struct CliArgs {
    db_path: PathBuf,
    backups_root: PathBuf,
    trashed_refs: TrashedRefPolicy,
    json: bool,
    log_level: String,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut positional: Vec<String> = Vec::new();
    let mut trashed_refs = TrashedRefPolicy::Keep;
    let mut json = false;
    let mut log_level = relink_core::default_log_level().to_string();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--drop-trashed-refs" => trashed_refs = TrashedRefPolicy::Drop,
            "--json" => json = true,
            "--log-level" => {
                log_level = args
                    .next()
                    .ok_or_else(|| "--log-level requires a value".to_string())?;
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown flag `{other}`"));
            }
            _ => positional.push(arg),
        }
    }

    if positional.len() != 2 {
        return Err(format!(
            "expected exactly 2 positional arguments, got {}",
            positional.len()
        ));
    }
    let backups_root = PathBuf::from(positional.pop().expect("length checked"));
    let db_path = PathBuf::from(positional.pop().expect("length checked"));

    Ok(CliArgs {
        db_path,
        backups_root,
        trashed_refs,
        json,
        log_level,
    })
}

fn print_report(report: &RunReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => error!("event=report module=cli status=error error={err}"),
        }
        return;
    }

    println!(
        "updated {} of {} notes needing backlink updates",
        report.updated, report.candidates
    );
    for skip in &report.skipped {
        println!("skipped {} ({}): {}", skip.note_id, skip.title, skip.reason);
    }
    for failure in &report.commit_failures {
        println!("commit failed for {}: {}", failure.note_id, failure.message);
    }
    if let Some(dir) = &report.backup_dir {
        println!("backups written to {}", dir.display());
    }
}

fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    if raw.iter().any(|arg| arg == "--version") {
        println!("relink {}", relink_core::core_version());
        return ExitCode::SUCCESS;
    }

    let args = match parse_args(raw.into_iter()) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    if let Err(message) = init_logging(&args.log_level, None) {
        eprintln!("{message}");
        return ExitCode::from(2);
    }

    let store = match open_store(&args.db_path) {
        Ok(store) => store,
        Err(err) => {
            error!(
                "event=run module=cli status=error stage=open db={} error={}",
                args.db_path.display(),
                err
            );
            return ExitCode::FAILURE;
        }
    };

    let config = RunConfig {
        backups_root: args.backups_root.clone(),
        trashed_refs: args.trashed_refs,
    };
    let stamp = RunTimestamp::now();

    match run_backlink_update(&store, &store, &config, &stamp) {
        Ok(report) => {
            print_report(&report, args.json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=run module=cli status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_args;
    use relink_core::TrashedRefPolicy;

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_positional_arguments_and_defaults() {
        let parsed = parse_args(args(&["notes.db", "backups"])).expect("valid args");
        assert_eq!(parsed.db_path.to_str(), Some("notes.db"));
        assert_eq!(parsed.backups_root.to_str(), Some("backups"));
        assert_eq!(parsed.trashed_refs, TrashedRefPolicy::Keep);
        assert!(!parsed.json);
    }

    #[test]
    fn parses_flags_in_any_position() {
        let parsed = parse_args(args(&[
            "--json",
            "notes.db",
            "--drop-trashed-refs",
            "backups",
            "--log-level",
            "warn",
        ]))
        .expect("valid args");
        assert!(parsed.json);
        assert_eq!(parsed.trashed_refs, TrashedRefPolicy::Drop);
        assert_eq!(parsed.log_level, "warn");
    }

    #[test]
    fn rejects_unknown_flags_and_wrong_arity() {
        assert!(parse_args(args(&["notes.db", "backups", "--verbose"])).is_err());
        assert!(parse_args(args(&["notes.db"])).is_err());
        assert!(parse_args(args(&["a", "b", "c"])).is_err());
    }
}
