//! Purpose: Hold top-level CLI command dispatch for `arkpack`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Packaging types without a jar to repackage bypass the core entirely.
//! Invariants: Each command emits exactly one JSON document on success.

use super::*;

use arkpack::api::{LibraryScope, Repackager, classify, output_path};
use tracing::debug;

use crate::library_manifest::collect_libraries;
use crate::report_json::{assembly_json, classification_json};

const SKIPPED_PACKAGING: [&str; 2] = ["pom", "war"];

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "arkpack", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_json(json!({
                "name": "arkpack",
                "version": env!("CARGO_PKG_VERSION"),
            }));
            Ok(RunOutcome::ok())
        }
        Command::Inspect(args) => {
            let libraries = collect_libraries(args.manifest.as_deref(), &args.libraries)?;
            let classification = classify(&libraries, LibraryScope::Provided)?;
            emit_json(classification_json(&classification));
            Ok(RunOutcome::ok())
        }
        Command::Repackage(args) => repackage(args),
    }
}

fn repackage(args: RepackageArgs) -> Result<RunOutcome, Error> {
    if SKIPPED_PACKAGING.contains(&args.packaging.as_str()) {
        debug!(packaging = %args.packaging, "repackage does not apply to this packaging");
        emit_json(json!({
            "skipped": true,
            "packaging": args.packaging,
        }));
        return Ok(RunOutcome::ok());
    }

    let destination = output_path(&args.output_dir, &args.final_name, &args.extension)?;
    let libraries = collect_libraries(args.libraries.manifest.as_deref(), &args.libraries.libraries)?;
    let repackager = Repackager::new(&args.source)?.with_bootstrap_origin(args.bootstrap_origin);
    let result = repackager.repackage(&destination, &libraries)?;

    let mut value = assembly_json(&result.report, now_rfc3339());
    if let Value::Object(map) = &mut value {
        map.insert(
            "classification".to_string(),
            classification_json(&result.classification),
        );
    }
    emit_json(value);
    Ok(RunOutcome::ok())
}
