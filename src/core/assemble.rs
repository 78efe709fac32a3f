//! Purpose: Assemble the self-executing output archive from classified libraries.
//! Exports: `assemble`, `AssemblyReport`.
//! Role: Drives `ArchiveWriter` through the bootstrap → container → plugins protocol.
//! Invariants: A missing container fails before the output path is touched.
//! Invariants: The output never resolves to the source or a nested library file.
//! Invariants: Nested entry paths are unique; a repeat is fatal and stops all writing.
//! Invariants: The writer is closed on success and failure paths alike.
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::error::{Error, ErrorKind};
use crate::core::layout::Layout;
use crate::core::library::Library;
use crate::core::writer::{ArchiveWriter, NestedEntry};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssemblyReport {
    pub output: PathBuf,
    pub bootstrap_entries: usize,
    pub nested: Vec<NestedEntry>,
    pub excluded: Vec<String>,
}

/// Writes `output` from the bootstrap entries of `source`, the container, and the plugins.
pub fn assemble(
    source: &Path,
    container: Option<&Library>,
    plugins: &[Library],
    output: &Path,
    layout: &dyn Layout,
) -> Result<AssemblyReport, Error> {
    let container = container.ok_or_else(|| {
        Error::new(ErrorKind::Configuration)
            .with_message("no runtime container dependency found")
            .with_hint("Add the container archive as a (non-provided) dependency.")
    })?;
    let inputs = std::iter::once((None, source)).chain(
        std::iter::once(container)
            .chain(plugins)
            .map(|library| (Some(library.name()), library.file())),
    );
    reject_output_overlap(output, inputs)?;

    prepare_destination(output)?;
    let mut writer = ArchiveWriter::create(output)?;
    match write_entries(&mut writer, source, container, plugins, layout) {
        Ok((bootstrap_entries, nested, excluded)) => {
            let output = writer.finish()?;
            info!(
                output = %output.display(),
                bootstrap_entries,
                nested = nested.len(),
                "assembled archive"
            );
            Ok(AssemblyReport {
                output,
                bootstrap_entries,
                nested,
                excluded,
            })
        }
        Err(err) => {
            writer.abandon();
            Err(err)
        }
    }
}

type WrittenEntries = (usize, Vec<NestedEntry>, Vec<String>);

fn write_entries(
    writer: &mut ArchiveWriter,
    source: &Path,
    container: &Library,
    plugins: &[Library],
    layout: &dyn Layout,
) -> Result<WrittenEntries, Error> {
    let bootstrap_entries = writer.write_bootstrap_entries(source)?;
    if bootstrap_entries == 0 {
        warn!(source = %source.display(), "no bootstrap entries found; output will not be launchable");
    }

    let mut seen = HashSet::new();
    let mut nested = Vec::with_capacity(plugins.len() + 1);
    let mut excluded = Vec::new();
    for library in std::iter::once(container).chain(plugins) {
        let Some(destination) = layout.library_destination(library.name(), library.scope()) else {
            debug!(library = library.name(), scope = %library.scope(), "layout excludes library");
            excluded.push(library.name().to_string());
            continue;
        };
        let entry = entry_path(&destination, library.name());
        if !seen.insert(entry.clone()) {
            return Err(Error::new(ErrorKind::LayoutConflict)
                .with_message(format!("duplicate library {}", library.name()))
                .with_library(library.name())
                .with_destination(entry)
                .with_path(library.file())
                .with_hint("Two dependencies resolve to the same nested path; rename or drop one."));
        }
        debug!(library = library.name(), entry = %entry, "nesting library");
        nested.push(writer.write_nested_library(&entry, library)?);
    }
    Ok((bootstrap_entries, nested, excluded))
}

/// Nested entry name; also the uniqueness key for nested libraries.
fn entry_path(destination: &str, name: &str) -> String {
    if destination.is_empty() || destination.ends_with('/') {
        format!("{destination}{name}")
    } else {
        format!("{destination}/{name}")
    }
}

/// Fails when an existing `output` resolves to one of `inputs`.
pub(crate) fn reject_output_overlap<'a>(
    output: &Path,
    inputs: impl IntoIterator<Item = (Option<&'a str>, &'a Path)>,
) -> Result<(), Error> {
    let Ok(resolved) = fs::canonicalize(output) else {
        return Ok(());
    };
    for (library, input) in inputs {
        if fs::canonicalize(input).is_ok_and(|candidate| candidate == resolved) {
            let err = Error::new(ErrorKind::Usage)
                .with_message("output path would overwrite an input archive")
                .with_path(output)
                .with_hint("Choose a different output directory or final name.");
            return Err(match library {
                Some(name) => err.with_library(name),
                None => err,
            });
        }
    }
    Ok(())
}

fn prepare_destination(output: &Path) -> Result<(), Error> {
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            Error::new(ErrorKind::Write)
                .with_message("failed to create output directory")
                .with_path(parent)
                .with_source(err)
        })?;
    }
    match fs::remove_file(output) {
        Ok(()) => {
            debug!(output = %output.display(), "removed previous output");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::new(ErrorKind::Write)
            .with_message("failed to remove previous output")
            .with_path(output)
            .with_source(err)),
    }
}
