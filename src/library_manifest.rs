//! Purpose: Turn CLI library flags and JSON manifests into `Library` values.
//! Exports: `load_manifest`, `parse_library_arg`, `collect_libraries`.
//! Role: Keep library input parsing out of command dispatch.
//! Invariants: Manifest entries come first, then `--library` flags, order preserved.
//! Invariants: Relative manifest paths resolve against the manifest's directory.
//! Invariants: Names are plain file names; container/plugin scopes are never accepted as input.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use arkpack::api::{Error, ErrorKind, Library, LibraryScope};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    name: String,
    file: PathBuf,
    #[serde(default)]
    scope: Option<String>,
}

pub(crate) fn collect_libraries(
    manifest: Option<&Path>,
    flags: &[String],
) -> Result<Vec<Library>, Error> {
    let mut libraries = match manifest {
        Some(path) => load_manifest(path)?,
        None => Vec::new(),
    };
    for flag in flags {
        libraries.push(parse_library_arg(flag)?);
    }
    Ok(libraries)
}

pub(crate) fn load_manifest(path: &Path) -> Result<Vec<Library>, Error> {
    let text = fs::read_to_string(path).map_err(|err| {
        Error::new(ErrorKind::Input)
            .with_message("failed to read library manifest")
            .with_path(path)
            .with_source(err)
    })?;
    let entries: Vec<ManifestEntry> = serde_json::from_str(&text).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid library manifest: {err}"))
            .with_path(path)
            .with_hint("Expected a JSON array of {\"name\", \"file\", \"scope\"?} objects.")
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    entries
        .into_iter()
        .map(|entry| -> Result<Library, Error> {
            check_name(&entry.name).map_err(|err| err.with_path(path))?;
            let scope = match entry.scope.as_deref() {
                Some(scope) => scope
                    .parse::<LibraryScope>()
                    .and_then(declared_scope)
                    .map_err(|err| err.with_library(&entry.name).with_path(path))?,
                None => LibraryScope::default(),
            };
            let file = if entry.file.is_absolute() {
                entry.file
            } else {
                base.join(entry.file)
            };
            Ok(Library::new(entry.name, file, scope))
        })
        .collect()
}

/// Parses `name=path[:scope]`; a trailing `:scope` is only taken when it names a scope.
pub(crate) fn parse_library_arg(value: &str) -> Result<Library, Error> {
    let Some((name, rest)) = value.split_once('=') else {
        return Err(invalid_library_arg(value));
    };
    if name.is_empty() || rest.is_empty() {
        return Err(invalid_library_arg(value));
    }
    check_name(name)?;
    let (file, scope) = match rest.rsplit_once(':') {
        Some((file, scope)) if !file.is_empty() => match scope.parse::<LibraryScope>() {
            Ok(parsed) => (file, declared_scope(parsed).map_err(|err| err.with_library(name))?),
            Err(_) => (rest, LibraryScope::default()),
        },
        _ => (rest, LibraryScope::default()),
    };
    Ok(Library::new(name, file, scope))
}

// Names become nested entry names, so they must not carry directory parts.
fn check_name(name: &str) -> Result<(), Error> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("invalid library name `{name}`"))
            .with_library(name)
            .with_hint("Use a plain file name such as core.jar."));
    }
    Ok(())
}

// Container and plugin are assigned by classification, not declared.
fn declared_scope(scope: LibraryScope) -> Result<LibraryScope, Error> {
    match scope {
        LibraryScope::Container | LibraryScope::Plugin => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("scope `{scope}` cannot be declared"))
            .with_hint(
                "Use provided, compile or runtime; container and plugin come from archive markers.",
            )),
        scope => Ok(scope),
    }
}

fn invalid_library_arg(value: &str) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(format!("invalid --library value `{value}`"))
        .with_hint("Use name=path or name=path:scope (e.g. core.jar=lib/core.jar:runtime).")
}
