//! Purpose: Classify dependency archives as container, plugin, or plain library.
//! Exports: `classify`, `Classification`, `ClassifiedLibrary`, `Outcome`, marker names.
//! Role: Read-only leaf stage; its result feeds the assembler.
//! Invariants: Candidates are inspected in input order and never mutated.
//! Invariants: Excluded-scope and non-zip candidates are never opened as archives.
//! Invariants: At most one container per classification; a second is fatal.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::core::error::{Error, ErrorKind};
use crate::core::library::{Library, LibraryScope};
use crate::core::signature::is_zip;
use crate::core::slot::OnceSlot;

pub const CONTAINER_MARK_ENTRY: &str = "com/alipay/sofa/ark/container/mark";
pub const PLUGIN_MARK_ENTRY: &str = "com/alipay/sofa/ark/plugin/mark";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Excluded,
    NotArchive,
    Container,
    Plugin,
    Library,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Excluded => "excluded",
            Outcome::NotArchive => "not_archive",
            Outcome::Container => "container",
            Outcome::Plugin => "plugin",
            Outcome::Library => "library",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassifiedLibrary {
    pub library: Library,
    pub outcome: Outcome,
}

#[derive(Clone, Debug, Default)]
pub struct Classification {
    container: Option<Library>,
    plugins: Vec<Library>,
    outcomes: Vec<ClassifiedLibrary>,
}

impl Classification {
    pub fn container(&self) -> Option<&Library> {
        self.container.as_ref()
    }

    pub fn plugins(&self) -> &[Library] {
        &self.plugins
    }

    /// Every candidate in input order with its resulting scope.
    pub fn outcomes(&self) -> &[ClassifiedLibrary] {
        &self.outcomes
    }
}

pub fn classify(candidates: &[Library], excluded: LibraryScope) -> Result<Classification, Error> {
    let container = OnceSlot::new();
    let mut plugins = Vec::new();
    let mut outcomes = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let outcome = inspect(candidate, excluded)?;
        let library = match outcome {
            Outcome::Container => {
                let library = candidate.with_scope(LibraryScope::Container);
                if let Err(rejected) = container.claim(library.clone()) {
                    return Err(container_conflict(container.get(), &rejected));
                }
                library
            }
            Outcome::Plugin => {
                let library = candidate.with_scope(LibraryScope::Plugin);
                plugins.push(library.clone());
                library
            }
            Outcome::Excluded | Outcome::NotArchive | Outcome::Library => candidate.clone(),
        };
        debug!(
            library = library.name(),
            scope = %library.scope(),
            outcome = outcome.as_str(),
            "classified library"
        );
        outcomes.push(ClassifiedLibrary { library, outcome });
    }

    Ok(Classification {
        container: container.into_inner(),
        plugins,
        outcomes,
    })
}

fn inspect(candidate: &Library, excluded: LibraryScope) -> Result<Outcome, Error> {
    if candidate.scope() == excluded {
        return Ok(Outcome::Excluded);
    }
    if !is_zip(candidate.file()).map_err(|err| err.with_library(candidate.name()))? {
        return Ok(Outcome::NotArchive);
    }

    let archive = open_archive(candidate.file())
        .map_err(|err| err.with_library(candidate.name()))?;
    if archive.index_for_name(CONTAINER_MARK_ENTRY).is_some() {
        return Ok(Outcome::Container);
    }
    if archive.index_for_name(PLUGIN_MARK_ENTRY).is_some() {
        return Ok(Outcome::Plugin);
    }
    Ok(Outcome::Library)
}

pub(crate) fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>, Error> {
    let file = File::open(path).map_err(|err| {
        Error::new(ErrorKind::Input)
            .with_message("failed to open archive")
            .with_path(path)
            .with_source(err)
    })?;
    ZipArchive::new(BufReader::new(file)).map_err(|err| {
        Error::new(ErrorKind::Input)
            .with_message("archive is unreadable or corrupt")
            .with_path(path)
            .with_source(err)
    })
}

fn container_conflict(existing: Option<&Library>, rejected: &Library) -> Error {
    let existing = existing.map(Library::name).unwrap_or("<unknown>");
    Error::new(ErrorKind::ClassificationConflict)
        .with_message(format!(
            "duplicate container dependency: `{}` conflicts with `{existing}`",
            rejected.name()
        ))
        .with_library(rejected.name())
        .with_path(rejected.file())
        .with_hint("Keep exactly one dependency carrying the container marker.")
}
