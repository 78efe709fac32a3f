//! Purpose: Caller-facing entry point: classify dependencies, then assemble the output.
//! Exports: `Repackager`, `Repackaged`, `BootstrapOrigin`, `output_path`.
//! Role: Glue between the build-side caller and the classify/assemble stages.
//! Invariants: The source must exist and be a regular file before anything runs.
//! Invariants: Classification fully completes before assembly starts.
//! Invariants: The destination never resolves to the source or any candidate file.
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::core::assemble::{AssemblyReport, assemble, reject_output_overlap};
use crate::core::classify::{Classification, classify};
use crate::core::error::{Error, ErrorKind};
use crate::core::layout::{JarLayout, Layout};
use crate::core::library::{Library, LibraryScope};

/// Archive whose bootstrap entries are copied into the output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BootstrapOrigin {
    #[default]
    Source,
    Container,
}

impl FromStr for BootstrapOrigin {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "source" => Ok(BootstrapOrigin::Source),
            "container" => Ok(BootstrapOrigin::Container),
            other => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unknown bootstrap origin `{other}`"))
                .with_hint("Use source or container.")),
        }
    }
}

#[derive(Debug)]
pub struct Repackaged {
    pub classification: Classification,
    pub report: AssemblyReport,
}

pub struct Repackager {
    source: PathBuf,
    layout: Box<dyn Layout>,
    bootstrap_origin: BootstrapOrigin,
}

impl Repackager {
    pub fn new(source: impl Into<PathBuf>) -> Result<Self, Error> {
        let source = source.into();
        if !source.is_file() {
            return Err(Error::new(ErrorKind::Input)
                .with_message("source must refer to an existing file")
                .with_path(&source));
        }
        Ok(Self {
            source,
            layout: Box::new(JarLayout),
            bootstrap_origin: BootstrapOrigin::default(),
        })
    }

    pub fn with_layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    pub fn with_bootstrap_origin(mut self, origin: BootstrapOrigin) -> Self {
        self.bootstrap_origin = origin;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn repackage(&self, destination: &Path, libraries: &[Library]) -> Result<Repackaged, Error> {
        let inputs = std::iter::once((None, self.source.as_path()))
            .chain(libraries.iter().map(|library| (Some(library.name()), library.file())));
        reject_output_overlap(destination, inputs)?;

        let classification = classify(libraries, LibraryScope::Provided)?;
        debug!(
            container = classification.container().map(Library::name),
            plugins = classification.plugins().len(),
            "classification complete"
        );

        let bootstrap_source = match (self.bootstrap_origin, classification.container()) {
            (BootstrapOrigin::Container, Some(container)) => container.file(),
            _ => self.source.as_path(),
        };
        let report = assemble(
            bootstrap_source,
            classification.container(),
            classification.plugins(),
            destination,
            self.layout.as_ref(),
        )?;
        Ok(Repackaged {
            classification,
            report,
        })
    }
}

/// `output_dir/final_name.extension`, rejecting names that would escape `output_dir`.
pub fn output_path(output_dir: &Path, final_name: &str, extension: &str) -> Result<PathBuf, Error> {
    if final_name.is_empty() || final_name.contains(['/', '\\']) {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("invalid final name `{final_name}`"))
            .with_hint("Use a plain file name without path separators."));
    }
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() || extension.contains(['/', '\\']) {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("invalid archive extension `{extension}`"))
            .with_hint("Use an extension such as jar."));
    }
    Ok(output_dir.join(format!("{final_name}.{extension}")))
}
