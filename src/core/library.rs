//! Purpose: Dependency library model handed in by the caller.
//! Exports: `Library`, `LibraryScope`.
//! Role: Immutable input to classification; classified copies flow to assembly.
//! Invariants: Library names are unique within one invocation (caller contract).
//! Invariants: Scope names parse and render as stable lowercase strings.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum LibraryScope {
    Provided,
    Compile,
    #[default]
    Runtime,
    Container,
    Plugin,
}

impl LibraryScope {
    pub fn as_str(self) -> &'static str {
        match self {
            LibraryScope::Provided => "provided",
            LibraryScope::Compile => "compile",
            LibraryScope::Runtime => "runtime",
            LibraryScope::Container => "container",
            LibraryScope::Plugin => "plugin",
        }
    }
}

impl fmt::Display for LibraryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LibraryScope {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "provided" => Ok(LibraryScope::Provided),
            "compile" => Ok(LibraryScope::Compile),
            "runtime" => Ok(LibraryScope::Runtime),
            "container" => Ok(LibraryScope::Container),
            "plugin" => Ok(LibraryScope::Plugin),
            other => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unknown library scope `{other}`"))
                .with_hint("Use one of: provided, compile, runtime, container, plugin.")),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Library {
    name: String,
    file: PathBuf,
    scope: LibraryScope,
}

impl Library {
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>, scope: LibraryScope) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            scope,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn scope(&self) -> LibraryScope {
        self.scope
    }

    /// Returns a copy of this library carrying `scope`.
    pub fn with_scope(&self, scope: LibraryScope) -> Self {
        Self {
            name: self.name.clone(),
            file: self.file.clone(),
            scope,
        }
    }
}
