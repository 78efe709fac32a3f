//! Purpose: Layout policies mapping a library to its nested destination directory.
//! Exports: `Layout`, `JarLayout`, constants for the nested directory names.
//! Role: Strategy consulted by the assembler; never holds state.
//! Invariants: A destination is joined to the library name with exactly one `/`.
//! Invariants: `None` means the library is not nested in the output.
use crate::core::library::LibraryScope;

pub const CONTAINER_BASE: &str = "SOFA-ARK/container/";
pub const PLUGIN_BASE: &str = "SOFA-ARK/plugin/";
pub const LIBRARY_BASE: &str = "lib/";

pub trait Layout {
    /// Directory inside the output archive for `name`, or `None` to leave it out.
    ///
    /// A destination without a trailing `/` is treated as a directory: `"mods"`
    /// nests `a.jar` at `mods/a.jar`. An empty destination nests at the archive root.
    fn library_destination(&self, name: &str, scope: LibraryScope) -> Option<String>;
}

impl<F> Layout for F
where
    F: Fn(&str, LibraryScope) -> Option<String>,
{
    fn library_destination(&self, name: &str, scope: LibraryScope) -> Option<String> {
        self(name, scope)
    }
}

/// Self-executing jar layout: container and plugins under `SOFA-ARK/`, plain
/// libraries under `lib/`, provided libraries never nested.
#[derive(Clone, Copy, Debug, Default)]
pub struct JarLayout;

impl Layout for JarLayout {
    fn library_destination(&self, _name: &str, scope: LibraryScope) -> Option<String> {
        let base = match scope {
            LibraryScope::Container => CONTAINER_BASE,
            LibraryScope::Plugin => PLUGIN_BASE,
            LibraryScope::Compile | LibraryScope::Runtime => LIBRARY_BASE,
            LibraryScope::Provided => return None,
        };
        Some(base.to_string())
    }
}
