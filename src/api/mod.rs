//! Purpose: Define the public Rust API boundary for arkpack.
//! Exports: Types and operations needed by the CLI and embedding build tools.
//! Role: Additive-only surface over the core modules.
//! Invariants: Callers should not need to reach into `core` for normal use.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::assemble::{AssemblyReport, assemble};
pub use crate::core::classify::{
    CONTAINER_MARK_ENTRY, Classification, ClassifiedLibrary, Outcome, PLUGIN_MARK_ENTRY, classify,
};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::layout::{JarLayout, Layout};
pub use crate::core::library::{Library, LibraryScope};
pub use crate::core::repackage::{BootstrapOrigin, Repackaged, Repackager, output_path};
pub use crate::core::signature::{ZIP_FILE_HEADER, is_zip};
pub use crate::core::slot::OnceSlot;
pub use crate::core::writer::{BOOTSTRAP_PREFIX, MANIFEST_ENTRY, NestedEntry};
