// Core modules implementing classification, layout, archive writing, and error modeling.
pub mod assemble;
pub mod classify;
pub mod error;
pub mod layout;
pub mod library;
pub mod repackage;
pub mod signature;
pub mod slot;
pub mod writer;

#[cfg(test)]
pub(crate) mod fixture;
