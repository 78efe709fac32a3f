//! Purpose: Library crate behind the `arkpack` CLI and its tests.
//! Exports: `api` (stable surface), `core` (classification, layout, writer, errors).
//! Role: Repackage a build artifact plus container/plugin archives into one jar.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
//! Invariants: Marker entry names and zip signature bytes are a wire contract.
pub mod api;
pub mod core;
