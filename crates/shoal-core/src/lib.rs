//! Shoal core
//!
//! The declarative surface shared by every Shoal resource: attribute schemas,
//! old-vs-new diffing, diagnostics accumulation, and the `Resource` trait that
//! the provider runtime drives.
//!
//! A reconciliation pass flows through this crate twice: once on the way in
//! (configuration is validated against the schema and diffed against prior
//! state) and once on the way out (remote state is flattened back into the
//! attribute map via [`ResourceData::set`]).

pub mod data;
pub mod diagnostics;
pub mod resource;
pub mod schema;

// Re-exports
pub use data::ResourceData;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use resource::{ReconcileTimeouts, Resource};
pub use schema::{AttrSpec, RawValue, Schema};
