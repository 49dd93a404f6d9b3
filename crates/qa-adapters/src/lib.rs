//! Concrete vocabulary adapters for the query gateway.
//!
//! Each module pairs an [`AuthorityDescriptor`](qa_authority::AuthorityDescriptor)
//! with an adapter implementing the capabilities it declares:
//!
//! - [`loc`]: Library of Congress linked data (`id.loc.gov`);
//! - [`assign_fast`]: the OCLC FAST suggest service;
//! - [`oclcts`]: OCLC Terminology Services over SRU;
//! - [`local`]: YAML vocabularies maintained on disk;
//! - [`table`]: static term tables such as MeSH and TGN languages.
//!
//! Remote adapters reach their backends through a [`Fetcher`], so tests can
//! substitute canned responses. [`catalog::builtin_registry`] assembles all
//! of them into a frozen registry.

pub mod assign_fast;
pub mod catalog;
pub mod fetch;
pub mod loc;
pub mod local;
pub mod oclcts;
pub mod table;
pub mod termfile;

#[cfg(test)]
mod tests;

pub use self::catalog::{CatalogConfig, CatalogError, builtin_registry};
pub use self::fetch::{FetchError, Fetcher, SharedFetcher};
