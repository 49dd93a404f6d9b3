//! Authority resolution and dispatch for controlled-vocabulary lookups.
//!
//! The `qa-authority` crate is the core of the query gateway. Callers name a
//! vocabulary (and optionally a sub-authority) and ask for one of three
//! operations: free-text search, list-all, or find-by-id. The crate resolves
//! the vocabulary against an explicit [`AuthorityRegistry`], validates the
//! sub-authority, checks that the authority declares the operation, builds a
//! fresh adapter, invokes it, and normalises whatever the backend returned
//! into [`Term`] records.
//!
//! # Architecture
//!
//! Authorities are described by an [`AuthorityDescriptor`] and constructed by
//! an [`adapter::AdapterFactory`]. Adapters expose their capabilities as
//! optional trait objects ([`adapter::Search`], [`adapter::ListAll`],
//! [`adapter::FindById`]) so an undeclared operation is never invoked by
//! accident. The [`DispatchEngine`] folds every failure into a
//! [`DispatchResult`] and reports operator-facing warnings through a
//! [`diagnostics::DiagnosticReporter`]. The [`wire`] module turns results
//! into status codes and JSON bodies.
//!
//! # Example
//!
//! ```rust
//! use qa_authority::adapter::{AuthorityAdapter, ListAll, adapter_factory};
//! use qa_authority::capability::{Operation, OperationSet};
//! use qa_authority::diagnostics::TracingReporter;
//! use qa_authority::normalize::RawResult;
//! use qa_authority::wire::render;
//! use qa_authority::{AuthorityDescriptor, AuthorityError, AuthorityRegistry, DispatchEngine};
//!
//! struct States;
//!
//! impl ListAll for States {
//!     fn all(&self) -> Result<RawResult, AuthorityError> {
//!         Ok(RawResult::plain(serde_json::json!([{ "id": "OH", "label": "Ohio" }])))
//!     }
//! }
//!
//! impl AuthorityAdapter for States {
//!     fn lister(&self) -> Option<&dyn ListAll> {
//!         Some(self)
//!     }
//! }
//!
//! let mut builder = AuthorityRegistry::builder();
//! builder
//!     .register(
//!         AuthorityDescriptor::new("states", OperationSet::empty().with(Operation::ListAll)),
//!         adapter_factory(|_| Ok(Box::new(States))),
//!     )
//!     .expect("registration succeeds");
//! let registry = builder.build();
//!
//! let engine = DispatchEngine::new(&registry, TracingReporter);
//! let response = render(Operation::ListAll, &engine.list_all("states", None)).expect("render");
//! assert_eq!(response.body(), r#"[{"id":"OH","label":"Ohio"}]"#);
//! ```

pub mod adapter;
pub mod capability;
pub mod descriptor;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod normalize;
pub mod registry;
pub mod subauthority;
pub mod term;
pub mod wire;

#[cfg(test)]
mod tests;

pub use self::adapter::{AdapterFactory, AuthorityAdapter};
pub use self::capability::{Operation, OperationSet};
pub use self::descriptor::{AuthorityDescriptor, SubauthorityPolicy};
pub use self::dispatch::{
    DispatchEngine, DispatchRequest, DispatchResult, NotFoundReason, OperationRequest, Payload,
    RetryPolicy,
};
pub use self::error::{AuthorityError, NormalizationError};
pub use self::registry::{AuthorityRegistry, DEFAULT_NAMESPACE, RegistryBuilder};
pub use self::term::{AttributeValue, Attributes, Term};
pub use self::wire::{WireError, WireResponse};
