//! Capability-typed adapter contract implemented by every backend.
//!
//! An [`AuthorityAdapter`] exposes only the operations it implements: each
//! accessor returns the matching capability trait object, or `None`. The
//! dispatch engine checks the descriptor's declared operations first, so an
//! accessor returning `None` for a declared operation is reported as a
//! backend failure rather than silently ignored.
//!
//! Adapters are built per request by an [`AdapterFactory`], bound to the
//! resolved sub-authority, and dropped when the request completes.

use crate::error::AuthorityError;
use crate::normalize::RawResult;

/// Keyword search capability.
pub trait Search {
    /// Searches the backend for `query`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthorityError`] if the backend cannot be reached or
    /// answers with an unusable body.
    fn search(&self, query: &str) -> Result<RawResult, AuthorityError>;
}

/// Full enumeration capability.
pub trait ListAll {
    /// Returns every term in the vocabulary.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthorityError`] if the backend cannot be reached or
    /// answers with an unusable body.
    fn all(&self) -> Result<RawResult, AuthorityError>;
}

/// Lookup-by-identifier capability.
pub trait FindById {
    /// Fetches the single term identified by `id`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthorityError`] if the backend cannot be reached,
    /// answers with an unusable body, or has no such term.
    fn find(&self, id: &str) -> Result<RawResult, AuthorityError>;
}

/// A request-scoped backend adapter.
///
/// # Example
///
/// ```
/// use qa_authority::adapter::{AuthorityAdapter, Search};
/// use qa_authority::normalize::RawResult;
/// use qa_authority::AuthorityError;
///
/// struct Echo;
///
/// impl Search for Echo {
///     fn search(&self, query: &str) -> Result<RawResult, AuthorityError> {
///         Ok(RawResult::plain(serde_json::json!([{ "id": query, "label": query }])))
///     }
/// }
///
/// impl AuthorityAdapter for Echo {
///     fn searcher(&self) -> Option<&dyn Search> {
///         Some(self)
///     }
/// }
///
/// assert!(Echo.searcher().is_some());
/// assert!(Echo.lister().is_none());
/// ```
pub trait AuthorityAdapter {
    /// Returns the search capability, if implemented.
    fn searcher(&self) -> Option<&dyn Search> {
        None
    }

    /// Returns the list-all capability, if implemented.
    fn lister(&self) -> Option<&dyn ListAll> {
        None
    }

    /// Returns the find-by-id capability, if implemented.
    fn finder(&self) -> Option<&dyn FindById> {
        None
    }
}

/// Builds adapters bound to a resolved sub-authority.
///
/// Closures with the matching signature implement this trait, which keeps
/// catalogue tables terse.
pub trait AdapterFactory: Send + Sync {
    /// Constructs an adapter for one request.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthorityError`] if the backend is misconfigured or
    /// rejects the sub-authority at construction time.
    fn build(&self, subauthority: Option<&str>)
    -> Result<Box<dyn AuthorityAdapter>, AuthorityError>;
}

impl<F> AdapterFactory for F
where
    F: Fn(Option<&str>) -> Result<Box<dyn AuthorityAdapter>, AuthorityError> + Send + Sync,
{
    fn build(
        &self,
        subauthority: Option<&str>,
    ) -> Result<Box<dyn AuthorityAdapter>, AuthorityError> {
        self(subauthority)
    }
}

/// Pins a closure to the [`AdapterFactory`] signature.
///
/// Closure parameter types are only inferred as higher-ranked when the
/// `Fn` bound is visible at the call site; this helper provides it.
pub const fn adapter_factory<F>(factory: F) -> F
where
    F: Fn(Option<&str>) -> Result<Box<dyn AuthorityAdapter>, AuthorityError> + Send + Sync,
{
    factory
}
