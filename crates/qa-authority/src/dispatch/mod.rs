//! Authority resolution and dispatch.
//!
//! The [`DispatchEngine`] is the public-facing API the transport layer calls
//! to execute one request. It runs the checks below strictly in order; the
//! first failing check decides the outcome and nothing after it runs:
//!
//! 1. parameter presence (vocabulary, query, identifier);
//! 2. registry lookup;
//! 3. sub-authority validation;
//! 4. capability check against the descriptor;
//! 5. adapter construction and invocation;
//! 6. normalisation.
//!
//! Every failure is folded into a [`DispatchResult`]; nothing escapes as an
//! error or panic.

use tracing::debug;

use crate::capability::Operation;
use crate::diagnostics::{DiagnosticEvent, DiagnosticReporter};
use crate::error::AuthorityError;
use crate::normalize::{RawResult, ResponseNormalizer};
use crate::registry::{AuthorityRegistry, RegisteredAuthority};
use crate::subauthority::{self, SubauthorityViolation};
use crate::term::Term;

mod request;
mod retry;

pub use self::request::{DispatchRequest, OperationRequest};
pub use self::retry::RetryPolicy;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Successful dispatch payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Result of search or list-all.
    Terms(Vec<Term>),
    /// Result of find-by-id.
    Term(Term),
}

/// Why a request produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotFoundReason {
    /// The vocabulary identifier was empty.
    MissingVocabulary,
    /// A search was requested with an empty query.
    MissingQuery,
    /// A lookup was requested with an empty identifier.
    MissingIdentifier,
    /// The vocabulary identifier is not registered.
    UnknownAuthority,
    /// The authority requires a sub-authority and none was supplied.
    SubauthorityRequired,
    /// The authority has no sub-authorities and one was supplied.
    SubauthorityUnsupported,
    /// The supplied sub-authority is not legal for the authority.
    UnknownSubauthority,
    /// The backend has no term with the requested identifier.
    UnknownTerm,
    /// The adapter or its backend failed.
    BackendFailure,
}

impl NotFoundReason {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingVocabulary => "missing vocabulary",
            Self::MissingQuery => "missing query",
            Self::MissingIdentifier => "missing identifier",
            Self::UnknownAuthority => "unknown authority",
            Self::SubauthorityRequired => "subauthority required",
            Self::SubauthorityUnsupported => "subauthority unsupported",
            Self::UnknownSubauthority => "unknown subauthority",
            Self::UnknownTerm => "unknown term",
            Self::BackendFailure => "backend failure",
        }
    }
}

impl std::fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of outcomes for one dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// The backend answered and its output was normalised.
    Success(Payload),
    /// The request produced no data for the given reason.
    NotFound(NotFoundReason),
    /// The authority does not declare the requested operation.
    Unsupported,
}

impl DispatchResult {
    /// Returns `true` for [`DispatchResult::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the not-found reason, if any.
    #[must_use]
    pub const fn not_found_reason(&self) -> Option<NotFoundReason> {
        match self {
            Self::NotFound(reason) => Some(*reason),
            Self::Success(_) | Self::Unsupported => None,
        }
    }
}

/// Orchestrates resolution, validation, invocation and normalisation.
///
/// # Example
///
/// ```
/// use qa_authority::adapter::{AuthorityAdapter, Search, adapter_factory};
/// use qa_authority::capability::{Operation, OperationSet};
/// use qa_authority::descriptor::AuthorityDescriptor;
/// use qa_authority::diagnostics::TracingReporter;
/// use qa_authority::dispatch::{DispatchEngine, DispatchResult, Payload};
/// use qa_authority::normalize::RawResult;
/// use qa_authority::registry::AuthorityRegistry;
/// use qa_authority::AuthorityError;
///
/// struct Languages;
///
/// impl Search for Languages {
///     fn search(&self, _query: &str) -> Result<RawResult, AuthorityError> {
///         Ok(RawResult::plain(serde_json::json!([
///             { "id": "tib", "label": "Tibetan" }
///         ])))
///     }
/// }
///
/// impl AuthorityAdapter for Languages {
///     fn searcher(&self) -> Option<&dyn Search> {
///         Some(self)
///     }
/// }
///
/// let mut builder = AuthorityRegistry::builder();
/// builder
///     .register(
///         AuthorityDescriptor::new("tgnlang", OperationSet::empty().with(Operation::Search)),
///         adapter_factory(|_| Ok(Box::new(Languages))),
///     )
///     .expect("register");
/// let registry = builder.build();
///
/// let engine = DispatchEngine::new(&registry, TracingReporter);
/// let result = engine.search("tgnlang", None, "Tibetan");
/// assert!(matches!(result, DispatchResult::Success(Payload::Terms(ref terms)) if terms.len() == 1));
/// assert_eq!(engine.list_all("tgnlang", None), DispatchResult::Unsupported);
/// ```
#[derive(Debug)]
pub struct DispatchEngine<'r, D> {
    registry: &'r AuthorityRegistry,
    reporter: D,
    normalizer: ResponseNormalizer,
    retry: RetryPolicy,
}

impl<'r, D> DispatchEngine<'r, D> {
    /// Creates an engine over a frozen registry.
    #[must_use]
    pub const fn new(registry: &'r AuthorityRegistry, reporter: D) -> Self {
        Self {
            registry,
            reporter,
            normalizer: ResponseNormalizer::new(),
            retry: RetryPolicy::none(),
        }
    }

    /// Replaces the retry policy applied around backend invocation.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the registry the engine resolves against.
    #[must_use]
    pub const fn registry(&self) -> &AuthorityRegistry {
        self.registry
    }

    /// Returns the diagnostic reporter.
    #[must_use]
    pub const fn reporter(&self) -> &D {
        &self.reporter
    }
}

impl<D: DiagnosticReporter> DispatchEngine<'_, D> {
    /// Searches `vocabulary_id` for `query`.
    pub fn search(
        &self,
        vocabulary_id: &str,
        subauthority_id: Option<&str>,
        query: &str,
    ) -> DispatchResult {
        self.dispatch(&DispatchRequest::search(vocabulary_id, subauthority_id, query))
    }

    /// Lists every term of `vocabulary_id`.
    pub fn list_all(&self, vocabulary_id: &str, subauthority_id: Option<&str>) -> DispatchResult {
        self.dispatch(&DispatchRequest::list_all(vocabulary_id, subauthority_id))
    }

    /// Fetches the term `id` from `vocabulary_id`.
    pub fn find_by_id(
        &self,
        vocabulary_id: &str,
        subauthority_id: Option<&str>,
        id: &str,
    ) -> DispatchResult {
        self.dispatch(&DispatchRequest::find_by_id(vocabulary_id, subauthority_id, id))
    }

    /// Dispatches one request end to end.
    pub fn dispatch(&self, request: &DispatchRequest) -> DispatchResult {
        let operation = request.operation().kind();
        debug!(
            target: DISPATCH_TARGET,
            vocabulary = request.vocabulary_id(),
            subauthority = request.subauthority_id(),
            operation = operation.as_str(),
            "dispatching request"
        );

        if let Some(reason) = missing_parameter(request) {
            return DispatchResult::NotFound(reason);
        }

        let Some(authority) = self.registry.lookup(request.vocabulary_id()) else {
            self.reporter.warn(&DiagnosticEvent::UnknownAuthority {
                vocabulary_id: request.vocabulary_id().to_owned(),
                qualified_name: self.registry.qualified_name(request.vocabulary_id()),
            });
            return DispatchResult::NotFound(NotFoundReason::UnknownAuthority);
        };

        if let Err(violation) =
            subauthority::validate(authority.descriptor(), request.subauthority_id())
        {
            return DispatchResult::NotFound(self.subauthority_failure(request, violation));
        }

        if !authority.descriptor().supports(operation) {
            debug!(
                target: DISPATCH_TARGET,
                vocabulary = request.vocabulary_id(),
                operation = operation.as_str(),
                "operation not declared by authority"
            );
            return DispatchResult::Unsupported;
        }

        match self.invoke_with_retry(authority, request) {
            Ok(payload) => DispatchResult::Success(payload),
            Err(AuthorityError::TermNotFound { id, .. }) => {
                debug!(
                    target: DISPATCH_TARGET,
                    vocabulary = request.vocabulary_id(),
                    id = %id,
                    "term not found"
                );
                DispatchResult::NotFound(NotFoundReason::UnknownTerm)
            }
            Err(error) => {
                self.reporter.warn(&DiagnosticEvent::BackendFailure {
                    vocabulary_id: request.vocabulary_id().to_owned(),
                    qualified_name: self.registry.qualified_name(request.vocabulary_id()),
                    operation,
                    detail: error.to_string(),
                });
                DispatchResult::NotFound(NotFoundReason::BackendFailure)
            }
        }
    }

    fn subauthority_failure(
        &self,
        request: &DispatchRequest,
        violation: SubauthorityViolation,
    ) -> NotFoundReason {
        match violation {
            SubauthorityViolation::Required => NotFoundReason::SubauthorityRequired,
            SubauthorityViolation::NotSupported => NotFoundReason::SubauthorityUnsupported,
            SubauthorityViolation::Unknown { requested, valid } => {
                self.reporter.warn(&DiagnosticEvent::UnknownSubauthority {
                    vocabulary_id: request.vocabulary_id().to_owned(),
                    qualified_name: self.registry.qualified_name(request.vocabulary_id()),
                    subauthority_id: requested,
                    valid,
                });
                NotFoundReason::UnknownSubauthority
            }
        }
    }

    fn invoke_with_retry(
        &self,
        authority: &RegisteredAuthority,
        request: &DispatchRequest,
    ) -> Result<Payload, AuthorityError> {
        let mut attempt = 1;
        loop {
            match self.invoke(authority, request) {
                Err(error) if error.is_transient() && self.retry.allows(attempt) => {
                    debug!(
                        target: DISPATCH_TARGET,
                        vocabulary = request.vocabulary_id(),
                        attempt,
                        error = %error,
                        "retrying transient backend failure"
                    );
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    fn invoke(
        &self,
        authority: &RegisteredAuthority,
        request: &DispatchRequest,
    ) -> Result<Payload, AuthorityError> {
        let adapter = authority.factory().build(request.subauthority_id())?;
        let identifier = authority.descriptor().identifier();
        match request.operation() {
            OperationRequest::Search { query } => {
                let raw = capability(identifier, Operation::Search, adapter.searcher())?
                    .search(query)?;
                self.many(&raw)
            }
            OperationRequest::ListAll => {
                let raw = capability(identifier, Operation::ListAll, adapter.lister())?.all()?;
                self.many(&raw)
            }
            OperationRequest::FindById { id } => {
                let raw = capability(identifier, Operation::FindById, adapter.finder())?.find(id)?;
                Ok(Payload::Term(self.normalizer.normalize_one(&raw)?))
            }
        }
    }

    fn many(&self, raw: &RawResult) -> Result<Payload, AuthorityError> {
        Ok(Payload::Terms(self.normalizer.normalize_many(raw)?))
    }
}

fn missing_parameter(request: &DispatchRequest) -> Option<NotFoundReason> {
    if request.vocabulary_id().is_empty() {
        return Some(NotFoundReason::MissingVocabulary);
    }
    match request.operation() {
        OperationRequest::Search { query } if query.is_empty() => {
            Some(NotFoundReason::MissingQuery)
        }
        OperationRequest::FindById { id } if id.is_empty() => {
            Some(NotFoundReason::MissingIdentifier)
        }
        _ => None,
    }
}

fn capability<'a, C: ?Sized>(
    identifier: &str,
    operation: Operation,
    provided: Option<&'a C>,
) -> Result<&'a C, AuthorityError> {
    provided.ok_or_else(|| AuthorityError::MissingCapability {
        authority: identifier.to_owned(),
        operation,
    })
}
