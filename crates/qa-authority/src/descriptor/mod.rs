//! Authority descriptors: static metadata about one pluggable backend.
//!
//! An [`AuthorityDescriptor`] declares everything the dispatch engine needs
//! to know before it touches a backend: the vocabulary identifier, the
//! operations the backend supports, and the sub-authority policy with its
//! legal values. Descriptors are validated when registered so malformed
//! catalogue entries are rejected at start-up rather than per request.

use serde::{Deserialize, Serialize};

use crate::capability::{Operation, OperationSet};
use crate::error::AuthorityError;

/// How an authority treats sub-authority (sub-vocabulary) identifiers.
///
/// # Example
///
/// ```
/// use qa_authority::descriptor::SubauthorityPolicy;
///
/// assert_eq!(SubauthorityPolicy::OpenAny.as_str(), "open_any");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubauthorityPolicy {
    /// The authority has no sub-authority concept; supplying one is invalid.
    #[default]
    None,
    /// A sub-authority from the legal list must be supplied.
    Required,
    /// A sub-authority may be supplied; with a legal list it must match.
    Optional,
    /// Any sub-authority string is accepted; the backend decides validity.
    OpenAny,
}

impl SubauthorityPolicy {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Required => "required",
            Self::Optional => "optional",
            Self::OpenAny => "open_any",
        }
    }
}

impl std::fmt::Display for SubauthorityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one authority.
///
/// # Example
///
/// ```
/// use qa_authority::capability::{Operation, OperationSet};
/// use qa_authority::descriptor::{AuthorityDescriptor, SubauthorityPolicy};
///
/// let descriptor = AuthorityDescriptor::new("mesh", OperationSet::all());
/// assert_eq!(descriptor.identifier(), "mesh");
/// assert_eq!(descriptor.policy(), SubauthorityPolicy::None);
/// assert!(descriptor.supports(Operation::ListAll));
///
/// let loc = AuthorityDescriptor::new(
///     "loc",
///     OperationSet::empty().with(Operation::Search),
/// )
/// .with_required_subauthorities(["subjects", "names"]);
/// assert_eq!(loc.subauthorities(), ["subjects", "names"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityDescriptor {
    identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qualified_name: Option<String>,
    operations: OperationSet,
    #[serde(default)]
    policy: SubauthorityPolicy,
    #[serde(default)]
    subauthorities: Vec<String>,
}

impl AuthorityDescriptor {
    /// Creates a descriptor with no sub-authority concept.
    #[must_use]
    pub fn new(identifier: impl Into<String>, operations: OperationSet) -> Self {
        Self {
            identifier: identifier.into(),
            qualified_name: None,
            operations,
            policy: SubauthorityPolicy::None,
            subauthorities: Vec::new(),
        }
    }

    /// Overrides the name used when the authority appears in diagnostics.
    #[must_use]
    pub fn with_qualified_name(mut self, name: impl Into<String>) -> Self {
        self.qualified_name = Some(name.into());
        self
    }

    /// Requires one of the given sub-authorities, in declared order.
    #[must_use]
    pub fn with_required_subauthorities<I, S>(self, subauthorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_policy(SubauthorityPolicy::Required, subauthorities)
    }

    /// Accepts an optional sub-authority drawn from the given list.
    ///
    /// An empty list leaves the optional set open.
    #[must_use]
    pub fn with_optional_subauthorities<I, S>(self, subauthorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_policy(SubauthorityPolicy::Optional, subauthorities)
    }

    /// Accepts any sub-authority string, leaving validity to the backend.
    #[must_use]
    pub fn with_open_subauthorities(mut self) -> Self {
        self.policy = SubauthorityPolicy::OpenAny;
        self.subauthorities.clear();
        self
    }

    fn with_policy<I, S>(mut self, policy: SubauthorityPolicy, subauthorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy = policy;
        self.subauthorities = subauthorities.into_iter().map(Into::into).collect();
        self
    }

    /// Validates the descriptor, returning an error if it is malformed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Descriptor`] if the identifier is blank, if
    /// the legal sub-authority list disagrees with the policy, or if the
    /// list contains blank or repeated entries.
    pub fn validate(&self) -> Result<(), AuthorityError> {
        if self.identifier.trim().is_empty() {
            return Err(descriptor_error("authority identifier must not be empty"));
        }
        match self.policy {
            SubauthorityPolicy::Required if self.subauthorities.is_empty() => {
                return Err(descriptor_error(format!(
                    "authority '{}' requires a sub-authority but lists none",
                    self.identifier
                )));
            }
            SubauthorityPolicy::None | SubauthorityPolicy::OpenAny
                if !self.subauthorities.is_empty() =>
            {
                return Err(descriptor_error(format!(
                    "authority '{}' with policy '{}' must not list sub-authorities",
                    self.identifier, self.policy
                )));
            }
            _ => {}
        }
        for (index, name) in self.subauthorities.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(descriptor_error(format!(
                    "authority '{}' lists a blank sub-authority",
                    self.identifier
                )));
            }
            if self.subauthorities.iter().take(index).any(|seen| seen == name) {
                return Err(descriptor_error(format!(
                    "authority '{}' lists sub-authority '{name}' twice",
                    self.identifier
                )));
            }
        }
        Ok(())
    }

    /// Returns the vocabulary identifier.
    #[must_use]
    pub const fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Returns the diagnostic name override, if any.
    #[must_use]
    pub fn qualified_name(&self) -> Option<&str> {
        self.qualified_name.as_deref()
    }

    /// Returns the declared operations.
    #[must_use]
    pub const fn operations(&self) -> OperationSet {
        self.operations
    }

    /// Returns `true` when the descriptor declares `operation`.
    #[must_use]
    pub const fn supports(&self, operation: Operation) -> bool {
        self.operations.contains(operation)
    }

    /// Returns the sub-authority policy.
    #[must_use]
    pub const fn policy(&self) -> SubauthorityPolicy {
        self.policy
    }

    /// Returns the legal sub-authorities in declared order.
    #[must_use]
    pub fn subauthorities(&self) -> &[String] {
        &self.subauthorities
    }
}

fn descriptor_error(message: impl Into<String>) -> AuthorityError {
    AuthorityError::Descriptor {
        message: message.into(),
    }
}
