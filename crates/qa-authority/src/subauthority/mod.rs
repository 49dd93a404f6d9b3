//! Sub-authority validation against a descriptor's policy.
//!
//! Validation happens before any adapter is built. An empty requested value
//! is treated as absent.

use thiserror::Error;

use crate::descriptor::{AuthorityDescriptor, SubauthorityPolicy};

/// Reasons a requested sub-authority is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubauthorityViolation {
    /// The authority has no sub-authorities, but one was supplied.
    #[error("sub-authorities are not supported")]
    NotSupported,

    /// The authority requires a sub-authority, but none was supplied.
    #[error("a sub-authority is required")]
    Required,

    /// The supplied sub-authority is not in the legal list.
    #[error("unknown sub-authority '{requested}'")]
    Unknown {
        /// The rejected value.
        requested: String,
        /// Every legal value, in the descriptor's declared order.
        valid: Vec<String>,
    },
}

/// Checks `requested` against the descriptor's sub-authority policy.
///
/// # Errors
///
/// Returns a [`SubauthorityViolation`] describing the first rule broken.
///
/// # Example
///
/// ```
/// use qa_authority::capability::OperationSet;
/// use qa_authority::descriptor::AuthorityDescriptor;
/// use qa_authority::subauthority::{SubauthorityViolation, validate};
///
/// let loc = AuthorityDescriptor::new("loc", OperationSet::all())
///     .with_required_subauthorities(["subjects", "names"]);
/// assert!(validate(&loc, Some("names")).is_ok());
/// assert_eq!(validate(&loc, None), Err(SubauthorityViolation::Required));
/// ```
pub fn validate(
    descriptor: &AuthorityDescriptor,
    requested: Option<&str>,
) -> Result<(), SubauthorityViolation> {
    let supplied = requested.filter(|value| !value.is_empty());
    match (descriptor.policy(), supplied) {
        (SubauthorityPolicy::None, Some(_)) => Err(SubauthorityViolation::NotSupported),
        (SubauthorityPolicy::Required, None) => Err(SubauthorityViolation::Required),
        (SubauthorityPolicy::Required | SubauthorityPolicy::Optional, Some(value)) => {
            check_membership(descriptor, value)
        }
        (
            SubauthorityPolicy::None | SubauthorityPolicy::Optional | SubauthorityPolicy::OpenAny,
            None,
        )
        | (SubauthorityPolicy::OpenAny, Some(_)) => Ok(()),
    }
}

fn check_membership(
    descriptor: &AuthorityDescriptor,
    value: &str,
) -> Result<(), SubauthorityViolation> {
    let legal = descriptor.subauthorities();
    // An optional policy without a list is an open set.
    if legal.is_empty() || legal.iter().any(|name| name == value) {
        return Ok(());
    }
    Err(SubauthorityViolation::Unknown {
        requested: value.to_owned(),
        valid: legal.to_vec(),
    })
}
