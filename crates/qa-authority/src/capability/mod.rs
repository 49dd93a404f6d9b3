//! Operation capabilities declared by authorities.
//!
//! Every authority declares, through its descriptor, which of the three
//! uniform operations it supports. The dispatch engine consults the
//! declared [`OperationSet`] before it builds an adapter, so an undeclared
//! operation never reaches a backend.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// One of the uniform operations an authority may support.
///
/// # Example
///
/// ```
/// use qa_authority::capability::Operation;
///
/// assert_eq!(Operation::ListAll.as_str(), "list-all");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Keyword search returning a sequence of terms.
    Search,
    /// Enumeration of every term in the vocabulary.
    ListAll,
    /// Lookup of a single term by its backend identifier.
    FindById,
}

impl Operation {
    /// Every operation in declaration order.
    pub const ALL: [Self; 3] = [Self::Search, Self::ListAll, Self::FindById];

    /// Returns the canonical kebab-case string for this operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::ListAll => "list-all",
            Self::FindById => "find-by-id",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Search => 0b001,
            Self::ListAll => 0b010,
            Self::FindById => 0b100,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OperationSet
// ---------------------------------------------------------------------------

/// Closed set of operations supported by an authority.
///
/// Serialises as a list of operation names.
///
/// # Example
///
/// ```
/// use qa_authority::capability::{Operation, OperationSet};
///
/// let set = OperationSet::empty().with(Operation::Search);
/// assert!(set.contains(Operation::Search));
/// assert!(!set.contains(Operation::ListAll));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Operation>", into = "Vec<Operation>")]
pub struct OperationSet {
    bits: u8,
}

impl OperationSet {
    /// Returns a set with no operations.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Returns a set with every operation.
    #[must_use]
    pub const fn all() -> Self {
        Self { bits: 0b111 }
    }

    /// Returns a copy of the set with `operation` added.
    #[must_use]
    pub const fn with(self, operation: Operation) -> Self {
        Self {
            bits: self.bits | operation.bit(),
        }
    }

    /// Returns `true` when the set includes `operation`.
    #[must_use]
    pub const fn contains(self, operation: Operation) -> bool {
        self.bits & operation.bit() != 0
    }

    /// Returns `true` when the set has no operations.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Iterates over the contained operations in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Operation> {
        Operation::ALL
            .into_iter()
            .filter(move |operation| self.contains(*operation))
    }
}

impl FromIterator<Operation> for OperationSet {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl From<Vec<Operation>> for OperationSet {
    fn from(operations: Vec<Operation>) -> Self {
        operations.into_iter().collect()
    }
}

impl From<OperationSet> for Vec<Operation> {
    fn from(set: OperationSet) -> Self {
        set.iter().collect()
    }
}

impl std::fmt::Display for OperationSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(Operation::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
