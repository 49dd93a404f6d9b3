//! Request types accepted by the dispatch engine.

use crate::capability::Operation;

/// Operation-specific parameters of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    /// Free-text search.
    Search {
        /// Search text, passed to the backend unchanged.
        query: String,
    },
    /// Enumerate every term.
    ListAll,
    /// Fetch one term.
    FindById {
        /// Term identifier, passed to the backend unchanged.
        id: String,
    },
}

impl OperationRequest {
    /// Returns the capability this request needs.
    #[must_use]
    pub const fn kind(&self) -> Operation {
        match self {
            Self::Search { .. } => Operation::Search,
            Self::ListAll => Operation::ListAll,
            Self::FindById { .. } => Operation::FindById,
        }
    }
}

/// One inbound request as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    vocabulary_id: String,
    subauthority_id: Option<String>,
    operation: OperationRequest,
}

impl DispatchRequest {
    /// Creates a request from its parts.
    #[must_use]
    pub fn new(
        vocabulary_id: impl Into<String>,
        subauthority_id: Option<&str>,
        operation: OperationRequest,
    ) -> Self {
        Self {
            vocabulary_id: vocabulary_id.into(),
            subauthority_id: subauthority_id.map(str::to_owned),
            operation,
        }
    }

    /// Creates a search request.
    #[must_use]
    pub fn search(
        vocabulary_id: impl Into<String>,
        subauthority_id: Option<&str>,
        query: impl Into<String>,
    ) -> Self {
        Self::new(
            vocabulary_id,
            subauthority_id,
            OperationRequest::Search {
                query: query.into(),
            },
        )
    }

    /// Creates a list-all request.
    #[must_use]
    pub fn list_all(vocabulary_id: impl Into<String>, subauthority_id: Option<&str>) -> Self {
        Self::new(vocabulary_id, subauthority_id, OperationRequest::ListAll)
    }

    /// Creates a find-by-id request.
    #[must_use]
    pub fn find_by_id(
        vocabulary_id: impl Into<String>,
        subauthority_id: Option<&str>,
        id: impl Into<String>,
    ) -> Self {
        Self::new(
            vocabulary_id,
            subauthority_id,
            OperationRequest::FindById { id: id.into() },
        )
    }

    /// Returns the requested vocabulary identifier.
    #[must_use]
    pub fn vocabulary_id(&self) -> &str {
        &self.vocabulary_id
    }

    /// Returns the requested sub-authority, treating an empty value as
    /// absent.
    #[must_use]
    pub fn subauthority_id(&self) -> Option<&str> {
        self.subauthority_id
            .as_deref()
            .filter(|value| !value.is_empty())
    }

    /// Returns the operation parameters.
    #[must_use]
    pub const fn operation(&self) -> &OperationRequest {
        &self.operation
    }
}
