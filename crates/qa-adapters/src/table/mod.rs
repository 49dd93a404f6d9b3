//! Static term tables loaded once at start-up.
//!
//! Used for vocabularies without sub-authorities whose data ships as a
//! single YAML term file, such as MeSH subject headings or Getty TGN
//! language names. Search is a case-insensitive substring match on labels.

use std::path::Path;
use std::sync::Arc;

use qa_authority::adapter::{AuthorityAdapter, FindById, ListAll, Search};
use qa_authority::capability::{Operation, OperationSet};
use qa_authority::descriptor::AuthorityDescriptor;
use qa_authority::normalize::RawResult;
use qa_authority::AuthorityError;

use crate::termfile::{TermFileError, TermList};

/// Registry identifier for Medical Subject Headings.
pub const MESH: &str = "mesh";
/// Registry identifier for Getty TGN languages.
pub const TGNLANG: &str = "tgnlang";

/// A named term table and the operations it is published with.
#[derive(Debug, Clone)]
pub struct TermTable {
    identifier: String,
    operations: OperationSet,
    terms: Arc<TermList>,
}

impl TermTable {
    /// Wraps an already parsed term list.
    #[must_use]
    pub fn new(identifier: impl Into<String>, operations: OperationSet, terms: TermList) -> Self {
        Self {
            identifier: identifier.into(),
            operations,
            terms: Arc::new(terms),
        }
    }

    /// Loads a table from a YAML term file.
    ///
    /// # Errors
    ///
    /// Returns a [`TermFileError`] if the file cannot be read or parsed.
    pub fn load(
        identifier: impl Into<String>,
        operations: OperationSet,
        path: &Path,
    ) -> Result<Self, TermFileError> {
        Ok(Self::new(identifier, operations, TermList::load(path)?))
    }

    /// MeSH supports every operation.
    ///
    /// # Errors
    ///
    /// Returns a [`TermFileError`] if the file cannot be read or parsed.
    pub fn mesh(path: &Path) -> Result<Self, TermFileError> {
        Self::load(MESH, OperationSet::all(), path)
    }

    /// TGN languages support search only.
    ///
    /// # Errors
    ///
    /// Returns a [`TermFileError`] if the file cannot be read or parsed.
    pub fn tgnlang(path: &Path) -> Result<Self, TermFileError> {
        Self::load(TGNLANG, OperationSet::empty().with(Operation::Search), path)
    }

    /// Returns the registry identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the descriptor for this table.
    #[must_use]
    pub fn descriptor(&self) -> AuthorityDescriptor {
        AuthorityDescriptor::new(self.identifier.clone(), self.operations)
    }

    /// Returns an adapter sharing this table's terms.
    #[must_use]
    pub fn adapter(&self) -> TableAdapter {
        TableAdapter {
            table: self.clone(),
        }
    }
}

/// Adapter over a shared term table.
#[derive(Debug)]
pub struct TableAdapter {
    table: TermTable,
}

impl Search for TableAdapter {
    fn search(&self, query: &str) -> Result<RawResult, AuthorityError> {
        let needle = query.to_lowercase();
        Ok(self
            .table
            .terms
            .filter(|label| label.to_lowercase().contains(&needle)))
    }
}

impl ListAll for TableAdapter {
    fn all(&self) -> Result<RawResult, AuthorityError> {
        Ok(self.table.terms.all())
    }
}

impl FindById for TableAdapter {
    fn find(&self, id: &str) -> Result<RawResult, AuthorityError> {
        self.table
            .terms
            .find(id)
            .ok_or_else(|| AuthorityError::TermNotFound {
                authority: self.table.identifier.clone(),
                id: id.to_owned(),
            })
    }
}

impl AuthorityAdapter for TableAdapter {
    fn searcher(&self) -> Option<&dyn Search> {
        self.table
            .operations
            .contains(Operation::Search)
            .then_some(self as &dyn Search)
    }

    fn lister(&self) -> Option<&dyn ListAll> {
        self.table
            .operations
            .contains(Operation::ListAll)
            .then_some(self as &dyn ListAll)
    }

    fn finder(&self) -> Option<&dyn FindById> {
        self.table
            .operations
            .contains(Operation::FindById)
            .then_some(self as &dyn FindById)
    }
}

#[cfg(test)]
mod tests;
