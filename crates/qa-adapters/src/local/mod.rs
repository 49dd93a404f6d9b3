//! Locally maintained vocabularies stored as YAML files.
//!
//! Each `<name>.yml` (or `.yaml`) file in the configured directory is one
//! sub-authority. Files are re-read for every request so edits show up
//! without a restart.

use std::fs;
use std::path::{Path, PathBuf};

use qa_authority::adapter::{AuthorityAdapter, FindById, ListAll, Search};
use qa_authority::capability::OperationSet;
use qa_authority::descriptor::AuthorityDescriptor;
use qa_authority::normalize::RawResult;
use qa_authority::AuthorityError;
use tracing::debug;

use crate::termfile::TermList;

/// Registry identifier.
pub const IDENTIFIER: &str = "local";

const LOCAL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::local");
const EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Lists the sub-authorities available in `dir`, sorted by name.
///
/// # Errors
///
/// Returns the I/O error if the directory cannot be read.
pub fn discover(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !has_term_extension(&path) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            names.push(stem.to_owned());
        }
    }
    names.sort();
    names.dedup();
    Ok(names)
}

/// Returns the descriptor for a local directory holding `subauthorities`.
#[must_use]
pub fn descriptor(subauthorities: &[String]) -> AuthorityDescriptor {
    AuthorityDescriptor::new(IDENTIFIER, OperationSet::all())
        .with_required_subauthorities(subauthorities.iter().cloned())
}

/// Returns `true` when `query` matches the start of a word in `label`,
/// ignoring case.
///
/// # Example
///
/// ```
/// use qa_adapters::local::matches_word_start;
///
/// assert!(matches_word_start("New Mexico", "mex"));
/// assert!(!matches_word_start("New Mexico", "exico"));
/// ```
#[must_use]
pub fn matches_word_start(label: &str, query: &str) -> bool {
    let needle = query.to_lowercase();
    let haystack = label.to_lowercase();
    haystack
        .match_indices(needle.as_str())
        .any(|(start, _)| {
            haystack
                .get(..start)
                .and_then(|prefix| prefix.chars().next_back())
                .is_none_or(|previous| !previous.is_alphanumeric())
        })
}

/// Adapter over one local term file.
#[derive(Debug)]
pub struct LocalAdapter {
    terms: TermList,
}

impl LocalAdapter {
    /// Loads the term file for `subauthority` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Construction`] if the sub-authority is
    /// missing, has no file, or the file cannot be parsed.
    pub fn load(dir: &Path, subauthority: Option<&str>) -> Result<Self, AuthorityError> {
        let name = subauthority.ok_or_else(|| construction("a sub-authority is required"))?;
        let path = locate(dir, name)
            .ok_or_else(|| construction(&format!("no term file for sub-authority {name}")))?;
        debug!(target: LOCAL_TARGET, path = %path.display(), "loading term file");
        let terms = TermList::load(&path).map_err(|error| construction(&error.to_string()))?;
        Ok(Self { terms })
    }
}

impl Search for LocalAdapter {
    fn search(&self, query: &str) -> Result<RawResult, AuthorityError> {
        Ok(self.terms.filter(|label| matches_word_start(label, query)))
    }
}

impl ListAll for LocalAdapter {
    fn all(&self) -> Result<RawResult, AuthorityError> {
        Ok(self.terms.all())
    }
}

impl FindById for LocalAdapter {
    fn find(&self, id: &str) -> Result<RawResult, AuthorityError> {
        self.terms.find(id).ok_or_else(|| AuthorityError::TermNotFound {
            authority: IDENTIFIER.to_owned(),
            id: id.to_owned(),
        })
    }
}

impl AuthorityAdapter for LocalAdapter {
    fn searcher(&self) -> Option<&dyn Search> {
        Some(self)
    }

    fn lister(&self) -> Option<&dyn ListAll> {
        Some(self)
    }

    fn finder(&self) -> Option<&dyn FindById> {
        Some(self)
    }
}

fn has_term_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| EXTENSIONS.contains(&extension))
}

fn locate(dir: &Path, name: &str) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|extension| dir.join(format!("{name}.{extension}")))
        .find(|path| path.is_file())
}

fn construction(message: &str) -> AuthorityError {
    AuthorityError::Construction {
        authority: IDENTIFIER.to_owned(),
        message: message.to_owned(),
    }
}
