//! The built-in authority catalogue.
//!
//! [`builtin_registry`] is the explicit table mapping vocabulary identifiers
//! to adapter factories. Remote authorities are always registered; file
//! backed ones only when their data path is configured.

use std::path::PathBuf;
use std::sync::Arc;

use qa_authority::adapter::adapter_factory;
use qa_authority::registry::{AuthorityRegistry, DEFAULT_NAMESPACE};
use qa_authority::AuthorityError;
use thiserror::Error;
use tracing::info;

use crate::assign_fast::{self, AssignFastAdapter};
use crate::fetch::SharedFetcher;
use crate::local::{self, LocalAdapter};
use crate::loc::{self, LocAdapter};
use crate::oclcts::{self, OclctsAdapter};
use crate::table::TermTable;
use crate::termfile::TermFileError;

const CATALOG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::catalog");

/// Where the catalogue finds its file-backed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Namespace used to qualify authority names in diagnostics.
    pub namespace: String,
    /// Directory of local YAML vocabularies.
    pub local_dir: Option<PathBuf>,
    /// MeSH term file.
    pub mesh_path: Option<PathBuf>,
    /// TGN languages term file.
    pub tgnlang_path: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            namespace: String::from(DEFAULT_NAMESPACE),
            local_dir: None,
            mesh_path: None,
            tgnlang_path: None,
        }
    }
}

/// Errors raised while assembling the catalogue.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The local vocabulary directory could not be listed.
    #[error("failed to read local vocabulary directory {path}: {source}")]
    LocalDir {
        /// Directory that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A term table could not be loaded.
    #[error(transparent)]
    Table(#[from] TermFileError),

    /// An authority was rejected by the registry.
    #[error(transparent)]
    Registration(#[from] AuthorityError),
}

/// Builds the registry of every built-in authority.
///
/// # Errors
///
/// Returns a [`CatalogError`] if a configured data path cannot be read or a
/// descriptor is rejected.
pub fn builtin_registry(
    config: &CatalogConfig,
    fetcher: &SharedFetcher,
) -> Result<AuthorityRegistry, CatalogError> {
    let mut builder = AuthorityRegistry::builder().with_namespace(config.namespace.clone());

    let loc_fetcher = Arc::clone(fetcher);
    builder.register(
        loc::descriptor(),
        adapter_factory(move |sub| Ok(Box::new(LocAdapter::new(Arc::clone(&loc_fetcher), sub)?))),
    )?;

    let fast_fetcher = Arc::clone(fetcher);
    builder.register(
        assign_fast::descriptor(),
        adapter_factory(move |sub| {
            Ok(Box::new(AssignFastAdapter::new(
                Arc::clone(&fast_fetcher),
                sub,
            )?))
        }),
    )?;

    let oclcts_fetcher = Arc::clone(fetcher);
    builder.register(
        oclcts::descriptor(),
        adapter_factory(move |sub| {
            Ok(Box::new(OclctsAdapter::new(
                Arc::clone(&oclcts_fetcher),
                sub,
            )?))
        }),
    )?;

    if let Some(dir) = &config.local_dir {
        let names = local::discover(dir).map_err(|source| CatalogError::LocalDir {
            path: dir.display().to_string(),
            source: Arc::new(source),
        })?;
        if names.is_empty() {
            info!(
                target: CATALOG_TARGET,
                path = %dir.display(),
                "no local vocabularies found; skipping local authority"
            );
        } else {
            info!(target: CATALOG_TARGET, count = names.len(), "registering local vocabularies");
            let root = dir.clone();
            builder.register(
                local::descriptor(&names),
                adapter_factory(move |sub| Ok(Box::new(LocalAdapter::load(&root, sub)?))),
            )?;
        }
    }

    let tables = [
        config.mesh_path.as_deref().map(TermTable::mesh),
        config.tgnlang_path.as_deref().map(TermTable::tgnlang),
    ];
    for loaded in tables.into_iter().flatten() {
        let table = loaded?;
        info!(target: CATALOG_TARGET, authority = table.identifier(), "registering term table");
        builder.register(
            table.descriptor(),
            adapter_factory(move |_| Ok(Box::new(table.adapter()))),
        )?;
    }

    Ok(builder.build())
}
