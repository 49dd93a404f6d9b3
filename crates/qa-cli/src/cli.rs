//! Command-line argument definitions for the `qa` tool.

use clap::{Parser, Subcommand};
use qa_authority::dispatch::DispatchRequest;

/// Query controlled vocabularies from the command line.
#[derive(Parser, Debug)]
#[command(
    name = "qa",
    version,
    disable_help_subcommand = true,
    after_help = CONFIG_HELP
)]
pub(crate) struct Cli {
    /// The vocabulary operation to run.
    #[command(subcommand)]
    pub(crate) command: Command,
}

const CONFIG_HELP: &str = "\
Configuration flags must come before the command:
  --config-path <PATH>     TOML configuration file [env: QA_CONFIG_PATH]
  --log-filter <FILTER>    tracing filter, for example qa_authority=debug
  --log-format <FORMAT>    auto, json or compact
  --timeout-secs <SECS>    backend request timeout
  --retry-attempts <N>     attempts for transient backend failures
  --namespace <NAME>       namespace for authority names in diagnostics
  --local-dir <DIR>        directory of local YAML vocabularies
  --mesh-path <PATH>       MeSH term file
  --tgnlang-path <PATH>    TGN languages term file
Every flag can also be set as QA_<NAME> in the environment.";

/// Vocabulary operations.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    /// Searches a vocabulary for matching terms.
    Search {
        /// Vocabulary identifier, for example `loc`.
        vocabulary: String,
        /// Free-text query.
        query: String,
        /// Sub-authority within the vocabulary.
        #[arg(long, short = 's')]
        subauthority: Option<String>,
    },
    /// Lists every term of a vocabulary.
    List {
        /// Vocabulary identifier.
        vocabulary: String,
        /// Sub-authority within the vocabulary.
        #[arg(long, short = 's')]
        subauthority: Option<String>,
    },
    /// Shows one term by identifier.
    Show {
        /// Vocabulary identifier.
        vocabulary: String,
        /// Term identifier.
        id: String,
        /// Sub-authority within the vocabulary.
        #[arg(long, short = 's')]
        subauthority: Option<String>,
    },
}

impl Command {
    /// Converts the parsed command into a dispatch request.
    pub(crate) fn to_request(&self) -> DispatchRequest {
        match self {
            Self::Search {
                vocabulary,
                query,
                subauthority,
            } => DispatchRequest::search(vocabulary.as_str(), subauthority.as_deref(), query.as_str()),
            Self::List {
                vocabulary,
                subauthority,
            } => DispatchRequest::list_all(vocabulary.as_str(), subauthority.as_deref()),
            Self::Show {
                vocabulary,
                id,
                subauthority,
            } => DispatchRequest::find_by_id(vocabulary.as_str(), subauthority.as_deref(), id.as_str()),
        }
    }
}
