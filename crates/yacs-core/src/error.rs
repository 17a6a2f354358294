//! Error type shared by the resolver, the schema stage and the pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised while turning a locator into a processed document.
///
/// The diff engine never fails and has no variant here.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure reading a local or remote document.
    #[error("fetch error for '{locator}': {message}")]
    Fetch { locator: String, message: String },

    /// Fetched bytes are not valid JSON.
    #[error("parse error in '{locator}': {source}")]
    Parse {
        locator: String,
        #[source]
        source: serde_json::Error,
    },

    /// Malformed JSON Reference (not a missing pointer target, which yields null).
    #[error("invalid reference '{uri}': {reason}")]
    Pointer { uri: String, reason: String },

    /// A reference chain came back to a reference still being resolved.
    #[error("reference cycle detected: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    /// Aggregated schema failures, one `[i] ...` line per failing schema.
    #[error("{0}")]
    Validation(String),
}

impl Error {
    pub fn fetch(locator: impl Into<String>, message: impl ToString) -> Self {
        Error::Fetch {
            locator: locator.into(),
            message: message.to_string(),
        }
    }

    pub fn pointer(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Pointer {
            uri: uri.into(),
            reason: reason.into(),
        }
    }
}
