//! Document loading seam.

use serde_json::Value;

use crate::error::{Error, Result};

/// Fetches raw document bytes for an absolute locator.
///
/// The locator is either a filesystem path (possibly prefixed with
/// `file://`) or an `http`/`https` URL. Implementations must be shareable
/// between batch workers.
pub trait Loader: Send + Sync {
    fn load(&self, locator: &str) -> Result<Vec<u8>>;
}

/// Parse fetched bytes as a JSON document.
pub fn parse_document(locator: &str, bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|source| Error::Parse {
        locator: locator.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_document() {
        let doc = parse_document("a.json", br#"{"a": [1, 2.5, "x"]}"#).unwrap();
        assert_eq!(doc, json!({"a": [1, 2.5, "x"]}));
    }

    #[test]
    fn test_parse_error_names_locator() {
        let err = parse_document("broken.json", b"{not json").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
