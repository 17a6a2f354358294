//! Exclusion rules for directory discovery

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Errors for exclusion rules
#[derive(Debug, thiserror::Error)]
pub enum ExcludeError {
    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),
}

/// Glob patterns matched against paths relative to the input directory
#[derive(Debug)]
pub struct ExcludeRules {
    glob_set: GlobSet,
    len: usize,
}

impl Default for ExcludeRules {
    fn default() -> Self {
        Self {
            glob_set: GlobSet::empty(),
            len: 0,
        }
    }
}

impl ExcludeRules {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ExcludeError> {
        let mut builder = GlobSetBuilder::new();
        let mut len = 0;

        for pattern in patterns.iter().map(AsRef::as_ref) {
            if !pattern.is_empty() {
                builder.add(Glob::new(pattern)?);
                len += 1;
            }
        }

        Ok(Self {
            glob_set: builder.build()?,
            len,
        })
    }

    /// Number of active patterns
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if a relative path should be skipped
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.glob_set.is_match(path_str.as_ref())
    }
}
