use std::{fmt, path::PathBuf};

use thiserror::Error;

const MAX_ISSUES_SHOWN: usize = 20;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("required input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error in {} at byte {offset}: {message}\n{context}", path.display())]
    Parse { path: PathBuf, offset: usize, message: String, context: String },

    #[error("schema error in {}:\n{}", path.display(), IssueList(issues))]
    Schema { path: PathBuf, issues: Vec<SchemaIssue> },

    #[error("override file {} is invalid and must be fixed by hand: {source}", path.display())]
    OverrideInvalid {
        path: PathBuf,
        #[source]
        source: Box<AppError>,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot resolve timestamp {starts_at:?}: {source}")]
    Timestamp {
        starts_at: String,
        #[source]
        source: jiff::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchemaIssue {
    pub path: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, got {}", self.path, self.expected, self.actual)
    }
}

struct IssueList<'a>(&'a [SchemaIssue]);

impl fmt::Display for IssueList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in self.0.iter().take(MAX_ISSUES_SHOWN) {
            writeln!(f, "  - {issue}")?;
        }
        if self.0.len() > MAX_ISSUES_SHOWN {
            writeln!(f, "  ... and {} more", self.0.len() - MAX_ISSUES_SHOWN)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_lists_issues_and_truncates() {
        let issues = (0..25)
            .map(|i| SchemaIssue {
                path: format!("$[{i}].id"),
                expected: "integer".to_string(),
                actual: "string".to_string(),
            })
            .collect();
        let err = AppError::Schema { path: PathBuf::from("raw/movie-list.json"), issues };
        let text = err.to_string();

        assert!(text.contains("raw/movie-list.json"));
        assert!(text.contains("$[0].id: expected integer, got string"));
        assert!(!text.contains("$[20].id"));
        assert!(text.contains("and 5 more"));
    }
}
