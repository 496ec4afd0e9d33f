//! Error types for catalog operations

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::taxonomy::Rank;

/// Coarse classification of a [`CatalogError`]
///
/// Callers use this to decide how to present a failure: validation problems
/// go back to the user, not-found maps to a 404-style message, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AlreadyExists,
    Import,
    Storage,
}

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("invalid {rank} name: '{name}'")]
    #[diagnostic(
        code(antdb::invalid_name),
        help("ranks are a single capitalized word; species are written 'Genus species'")
    )]
    InvalidName { rank: Rank, name: String },

    #[error("invalid input: {0}")]
    #[diagnostic(code(antdb::invalid_input))]
    Invalid(String),

    #[error("{what} not found: {key}")]
    #[diagnostic(code(antdb::not_found))]
    NotFound { what: &'static str, key: String },

    #[error("{what} '{key}' is ambiguous, it matches {candidates}")]
    #[diagnostic(code(antdb::ambiguous), help("use the numeric id instead"))]
    Ambiguous {
        what: &'static str,
        key: String,
        candidates: String,
    },

    #[error("{what} already exists: {key}")]
    #[diagnostic(code(antdb::already_exists))]
    AlreadyExists { what: &'static str, key: String },

    #[error("import of {} failed at line {line}", .file.display())]
    #[diagnostic(
        code(antdb::import),
        help("no rows of this file were applied; fix the row and run the import again")
    )]
    Import {
        file: PathBuf,
        line: u64,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("import of {} failed at entry {entry}", .file.display())]
    #[diagnostic(
        code(antdb::import),
        help("no entries of this file were applied; fix the entry and run the import again")
    )]
    ImportEntry {
        file: PathBuf,
        /// 1-based position in the file's top-level array
        entry: usize,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("file is not valid UTF-16: {0}")]
    #[diagnostic(code(antdb::encoding))]
    Encoding(String),

    #[error("database error: {0}")]
    #[diagnostic(code(antdb::database))]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    #[diagnostic(code(antdb::io))]
    Io(#[from] std::io::Error),

    #[error("malformed delimited file: {0}")]
    #[diagnostic(code(antdb::csv))]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    #[diagnostic(code(antdb::json))]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::InvalidName { .. }
            | CatalogError::Invalid(_)
            | CatalogError::Ambiguous { .. } => ErrorKind::Validation,
            CatalogError::NotFound { .. } => ErrorKind::NotFound,
            CatalogError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            CatalogError::Import { .. } | CatalogError::ImportEntry { .. } => ErrorKind::Import,
            CatalogError::Encoding(_)
            | CatalogError::Database(_)
            | CatalogError::Io(_)
            | CatalogError::Csv(_)
            | CatalogError::Json(_) => ErrorKind::Storage,
        }
    }

    pub fn not_found(what: &'static str, key: impl Into<String>) -> Self {
        CatalogError::NotFound {
            what,
            key: key.into(),
        }
    }

    pub fn already_exists(what: &'static str, key: impl Into<String>) -> Self {
        CatalogError::AlreadyExists {
            what,
            key: key.into(),
        }
    }
}

/// True when SQLite rejected a write because of a UNIQUE or PRIMARY KEY constraint
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = CatalogError::InvalidName {
            rank: Rank::Species,
            name: "lasius niger".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            CatalogError::not_found("region", "XX").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CatalogError::already_exists("species", "Lasius niger").kind(),
            ErrorKind::AlreadyExists
        );
        let ambiguous = CatalogError::Ambiguous {
            what: "region",
            key: "georgia".into(),
            candidates: "Georgia (1), Georgia (7)".into(),
        };
        assert_eq!(ambiguous.kind(), ErrorKind::Validation);
        assert!(ambiguous.to_string().contains("Georgia (7)"));
    }

    #[test]
    fn test_import_error_keeps_row_reason() {
        let err = CatalogError::Import {
            file: PathBuf::from("species.tsv"),
            line: 4,
            source: Box::new(CatalogError::Invalid("bad year".into())),
        };
        assert_eq!(err.kind(), ErrorKind::Import);
        assert!(err.to_string().contains("line 4"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("invalid input: bad year"));
    }
}
