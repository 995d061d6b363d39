//! Error types for dataset loading and cell coercion.
//!
//! Only [`LoadError`] is fatal. [`CoerceError`] is absorbed by the loader,
//! which records the cell as missing and keeps going.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::schema::ColumnMap;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read input: {source}")]
    Read {
        #[from]
        source: io::Error,
    },

    #[error("file is empty")]
    Empty,

    #[error("could not detect Country/Year headers. Detected: {columns}")]
    MissingColumns { columns: ColumnMap },
}

/// A cell held text that was present but not numeric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("'{raw}' is not a number")]
    NotNumeric { raw: String },

    #[error("'{raw}' is out of range")]
    OutOfRange { raw: String },
}
