//! JSON data loader.
//!
//! Reads the two exports into raw record collections. A missing file,
//! unreadable file, or malformed JSON is a [`LoadError`]; field-level problems
//! are left to the normalizer, which can name the offending record.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::LoadError;
use crate::types::{RawAccount, RawCase};

pub fn load_accounts(path: &Path) -> Result<Vec<RawAccount>, LoadError> {
    read_array(path)
}

pub fn load_cases(path: &Path) -> Result<Vec<RawCase>, LoadError> {
    read_array(path)
}

fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}
