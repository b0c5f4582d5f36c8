//! Reader for Java-style `.properties` files (`key=value`, `#`/`!` comments,
//! backslash escapes and continuations).
use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PropertiesError {
    #[error("Cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: java_properties::PropertiesError,
    },

    #[error("{path}: missing key '{key}'")]
    MissingKey { path: PathBuf, key: String },
}

/// Key-value pairs of one properties file.
#[derive(Debug)]
pub struct Properties {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl Properties {
    pub fn read(path: &Path) -> Result<Self, PropertiesError> {
        let file = File::open(path).map_err(|source| PropertiesError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let entries =
            java_properties::read(BufReader::new(file)).map_err(|source| PropertiesError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, PropertiesError> {
        self.get(key).ok_or_else(|| PropertiesError::MissingKey {
            path: self.path.clone(),
            key: key.to_owned(),
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
