//! `key=value` property files.
//!
//! A line ending in `\` continues on the next line. Leading whitespace is
//! skipped; blank lines and lines starting with `#` are ignored. The value
//! is everything after the first `=`, kept verbatim.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::convert::{PrimitiveType, parse as parse_value};

pub type PropertyMap = BTreeMap<String, String>;

const COMMENT_CHAR: char = '#';
const EQUALS_CHAR: char = '=';
const CONTINUATION: char = '\\';

#[derive(Error, Debug)]
pub enum PropertiesError {
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Empty key@{line}")]
    EmptyKey { line: usize },

    #[error("Missing '='@{line}")]
    MissingEquals { line: usize },
}

/// Read a property file.
pub fn load(path: impl AsRef<Path>) -> Result<PropertyMap, PropertiesError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PropertiesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = parse(BufReader::new(file)).map_err(|e| match e {
        PropertiesError::Io { source, .. } => PropertiesError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    debug!(path = %path.display(), entries = map.len(), "loaded properties");
    Ok(map)
}

/// Parse property text. Line numbers in errors count logical lines, so a
/// continued line counts once.
pub fn parse(reader: impl BufRead) -> Result<PropertyMap, PropertiesError> {
    let mut result = PropertyMap::new();
    let mut lines = reader.lines();
    let mut line_count = 0;

    while let Some(line) = next_logical_line(&mut lines)? {
        line_count += 1;

        let buffer = line.trim_start();
        if buffer.is_empty() || buffer.starts_with(COMMENT_CHAR) {
            continue;
        }
        if buffer.starts_with(EQUALS_CHAR) {
            return Err(PropertiesError::EmptyKey { line: line_count });
        }
        let (key, value) = buffer
            .split_once(EQUALS_CHAR)
            .ok_or(PropertiesError::MissingEquals { line: line_count })?;

        result.insert(key.to_string(), value.to_string());
    }

    Ok(result)
}

fn next_logical_line<I>(lines: &mut I) -> Result<Option<String>, PropertiesError>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut result = String::new();
    let mut count = 0;

    for line in lines.by_ref() {
        let line = line.map_err(|source| PropertiesError::Io {
            path: PathBuf::new(),
            source,
        })?;
        count += 1;
        match line.strip_suffix(CONTINUATION) {
            Some(head) => result.push_str(head),
            None => {
                result.push_str(&line);
                break;
            }
        }
    }

    Ok((count != 0).then_some(result))
}

/// A property file opened by name. A file that does not exist gives an
/// empty set of properties.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    path: PathBuf,
    map: PropertyMap,
    file_found: bool,
}

impl Properties {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PropertiesError> {
        let path = path.as_ref().to_path_buf();
        match load(&path) {
            Ok(map) => Ok(Self {
                path,
                map,
                file_found: true,
            }),
            Err(PropertiesError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "property file not found");
                Ok(Self {
                    path,
                    map: PropertyMap::new(),
                    file_found: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    pub fn from_map(map: PropertyMap) -> Self {
        Self {
            path: PathBuf::new(),
            map,
            file_found: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_found(&self) -> bool {
        self.file_found
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn get<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.map.get(key).map_or(default, String::as_str)
    }

    /// The value converted to `T`, or `default` if it is missing or does
    /// not convert.
    pub fn get_as<T: PrimitiveType>(&self, key: &str, default: T) -> T {
        self.map
            .get(key)
            .and_then(|raw| parse_value::<T>(raw).ok())
            .unwrap_or(default)
    }

    pub fn map(&self) -> &PropertyMap {
        &self.map
    }
}
