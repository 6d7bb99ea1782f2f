//! Locale-keyed lookup of display texts.

mod bundle;
mod locale;

use std::path::PathBuf;

use thiserror::Error;

pub use bundle::ResourceBundle;
pub use locale::Locale;

/// Prefix of the text returned for a key no bundle file defines.
pub const UNRESOLVED_PREFIX: &str = "default.";

#[derive(Error, Debug)]
pub enum LocalisationError {
    #[error("Invalid locale '{0}'")]
    InvalidLocale(String),

    #[error("NotFound:{}", .0.display())]
    NotFound(PathBuf),

    #[error("NoDirectory:{}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid locale definition: {0}")]
    InvalidDefinition(String),

    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
