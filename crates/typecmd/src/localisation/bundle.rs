use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};
use typecmd_common::mutex_lock_or_recover;
use typecmd_common::strings;

use super::{Locale, LocalisationError, UNRESOLVED_PREFIX};
use crate::properties::{self, PropertyMap};

const SUFFIX: &str = "properties";

/// Translations for one base name, stored as
///
/// ```text
/// <dir>/<base>.properties
/// <dir>/<base>_de.properties
/// <dir>/<base>_en_GB.properties
/// ```
///
/// The file without a locale part is the root fallback. Files are read on
/// first use.
pub struct ResourceBundle {
    base_name: String,
    location: PathBuf,
    /// Locale string ("" for the root file) to file.
    available: BTreeMap<String, PathBuf>,
    loaded: Mutex<HashMap<String, PropertyMap>>,
}

impl ResourceBundle {
    pub fn new(base_name: &str, location: impl AsRef<Path>) -> Result<Self, LocalisationError> {
        let location = location.as_ref().to_path_buf();
        let available = detect_locales(base_name, &location)?;
        debug!(
            bundle = base_name,
            location = %location.display(),
            locales = available.len(),
            "resource bundle opened"
        );
        Ok(Self {
            base_name: base_name.to_string(),
            location,
            available,
            loaded: Mutex::new(HashMap::new()),
        })
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Available locales in string form, sorted. The root file is "".
    pub fn locales(&self) -> Vec<String> {
        self.available.keys().cloned().collect()
    }

    /// Whether a file exists for exactly this locale.
    pub fn has_definitions(&self, locale: &Locale) -> bool {
        self.available.contains_key(&locale.to_string())
    }

    /// Look `key` up for `locale`, falling back to its language and then to
    /// the root file. An unresolved key gives `default.<key>`.
    pub fn translate(&self, locale: &Locale, key: &str) -> String {
        let mut loaded = mutex_lock_or_recover(&self.loaded);

        let mut candidates = Vec::with_capacity(3);
        if !locale.is_root() {
            candidates.push(locale.to_string());
            candidates.push(locale.language().to_string());
        }
        candidates.push(String::new());
        candidates.dedup();

        for candidate in &candidates {
            if let Some(text) = self.resolve(&mut loaded, candidate, key) {
                return text;
            }
        }
        format!("{}{}", UNRESOLVED_PREFIX, key)
    }

    pub fn translate_current(&self, key: &str) -> String {
        self.translate(&Locale::current(), key)
    }

    fn resolve(
        &self,
        loaded: &mut HashMap<String, PropertyMap>,
        locale: &str,
        key: &str,
    ) -> Option<String> {
        let path = self.available.get(locale)?;
        let map = loaded
            .entry(locale.to_string())
            .or_insert_with(|| load_optional(path));
        map.get(key).filter(|text| !text.is_empty()).cloned()
    }
}

impl fmt::Display for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceBundle{{{}@{}}}", self.base_name, self.location.display())
    }
}

impl fmt::Debug for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBundle")
            .field("base_name", &self.base_name)
            .field("location", &self.location)
            .field("available", &self.available)
            .finish_non_exhaustive()
    }
}

/// A file that cannot be read or parsed contributes no translations.
fn load_optional(path: &Path) -> PropertyMap {
    match properties::load(path) {
        Ok(map) => map,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable bundle file");
            PropertyMap::new()
        }
    }
}

fn detect_locales(base_name: &str, location: &Path) -> Result<BTreeMap<String, PathBuf>, LocalisationError> {
    if !location.exists() {
        return Err(LocalisationError::NotFound(location.to_path_buf()));
    }
    if !location.is_dir() {
        return Err(LocalisationError::NotADirectory(location.to_path_buf()));
    }

    let entries = std::fs::read_dir(location).map_err(|source| LocalisationError::Io {
        path: location.to_path_buf(),
        source,
    })?;

    let mut available = BTreeMap::new();
    for entry in entries {
        let path = entry
            .map_err(|source| LocalisationError::Io {
                path: location.to_path_buf(),
                source,
            })?
            .path();
        if path.extension().and_then(|e| e.to_str()) != Some(SUFFIX) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(rest) = stem.strip_prefix(base_name) else {
            continue;
        };
        if rest.is_empty() {
            available.insert(String::new(), path);
            continue;
        }
        let Some(locale) = rest.strip_prefix('_') else {
            continue;
        };

        let parts = strings::split(locale, "_");
        if !(1..=2).contains(&parts.len()) || parts.iter().any(String::is_empty) {
            return Err(LocalisationError::InvalidDefinition(locale.to_string()));
        }
        available.insert(locale.to_string(), path);
    }
    Ok(available)
}
