use std::fmt;
use std::sync::RwLock;

use typecmd_common::rwlock_read_or_recover;
use typecmd_common::rwlock_write_or_recover;

use super::LocalisationError;

static CURRENT: RwLock<Option<Locale>> = RwLock::new(None);

/// A language with an optional country, written `de` or `de_DE`. The root
/// locale has neither and is written as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    language: String,
    country: String,
}

impl Locale {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(language: &str, country: &str) -> Result<Self, LocalisationError> {
        let valid_language = language.chars().all(|c| c.is_ascii_alphabetic());
        let valid_country = country.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid_language || !valid_country || (language.is_empty() && !country.is_empty()) {
            return Err(LocalisationError::InvalidLocale(join(language, country)));
        }
        Ok(Self {
            language: language.to_string(),
            country: country.to_string(),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn is_root(&self) -> bool {
        self.language.is_empty()
    }

    /// Parse `de`, `de_DE` or a POSIX form like `de_DE.UTF-8@euro`.
    /// `C`, `POSIX` and the empty string give the root locale.
    pub fn parse(text: &str) -> Result<Self, LocalisationError> {
        let name = text
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .trim();
        if name.is_empty() || name == "C" || name == "POSIX" {
            return Ok(Self::root());
        }
        match name.split_once('_') {
            Some((language, country)) if !country.is_empty() => Self::new(language, country),
            Some(_) => Err(LocalisationError::InvalidLocale(text.to_string())),
            None => Self::new(name, ""),
        }
    }

    /// The process-wide locale. Until one is set it is taken from `LANG`.
    pub fn current() -> Self {
        if let Some(locale) = rwlock_read_or_recover(&CURRENT).as_ref() {
            return locale.clone();
        }
        let mut current = rwlock_write_or_recover(&CURRENT);
        current.get_or_insert_with(Self::from_env).clone()
    }

    pub fn set_current(locale: Locale) {
        *rwlock_write_or_recover(&CURRENT) = Some(locale);
    }

    fn from_env() -> Self {
        std::env::var("LANG")
            .ok()
            .and_then(|lang| Self::parse(&lang).ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.language, &self.country))
    }
}

impl std::str::FromStr for Locale {
    type Err = LocalisationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn join(language: &str, country: &str) -> String {
    if country.is_empty() {
        language.to_string()
    } else {
        format!("{}_{}", language, country)
    }
}
