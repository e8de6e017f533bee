//! Event authors and the locale validation they depend on.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::CadenceConfig;
use crate::error::{CadenceError, CadenceResult};

/// Decides which cultures and timezones an author may use.
pub trait LocaleValidator {
    fn is_valid_culture(&self, culture: &str) -> bool;
    fn is_valid_timezone(&self, timezone: &str) -> bool;
}

/// Validates timezones against the IANA database and cultures against a
/// fixed catalog of supported names.
#[derive(Debug, Clone)]
pub struct CatalogValidator {
    cultures: Vec<String>,
}

impl CatalogValidator {
    pub fn new<I, S>(cultures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CatalogValidator {
            cultures: cultures.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &CadenceConfig) -> Self {
        Self::new(config.supported_cultures.iter().cloned())
    }
}

impl LocaleValidator for CatalogValidator {
    fn is_valid_culture(&self, culture: &str) -> bool {
        self.cultures.iter().any(|c| c.eq_ignore_ascii_case(culture))
    }

    fn is_valid_timezone(&self, timezone: &str) -> bool {
        chrono_tz::Tz::from_str(timezone).is_ok()
    }
}

/// Identity plus locale preferences attached to created events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    id: String,
    culture: String,
    timezone: String,
}

impl Author {
    pub fn new(
        id: impl Into<String>,
        culture: &str,
        timezone: &str,
        validator: &dyn LocaleValidator,
    ) -> CadenceResult<Self> {
        check_culture(culture, validator)?;
        check_timezone(timezone, validator)?;

        Ok(Author {
            id: id.into(),
            culture: culture.to_string(),
            timezone: timezone.to_string(),
        })
    }

    /// An author using the configured default culture and timezone.
    pub fn from_config(id: impl Into<String>, config: &CadenceConfig) -> CadenceResult<Self> {
        let validator = CatalogValidator::from_config(config);
        Self::new(
            id,
            &config.default_culture,
            &config.default_timezone,
            &validator,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn culture(&self) -> &str {
        &self.culture
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn change_culture(
        &mut self,
        culture: &str,
        validator: &dyn LocaleValidator,
    ) -> CadenceResult<()> {
        check_culture(culture, validator)?;
        self.culture = culture.to_string();
        Ok(())
    }

    pub fn change_timezone(
        &mut self,
        timezone: &str,
        validator: &dyn LocaleValidator,
    ) -> CadenceResult<()> {
        check_timezone(timezone, validator)?;
        self.timezone = timezone.to_string();
        Ok(())
    }
}

fn check_culture(culture: &str, validator: &dyn LocaleValidator) -> CadenceResult<()> {
    if validator.is_valid_culture(culture) {
        Ok(())
    } else {
        Err(CadenceError::InvalidCulture(culture.to_string()))
    }
}

fn check_timezone(timezone: &str, validator: &dyn LocaleValidator) -> CadenceResult<()> {
    if validator.is_valid_timezone(timezone) {
        Ok(())
    } else {
        Err(CadenceError::InvalidTimezone(timezone.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> CatalogValidator {
        CatalogValidator::new(["en-US", "pl-PL"])
    }

    #[test]
    fn test_new_author_validates_locale() {
        let author = Author::new("alice", "pl-PL", "Europe/Warsaw", &validator()).unwrap();
        assert_eq!(author.id(), "alice");
        assert_eq!(author.culture(), "pl-PL");
        assert_eq!(author.timezone(), "Europe/Warsaw");

        assert!(matches!(
            Author::new("bob", "xx-YY", "UTC", &validator()),
            Err(CadenceError::InvalidCulture(_))
        ));
        assert!(matches!(
            Author::new("bob", "en-US", "Mars/Olympus_Mons", &validator()),
            Err(CadenceError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_rejected_change_leaves_author_untouched() {
        let mut author = Author::new("alice", "en-US", "UTC", &validator()).unwrap();

        assert!(author.change_timezone("Not/AZone", &validator()).is_err());
        assert!(author.change_culture("klingon", &validator()).is_err());
        assert_eq!(author.timezone(), "UTC");
        assert_eq!(author.culture(), "en-US");

        author.change_timezone("America/New_York", &validator()).unwrap();
        assert_eq!(author.timezone(), "America/New_York");
    }

    #[test]
    fn test_culture_lookup_ignores_case() {
        assert!(validator().is_valid_culture("EN-us"));
    }

    #[test]
    fn test_author_from_default_config() {
        let author = Author::from_config("alice", &CadenceConfig::default()).unwrap();
        assert_eq!(author.culture(), "en-US");
        assert_eq!(author.timezone(), "UTC");
    }
}
