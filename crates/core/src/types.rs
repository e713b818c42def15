use std::collections::BTreeMap;

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A bilingual string map. Expected keys: `en`, `ar`.
pub type LocaleString = BTreeMap<String, String>;

/// Resolve a [`LocaleString`] to a concrete string for `locale`,
/// falling back to English, then to any entry, then to `fallback`.
pub fn resolve_locale<'a>(s: &'a LocaleString, locale: &str, fallback: &'a str) -> &'a str {
    s.get(locale)
        .or_else(|| s.get("en"))
        .or_else(|| s.values().next())
        .map(String::as_str)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label() -> LocaleString {
        let mut m = LocaleString::new();
        m.insert("en".into(), "Name".into());
        m.insert("ar".into(), "الاسم".into());
        m
    }

    #[test]
    fn resolve_exact_locale() {
        assert_eq!(resolve_locale(&label(), "ar", "x"), "الاسم");
    }

    #[test]
    fn resolve_falls_back_to_english() {
        assert_eq!(resolve_locale(&label(), "fr", "x"), "Name");
    }

    #[test]
    fn resolve_falls_back_to_given_default_when_empty() {
        let empty = LocaleString::new();
        assert_eq!(resolve_locale(&empty, "en", "field_name"), "field_name");
    }
}
