//! Known-code tables: single source of truth for recognized locale codes.
//!
//! Three static tables back the validated code types in this module's
//! parent: ISO 639-1 language codes, ISO 15924 script codes, and
//! ISO 3166-1 alpha-2 region codes. Construction of a code type succeeds
//! only for strings present in the respective table, so every code value
//! in the system carries a `&'static str` borrowed from here.

/// ISO 639-1 language codes recognized by the catalog.
///
/// Sorted for binary search. Not the full registry, but every language
/// the catalog has shipped strings for plus common requests.
pub(crate) const LANGUAGES: &[&str] = &[
    "ar", "bg", "bn", "ca", "cs", "da", "de", "el", "en", "es", "et", "fa", "fi", "fr", "ga",
    "he", "hi", "hr", "hu", "id", "is", "it", "ja", "ko", "lt", "lv", "ms", "nb", "nl", "nn",
    "no", "pl", "pt", "ro", "ru", "sk", "sl", "sr", "sv", "sw", "th", "tr", "uk", "ur", "vi",
    "zh",
];

/// ISO 15924 script codes (four letters, title case). Sorted.
pub(crate) const SCRIPTS: &[&str] = &[
    "Arab", "Armn", "Beng", "Cyrl", "Deva", "Ethi", "Geor", "Grek", "Gujr", "Guru", "Hans",
    "Hant", "Hebr", "Jpan", "Khmr", "Knda", "Kore", "Laoo", "Latn", "Mlym", "Mymr", "Orya",
    "Sinh", "Taml", "Telu", "Thaa", "Thai", "Tibt",
];

/// ISO 3166-1 alpha-2 region codes. Sorted.
pub(crate) const REGIONS: &[&str] = &[
    "AE", "AR", "AT", "AU", "BE", "BG", "BR", "CA", "CH", "CL", "CN", "CO", "CZ", "DE", "DK",
    "EE", "EG", "ES", "FI", "FR", "GB", "GR", "HK", "HR", "HU", "ID", "IE", "IL", "IN", "IS",
    "IT", "JP", "KR", "LT", "LV", "MO", "MX", "MY", "NL", "NO", "NZ", "PE", "PH", "PL", "PT",
    "RO", "RS", "RU", "SA", "SE", "SG", "SI", "SK", "TH", "TR", "TW", "UA", "US", "VE", "VN",
    "ZA",
];

/// Look up `code` in a sorted table, returning the table's own static
/// string on a hit so callers never hold onto the input allocation.
pub(crate) fn find(table: &'static [&'static str], code: &str) -> Option<&'static str> {
    table
        .binary_search_by(|entry| entry.cmp(&code))
        .ok()
        .map(|idx| table[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_sorted() {
        for table in [LANGUAGES, SCRIPTS, REGIONS] {
            let mut sorted = table.to_vec();
            sorted.sort_unstable();
            assert_eq!(table, sorted.as_slice());
        }
    }

    #[test]
    fn test_find_known_language() {
        assert_eq!(find(LANGUAGES, "en"), Some("en"));
        assert_eq!(find(LANGUAGES, "zh"), Some("zh"));
    }

    #[test]
    fn test_find_unknown_language() {
        assert_eq!(find(LANGUAGES, "xx"), None);
        assert_eq!(find(LANGUAGES, ""), None);
    }

    #[test]
    fn test_find_is_case_sensitive() {
        // Canonical casing only; normalization happens in the code types.
        assert_eq!(find(LANGUAGES, "EN"), None);
        assert_eq!(find(SCRIPTS, "latn"), None);
        assert_eq!(find(REGIONS, "us"), None);
    }

    #[test]
    fn test_find_known_script_and_region() {
        assert_eq!(find(SCRIPTS, "Hans"), Some("Hans"));
        assert_eq!(find(REGIONS, "US"), Some("US"));
    }
}
