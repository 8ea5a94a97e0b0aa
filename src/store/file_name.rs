//! Naming of dataset cache files: `{key}_{firstDate}_{lastDate}.json`, where the
//! dates are the API's `yyyy-MM-dd HH:mm:ss` with `:` removed and the space
//! turned into `_`.

use chrono::NaiveDateTime;

const FILE_EXTENSION: &str = ".json";
const SANITIZED_DATE_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// `"2024-01-02 10:00:00"` becomes `"2024-01-02_100000"`.
pub fn sanitize_timestamp(date: &str) -> String {
    date.replace(':', "").replace(' ', "_")
}

/// Makes a key or location usable as a single path component.
pub fn sanitize_component(name: &str) -> String {
    let cleaned = name.replace(['/', '\\'], "-");
    match cleaned.trim() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// File name for a dataset whose first and last records carry the given dates.
pub fn dataset_file_name(key: &str, first_date: &str, last_date: &str) -> String {
    format!(
        "{}_{}_{}{}",
        sanitize_component(key),
        sanitize_timestamp(first_date),
        sanitize_timestamp(last_date),
        FILE_EXTENSION
    )
}

/// A dataset cache file name taken apart again.
///
/// `first` and `last` follow the record order of the saved payload, which is
/// newest first for data coming from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheFileName {
    pub key: String,
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

impl CacheFileName {
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(FILE_EXTENSION)?;
        // Split from the right: keys may contain underscores, dates never do.
        let mut parts = stem.rsplitn(5, '_');
        let last_time = parts.next()?;
        let last_day = parts.next()?;
        let first_time = parts.next()?;
        let first_day = parts.next()?;
        let key = parts.next()?;

        let parse = |day: &str, time: &str| {
            NaiveDateTime::parse_from_str(&format!("{}_{}", day, time), SANITIZED_DATE_FORMAT).ok()
        };
        Some(CacheFileName {
            key: key.to_string(),
            first: parse(first_day, first_time)?,
            last: parse(last_day, last_time)?,
        })
    }

    pub fn earliest(&self) -> NaiveDateTime {
        self.first.min(self.last)
    }

    pub fn latest(&self) -> NaiveDateTime {
        self.first.max(self.last)
    }

    /// `"PM10, from 2024-01-01 10:00 to 2024-01-02 09:00"`, for a cache browser.
    pub fn label(&self) -> String {
        format!(
            "{}, from {} to {}",
            self.key,
            self.earliest().format("%Y-%m-%d %H:%M"),
            self.latest().format("%Y-%m-%d %H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_timestamp() {
        assert_eq!(sanitize_timestamp("2024-01-02 10:00:00"), "2024-01-02_100000");
    }

    #[test]
    fn test_dataset_file_name() {
        assert_eq!(
            dataset_file_name("PM10", "2024-01-02 10:00:00", "2024-01-01 11:00:00"),
            "PM10_2024-01-02_100000_2024-01-01_110000.json"
        );
        assert_eq!(
            dataset_file_name("a/b", "2024-01-02 10:00:00", "2024-01-02 10:00:00"),
            "a-b_2024-01-02_100000_2024-01-02_100000.json"
        );
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("Łódź, Łódź, ŁÓDZKIE, ul. Czernika"), "Łódź, Łódź, ŁÓDZKIE, ul. Czernika");
        assert_eq!(sanitize_component("../etc"), "..-etc");
        assert_eq!(sanitize_component(".."), "_");
        assert_eq!(sanitize_component("  "), "_");
    }

    #[test]
    fn test_parse_and_label() {
        let name = CacheFileName::parse("PM2.5_2024-01-02_100000_2024-01-01_110000.json").unwrap();
        assert_eq!(name.key, "PM2.5");
        assert!(name.first > name.last);
        assert_eq!(name.label(), "PM2.5, from 2024-01-01 11:00 to 2024-01-02 10:00");

        let with_underscore =
            CacheFileName::parse("my_key_2024-01-01_000000_2024-01-01_230000.json").unwrap();
        assert_eq!(with_underscore.key, "my_key");

        assert!(CacheFileName::parse("citySearchData.json").is_none());
        assert!(CacheFileName::parse("PM10_2024-01-02_100000_2024-01-01_110000.txt").is_none());
    }
}
