use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::{macros::format_description, Date};

/// Canonical `YYYY-MM-DD` form of a date, used to look up entries.  Two
/// dates share an entry iff their keys are equal.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct DateKey(Date);

impl DateKey {
    pub(crate) fn date(self) -> Date {
        self.0
    }
}

impl From<Date> for DateKey {
    fn from(date: Date) -> DateKey {
        DateKey(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self.0.year();
        let sign = if year < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{:04}-{:02}-{:02}",
            year.unsigned_abs(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl FromStr for DateKey {
    type Err = ParseDateKeyError;

    /// Only the exact form produced by `Display` is accepted, so that every
    /// date has a single spelling in the journal.
    fn from_str(s: &str) -> Result<DateKey, ParseDateKeyError> {
        let key = Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map(DateKey)
            .map_err(|source| ParseDateKeyError::Invalid {
                input: s.to_owned(),
                source,
            })?;
        if key.to_string() == s {
            Ok(key)
        } else {
            Err(ParseDateKeyError::NonCanonical {
                input: s.to_owned(),
                canonical: key.to_string(),
            })
        }
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<DateKey, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateKey>().map_err(de::Error::custom)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ParseDateKeyError {
    #[error("invalid date {input:?}; expected YYYY-MM-DD")]
    Invalid {
        input: String,
        source: time::error::Parse,
    },
    #[error("date {input:?} is not written as {canonical:?}")]
    NonCanonical { input: String, canonical: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_display_zero_pads() {
        assert_eq!(DateKey::from(date!(2024 - 03 - 07)).to_string(), "2024-03-07");
        assert_eq!(DateKey::from(date!(2024 - 12 - 31)).to_string(), "2024-12-31");
        assert_eq!(DateKey::from(date!(987 - 01 - 02)).to_string(), "0987-01-02");
        assert_eq!(DateKey::from(date!(-44 - 03 - 15)).to_string(), "-0044-03-15");
    }

    #[test]
    fn test_parse() {
        let key = "2024-03-07".parse::<DateKey>().unwrap();
        assert_eq!(key.date(), date!(2024 - 03 - 07));
        assert_eq!(key.to_string(), "2024-03-07");
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        for s in [
            "2024-3-7",
            "2024-03-7",
            "2024/03/07",
            "2024-02-30",
            "2024-13-01",
            "2024-03-07T00:00",
            "+2024-03-07",
            " 2024-03-07",
            "",
            "yesterday",
        ] {
            assert!(s.parse::<DateKey>().is_err(), "{s:?} should not parse");
        }
    }

    #[test]
    fn test_distinct_dates_make_distinct_keys() {
        let mut seen = std::collections::HashSet::new();
        let mut date = date!(2023 - 12 - 01);
        while date < date!(2025 - 02 - 01) {
            let key = DateKey::from(date).to_string();
            assert_eq!(key.len(), 10);
            assert!(seen.insert(key), "duplicate key for {date}");
            date = date.next_day().unwrap();
        }
    }

    #[test]
    fn test_serde_as_string() {
        let key = DateKey::from(date!(2024 - 03 - 07));
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""2024-03-07""#);
        let back = serde_json::from_str::<DateKey>(r#""2024-03-07""#).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<DateKey>(r#""2024-3-7""#).is_err());
    }

    #[test]
    fn test_signed_year_must_be_canonical() {
        let e = "+2024-03-07".parse::<DateKey>().unwrap_err();
        assert!(matches!(e, ParseDateKeyError::NonCanonical { .. }));
        assert_eq!(
            e.to_string(),
            r#"date "+2024-03-07" is not written as "2024-03-07""#
        );
        let key = "-0044-03-15".parse::<DateKey>().unwrap();
        assert_eq!(key.date(), date!(-44 - 03 - 15));
    }
}
