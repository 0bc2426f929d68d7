//! # Month keys and the month index
//!
//! Each thread's posts are stored in one file per month, named by a
//! [`MonthKey`] such as `2014-03`. [`MonthList`] orders the available
//! months for the month selector, newest first.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::prelude::*;

use crate::{Result, prelude::*};

/// Identifies one month's dataset, `yyyy-mm`.
///
/// Parsing accepts a one or two digit month (`2014-3` or `2014-03`);
/// display is always zero-padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Constructs a month key. Returns `InvalidMonth` if month is not in 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        ensure!(
            (1..=12).contains(&month) && (1000..=9999).contains(&year),
            InvalidMonthSnafu {
                input: format!("{year}-{month}"),
            }
        );
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Human readable label, for example "March 2014"
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|date| date.format("%B %Y").to_string())
            .unwrap_or_else(|| self.to_string())
    }

    /// File name of this month's data file
    pub fn file_name(&self) -> String {
        format!("{self}.json")
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = HnMappedError;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = || InvalidMonthSnafu {
            input: input.to_string(),
        };
        let (year, month) = input.trim().split_once('-').context(invalid())?;
        ensure!(
            year.len() == 4 && matches!(month.len(), 1 | 2),
            invalid()
        );
        let year = year.parse::<i32>().ok().context(invalid())?;
        let month = month.parse::<u32>().ok().context(invalid())?;
        Self::new(year, month).map_err(|_| invalid().build())
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// One entry of the month selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthEntry {
    pub key: MonthKey,
    pub label: String,
}

/// Available months, newest first.
#[derive(Debug, Clone, Default)]
pub struct MonthList {
    entries: Vec<MonthEntry>,
}

impl MonthList {
    /// Builds the list from months in any order. Duplicates are removed.
    pub fn new(months: impl IntoIterator<Item = MonthKey>) -> Self {
        let mut keys: Vec<MonthKey> = months.into_iter().collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        keys.dedup();
        Self {
            entries: keys
                .into_iter()
                .map(|key| MonthEntry {
                    label: key.label(),
                    key,
                })
                .collect(),
        }
    }

    /// The most recent month, used when no month was requested.
    pub fn latest(&self) -> Option<&MonthKey> {
        self.entries.first().map(|entry| &entry.key)
    }

    pub fn contains(&self, month: &MonthKey) -> bool {
        self.entries.iter().any(|entry| &entry.key == month)
    }

    pub fn entries(&self) -> &[MonthEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() -> Result<()> {
        let month: MonthKey = "2014-03".parse()?;
        assert_eq!(month.to_string(), "2014-03");
        assert_eq!(month.year(), 2014);
        assert_eq!(month.month(), 3);

        // one digit month, as written by the thread finder
        let month: MonthKey = "2014-3".parse()?;
        assert_eq!(month.to_string(), "2014-03");
        assert_eq!(month.file_name(), "2014-03.json");
        Ok(())
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "2014", "2014-13", "2014-00", "14-03", "2014-003", "abcd-ef", "2014/03"] {
            assert!(bad.parse::<MonthKey>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_label() -> Result<()> {
        assert_eq!(MonthKey::new(2014, 1)?.label(), "January 2014");
        assert_eq!(MonthKey::new(2023, 12)?.label(), "December 2023");
        Ok(())
    }

    #[test]
    fn test_month_list_newest_first() -> Result<()> {
        let list = MonthList::new([
            MonthKey::new(2014, 2)?,
            MonthKey::new(2013, 12)?,
            MonthKey::new(2014, 10)?,
            MonthKey::new(2014, 2)?,
        ]);
        let keys: Vec<String> = list.entries().iter().map(|e| e.key.to_string()).collect();
        assert_eq!(keys, ["2014-10", "2014-02", "2013-12"]);
        assert_eq!(list.latest(), Some(&MonthKey::new(2014, 10)?));
        assert_eq!(list.entries()[0].label, "October 2014");
        assert!(MonthList::default().latest().is_none());
        Ok(())
    }

    #[test]
    fn test_serde_as_string() -> Result<()> {
        let month = MonthKey::new(2015, 6)?;
        let json = serde_json::to_string(&month).expect("serialize");
        assert_eq!(json, "\"2015-06\"");
        let back: MonthKey = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, month);
        Ok(())
    }
}
