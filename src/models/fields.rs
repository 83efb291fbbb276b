//! Tolerant field decoding for rows coming back from the managed store.
//!
//! The store is loosely typed: skills may arrive as an array or as a string,
//! availability as one date or many, ids as numbers or text. Everything is
//! normalized here so the rest of the crate only ever sees one shape.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Parse a calendar date, discarding any time-of-day suffix.
///
/// Accepts `2024-03-20`, `2024-03-20T10:00:00Z` and `2024-03-20 10:00:00`.
/// The date prefix is taken literally, no timezone conversion is applied.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Canonical availability: ascending, de-duplicated calendar dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability(Vec<NaiveDate>);

impl Availability {
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
        dates.sort_unstable();
        dates.dedup();
        Self(dates)
    }

    /// Build from raw strings, dropping anything that is not a date.
    pub fn from_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_dates(values.into_iter().filter_map(|v| parse_calendar_date(v.as_ref())))
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.0.binary_search(date).is_ok()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Wire shapes seen for availability and skill fields
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<Option<String>>),
}

impl<'de> Deserialize<'de> for Availability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<StringOrList>::deserialize(deserializer)?;
        Ok(match raw {
            None => Availability::default(),
            Some(StringOrList::One(s)) => Availability::from_strings(s.split(',')),
            Some(StringOrList::Many(items)) => Availability::from_strings(items.into_iter().flatten()),
        })
    }
}

impl Serialize for Availability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// Deserialize a skill list from an array, a JSON-encoded array string,
/// a comma-separated string, or null.
///
/// Tags are trimmed, blanks dropped and duplicates removed, keeping the
/// first occurrence.
pub fn deserialize_skills<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<StringOrList>::deserialize(deserializer)?;
    let tags: Vec<String> = match raw {
        None => Vec::new(),
        Some(StringOrList::Many(items)) => items.into_iter().flatten().collect(),
        Some(StringOrList::One(s)) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') {
                serde_json::from_str::<Vec<String>>(trimmed).unwrap_or_default()
            } else {
                trimmed.split(',').map(str::to_string).collect()
            }
        }
    };

    Ok(normalize_skills(tags))
}

pub fn normalize_skills<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut skills: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !skills.iter().any(|s| s == tag) {
            skills.push(tag.to_string());
        }
    }
    skills
}

/// Deserialize an identifier that may be stored as a number or as text.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Uint(n) => n.to_string(),
    })
}

/// Deserialize a counter that may be null or missing.
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

/// Deserialize a nullable column into its default value.
pub fn deserialize_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
