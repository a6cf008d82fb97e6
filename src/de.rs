//! Lenient deserializers for Last.fm's JSON quirks.
//!
//! Last.fm serializes numbers as strings, collapses one-element lists into a
//! bare object, and returns `""` in place of empty tag collections.

use serde::de::{self, Deserializer, IgnoredAny};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

fn parse_number<E: de::Error>(raw: NumberOrString) -> Result<Option<u64>, E> {
    match raw {
        NumberOrString::Number(n) => Ok(Some(n)),
        NumberOrString::String(s) if s.trim().is_empty() => Ok(None),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| E::custom(format!("expected a number, got '{s}'"))),
    }
}

/// `"123"` or `123` → `123`; an empty string is `0`.
pub fn number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = NumberOrString::deserialize(deserializer)?;
    Ok(parse_number::<D::Error>(raw)?.unwrap_or(0))
}

/// Like [`number`], but `null` and `""` become `None`.
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(raw) => parse_number(raw),
        None => Ok(None),
    }
}

/// A list, or a single bare element standing in for a one-element list.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

/// Tag names from `{"tag": [...]}`, `{"tag": {...}}` or `""`.
pub fn tag_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Tag {
        name: String,
    }

    #[derive(Deserialize)]
    struct Tags {
        #[serde(default, deserialize_with = "one_or_many")]
        tag: Vec<Tag>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTags {
        Tags(Tags),
        Other(IgnoredAny),
    }

    Ok(match RawTags::deserialize(deserializer)? {
        RawTags::Tags(tags) => tags.tag.into_iter().map(|t| t.name).collect(),
        RawTags::Other(_) => Vec::new(),
    })
}

/// `"1"`/`"true"`/`1`/`true` → `true`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Number(u64),
        String(String),
    }

    Ok(match Option::<RawFlag>::deserialize(deserializer)? {
        Some(RawFlag::Bool(b)) => b,
        Some(RawFlag::Number(n)) => n != 0,
        Some(RawFlag::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        None => false,
    })
}
