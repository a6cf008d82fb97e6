//! Wire-level response envelopes and their conversion into crate types.

use crate::de;
use crate::types::{Image, RecentTrack, RecentTracksPage, TopArtist};
use crate::{LastFmError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Pull `field` out of a success payload and deserialize it.
///
/// A missing or mistyped field means Last.fm answered with something other
/// than the documented shape, which is reported as [`LastFmError::Protocol`].
pub fn take_field<T: DeserializeOwned>(mut value: Value, field: &str) -> Result<T> {
    let inner = value
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| LastFmError::Protocol(format!("response is missing '{field}'")))?;

    serde_json::from_value(inner)
        .map_err(|e| LastFmError::Protocol(format!("unexpected '{field}' payload: {e}")))
}

#[derive(Deserialize)]
pub struct ApiRecentTracks {
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub track: Vec<ApiTrack>,
    #[serde(rename = "@attr")]
    pub attr: ApiPaginationAttr,
}

#[derive(Deserialize)]
pub struct ApiTrack {
    pub name: String,
    pub artist: ApiTextField,
    #[serde(default)]
    pub album: Option<ApiTextField>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: Vec<Image>,
    pub date: Option<ApiDate>,
    #[serde(rename = "@attr")]
    pub attr: Option<ApiTrackAttr>,
}

/// A `{"#text": ...}` object; extended responses use `name` instead.
#[derive(Deserialize)]
pub struct ApiTextField {
    #[serde(rename = "#text", alias = "name", default)]
    pub text: String,
}

#[derive(Deserialize)]
pub struct ApiDate {
    #[serde(deserialize_with = "de::number")]
    pub uts: u64,
}

#[derive(Deserialize)]
pub struct ApiTrackAttr {
    #[serde(default, deserialize_with = "de::flag")]
    pub nowplaying: bool,
}

#[derive(Deserialize)]
pub struct ApiPaginationAttr {
    #[serde(default, deserialize_with = "de::number")]
    pub page: u64,
    #[serde(rename = "perPage", default, deserialize_with = "de::number")]
    pub per_page: u64,
    #[serde(rename = "totalPages", default, deserialize_with = "de::number")]
    pub total_pages: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub total: u64,
}

impl From<ApiTrack> for RecentTrack {
    fn from(t: ApiTrack) -> Self {
        let album = t
            .album
            .map(|a| a.text)
            .filter(|name| !name.is_empty());

        RecentTrack {
            name: t.name,
            artist: t.artist.text,
            album,
            url: t.url,
            image: t.image,
            nowplaying: t.attr.map(|a| a.nowplaying).unwrap_or(false),
            timestamp: t.date.map(|d| d.uts),
        }
    }
}

/// Parse a `user.getRecentTracks` payload.
pub fn parse_recent_tracks(value: Value) -> Result<RecentTracksPage> {
    let recent: ApiRecentTracks = take_field(value, "recenttracks")?;
    let attr = recent.attr;

    Ok(RecentTracksPage {
        tracks: recent.track.into_iter().map(RecentTrack::from).collect(),
        page: attr.page.max(1) as u32,
        per_page: attr.per_page as u32,
        total_pages: attr.total_pages as u32,
        total: attr.total,
    })
}

#[derive(Deserialize)]
struct ApiTopArtists {
    #[serde(default, deserialize_with = "de::one_or_many")]
    artist: Vec<TopArtist>,
}

/// Parse a `user.getTopArtists` payload.
pub fn parse_top_artists(value: Value) -> Result<Vec<TopArtist>> {
    let top: ApiTopArtists = take_field(value, "topartists")?;
    Ok(top.artist)
}

#[derive(Deserialize)]
struct ApiTags(#[serde(deserialize_with = "de::tag_names")] Vec<String>);

/// Parse an `artist.getTags`/`track.getTags` payload into tag names.
pub fn parse_tags(value: Value) -> Result<Vec<String>> {
    let tags: ApiTags = take_field(value, "tags")?;
    Ok(tags.0)
}

/// Pull the suggestion out of a `*.getCorrection` payload.
///
/// Last.fm answers with a blank `corrections` string when it has nothing to suggest.
pub fn parse_correction(mut value: Value) -> Option<Value> {
    value
        .get_mut("corrections")?
        .get_mut("correction")
        .map(Value::take)
}
