//! Data types for Last.fm music metadata and the derived analytics.
//!
//! Wire-level response envelopes live in [`crate::api`]; the types here are
//! what callers receive.

use crate::de;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::LastFmError;

// ================================================================================================
// SHARED METADATA
// ================================================================================================

/// Artwork reference in one of Last.fm's fixed sizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image {
    /// `small`, `medium`, `large`, `extralarge` or `mega`
    #[serde(default)]
    pub size: String,
    /// Image URL (may be empty)
    #[serde(rename = "#text", default)]
    pub url: String,
}

/// Aggregation window for `user.getTop*` methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "overall")]
    Overall,
    #[serde(rename = "7day")]
    Week,
    #[serde(rename = "1month")]
    Month,
    #[serde(rename = "3month")]
    Quarter,
    #[serde(rename = "6month")]
    HalfYear,
    #[serde(rename = "12month")]
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Overall => "overall",
            Period::Week => "7day",
            Period::Month => "1month",
            Period::Quarter => "3month",
            Period::HalfYear => "6month",
            Period::Year => "12month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = LastFmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overall" => Ok(Period::Overall),
            "7day" => Ok(Period::Week),
            "1month" => Ok(Period::Month),
            "3month" => Ok(Period::Quarter),
            "6month" => Ok(Period::HalfYear),
            "12month" => Ok(Period::Year),
            other => Err(LastFmError::Validation(format!(
                "Unknown period '{other}' (expected overall, 7day, 1month, 3month, 6month or 12month)"
            ))),
        }
    }
}

// ================================================================================================
// RECENT TRACKS
// ================================================================================================

/// One entry of a user's play history, newest first.
///
/// # Examples
///
/// ```rust
/// use lastfm_helper::RecentTrack;
///
/// let track = RecentTrack {
///     name: "Believe".to_string(),
///     artist: "Cher".to_string(),
///     album: Some("Believe".to_string()),
///     url: "https://www.last.fm/music/Cher/_/Believe".to_string(),
///     image: vec![],
///     nowplaying: false,
///     timestamp: Some(1640995200),
/// };
///
/// if let Some(date) = track.scrobbled_at() {
///     println!("{} played at {}", track.name, date.format("%Y-%m-%d %H:%M:%S UTC"));
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecentTrack {
    pub name: String,
    pub artist: String,
    /// Album name; `None` when Last.fm reports an empty album
    pub album: Option<String>,
    pub url: String,
    pub image: Vec<Image>,
    /// The play is in progress rather than a completed scrobble
    pub nowplaying: bool,
    /// Unix timestamp of the scrobble; absent for the now-playing entry
    pub timestamp: Option<u64>,
}

impl RecentTrack {
    pub fn scrobbled_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .and_then(|ts| DateTime::from_timestamp(ts as i64, 0))
    }

    /// Album name as used for streak comparison, empty when absent.
    pub fn album_name(&self) -> &str {
        self.album.as_deref().unwrap_or_default()
    }
}

/// A page of a user's play history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentTracksPage {
    /// Entries on this page; a leading now-playing entry is kept
    pub tracks: Vec<RecentTrack>,
    /// Current page number (1-indexed)
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    /// Total number of scrobbles in the history
    pub total: u64,
}

impl RecentTracksPage {
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

// ================================================================================================
// TOP ARTISTS AND THEIR INTERSECTION
// ================================================================================================

/// An artist from a user's top-artists chart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopArtist {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(deserialize_with = "de::number")]
    pub playcount: u64,
}

/// An artist present in both users' charts, with each user's playcount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SharedArtist {
    pub name: String,
    pub url: String,
    /// Playcounts in argument order: `[first user, second user]`
    pub playcounts: [u64; 2],
}

// ================================================================================================
// COMBO
// ================================================================================================

/// One dimension of a listening streak.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Streak {
    /// The artist, album or track name the streak is about
    pub name: String,
    /// Number of consecutive most-recent completed plays matching `name`
    pub combo: u32,
}

/// Result of a streak scan over a user's recent plays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboResult {
    pub artist: Streak,
    pub album: Streak,
    pub track: Streak,
    /// The most recent entry was a play in progress
    pub nowplaying: bool,
    /// Artwork of the most recent entry
    pub image: Vec<Image>,
}

// ================================================================================================
// NOW PLAYING
// ================================================================================================

/// The detail lookups the now-playing aggregator can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailKind {
    Artist,
    Album,
    Track,
}

impl FromStr for DetailKind {
    type Err = LastFmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artist" => Ok(DetailKind::Artist),
            "album" => Ok(DetailKind::Album),
            "track" => Ok(DetailKind::Track),
            other => Err(LastFmError::Validation(format!(
                "Unknown detail kind '{other}' (expected artist, album or track)"
            ))),
        }
    }
}

/// Outcome of one best-effort detail lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail<T> {
    pub successful: bool,
    pub data: Option<T>,
}

impl<T> Detail<T> {
    pub fn success(data: T) -> Self {
        Self {
            successful: true,
            data: Some(data),
        }
    }

    /// A lookup that failed or was never attempted.
    pub fn missing() -> Self {
        Self {
            successful: false,
            data: None,
        }
    }
}

impl<T> Default for Detail<T> {
    fn default() -> Self {
        Self::missing()
    }
}

/// `artist.getInfo` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistInfo {
    pub name: String,
    #[serde(default)]
    pub mbid: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: Vec<Image>,
    #[serde(default)]
    pub stats: ArtistStats,
    #[serde(default, deserialize_with = "de::tag_names")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub bio: Option<Bio>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistStats {
    #[serde(default, deserialize_with = "de::optional_number")]
    pub listeners: Option<u64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub playcount: Option<u64>,
    /// Present when the lookup was made on behalf of a user
    #[serde(default, deserialize_with = "de::optional_number")]
    pub userplaycount: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bio {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
}

/// `album.getInfo` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumInfo {
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub mbid: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: Vec<Image>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub listeners: Option<u64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub playcount: Option<u64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub userplaycount: Option<u64>,
    #[serde(default, deserialize_with = "de::tag_names")]
    pub tags: Vec<String>,
}

/// `track.getInfo` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub name: String,
    #[serde(default)]
    pub mbid: Option<String>,
    #[serde(default)]
    pub url: String,
    /// Duration in milliseconds
    #[serde(default, deserialize_with = "de::optional_number")]
    pub duration: Option<u64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub listeners: Option<u64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub playcount: Option<u64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub userplaycount: Option<u64>,
    #[serde(default, deserialize_with = "de::flag")]
    pub userloved: bool,
    #[serde(default)]
    pub artist: Option<TrackArtist>,
    #[serde(default, rename = "toptags", deserialize_with = "de::tag_names")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Base fields of the most recent play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentPlay {
    pub artist: String,
    pub album: Option<String>,
    pub track: String,
    pub image: Vec<Image>,
    pub url: String,
    pub nowplaying: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingDetails {
    pub artist: Detail<ArtistInfo>,
    pub album: Detail<AlbumInfo>,
    pub track: Detail<TrackInfo>,
}

/// The most recent play plus whichever detail lookups were requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub recent: RecentPlay,
    pub details: NowPlayingDetails,
}

// ================================================================================================
// SCROBBLING AND AUTH
// ================================================================================================

/// A completed play to submit with `track.scrobble`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scrobble {
    pub artist: String,
    pub track: String,
    /// When the play started
    pub timestamp: DateTime<Utc>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track_number: Option<u32>,
    /// Duration in seconds
    pub duration: Option<u32>,
    pub mbid: Option<String>,
    /// Whether the user picked the track rather than e.g. a radio stream
    pub chosen_by_user: Option<bool>,
}

impl Scrobble {
    pub fn new(
        artist: impl Into<String>,
        track: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            artist: artist.into(),
            track: track.into(),
            timestamp,
            album: None,
            album_artist: None,
            track_number: None,
            duration: None,
            mbid: None,
            chosen_by_user: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }
}

/// Optional metadata for `track.updateNowPlaying`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlayingUpdate {
    pub album: Option<String>,
    pub track_number: Option<u32>,
    pub mbid: Option<String>,
    /// Duration in seconds
    pub duration: Option<u32>,
    pub album_artist: Option<String>,
}

/// An authenticated web-service session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Username the session belongs to
    pub name: String,
    /// Session key to pass as `sk`
    pub key: String,
    #[serde(default, deserialize_with = "de::flag")]
    pub subscriber: bool,
}
