//! Typed request parameters for Last.fm API calls.
//!
//! Every parameter name the client is willing to send is enumerated in
//! [`ParamKey`]. Free-form names coming from the outside (for example the
//! `call` subcommand of the binary) go through [`ParamKey::from_str`], which
//! rejects anything unrecognized before a request is built.

use crate::{LastFmError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Largest page size any Last.fm list endpoint accepts.
pub const MAX_LIMIT: u32 = 1000;

/// Largest number of scrobbles accepted by a single `track.scrobble` call.
pub const MAX_SCROBBLE_BATCH: usize = 50;

/// Largest number of tags accepted by a single `*.addTags` call.
pub const MAX_TAGS: usize = 10;

/// Parameter names recognized by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamKey {
    Method,
    Lang,
    Tag,
    Tags,
    User,
    Sk,
    Country,
    Location,
    NumRes,
    Offset,
    Page,
    Limit,
    Token,
    ApiSig,
    Username,
    Password,
    Artist,
    Album,
    Track,
    Mbid,
    Autocorrect,
    Period,
    Extended,
    Timestamp,
    Duration,
    TrackNumber,
    AlbumArtist,
    ChosenByUser,
}

impl ParamKey {
    pub const ALL: [ParamKey; 28] = [
        ParamKey::Method,
        ParamKey::Lang,
        ParamKey::Tag,
        ParamKey::Tags,
        ParamKey::User,
        ParamKey::Sk,
        ParamKey::Country,
        ParamKey::Location,
        ParamKey::NumRes,
        ParamKey::Offset,
        ParamKey::Page,
        ParamKey::Limit,
        ParamKey::Token,
        ParamKey::ApiSig,
        ParamKey::Username,
        ParamKey::Password,
        ParamKey::Artist,
        ParamKey::Album,
        ParamKey::Track,
        ParamKey::Mbid,
        ParamKey::Autocorrect,
        ParamKey::Period,
        ParamKey::Extended,
        ParamKey::Timestamp,
        ParamKey::Duration,
        ParamKey::TrackNumber,
        ParamKey::AlbumArtist,
        ParamKey::ChosenByUser,
    ];

    /// The wire name of the parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::Method => "method",
            ParamKey::Lang => "lang",
            ParamKey::Tag => "tag",
            ParamKey::Tags => "tags",
            ParamKey::User => "user",
            ParamKey::Sk => "sk",
            ParamKey::Country => "country",
            ParamKey::Location => "location",
            ParamKey::NumRes => "num_res",
            ParamKey::Offset => "offset",
            ParamKey::Page => "page",
            ParamKey::Limit => "limit",
            ParamKey::Token => "token",
            ParamKey::ApiSig => "api_sig",
            ParamKey::Username => "username",
            ParamKey::Password => "password",
            ParamKey::Artist => "artist",
            ParamKey::Album => "album",
            ParamKey::Track => "track",
            ParamKey::Mbid => "mbid",
            ParamKey::Autocorrect => "autocorrect",
            ParamKey::Period => "period",
            ParamKey::Extended => "extended",
            ParamKey::Timestamp => "timestamp",
            ParamKey::Duration => "duration",
            ParamKey::TrackNumber => "trackNumber",
            ParamKey::AlbumArtist => "albumArtist",
            ParamKey::ChosenByUser => "chosenByUser",
        }
    }

    /// Whether the presence of this key means the request must be signed and POSTed.
    pub fn is_auth(&self) -> bool {
        matches!(self, ParamKey::Sk | ParamKey::Token | ParamKey::Password)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamKey {
    type Err = LastFmError;

    fn from_str(s: &str) -> Result<Self> {
        ParamKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| LastFmError::Validation(format!("Unrecognized parameter '{s}'")))
    }
}

/// Who a user-scoped request is about.
///
/// Last.fm accepts either a public username or, for private data, an
/// authenticated session key. A session key turns the request into a signed POST.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserKey {
    Username(String),
    SessionKey(String),
}

impl UserKey {
    pub fn username(name: impl Into<String>) -> Self {
        UserKey::Username(name.into())
    }

    pub fn session_key(sk: impl Into<String>) -> Self {
        UserKey::SessionKey(sk.into())
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserKey::Username(name) => f.write_str(name),
            // Session keys are credentials
            UserKey::SessionKey(_) => f.write_str("<session>"),
        }
    }
}

/// Something a `*.get*` lookup can identify either by name or by MusicBrainz ID.
pub trait Lookup {
    /// Add the identifying parameters to `params`.
    fn write(&self, params: &mut RequestParams);
}

/// An artist, by name or MBID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtistRef {
    Name(String),
    Mbid(String),
}

impl ArtistRef {
    pub fn name(artist: impl Into<String>) -> Self {
        ArtistRef::Name(artist.into())
    }

    pub fn mbid(mbid: impl Into<String>) -> Self {
        ArtistRef::Mbid(mbid.into())
    }
}

impl Lookup for ArtistRef {
    fn write(&self, params: &mut RequestParams) {
        match self {
            ArtistRef::Name(artist) => params.set(ParamKey::Artist, artist),
            ArtistRef::Mbid(mbid) => params.set(ParamKey::Mbid, mbid),
        }
    }
}

/// An album, by artist and title or by MBID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlbumRef {
    Name { artist: String, album: String },
    Mbid(String),
}

impl AlbumRef {
    pub fn name(artist: impl Into<String>, album: impl Into<String>) -> Self {
        AlbumRef::Name {
            artist: artist.into(),
            album: album.into(),
        }
    }

    pub fn mbid(mbid: impl Into<String>) -> Self {
        AlbumRef::Mbid(mbid.into())
    }
}

impl Lookup for AlbumRef {
    fn write(&self, params: &mut RequestParams) {
        match self {
            AlbumRef::Name { artist, album } => {
                params.set(ParamKey::Artist, artist);
                params.set(ParamKey::Album, album);
            }
            AlbumRef::Mbid(mbid) => params.set(ParamKey::Mbid, mbid),
        }
    }
}

/// A track, by artist and title or by MBID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackRef {
    Name { artist: String, track: String },
    Mbid(String),
}

impl TrackRef {
    pub fn name(artist: impl Into<String>, track: impl Into<String>) -> Self {
        TrackRef::Name {
            artist: artist.into(),
            track: track.into(),
        }
    }

    pub fn mbid(mbid: impl Into<String>) -> Self {
        TrackRef::Mbid(mbid.into())
    }
}

impl Lookup for TrackRef {
    fn write(&self, params: &mut RequestParams) {
        match self {
            TrackRef::Name { artist, track } => {
                params.set(ParamKey::Artist, artist);
                params.set(ParamKey::Track, track);
            }
            TrackRef::Mbid(mbid) => params.set(ParamKey::Mbid, mbid),
        }
    }
}

/// Parameters for a single Last.fm API call.
///
/// Keys are kept in a sorted map so iteration order is the lexicographic order
/// used by the request signature.
///
/// # Examples
///
/// ```rust
/// use lastfm_helper::params::{ParamKey, RequestParams};
///
/// let params = RequestParams::new("track.love")
///     .with(ParamKey::Artist, "Cher")
///     .with(ParamKey::Track, "Believe")
///     .with(ParamKey::Sk, "d580d57f32848f5dcf574d1ce18d78b2");
///
/// assert_eq!(params.method(), "track.love");
/// assert!(params.requires_auth());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestParams {
    fields: BTreeMap<String, String>,
}

impl RequestParams {
    pub fn new(method: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(ParamKey::Method.as_str().to_string(), method.into());
        Self { fields }
    }

    pub fn method(&self) -> &str {
        self.get(ParamKey::Method).unwrap_or_default()
    }

    pub fn with(mut self, key: ParamKey, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Like [`with`](Self::with) but skips `None`.
    pub fn with_opt<V: ToString>(mut self, key: ParamKey, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    /// Add the parameter identifying `user`.
    ///
    /// A username goes into `name_key` (`user` for `user.*` methods, `username`
    /// for the `*.getInfo` lookups); a session key always goes into `sk`.
    pub fn with_user(self, user: &UserKey, name_key: ParamKey) -> Self {
        match user {
            UserKey::Username(name) => self.with(name_key, name),
            UserKey::SessionKey(sk) => self.with(ParamKey::Sk, sk),
        }
    }

    /// Identify the subject of a lookup by name or MBID.
    pub fn with_lookup(mut self, lookup: &impl Lookup) -> Self {
        lookup.write(&mut self);
        self
    }

    /// Send `autocorrect=1` when `enabled`; Last.fm defaults to no correction.
    pub fn with_autocorrect(self, enabled: bool) -> Self {
        self.with_opt(ParamKey::Autocorrect, enabled.then_some(1))
    }

    pub fn set(&mut self, key: ParamKey, value: impl ToString) {
        self.fields
            .insert(key.as_str().to_string(), value.to_string());
    }

    /// Set an array-style parameter such as `artist[3]`, used by batch methods.
    pub fn set_indexed(&mut self, key: ParamKey, index: usize, value: impl ToString) {
        self.fields
            .insert(format!("{}[{index}]", key.as_str()), value.to_string());
    }

    pub fn get(&self, key: ParamKey) -> Option<&str> {
        self.fields.get(key.as_str()).map(String::as_str)
    }

    pub fn contains(&self, key: ParamKey) -> bool {
        self.fields.contains_key(key.as_str())
    }

    pub fn remove(&mut self, key: ParamKey) -> Option<String> {
        self.fields.remove(key.as_str())
    }

    /// Whether any of `sk`, `token` or `password` is present.
    pub fn requires_auth(&self) -> bool {
        ParamKey::ALL
            .iter()
            .filter(|key| key.is_auth())
            .any(|key| self.contains(*key))
    }

    /// Iterate over `(name, value)` pairs in lexicographic name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a `name=value` argument, rejecting unknown names.
    pub fn parse_pair(pair: &str) -> Result<(ParamKey, String)> {
        let (name, value) = pair.split_once('=').ok_or_else(|| {
            LastFmError::Validation(format!("Expected name=value, got '{pair}'"))
        })?;
        Ok((name.trim().parse()?, value.to_string()))
    }
}

/// Reject a limit outside `1..=max` before anything is dispatched.
pub fn check_limit(limit: Option<u32>, max: u32) -> Result<()> {
    match limit {
        Some(limit) if limit < 1 || limit > max => Err(LastFmError::Validation(format!(
            "Limit out of bounds (1-{max}), {limit} passed"
        ))),
        _ => Ok(()),
    }
}

/// Reject an empty or oversized tag list for `*.addTags`.
pub fn check_tag_count(count: usize, max: usize) -> Result<()> {
    if count < 1 || count > max {
        return Err(LastFmError::Validation(format!(
            "Tag count out of bounds (1-{max}), {count} passed"
        )));
    }
    Ok(())
}

/// Reject an empty or oversized scrobble batch.
pub fn check_scrobble_count(count: usize, max: usize) -> Result<()> {
    if count < 1 || count > max {
        return Err(LastFmError::Validation(format!(
            "Scrobble count out of bounds (1-{max}), {count} passed"
        )));
    }
    Ok(())
}
