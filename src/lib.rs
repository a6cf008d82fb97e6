//! # lastfm-helper
//!
//! An async client for the Last.fm web service with a few derived analytics:
//! current listening streaks, a now-playing view with metadata, and the
//! artists two users have in common.
//!
//! Requests go through a [`Dispatcher`], which picks GET or signed POST per
//! call and turns every failure into a [`LastFmError`].

pub mod api;
pub mod client;
pub mod combo;
pub mod config;
mod de;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod intersect;
pub mod now_playing;
pub mod params;
pub mod types;

pub use client::LastFmClient;
pub use config::ClientConfig;
pub use dispatcher::{ApiDispatch, Dispatcher};
pub use error::LastFmError;
pub use events::{ClientEvent, ClientEventReceiver, RequestInfo, SharedEventBroadcaster};
pub use params::{AlbumRef, ArtistRef, Lookup, ParamKey, RequestParams, TrackRef, UserKey};
pub use types::{
    AlbumInfo, ArtistInfo, ComboResult, Detail, DetailKind, Image, NowPlaying, NowPlayingDetails,
    NowPlayingUpdate, Period, RecentPlay, RecentTrack, RecentTracksPage, Scrobble, Session,
    SharedArtist, Streak, TopArtist, TrackInfo,
};

#[cfg(feature = "mock")]
pub use dispatcher::MockApiDispatch;

pub type Result<T> = std::result::Result<T, LastFmError>;
