use crate::api::{parse_correction, parse_recent_tracks, parse_tags, parse_top_artists, take_field};
use crate::config::ClientConfig;
use crate::dispatcher::{ApiDispatch, Dispatcher};
use crate::events::{ClientEvent, ClientEventReceiver};
use crate::params::{check_limit, check_scrobble_count, check_tag_count};
use crate::params::{AlbumRef, ArtistRef, ParamKey, RequestParams, TrackRef, UserKey};
use crate::params::{MAX_LIMIT, MAX_SCROBBLE_BATCH, MAX_TAGS};
use crate::types::{
    AlbumInfo, ArtistInfo, ComboResult, DetailKind, NowPlaying, NowPlayingUpdate, Period,
    RecentTracksPage, Scrobble, Session, SharedArtist, TopArtist, TrackInfo,
};
use crate::{combo, intersect, now_playing, Result};
use http_client::HttpClient;
use serde_json::Value;

/// Main client for the Last.fm web service.
///
/// Every resource method builds one [`RequestParams`], hands it to the
/// dispatcher and unwraps the documented field of the response. The client is
/// generic over [`ApiDispatch`] so the HTTP layer can be swapped out.
///
/// # Examples
///
/// ```rust,no_run
/// use lastfm_helper::{ClientConfig, LastFmClient, Result, UserKey};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let http_client = http_client::native::NativeClient::new();
///     let config = ClientConfig::new("api-key", "api-secret");
///     let client = LastFmClient::new(Box::new(http_client), &config)?;
///
///     let page = client
///         .user_recent_tracks_page(&UserKey::username("rj"), 10, 1)
///         .await?;
///     for track in page.tracks {
///         println!("{} - {}", track.artist, track.name);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct LastFmClient<D: ApiDispatch = Dispatcher> {
    dispatcher: D,
}

impl LastFmClient<Dispatcher> {
    /// Create a client on top of any [`HttpClient`] implementation.
    pub fn new(client: Box<dyn HttpClient + Send + Sync>, config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_dispatcher(Dispatcher::new(client, config)?))
    }

    /// Create a client from the `LASTFM_*` environment variables using the
    /// native HTTP client.
    #[cfg(feature = "curl")]
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        Self::new(Box::new(http_client::native::NativeClient::new()), &config)
    }

    /// Subscribe to request lifecycle events.
    pub fn subscribe(&self) -> ClientEventReceiver {
        self.dispatcher.subscribe()
    }

    /// The most recent request event, if any request has been made.
    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.dispatcher.latest_event()
    }
}

impl<D: ApiDispatch> LastFmClient<D> {
    pub fn with_dispatcher(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Dispatch arbitrary parameters and return the raw JSON payload.
    pub async fn call(&self, params: RequestParams) -> Result<Value> {
        self.dispatcher.execute(params).await
    }

    // =========================================================================
    // user.*
    // =========================================================================

    /// Fetch one page of `user`'s play history, newest first.
    ///
    /// A play in progress appears as an extra leading entry flagged
    /// `nowplaying`.
    pub async fn user_recent_tracks_page(
        &self,
        user: &UserKey,
        limit: u32,
        page: u32,
    ) -> Result<RecentTracksPage> {
        check_limit(Some(limit), MAX_LIMIT)?;

        let params = RequestParams::new("user.getRecentTracks")
            .with_user(user, ParamKey::User)
            .with(ParamKey::Limit, limit)
            .with(ParamKey::Page, page)
            .with(ParamKey::Extended, 1);

        parse_recent_tracks(self.call(params).await?)
    }

    pub async fn user_top_artists(
        &self,
        user: &UserKey,
        limit: Option<u32>,
        page: Option<u32>,
        period: Option<Period>,
    ) -> Result<Vec<TopArtist>> {
        check_limit(limit, MAX_LIMIT)?;

        let params = RequestParams::new("user.getTopArtists")
            .with_user(user, ParamKey::User)
            .with_opt(ParamKey::Limit, limit)
            .with_opt(ParamKey::Page, page)
            .with_opt(ParamKey::Period, period);

        parse_top_artists(self.call(params).await?)
    }

    pub async fn user_info(&self, user: &UserKey) -> Result<Value> {
        let params = RequestParams::new("user.getInfo").with_user(user, ParamKey::User);
        take_field(self.call(params).await?, "user")
    }

    // =========================================================================
    // artist.* / album.*
    // =========================================================================

    /// `artist.getInfo`, with the user's playcount when `user` is given and
    /// the biography in `lang` (ISO 639 alpha-2) when set.
    pub async fn artist_info(
        &self,
        artist: &ArtistRef,
        user: Option<&UserKey>,
        lang: Option<&str>,
        autocorrect: bool,
    ) -> Result<ArtistInfo> {
        let mut params = RequestParams::new("artist.getInfo")
            .with_lookup(artist)
            .with_opt(ParamKey::Lang, lang)
            .with_autocorrect(autocorrect);
        if let Some(user) = user {
            params = params.with_user(user, ParamKey::Username);
        }
        take_field(self.call(params).await?, "artist")
    }

    pub async fn artist_similar(
        &self,
        artist: &ArtistRef,
        limit: Option<u32>,
        autocorrect: bool,
    ) -> Result<Value> {
        check_limit(limit, MAX_LIMIT)?;

        let params = RequestParams::new("artist.getSimilar")
            .with_lookup(artist)
            .with_opt(ParamKey::Limit, limit)
            .with_autocorrect(autocorrect);
        take_field(self.call(params).await?, "similarartists")
    }

    pub async fn artist_top_tracks(
        &self,
        artist: &ArtistRef,
        limit: Option<u32>,
        page: Option<u32>,
        autocorrect: bool,
    ) -> Result<Value> {
        check_limit(limit, MAX_LIMIT)?;

        let params = RequestParams::new("artist.getTopTracks")
            .with_lookup(artist)
            .with_opt(ParamKey::Limit, limit)
            .with_opt(ParamKey::Page, page)
            .with_autocorrect(autocorrect);
        take_field(self.call(params).await?, "toptracks")
    }

    pub async fn artist_search(
        &self,
        artist: &str,
        limit: Option<u32>,
        page: Option<u32>,
    ) -> Result<Value> {
        check_limit(limit, MAX_LIMIT)?;

        let params = RequestParams::new("artist.search")
            .with(ParamKey::Artist, artist)
            .with_opt(ParamKey::Limit, limit)
            .with_opt(ParamKey::Page, page);
        take_field(self.call(params).await?, "results")
    }

    /// Names of the tags `user` has applied to `artist`.
    pub async fn artist_tags(
        &self,
        artist: &ArtistRef,
        user: &UserKey,
        autocorrect: bool,
    ) -> Result<Vec<String>> {
        let params = RequestParams::new("artist.getTags")
            .with_lookup(artist)
            .with_user(user, ParamKey::User)
            .with_autocorrect(autocorrect);
        parse_tags(self.call(params).await?)
    }

    pub async fn artist_top_tags(&self, artist: &ArtistRef, autocorrect: bool) -> Result<Value> {
        let params = RequestParams::new("artist.getTopTags")
            .with_lookup(artist)
            .with_autocorrect(autocorrect);
        take_field(self.call(params).await?, "toptags")
    }

    /// Tag `artist` with up to 10 tags on behalf of the session's user.
    pub async fn artist_add_tags(&self, artist: &str, tags: &[&str], sk: &str) -> Result<()> {
        check_tag_count(tags.len(), MAX_TAGS)?;

        let params = RequestParams::new("artist.addTags")
            .with(ParamKey::Artist, artist)
            .with(ParamKey::Tags, tags.join(","))
            .with(ParamKey::Sk, sk);
        self.call(params).await.map(|_| ())
    }

    pub async fn artist_remove_tag(&self, artist: &str, tag: &str, sk: &str) -> Result<()> {
        let params = RequestParams::new("artist.removeTag")
            .with(ParamKey::Artist, artist)
            .with(ParamKey::Tag, tag)
            .with(ParamKey::Sk, sk);
        self.call(params).await.map(|_| ())
    }

    /// The canonical spelling Last.fm suggests for `artist`, if any.
    pub async fn artist_correction(&self, artist: &str) -> Result<Option<Value>> {
        let params = RequestParams::new("artist.getCorrection").with(ParamKey::Artist, artist);
        Ok(parse_correction(self.call(params).await?))
    }

    pub async fn album_info(
        &self,
        album: &AlbumRef,
        user: Option<&UserKey>,
        autocorrect: bool,
    ) -> Result<AlbumInfo> {
        let mut params = RequestParams::new("album.getInfo")
            .with_lookup(album)
            .with_autocorrect(autocorrect);
        if let Some(user) = user {
            params = params.with_user(user, ParamKey::Username);
        }
        take_field(self.call(params).await?, "album")
    }

    // =========================================================================
    // track.*
    // =========================================================================

    pub async fn track_info(
        &self,
        track: &TrackRef,
        user: Option<&UserKey>,
        autocorrect: bool,
    ) -> Result<TrackInfo> {
        let mut params = RequestParams::new("track.getInfo")
            .with_lookup(track)
            .with_autocorrect(autocorrect);
        if let Some(user) = user {
            params = params.with_user(user, ParamKey::Username);
        }
        take_field(self.call(params).await?, "track")
    }

    /// Names of the tags `user` has applied to `track`.
    pub async fn track_tags(
        &self,
        track: &TrackRef,
        user: &UserKey,
        autocorrect: bool,
    ) -> Result<Vec<String>> {
        let params = RequestParams::new("track.getTags")
            .with_lookup(track)
            .with_user(user, ParamKey::User)
            .with_autocorrect(autocorrect);
        parse_tags(self.call(params).await?)
    }

    pub async fn track_top_tags(&self, track: &TrackRef, autocorrect: bool) -> Result<Value> {
        let params = RequestParams::new("track.getTopTags")
            .with_lookup(track)
            .with_autocorrect(autocorrect);
        take_field(self.call(params).await?, "toptags")
    }

    /// Tag a track with up to 10 tags on behalf of the session's user.
    pub async fn track_add_tags(
        &self,
        artist: &str,
        track: &str,
        tags: &[&str],
        sk: &str,
    ) -> Result<()> {
        check_tag_count(tags.len(), MAX_TAGS)?;

        let params = RequestParams::new("track.addTags")
            .with(ParamKey::Artist, artist)
            .with(ParamKey::Track, track)
            .with(ParamKey::Tags, tags.join(","))
            .with(ParamKey::Sk, sk);
        self.call(params).await.map(|_| ())
    }

    pub async fn track_remove_tag(
        &self,
        artist: &str,
        track: &str,
        tag: &str,
        sk: &str,
    ) -> Result<()> {
        let params = RequestParams::new("track.removeTag")
            .with(ParamKey::Artist, artist)
            .with(ParamKey::Track, track)
            .with(ParamKey::Tag, tag)
            .with(ParamKey::Sk, sk);
        self.call(params).await.map(|_| ())
    }

    pub async fn track_correction(&self, artist: &str, track: &str) -> Result<Option<Value>> {
        let params = RequestParams::new("track.getCorrection")
            .with(ParamKey::Artist, artist)
            .with(ParamKey::Track, track);
        Ok(parse_correction(self.call(params).await?))
    }

    pub async fn track_love(&self, artist: &str, track: &str, sk: &str) -> Result<()> {
        let params = RequestParams::new("track.love")
            .with(ParamKey::Artist, artist)
            .with(ParamKey::Track, track)
            .with(ParamKey::Sk, sk);
        self.call(params).await.map(|_| ())
    }

    pub async fn track_unlove(&self, artist: &str, track: &str, sk: &str) -> Result<()> {
        let params = RequestParams::new("track.unlove")
            .with(ParamKey::Artist, artist)
            .with(ParamKey::Track, track)
            .with(ParamKey::Sk, sk);
        self.call(params).await.map(|_| ())
    }

    pub async fn track_update_now_playing(
        &self,
        artist: &str,
        track: &str,
        sk: &str,
        update: &NowPlayingUpdate,
    ) -> Result<Value> {
        let params = RequestParams::new("track.updateNowPlaying")
            .with(ParamKey::Artist, artist)
            .with(ParamKey::Track, track)
            .with(ParamKey::Sk, sk)
            .with_opt(ParamKey::Album, update.album.as_deref())
            .with_opt(ParamKey::TrackNumber, update.track_number)
            .with_opt(ParamKey::Mbid, update.mbid.as_deref())
            .with_opt(ParamKey::Duration, update.duration)
            .with_opt(ParamKey::AlbumArtist, update.album_artist.as_deref());
        take_field(self.call(params).await?, "nowplaying")
    }

    /// Submit up to 50 completed plays in one signed call.
    pub async fn track_scrobble(&self, sk: &str, scrobbles: &[Scrobble]) -> Result<Value> {
        check_scrobble_count(scrobbles.len(), MAX_SCROBBLE_BATCH)?;

        let mut params = RequestParams::new("track.scrobble").with(ParamKey::Sk, sk);
        for (i, scrobble) in scrobbles.iter().enumerate() {
            params.set_indexed(ParamKey::Artist, i, &scrobble.artist);
            params.set_indexed(ParamKey::Track, i, &scrobble.track);
            params.set_indexed(ParamKey::Timestamp, i, scrobble.timestamp.timestamp());
            if let Some(album) = &scrobble.album {
                params.set_indexed(ParamKey::Album, i, album);
            }
            if let Some(album_artist) = &scrobble.album_artist {
                params.set_indexed(ParamKey::AlbumArtist, i, album_artist);
            }
            if let Some(track_number) = scrobble.track_number {
                params.set_indexed(ParamKey::TrackNumber, i, track_number);
            }
            if let Some(duration) = scrobble.duration {
                params.set_indexed(ParamKey::Duration, i, duration);
            }
            if let Some(mbid) = &scrobble.mbid {
                params.set_indexed(ParamKey::Mbid, i, mbid);
            }
            if let Some(chosen) = scrobble.chosen_by_user {
                params.set_indexed(ParamKey::ChosenByUser, i, u8::from(chosen));
            }
        }

        log::debug!("Submitting {} scrobbles", scrobbles.len());
        take_field(self.call(params).await?, "scrobbles")
    }

    // =========================================================================
    // tag.* / geo.*
    // =========================================================================

    pub async fn tag_info(&self, tag: &str, lang: Option<&str>) -> Result<Value> {
        let params = RequestParams::new("tag.getInfo")
            .with(ParamKey::Tag, tag)
            .with_opt(ParamKey::Lang, lang);
        take_field(self.call(params).await?, "tag")
    }

    pub async fn tag_top_artists(
        &self,
        tag: &str,
        limit: Option<u32>,
        page: Option<u32>,
    ) -> Result<Value> {
        check_limit(limit, MAX_LIMIT)?;

        let params = RequestParams::new("tag.getTopArtists")
            .with(ParamKey::Tag, tag)
            .with_opt(ParamKey::Limit, limit)
            .with_opt(ParamKey::Page, page);
        take_field(self.call(params).await?, "topartists")
    }

    pub async fn geo_top_artists(
        &self,
        country: &str,
        limit: Option<u32>,
        page: Option<u32>,
    ) -> Result<Value> {
        check_limit(limit, MAX_LIMIT)?;

        let params = RequestParams::new("geo.getTopArtists")
            .with(ParamKey::Country, country)
            .with_opt(ParamKey::Limit, limit)
            .with_opt(ParamKey::Page, page);
        take_field(self.call(params).await?, "topartists")
    }

    pub async fn geo_top_tracks(
        &self,
        country: &str,
        limit: Option<u32>,
        page: Option<u32>,
        location: Option<&str>,
    ) -> Result<Value> {
        check_limit(limit, MAX_LIMIT)?;

        let params = RequestParams::new("geo.getTopTracks")
            .with(ParamKey::Country, country)
            .with_opt(ParamKey::Limit, limit)
            .with_opt(ParamKey::Page, page)
            .with_opt(ParamKey::Location, location);
        take_field(self.call(params).await?, "tracks")
    }

    // =========================================================================
    // auth.*
    // =========================================================================

    /// Exchange a web-auth token for a session.
    pub async fn auth_session(&self, token: &str) -> Result<Session> {
        let params = RequestParams::new("auth.getSession").with(ParamKey::Token, token);
        take_field(self.call(params).await?, "session")
    }

    /// Obtain a session directly from username and password.
    pub async fn auth_mobile_session(&self, username: &str, password: &str) -> Result<Session> {
        let params = RequestParams::new("auth.getMobileSession")
            .with(ParamKey::Username, username)
            .with(ParamKey::Password, password);
        take_field(self.call(params).await?, "session")
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    /// Current artist/album/track streaks over the last `target` plays.
    ///
    /// See [`combo::scan`].
    pub async fn combo(&self, user: &UserKey, target: u32) -> Result<ComboResult> {
        combo::scan(self, user, target).await
    }

    /// The most recent play, enriched with the requested detail lookups.
    ///
    /// See [`now_playing::aggregate`].
    pub async fn now_playing(
        &self,
        user: &UserKey,
        details: &[DetailKind],
    ) -> Result<Option<NowPlaying>> {
        now_playing::aggregate(self, user, details).await
    }

    /// Artists in both users' top-artist charts.
    ///
    /// See [`intersect::matching_artists`].
    pub async fn matching_artists(
        &self,
        first: &UserKey,
        second: &UserKey,
        limit: u32,
        period: Period,
    ) -> Result<Vec<SharedArtist>> {
        intersect::matching_artists(self, first, second, limit, period).await
    }
}
