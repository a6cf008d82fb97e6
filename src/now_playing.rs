//! The most recent play of a user, enriched with metadata lookups.

use crate::client::LastFmClient;
use crate::dispatcher::ApiDispatch;
use crate::params::{AlbumRef, ArtistRef, TrackRef, UserKey};
use crate::types::{Detail, DetailKind, NowPlaying, NowPlayingDetails, RecentPlay};
use crate::Result;

/// Fetch the latest history entry of `user` and run the requested lookups.
///
/// The lookups run concurrently and are best-effort: a failed lookup is
/// logged and reported as an unsuccessful [`Detail`] without affecting the
/// others. The album lookup is skipped when the play has no album. Returns
/// `None` when the user has no history at all; failing to read the history
/// is an error.
///
/// ```rust,no_run
/// # use lastfm_helper::{ClientConfig, DetailKind, LastFmClient, UserKey};
/// # tokio_test::block_on(async {
/// let config = ClientConfig::new("api-key", "");
/// let client = LastFmClient::new(Box::new(http_client::native::NativeClient::new()), &config)?;
///
/// let kinds = [DetailKind::Artist, DetailKind::Track];
/// if let Some(np) = client.now_playing(&UserKey::username("rj"), &kinds).await? {
///     println!("{} - {}", np.recent.artist, np.recent.track);
///     if let Some(artist) = np.details.artist.data {
///         println!("{} plays", artist.stats.userplaycount.unwrap_or(0));
///     }
/// }
/// # Ok::<(), lastfm_helper::LastFmError>(())
/// # }).unwrap();
/// ```
pub async fn aggregate<D: ApiDispatch>(
    client: &LastFmClient<D>,
    user: &UserKey,
    kinds: &[DetailKind],
) -> Result<Option<NowPlaying>> {
    let page = client.user_recent_tracks_page(user, 1, 1).await?;

    let Some(latest) = page.tracks.into_iter().next() else {
        log::debug!("No recent plays for {user}");
        return Ok(None);
    };

    let recent = RecentPlay {
        artist: latest.artist,
        album: latest.album,
        track: latest.name,
        image: latest.image,
        url: latest.url,
        nowplaying: latest.nowplaying,
    };
    let wants = |kind: DetailKind| kinds.contains(&kind);

    let artist = async {
        if !wants(DetailKind::Artist) {
            return Detail::missing();
        }
        settle(
            DetailKind::Artist,
            client
                .artist_info(&ArtistRef::name(&recent.artist), Some(user), None, false)
                .await,
        )
    };

    let album = async {
        match &recent.album {
            Some(album) if wants(DetailKind::Album) => settle(
                DetailKind::Album,
                client
                    .album_info(&AlbumRef::name(&recent.artist, album), Some(user), false)
                    .await,
            ),
            _ => Detail::missing(),
        }
    };

    let track = async {
        if !wants(DetailKind::Track) {
            return Detail::missing();
        }
        settle(
            DetailKind::Track,
            client
                .track_info(&TrackRef::name(&recent.artist, &recent.track), Some(user), false)
                .await,
        )
    };

    let (artist, album, track) = futures::join!(artist, album, track);

    Ok(Some(NowPlaying {
        recent,
        details: NowPlayingDetails {
            artist,
            album,
            track,
        },
    }))
}

fn settle<T>(kind: DetailKind, result: Result<T>) -> Detail<T> {
    match result {
        Ok(data) => Detail::success(data),
        Err(e) => {
            log::warn!("{kind:?} lookup failed: {e}");
            Detail::missing()
        }
    }
}
