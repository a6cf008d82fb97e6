mod common;

use common::{recent_tracks, top_artists, ScriptedDispatch};
use lastfm_helper::{
    DetailKind, LastFmClient, LastFmError, ParamKey, Period, Result, UserKey,
};
use serde_json::json;

const RECENT: &str = "user.getRecentTracks";
const BELIEVE: (&str, &str, &str) = ("Cher", "Believe", "Believe");

fn client(dispatch: ScriptedDispatch) -> LastFmClient<ScriptedDispatch> {
    LastFmClient::with_dispatcher(dispatch)
}

fn rj() -> UserKey {
    UserKey::username("rj")
}

// =============================================================================
// combo
// =============================================================================

#[test_log::test(tokio::test)]
async fn test_combo_identical_plays() -> Result<()> {
    let client = client(ScriptedDispatch::new().reply(RECENT, recent_tracks(None, &[BELIEVE; 5], 1, 1)));

    let combo = client.combo(&rj(), 5).await?;
    assert_eq!(combo.artist.combo, 5);
    assert_eq!(combo.album.combo, 5);
    assert_eq!(combo.track.combo, 5);
    assert_eq!(combo.artist.name, "Cher");
    assert!(!combo.nowplaying);
    assert_eq!(combo.image.len(), 2);

    let calls = client.dispatcher().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].get(ParamKey::Limit), Some("5"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_combo_stops_when_all_streaks_end() -> Result<()> {
    let mut plays = vec![BELIEVE; 1000];
    plays[1] = ("ABBA", "Gold", "Dancing Queen");
    let client = client(ScriptedDispatch::new().reply(RECENT, recent_tracks(None, &plays, 1, 10)));

    let combo = client.combo(&rj(), 5000).await?;
    assert_eq!(combo.artist.combo, 1);
    assert_eq!(combo.album.combo, 1);
    assert_eq!(combo.track.combo, 1);

    // A full page and more pages available, but nothing left to count
    assert_eq!(client.dispatcher().calls_to(RECENT).len(), 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_combo_spans_pages() -> Result<()> {
    let strong_enough = ("Cher", "Believe", "Strong Enough");
    let dancing_queen = ("ABBA", "Gold", "Dancing Queen");

    let client = client(
        ScriptedDispatch::new()
            .reply(RECENT, recent_tracks(None, &[BELIEVE; 1000], 1, 4))
            .reply(
                RECENT,
                recent_tracks(Some(BELIEVE), &[BELIEVE, strong_enough, dancing_queen], 2, 4),
            ),
    );

    let combo = client.combo(&rj(), 1500).await?;
    assert_eq!(combo.artist.combo, 1002);
    assert_eq!(combo.album.combo, 1002);
    assert_eq!(combo.track.combo, 1001);
    // A leading play in progress is dropped on every page
    assert!(combo.nowplaying);

    let calls = client.dispatcher().calls_to(RECENT);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].get(ParamKey::Page), Some("2"));
    assert!(calls.iter().all(|c| c.get(ParamKey::Limit) == Some("1000")));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_combo_continues_when_nowplaying_fills_a_slot() -> Result<()> {
    let client = client(
        ScriptedDispatch::new()
            .reply(RECENT, recent_tracks(Some(BELIEVE), &[BELIEVE; 999], 1, 3))
            .reply(RECENT, recent_tracks(None, &[BELIEVE; 1000], 2, 3)),
    );

    let combo = client.combo(&rj(), 1500).await?;
    assert!(combo.nowplaying);
    assert_eq!(combo.track.combo, 1500);
    assert_eq!(client.dispatcher().calls_to(RECENT).len(), 2);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_combo_stops_at_target() -> Result<()> {
    let client = client(
        ScriptedDispatch::new()
            .reply(RECENT, recent_tracks(None, &[BELIEVE; 1000], 1, 3))
            .reply(RECENT, recent_tracks(None, &[BELIEVE; 1000], 2, 3)),
    );

    let combo = client.combo(&rj(), 1200).await?;
    assert_eq!(combo.track.combo, 1200);
    assert_eq!(client.dispatcher().calls_to(RECENT).len(), 2);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_combo_stops_at_last_page() -> Result<()> {
    let client = client(ScriptedDispatch::new().reply(RECENT, recent_tracks(None, &[BELIEVE; 1000], 1, 1)));

    let combo = client.combo(&rj(), 2000).await?;
    assert_eq!(combo.track.combo, 1000);
    assert_eq!(client.dispatcher().calls_to(RECENT).len(), 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_combo_nowplaying_is_not_counted() -> Result<()> {
    let plays = [BELIEVE, BELIEVE, ("ABBA", "Gold", "Dancing Queen")];
    let client = client(
        ScriptedDispatch::new().reply(RECENT, recent_tracks(Some(BELIEVE), &plays, 1, 5)),
    );

    let combo = client.combo(&rj(), 3).await?;
    assert!(combo.nowplaying);
    assert_eq!(combo.artist.combo, 2);
    assert_eq!(combo.album.combo, 2);
    assert_eq!(combo.track.combo, 2);
    assert_eq!(combo.image[0].url, "Believe-s.png");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_combo_nowplaying_seeds_labels() -> Result<()> {
    // The play in progress differs from the history, so every streak dies at once
    let client = client(ScriptedDispatch::new().reply(
        RECENT,
        recent_tracks(Some(("ABBA", "Gold", "Dancing Queen")), &[BELIEVE; 3], 1, 1),
    ));

    let combo = client.combo(&rj(), 3).await?;
    assert!(combo.nowplaying);
    assert_eq!(combo.artist.name, "ABBA");
    assert_eq!(combo.artist.combo, 0);
    assert_eq!(combo.track.combo, 0);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_combo_empty_album() -> Result<()> {
    let plays = [("Cher", "", "Believe"), ("Cher", "", "Believe"), ("Cher", "", "Strong Enough")];
    let client = client(ScriptedDispatch::new().reply(RECENT, recent_tracks(None, &plays, 1, 1)));

    let combo = client.combo(&rj(), 3).await?;
    assert_eq!(combo.album.name, "");
    assert_eq!(combo.album.combo, 0);
    assert_eq!(combo.artist.combo, 3);
    assert_eq!(combo.track.combo, 2);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_combo_empty_history() -> Result<()> {
    let client = client(ScriptedDispatch::new().reply(RECENT, recent_tracks(None, &[], 1, 0)));

    let combo = client.combo(&rj(), 50).await?;
    assert_eq!(combo, Default::default());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_combo_rejects_zero_target() {
    let client = client(ScriptedDispatch::new());

    let err = client.combo(&rj(), 0).await.unwrap_err();
    assert!(matches!(err, LastFmError::Validation(_)));
    assert!(client.dispatcher().calls().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_combo_propagates_page_errors() {
    let client = client(
        ScriptedDispatch::new()
            .reply(RECENT, recent_tracks(None, &[BELIEVE; 1000], 1, 3))
            .fail(RECENT, LastFmError::Service { code: 8, message: "Operation failed".to_string() }),
    );

    let err = client.combo(&rj(), 1500).await.unwrap_err();
    assert_eq!(err.service_code(), Some(8));
}

// =============================================================================
// now playing
// =============================================================================

const ALL_DETAILS: [DetailKind; 3] = [DetailKind::Artist, DetailKind::Album, DetailKind::Track];

fn artist_info() -> serde_json::Value {
    json!({"artist": {
        "name": "Cher",
        "url": "https://www.last.fm/music/Cher",
        "stats": {"listeners": "100", "playcount": "1000", "userplaycount": "12"},
        "tags": {"tag": [{"name": "pop"}]}
    }})
}

fn album_info() -> serde_json::Value {
    json!({"album": {"name": "Believe", "artist": "Cher", "userplaycount": "3", "tags": ""}})
}

#[test_log::test(tokio::test)]
async fn test_now_playing_with_all_details() -> Result<()> {
    let client = client(
        ScriptedDispatch::new()
            .reply(RECENT, recent_tracks(Some(BELIEVE), &[BELIEVE], 1, 10))
            .reply("artist.getInfo", artist_info())
            .reply("album.getInfo", album_info())
            .reply("track.getInfo", json!({"track": {"name": "Believe", "userloved": "1"}})),
    );

    let np = client.now_playing(&rj(), &ALL_DETAILS).await?.unwrap();
    assert!(np.recent.nowplaying);
    assert_eq!(np.recent.track, "Believe");
    assert_eq!(np.recent.album.as_deref(), Some("Believe"));

    assert!(np.details.artist.successful);
    assert_eq!(np.details.artist.data.unwrap().stats.userplaycount, Some(12));
    assert!(np.details.album.successful);
    assert!(np.details.track.data.unwrap().userloved);

    let history = client.dispatcher().calls_to(RECENT);
    assert_eq!(history[0].get(ParamKey::Limit), Some("1"));

    let lookup = &client.dispatcher().calls_to("track.getInfo")[0];
    assert_eq!(lookup.get(ParamKey::Username), Some("rj"));
    assert_eq!(lookup.get(ParamKey::Artist), Some("Cher"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_now_playing_skips_album_lookup_without_album() -> Result<()> {
    let client = client(
        ScriptedDispatch::new()
            .reply(RECENT, recent_tracks(None, &[("Cher", "", "Believe")], 1, 1))
            .reply("artist.getInfo", artist_info())
            .reply("track.getInfo", json!({"track": {"name": "Believe"}})),
    );

    let np = client.now_playing(&rj(), &ALL_DETAILS).await?.unwrap();
    assert!(!np.recent.nowplaying);
    assert_eq!(np.recent.album, None);
    assert!(!np.details.album.successful);
    assert!(np.details.album.data.is_none());
    assert!(client.dispatcher().calls_to("album.getInfo").is_empty());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_now_playing_failures_are_isolated() -> Result<()> {
    let client = client(
        ScriptedDispatch::new()
            .reply(RECENT, recent_tracks(None, &[BELIEVE], 1, 1))
            .reply("artist.getInfo", artist_info())
            .fail("album.getInfo", LastFmError::Service { code: 6, message: "Album not found".to_string() })
            .reply("track.getInfo", json!({"unexpected": {}})),
    );

    let np = client.now_playing(&rj(), &ALL_DETAILS).await?.unwrap();
    assert!(np.details.artist.successful);
    assert!(!np.details.album.successful);
    assert!(!np.details.track.successful);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_now_playing_only_requested_details() -> Result<()> {
    let client = client(
        ScriptedDispatch::new()
            .reply(RECENT, recent_tracks(None, &[BELIEVE], 1, 1))
            .reply("artist.getInfo", artist_info()),
    );

    let np = client.now_playing(&rj(), &[DetailKind::Artist]).await?.unwrap();
    assert!(np.details.artist.successful);
    assert!(!np.details.track.successful);
    assert_eq!(client.dispatcher().calls().len(), 2);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_now_playing_empty_history() -> Result<()> {
    let client = client(ScriptedDispatch::new().reply(RECENT, recent_tracks(None, &[], 1, 0)));

    assert!(client.now_playing(&rj(), &ALL_DETAILS).await?.is_none());
    assert_eq!(client.dispatcher().calls().len(), 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_now_playing_history_failure_is_an_error() {
    let client = client(
        ScriptedDispatch::new()
            .fail(RECENT, LastFmError::Service { code: 6, message: "User not found".to_string() }),
    );

    let err = client.now_playing(&rj(), &ALL_DETAILS).await.unwrap_err();
    assert_eq!(err.service_code(), Some(6));
}

// =============================================================================
// matching artists
// =============================================================================

const TOP: &str = "user.getTopArtists";

#[test_log::test(tokio::test)]
async fn test_matching_artists() -> Result<()> {
    let client = client(
        ScriptedDispatch::new()
            .reply(TOP, top_artists(&[("Cher", 50), ("ABBA", 40), ("Queen", 10)]))
            .reply(TOP, top_artists(&[("Queen", 7), ("Blondie", 5), ("Cher", 3)])),
    );

    let shared = client
        .matching_artists(&rj(), &UserKey::username("joan"), 50, Period::Year)
        .await?;

    let names: Vec<&str> = shared.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Cher", "Queen"]);
    assert_eq!(shared[0].playcounts, [50, 3]);

    let calls = client.dispatcher().calls_to(TOP);
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.get(ParamKey::Period) == Some("12month")));
    assert!(calls.iter().all(|c| c.get(ParamKey::Limit) == Some("50")));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_matching_artists_fails_if_either_fetch_fails() {
    let client = client(
        ScriptedDispatch::new()
            .reply(TOP, top_artists(&[("Cher", 50)]))
            .fail(TOP, LastFmError::Service { code: 6, message: "User not found".to_string() }),
    );

    let err = client
        .matching_artists(&rj(), &UserKey::username("nobody"), 10, Period::Overall)
        .await
        .unwrap_err();
    assert_eq!(err.service_code(), Some(6));
    assert_eq!(client.dispatcher().calls_to(TOP).len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_matching_artists_validates_limit() {
    let client = client(ScriptedDispatch::new());

    for limit in [0, 1001] {
        let err = client
            .matching_artists(&rj(), &UserKey::username("joan"), limit, Period::Overall)
            .await
            .unwrap_err();
        assert!(matches!(err, LastFmError::Validation(_)));
    }
    assert!(client.dispatcher().calls().is_empty());
}
