//! Listening streaks ("combos") over a user's most recent plays.
//!
//! The scan reads history pages newest first and keeps three independent
//! counters, one each for artist, album and track. Each counter is seeded
//! from the most recent entry and dies at the first completed play that
//! disagrees with it. Paging stops as soon as every counter is dead, the
//! requested number of plays has been examined, or the history runs out.
//!
//! A play in progress (the `nowplaying` entry Last.fm puts first on a page)
//! seeds the labels and the artwork but is never counted.

use crate::client::LastFmClient;
use crate::dispatcher::ApiDispatch;
use crate::params::{UserKey, MAX_LIMIT};
use crate::types::{ComboResult, Image, RecentTrack, Streak};
use crate::{LastFmError, Result};

/// One streak counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Counter {
    label: String,
    count: u32,
    alive: bool,
}

impl Counter {
    /// An empty label can never match anything, so it starts dead.
    fn seeded(label: &str) -> Self {
        Self {
            label: label.to_string(),
            count: 0,
            alive: !label.is_empty(),
        }
    }

    fn observe(&mut self, value: &str) {
        if !self.alive {
            return;
        }
        if value == self.label {
            self.count += 1;
        } else {
            self.alive = false;
        }
    }

    fn into_streak(self) -> Streak {
        Streak {
            name: self.label,
            combo: self.count,
        }
    }
}

/// Incremental state of a streak scan.
///
/// Feed it the seed entry once, then completed plays in history order.
#[derive(Debug, Clone, Default)]
pub struct StreakState {
    artist: Counter,
    album: Counter,
    track: Counter,
    nowplaying: bool,
    image: Vec<Image>,
    examined: u32,
}

impl StreakState {
    /// Start a scan from the most recent history entry.
    pub fn seed(first: &RecentTrack) -> Self {
        Self {
            artist: Counter::seeded(&first.artist),
            album: Counter::seeded(first.album_name()),
            track: Counter::seeded(&first.name),
            nowplaying: first.nowplaying,
            image: first.image.clone(),
            examined: 0,
        }
    }

    /// Count one completed play.
    pub fn observe(&mut self, play: &RecentTrack) {
        self.examined += 1;
        self.artist.observe(&play.artist);
        self.album.observe(play.album_name());
        self.track.observe(&play.name);
    }

    pub fn mark_nowplaying(&mut self) {
        self.nowplaying = true;
    }

    pub fn any_alive(&self) -> bool {
        self.artist.alive || self.album.alive || self.track.alive
    }

    /// Completed plays examined so far.
    pub fn examined(&self) -> u32 {
        self.examined
    }

    pub fn finish(self) -> ComboResult {
        ComboResult {
            artist: self.artist.into_streak(),
            album: self.album.into_streak(),
            track: self.track.into_streak(),
            nowplaying: self.nowplaying,
            image: self.image,
        }
    }
}

/// Compute the current streaks of `user` over at most `target` completed plays.
///
/// Pages are requested with a constant size of `min(target, 1000)`. An empty
/// history yields a default result.
pub async fn scan<D: ApiDispatch>(
    client: &LastFmClient<D>,
    user: &UserKey,
    target: u32,
) -> Result<ComboResult> {
    if target == 0 {
        return Err(LastFmError::Validation(
            "Combo target must be at least 1".to_string(),
        ));
    }

    let page_size = target.min(MAX_LIMIT);
    let mut page_number = 1;

    log::debug!("Fetching combo page {page_number} for {user} (size {page_size})");
    let mut page = client
        .user_recent_tracks_page(user, page_size, page_number)
        .await?;

    let Some(first) = page.tracks.first() else {
        log::debug!("No listening history for {user}");
        return Ok(ComboResult::default());
    };
    let mut state = StreakState::seed(first);

    loop {
        let mut plays = page.tracks.as_slice();
        if let Some((first, rest)) = plays.split_first() {
            if first.nowplaying {
                state.mark_nowplaying();
                plays = rest;
            }
        }

        let remaining = (target - state.examined()) as usize;
        for play in plays.iter().take(remaining) {
            if !state.any_alive() {
                break;
            }
            state.observe(play);
        }

        // A play in progress may occupy one of the page's slots
        let exhausted = page.tracks.len() < page_size as usize || !page.has_next_page();
        if !state.any_alive() || state.examined() >= target || exhausted {
            break;
        }

        page_number += 1;
        log::debug!("Fetching combo page {page_number} for {user} (size {page_size})");
        page = client
            .user_recent_tracks_page(user, page_size, page_number)
            .await?;
    }

    log::debug!(
        "Combo scan for {user} finished after {} plays on {page_number} page(s)",
        state.examined()
    );
    Ok(state.finish())
}
