//! Artists common to two users' top-artist charts.

use crate::client::LastFmClient;
use crate::dispatcher::ApiDispatch;
use crate::params::{check_limit, UserKey, MAX_LIMIT};
use crate::types::{Period, SharedArtist, TopArtist};
use crate::Result;
use std::cmp::Ordering;

/// Intersect two artist lists by exact name.
///
/// Both inputs are sorted by name (byte order) and walked with two cursors,
/// so the result is in name order and holds at most `min(a.len(), b.len())`
/// entries. The URL comes from `a`; playcounts are `[a, b]`.
pub fn intersect(mut a: Vec<TopArtist>, mut b: Vec<TopArtist>) -> Vec<SharedArtist> {
    a.sort_by(|x, y| x.name.cmp(&y.name));
    b.sort_by(|x, y| x.name.cmp(&y.name));

    let mut shared = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].name.cmp(&b[j].name) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                shared.push(SharedArtist {
                    name: a[i].name.clone(),
                    url: a[i].url.clone(),
                    playcounts: [a[i].playcount, b[j].playcount],
                });
                i += 1;
                j += 1;
            }
        }
    }

    shared
}

/// Fetch both users' top artists concurrently and intersect them.
///
/// Both fetches run to completion; if either failed, the first error in
/// argument order is returned.
pub async fn matching_artists<D: ApiDispatch>(
    client: &LastFmClient<D>,
    first: &UserKey,
    second: &UserKey,
    limit: u32,
    period: Period,
) -> Result<Vec<SharedArtist>> {
    check_limit(Some(limit), MAX_LIMIT)?;

    log::debug!("Matching top {limit} artists ({period}) of {first} and {second}");

    let (first_artists, second_artists) = futures::join!(
        client.user_top_artists(first, Some(limit), None, Some(period)),
        client.user_top_artists(second, Some(limit), None, Some(period)),
    );

    let shared = intersect(first_artists?, second_artists?);
    log::debug!("Found {} shared artists", shared.len());
    Ok(shared)
}
