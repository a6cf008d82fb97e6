use clap::{Args, Subcommand};
use lastfm_helper::{
    DetailKind, LastFmClient, ParamKey, Period, RequestParams, Result, UserKey,
};
use serde::Serialize;

/// Identifies the user a command is about.
#[derive(Args, Clone)]
pub struct UserArgs {
    /// Last.fm username, or a session key with --session
    pub user: String,

    /// Treat USER as a session key (the request is then signed)
    #[arg(long)]
    pub session: bool,
}

impl UserArgs {
    fn key(&self) -> UserKey {
        if self.session {
            UserKey::session_key(&self.user)
        } else {
            UserKey::username(&self.user)
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current artist, album and track streaks
    ///
    /// Usage examples:
    /// # Streaks over the last 1000 plays
    /// lastfm-helper combo rj
    ///
    /// # Only look at the last 50 plays
    /// lastfm-helper combo rj --target 50
    Combo {
        #[command(flatten)]
        user: UserArgs,

        /// Maximum number of completed plays to examine
        #[arg(long, default_value_t = 1000)]
        target: u32,
    },

    /// Show the most recent play with artist, album and track details
    ///
    /// Usage examples:
    /// lastfm-helper now-playing rj
    ///
    /// # Only look up the artist
    /// lastfm-helper now-playing rj --details artist
    NowPlaying {
        #[command(flatten)]
        user: UserArgs,

        /// Detail lookups to perform (artist, album, track); all by default
        #[arg(long, value_delimiter = ',')]
        details: Vec<DetailKind>,
    },

    /// List the artists two users have in their top-artist charts
    ///
    /// Usage examples:
    /// lastfm-helper matching-artists rj joanofarctan --limit 200 --period 12month
    MatchingArtists {
        /// First username
        first: String,

        /// Second username
        second: String,

        /// Size of each user's chart
        #[arg(long, default_value_t = 50)]
        limit: u32,

        /// overall, 7day, 1month, 3month, 6month or 12month
        #[arg(long, default_value = "overall")]
        period: Period,
    },

    /// Show one page of a user's play history
    Recent {
        #[command(flatten)]
        user: UserArgs,

        #[arg(long, default_value_t = 10)]
        limit: u32,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Call an arbitrary API method and print the raw response
    ///
    /// Usage examples:
    /// lastfm-helper call artist.getInfo artist=Cher autocorrect=1
    Call {
        /// API method, e.g. `tag.getInfo`
        method: String,

        /// Parameters as name=value
        params: Vec<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_params(method: &str, pairs: &[String]) -> Result<RequestParams> {
    let mut params = RequestParams::new(method);
    for pair in pairs {
        let (key, value) = RequestParams::parse_pair(pair)?;
        if key == ParamKey::Method {
            log::warn!("Ignoring method= argument, using '{method}'");
            continue;
        }
        params.set(key, value);
    }
    Ok(params)
}

pub async fn execute_command(
    command: Commands,
    client: &LastFmClient,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Combo { user, target } => {
            let combo = client.combo(&user.key(), target).await?;
            print_json(&combo)
        }
        Commands::NowPlaying { user, mut details } => {
            if details.is_empty() {
                details = vec![DetailKind::Artist, DetailKind::Album, DetailKind::Track];
            }
            match client.now_playing(&user.key(), &details).await? {
                Some(now_playing) => print_json(&now_playing),
                None => {
                    eprintln!("{} has no listening history", user.user);
                    Ok(())
                }
            }
        }
        Commands::MatchingArtists {
            first,
            second,
            limit,
            period,
        } => {
            let shared = client
                .matching_artists(
                    &UserKey::username(first),
                    &UserKey::username(second),
                    limit,
                    period,
                )
                .await?;
            print_json(&shared)
        }
        Commands::Recent { user, limit, page } => {
            let page = client
                .user_recent_tracks_page(&user.key(), limit, page)
                .await?;
            print_json(&page)
        }
        Commands::Call { method, params } => {
            let params = build_params(&method, &params)?;
            let response = client.call(params).await?;
            print_json(&response)
        }
    }
}
