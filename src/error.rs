use thiserror::Error;

/// Error types for Last.fm API operations.
///
/// The variants separate the failure domains a caller may want to branch on:
/// local misconfiguration, local precondition violations, transport failures,
/// malformed payloads, and errors reported by Last.fm itself.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use lastfm_helper::{LastFmClient, LastFmError, UserKey};
///
/// #[tokio::main]
/// async fn main() {
///     let client = LastFmClient::from_env().expect("LASTFM_API_KEY must be set");
///
///     match client.combo(&UserKey::username("rj"), 500).await {
///         Ok(combo) => println!("{} plays of {}", combo.artist.combo, combo.artist.name),
///         Err(LastFmError::Service { code: 6, .. }) => eprintln!("No such user"),
///         Err(LastFmError::Transport { status, .. }) => eprintln!("HTTP status {status}"),
///         Err(e) => eprintln!("Other error: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum LastFmError {
    /// An authenticated parameter (`sk`, `token` or `password`) was supplied
    /// but the client has no API secret to sign the request with.
    ///
    /// Raised before any network access. Fix the configuration; never retried.
    #[error("Authentication misconfigured: {0}")]
    AuthConfig(String),

    /// Last.fm answered with a non-success HTTP status.
    #[error("HTTP {status}: {status_text}")]
    Transport {
        /// Numeric HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        status_text: String,
    },

    /// The response had a success status but its body was not the expected JSON.
    ///
    /// This is treated as a defect on the Last.fm side.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Last.fm returned a JSON body carrying an `error` code.
    ///
    /// # Common Codes
    /// - 6: invalid parameters (unknown user, artist not found)
    /// - 9: invalid session key
    /// - 10: invalid API key
    /// - 13: invalid method signature
    #[error("Last.fm error {code}: {message}")]
    Service {
        /// Numeric Last.fm error code
        code: i64,
        /// Message supplied by Last.fm
        message: String,
    },

    /// A local precondition was violated, e.g. a limit outside `1..=1000`.
    ///
    /// Always raised before any request is dispatched.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The HTTP client failed before a status was available.
    ///
    /// This includes connection failures, DNS errors and body read failures.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl LastFmError {
    /// The Last.fm error code, if this error was reported by the service.
    pub fn service_code(&self) -> Option<i64> {
        match self {
            LastFmError::Service { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the error was raised locally without touching the network.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            LastFmError::AuthConfig(_) | LastFmError::Validation(_)
        )
    }
}
