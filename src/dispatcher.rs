use crate::config::ClientConfig;
use crate::events::{ClientEvent, ClientEventReceiver, RequestInfo, SharedEventBroadcaster};
use crate::params::{ParamKey, RequestParams};
use crate::{LastFmError, Result};
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, StatusCode, Url};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// ApiDispatch trait
// =============================================================================

/// The seam between the typed resource layer and the wire.
///
/// A dispatcher turns one [`RequestParams`] into one HTTP call and returns the
/// raw success JSON, or one of the typed [`LastFmError`] variants. Everything
/// above this trait (resource methods, analytics) is written against it so it
/// can be replaced in tests.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockApiDispatch`
/// generated by `mockall`.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait ApiDispatch: Send + Sync {
    /// Execute a single API call.
    async fn execute(&self, params: RequestParams) -> Result<Value>;
}

// =============================================================================
// Credentials, transport selection and signing
// =============================================================================

/// API key and shared secret, immutable for the lifetime of a dispatcher.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &if self.has_secret() { "<set>" } else { "<empty>" })
            .finish()
    }
}

/// How a request travels to Last.fm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Parameters in the query string, unsigned.
    Get,
    /// Signed parameters in a form-encoded body.
    Post,
}

impl Transport {
    /// Requests carrying `sk`, `token` or `password` are signed and POSTed.
    pub fn for_params(params: &RequestParams) -> Self {
        if params.requires_auth() {
            Transport::Post
        } else {
            Transport::Get
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Get => "GET",
            Transport::Post => "POST",
        }
    }
}

/// Compute `api_sig` for a request.
///
/// The signed fields are the request parameters plus `api_key`, sorted by name
/// in byte order, each written as `name` immediately followed by `value`. The
/// secret is appended and the whole string is MD5-hashed into lowercase hex.
/// `format` and any existing `api_sig` are not part of the signature.
pub fn sign(params: &RequestParams, credentials: &Credentials) -> String {
    let mut fields: BTreeMap<&str, &str> = params
        .iter()
        .filter(|(name, _)| *name != ParamKey::ApiSig.as_str())
        .collect();
    fields.insert("api_key", credentials.key());

    let mut base = String::new();
    for (name, value) in fields {
        base.push_str(name);
        base.push_str(value);
    }
    log::trace!("Signing {} bytes of parameters", base.len());
    base.push_str(&credentials.secret);

    format!("{:x}", md5::compute(base.as_bytes()))
}

/// Form-encode `name=value` pairs joined by `&`.
pub fn encode_form<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// The full, ordered field list sent on the wire for `params`.
///
/// GET requests carry `api_key` and `format=json`; POST requests additionally
/// carry the signature computed over the fields before `format` was added.
pub fn wire_fields(
    params: &RequestParams,
    credentials: &Credentials,
    transport: Transport,
) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = params
        .iter()
        .filter(|(name, _)| *name != ParamKey::ApiSig.as_str())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    fields.push(("api_key".to_string(), credentials.key().to_string()));
    fields.push(("format".to_string(), "json".to_string()));

    if transport == Transport::Post {
        fields.push((ParamKey::ApiSig.as_str().to_string(), sign(params, credentials)));
    }
    fields
}

// =============================================================================
// Response normalization
// =============================================================================

/// Map a non-success HTTP status to [`LastFmError::Transport`].
pub fn check_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(LastFmError::Transport {
        status: status.into(),
        status_text: status.canonical_reason().to_string(),
    })
}

/// Parse a response body, surfacing Last.fm's `error`/`message` envelope.
pub fn parse_payload(body: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(body)
        .map_err(|_| LastFmError::Protocol("service returned invalid payload".to_string()))?;

    let Some(code) = value.get("error") else {
        return Ok(value);
    };

    let code = code
        .as_i64()
        .or_else(|| code.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| {
            LastFmError::Protocol(format!("service returned a non-numeric error code: {code}"))
        })?;
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Err(LastFmError::Service { code, message })
}

/// Normalize a complete response.
///
/// Precedence is transport status, then JSON validity, then the service
/// error envelope.
pub fn normalize_response(status: StatusCode, body: &str) -> Result<Value> {
    check_status(status)?;
    parse_payload(body)
}

// =============================================================================
// Dispatcher
// =============================================================================

/// HTTP-backed [`ApiDispatch`] implementation.
///
/// Holds no per-call state; clones share the HTTP client, credentials and event
/// broadcaster, and may be used concurrently.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn HttpClient + Send + Sync>,
    credentials: Arc<Credentials>,
    base_url: Url,
    broadcaster: Arc<SharedEventBroadcaster>,
}

impl Dispatcher {
    /// Create a dispatcher on top of any [`HttpClient`] implementation.
    pub fn new(client: Box<dyn HttpClient + Send + Sync>, config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            LastFmError::Validation(format!("Invalid base URL '{}': {e}", config.base_url))
        })?;

        Ok(Self {
            client: Arc::from(client),
            credentials: Arc::new(Credentials::new(&config.api_key, &config.api_secret)),
            base_url,
            broadcaster: Arc::new(SharedEventBroadcaster::new()),
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn subscribe(&self) -> ClientEventReceiver {
        self.broadcaster.subscribe()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.broadcaster.latest_event()
    }

    /// Build the HTTP request for `params` without sending it.
    pub fn build_request(&self, params: &RequestParams) -> Result<(Transport, Request)> {
        let transport = Transport::for_params(params);

        if transport == Transport::Post && !self.credentials.has_secret() {
            return Err(LastFmError::AuthConfig(format!(
                "{} needs an API secret to sign requests with a session key, token or password",
                params.method()
            )));
        }

        let fields = wire_fields(params, &self.credentials, transport);
        let encoded = encode_form(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let request = match transport {
            Transport::Get => {
                let mut url = self.base_url.clone();
                url.set_query(Some(&encoded));
                Request::new(Method::Get, url)
            }
            Transport::Post => {
                let mut request = Request::new(Method::Post, self.base_url.clone());
                request.insert_header("Content-Type", "application/x-www-form-urlencoded");
                request.insert_header("Content-Length", encoded.len().to_string());
                request.set_body(encoded);
                request
            }
        };

        Ok((transport, request))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

#[async_trait]
impl ApiDispatch for Dispatcher {
    async fn execute(&self, params: RequestParams) -> Result<Value> {
        let (transport, request) = self.build_request(&params)?;

        let request_info = RequestInfo::new(transport.as_str(), params.method());
        let request_start = std::time::Instant::now();

        log::debug!("Dispatching {}", request_info.short_description());
        self.broadcaster
            .broadcast_event(ClientEvent::RequestStarted {
                request: request_info.clone(),
            });

        let mut response = match self.client.send(request).await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("{} failed: {e}", request_info.short_description());
                self.broadcaster.broadcast_event(ClientEvent::RequestFailed {
                    request: request_info,
                    error: e.to_string(),
                    duration_ms: request_start.elapsed().as_millis() as u64,
                });
                return Err(LastFmError::Http(e.to_string()));
            }
        };

        let status = response.status();
        self.broadcaster
            .broadcast_event(ClientEvent::RequestCompleted {
                request: request_info.clone(),
                status_code: status.into(),
                duration_ms: request_start.elapsed().as_millis() as u64,
            });
        log::debug!(
            "{} completed with status {}",
            request_info.short_description(),
            status
        );

        check_status(status)?;

        let body = response
            .body_string()
            .await
            .map_err(|e| LastFmError::Http(e.to_string()))?;

        parse_payload(&body).inspect_err(|e| {
            if let LastFmError::Service { code, message } = e {
                log::debug!("{} rejected by Last.fm: {code} {message}", params.method());
            }
        })
    }
}
