#![allow(dead_code)]
use async_trait::async_trait;
use http_client::{Error, HttpClient, Request, Response};
use http_types::{Method, StatusCode};
use lastfm_helper::{ApiDispatch, ClientConfig, LastFmClient, LastFmError, RequestParams, Result};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

// =============================================================================
// HTTP-level fake
// =============================================================================

/// A request as seen by [`FakeHttpClient`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub content_type: Option<String>,
    pub content_length: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// Decoded `name=value` pairs from the query string (GET) or body (POST).
    pub fn fields(&self) -> HashMap<String, String> {
        let raw = match self.method {
            Method::Get => self.url.split_once('?').map(|(_, q)| q).unwrap_or_default(),
            _ => self.body.as_str(),
        };
        raw.split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| {
                (
                    urlencoding::decode(k).unwrap().into_owned(),
                    urlencoding::decode(v).unwrap().into_owned(),
                )
            })
            .collect()
    }
}

#[derive(Debug)]
enum Scripted {
    Reply { status: u16, body: String },
    Fail(String),
}

/// An [`HttpClient`] that records requests and replays scripted responses in order.
#[derive(Debug, Clone, Default)]
pub struct FakeHttpClient {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Scripted::Reply {
            status,
            body: body.into(),
        });
        self
    }

    pub fn reply_json(self, value: Value) -> Self {
        self.reply(200, value.to_string())
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for FakeHttpClient {
    async fn send(&self, mut req: Request) -> std::result::Result<Response, Error> {
        let body = req.body_string().await.unwrap_or_default();
        self.requests.lock().unwrap().push(RecordedRequest {
            method: req.method(),
            url: req.url().to_string(),
            content_type: req
                .header("Content-Type")
                .map(|values| values.last().as_str().to_string()),
            content_length: req
                .header("Content-Length")
                .map(|values| values.last().as_str().to_string()),
            body,
        });

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply { status, body }) => {
                let mut response = Response::new(status);
                response.set_body(body);
                Ok(response)
            }
            Some(Scripted::Fail(message)) => Err(Error::from_str(
                StatusCode::InternalServerError,
                message,
            )),
            None => Err(Error::from_str(
                StatusCode::InternalServerError,
                "no scripted response left",
            )),
        }
    }
}

pub fn client_with(fake: &FakeHttpClient, secret: &str) -> LastFmClient {
    let config = ClientConfig::new("test-key", secret).with_base_url("https://api.test/2.0/");
    LastFmClient::new(Box::new(fake.clone()), &config).unwrap()
}

// =============================================================================
// Dispatch-level fake
// =============================================================================

/// An [`ApiDispatch`] that answers per API method from a script.
#[derive(Default)]
pub struct ScriptedDispatch {
    replies: Mutex<HashMap<String, VecDeque<Result<Value>>>>,
    calls: Mutex<Vec<RequestParams>>,
}

impl ScriptedDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, method: &str, value: Value) -> Self {
        self.push(method, Ok(value))
    }

    pub fn fail(self, method: &str, error: LastFmError) -> Self {
        self.push(method, Err(error))
    }

    fn push(self, method: &str, reply: Result<Value>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<RequestParams> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<RequestParams> {
        self.calls()
            .into_iter()
            .filter(|params| params.method() == method)
            .collect()
    }
}

#[async_trait]
impl ApiDispatch for ScriptedDispatch {
    async fn execute(&self, params: RequestParams) -> Result<Value> {
        let method = params.method().to_string();
        self.calls.lock().unwrap().push(params);

        self.replies
            .lock()
            .unwrap()
            .get_mut(&method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(LastFmError::Protocol(format!("no scripted reply for {method}"))))
    }
}

// =============================================================================
// Payload builders
// =============================================================================

/// `(artist, album, track)`; an empty album is sent as `""`.
pub type Play<'a> = (&'a str, &'a str, &'a str);

fn track_json((artist, album, track): Play, nowplaying: bool) -> Value {
    let mut value = json!({
        "name": track,
        "artist": {"name": artist, "url": format!("https://www.last.fm/music/{artist}")},
        "album": {"#text": album},
        "url": format!("https://www.last.fm/music/{artist}/_/{track}"),
        "image": [
            {"size": "small", "#text": format!("{track}-s.png")},
            {"size": "large", "#text": format!("{track}-l.png")}
        ],
    });
    if nowplaying {
        value["@attr"] = json!({"nowplaying": "true"});
    } else {
        value["date"] = json!({"uts": "1700000000", "#text": "14 Nov 2023, 22:13"});
    }
    value
}

/// A `user.getRecentTracks` payload.
pub fn recent_tracks(
    nowplaying: Option<Play>,
    plays: &[Play],
    page: u32,
    total_pages: u32,
) -> Value {
    let mut tracks: Vec<Value> = nowplaying.map(|p| track_json(p, true)).into_iter().collect();
    tracks.extend(plays.iter().map(|p| track_json(*p, false)));

    json!({
        "recenttracks": {
            "track": tracks,
            "@attr": {
                "user": "rj",
                "page": page.to_string(),
                "perPage": plays.len().to_string(),
                "totalPages": total_pages.to_string(),
                "total": "9999"
            }
        }
    })
}

/// A `user.getTopArtists` payload.
pub fn top_artists(artists: &[(&str, u64)]) -> Value {
    let artists: Vec<Value> = artists
        .iter()
        .map(|(name, playcount)| {
            json!({
                "name": name,
                "url": format!("https://www.last.fm/music/{name}"),
                "playcount": playcount.to_string(),
            })
        })
        .collect();
    json!({"topartists": {"artist": artists, "@attr": {"page": "1", "totalPages": "1"}}})
}
