use crate::auth::Credentials;
use crate::client::{create_http_client, Config};
use crate::context::CallContext;
use crate::error::{ApiError, OblioError, Result, TransportErrorKind};
use crate::query::to_query_pairs;
use crate::token::{InMemoryTokenStore, TokenStore, TokenStoreError};
use parking_lot::{Mutex, MutexGuard};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// How often a blocked call looks at its context for cancellation
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A request payload, with the optional capabilities the executor looks for.
///
/// Both methods have defaults, so a plain request type only needs
/// `impl Payload for MyRequest {}`.
pub trait Payload: Serialize {
    /// Checked before anything goes over the network
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Bearer token supplied by the caller for this request only.
    ///
    /// When present it is used verbatim, the token cache is not consulted and
    /// an unauthorized response is returned without re-authenticating.
    fn access_token(&self) -> Option<&str> {
        None
    }
}

impl Payload for () {}

impl Payload for serde_json::Value {}

/// Where the bearer token for a call came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenSource {
    Explicit,
    Cached,
}

/// Encoded request, reusable for the single unauthorized retry
struct PreparedRequest {
    method: Method,
    url: Url,
    body: Option<Vec<u8>>,
}

/// Client for the Oblio API.
///
/// Owns the credentials and the token store; share it between threads behind
/// an `Arc`. Minting a token is serialized per client, the calls themselves
/// are not.
pub struct OblioClient {
    client: Client,
    config: Config,
    pub(crate) credentials: Credentials,
    pub(crate) token_store: Arc<dyn TokenStore>,
    token_lock: Mutex<()>,
}

impl OblioClient {
    /// Create a new client with default configuration
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, Config::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(credentials: Credentials, config: Config) -> Result<Self> {
        Ok(OblioClient {
            client: create_http_client(&config)?,
            config,
            credentials,
            token_store: Arc::new(InMemoryTokenStore::new()),
            token_lock: Mutex::new(()),
        })
    }

    /// Replace the underlying HTTP client
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Replace the token store
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = store;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute an authenticated API call and decode the response into `R`.
    ///
    /// GET payloads are sent as query parameters, everything else as a JSON
    /// body. If the API answers 401 to a token taken from the cache, a new
    /// token is minted and the call is sent once more.
    pub fn execute<P, R>(
        &self,
        ctx: &CallContext,
        method: Method,
        path: &str,
        payload: &P,
    ) -> Result<R>
    where
        P: Payload + ?Sized,
        R: DeserializeOwned,
    {
        payload.validate()?;
        let request = self.prepare(method, path, payload)?;

        let (token, source) = match payload.access_token().filter(|t| !t.is_empty()) {
            Some(token) => (token.to_string(), TokenSource::Explicit),
            None => (self.resolve_token(ctx)?, TokenSource::Cached),
        };

        match self.exchange(ctx, &request, Some(&token)) {
            Err(err) if source == TokenSource::Cached && err.is_unauthorized() => {
                warn!(
                    path = %request.url.path(),
                    "unauthorized with cached token, re-authenticating"
                );
                let token = self.refresh_token(ctx)?;
                self.exchange(ctx, &request, Some(&token))
            }
            result => result,
        }
    }

    /// Execute a call that carries no bearer token
    pub(crate) fn execute_unauthenticated<P, R>(
        &self,
        ctx: &CallContext,
        method: Method,
        path: &str,
        payload: &P,
    ) -> Result<R>
    where
        P: Payload + ?Sized,
        R: DeserializeOwned,
    {
        payload.validate()?;
        let request = self.prepare(method, path, payload)?;
        self.exchange(ctx, &request, None)
    }

    /// Return the cached token, minting one if the cache has none
    fn resolve_token(&self, ctx: &CallContext) -> Result<String> {
        let _guard = self.lock_tokens(ctx)?;

        match self.token_store.get() {
            Ok(token) => Ok(token),
            Err(TokenStoreError::NotSet) => self.mint_token(ctx),
            Err(err) => {
                warn!(error = %err, "token store read failed, minting a new token");
                self.mint_token(ctx)
            }
        }
    }

    /// Mint a new token regardless of what the cache holds
    fn refresh_token(&self, ctx: &CallContext) -> Result<String> {
        let _guard = self.lock_tokens(ctx)?;
        self.mint_token(ctx)
    }

    /// Wait for the token-resolution lock, giving up as soon as the call
    /// is cancelled or runs out of time
    fn lock_tokens(&self, ctx: &CallContext) -> Result<MutexGuard<'_, ()>> {
        loop {
            ctx.check()?;
            if let Some(guard) = self.token_lock.try_lock_for(CANCEL_POLL_INTERVAL) {
                ctx.check()?;
                return Ok(guard);
            }
        }
    }

    /// Build the target URL and encode the payload
    fn prepare<P>(&self, method: Method, path: &str, payload: &P) -> Result<PreparedRequest>
    where
        P: Serialize + ?Sized,
    {
        let mut url = self.endpoint_url(path)?;
        let mut body = None;

        if method == Method::GET {
            let pairs = to_query_pairs(payload)?;
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        } else {
            let value = serde_json::to_value(payload)
                .map_err(|e| OblioError::RequestBuild(format!("encode body: {}", e)))?;
            if !value.is_null() {
                body = Some(
                    serde_json::to_vec(&value)
                        .map_err(|e| OblioError::RequestBuild(format!("encode body: {}", e)))?,
                );
            }
        }

        Ok(PreparedRequest { method, url, body })
    }

    /// Join `path` onto the configured API root
    fn endpoint_url(&self, path: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| {
                OblioError::RequestBuild(format!("invalid base URL: {}", self.config.base_url))
            })?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Send one HTTP exchange and decode its outcome
    fn exchange<R>(
        &self,
        ctx: &CallContext,
        request: &PreparedRequest,
        token: Option<&str>,
    ) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let remaining = ctx.remaining()?;

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .header(ACCEPT, "application/json");

        if let Some(timeout) = remaining {
            builder = builder.timeout(timeout);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let start = Instant::now();
        let (status, body) = send_cancellable(ctx, builder)?;

        debug!(
            method = %request.method,
            path = %request.url.path(),
            status = status.as_u16(),
            elapsed = ?start.elapsed(),
            "oblio request"
        );

        ctx.check()?;

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body).into());
        }

        serde_json::from_slice(&body).map_err(OblioError::Decode)
    }
}

/// Run one exchange on a worker thread and wait for it, polling `ctx`.
///
/// A cancelled or expired call returns at once; the abandoned worker ends on
/// its own when reqwest's timeout fires or the response arrives.
fn send_cancellable(
    ctx: &CallContext,
    builder: RequestBuilder,
) -> Result<(StatusCode, Vec<u8>)> {
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("oblio-exchange".to_string())
        .spawn(move || {
            let outcome = builder.send().and_then(|response| {
                let status = response.status();
                response.bytes().map(|body| (status, body.to_vec()))
            });
            // the caller may have stopped listening
            let _ = tx.send(outcome);
        })
        .map_err(|e| OblioError::RequestBuild(format!("spawn exchange worker: {}", e)))?;

    loop {
        match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
            Ok(outcome) => return outcome.map_err(OblioError::from),
            Err(RecvTimeoutError::Timeout) => ctx.check()?,
            Err(RecvTimeoutError::Disconnected) => {
                return Err(OblioError::Transport {
                    kind: TransportErrorKind::Other,
                    source: None,
                })
            }
        }
    }
}

impl std::fmt::Debug for OblioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OblioClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
