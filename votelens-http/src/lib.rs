//! Minimal HTTP client with safe logging, retries, and flexible auth.
//!
//! - Request options: headers, `Auth`, query params, timeout, retry policy
//! - Redacts sensitive query params and never logs secret values
//! - Retries network errors, 429 and 5xx under a bounded [`RetryPolicy`]
//!   with jitter and `Retry-After` support
//! - Optional *raw* request/response logging via `VOTELENS_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), votelens_http::HttpError> {
//! let client = votelens_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", votelens_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: `Auth::Bearer` values are sanitized before use, and logs only
//! ever include the auth kind (bearer/header/query/none), not the secret.

mod retry;

pub use retry::RetryPolicy;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "VOTELENS_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;
const RETRY_AFTER_CAP: Duration = Duration::from_secs(60);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        if let Ok(s) = std::str::from_utf8(bytes) {
            let s = truncate_chars(s, RAW_MAX_BODY);
            parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
        } else {
            parts.push(format!("--data-binary @- # ({} bytes)", bytes.len()));
        }
    }
    let (host_path, _) = redact_query(url);
    parts.push(format!("'{}://{}'", url.scheme(), host_path));
    parts.join(" ")
}

fn is_secret_header(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "authorization" | "x-api-key" | "x-subscription-token" | "cookie" | "set-cookie"
    )
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
    )
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if is_secret_header(&key) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

/// Return "host + path" and the redacted query list for logging.
fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| {
            let k = k.to_string();
            let v = if is_secret_param(&k) {
                "<redacted>".to_string()
            } else {
                v.to_string()
            };
            (k, v)
        })
        .collect();
    (host_path, redacted)
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status for `Api` errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use votelens_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// match bearer {
///     Auth::Bearer(value) => assert_eq!(value, "token"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    /// Custom header (e.g., Anthropic: x-api-key)
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    /// Auth via query param (e.g., SerpAPI: api_key)
    Query {
        name: &'a str,
        value: Cow<'a, str>,
    },
    None,
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use votelens_http::{Auth, RequestOpts, RetryPolicy};
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retry: Some(RetryPolicy::none()),
///     auth: Some(Auth::Query {
///         name: "api_key",
///         value: Cow::Borrowed("demo"),
///     }),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(!opts.allow_absolute);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retry: Option<RetryPolicy>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub retry: RetryPolicy,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use votelens_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.retry.max_retries, 2);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(&with_trailing_slash(base)).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Override the retry policy returned by [`HttpClient::new`].
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// GET JSON with per-request options (headers/query/auth/timeout/retries).
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json_internal::<(), T>(Method::GET, path, None, opts)
            .await
    }

    /// POST JSON with per-request options (headers/query/auth/timeout/retries).
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json_internal(Method::POST, path, Some(body), opts)
            .await
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    async fn request_json_internal<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path, opts.allow_absolute)?;
        let policy = opts.retry.unwrap_or(self.retry);
        let max_retries = policy.max_retries;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        // Query pairs, including query-param auth, are fixed across retries.
        let mut query: Vec<(&str, Cow<'_, str>)> = opts.query.clone().unwrap_or_default();
        if let Some(Auth::Query { name, value }) = &opts.auth {
            query.push((*name, value.clone()));
        }
        let bearer = match &opts.auth {
            Some(Auth::Bearer(tok)) => Some(sanitize_api_key(tok)?),
            _ => None,
        };
        let body_bytes = match body {
            Some(b) => Some(serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?),
            None => None,
        };

        let auth_kind = match &opts.auth {
            Some(Auth::Bearer(_)) => "bearer",
            Some(Auth::Header { .. }) => "header",
            Some(Auth::Query { .. }) => "query",
            Some(Auth::None) | None => "none",
        };
        let redacted_q: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| {
                let shown = if is_secret_param(k) {
                    "<redacted>".to_string()
                } else {
                    v.to_string()
                };
                ((*k).to_string(), shown)
            })
            .collect();
        let req_id = format!("r{}", uuid::Uuid::new_v4().simple());

        let mut attempt = 0usize;
        loop {
            // ----- Build request -----
            let mut rb = self
                .inner
                .request(method.clone(), url.clone())
                .timeout(timeout);
            if !query.is_empty() {
                let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_ref())).collect();
                rb = rb.query(&pairs);
            }
            if let Some(bytes) = &body_bytes {
                rb = rb
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(bytes.clone());
            }
            if let Some(hdrs) = &opts.headers {
                rb = rb.headers(hdrs.clone());
            }
            if let Some(tok) = &bearer {
                rb = rb.bearer_auth(tok);
            }
            if let Some(Auth::Header { name, value }) = &opts.auth {
                rb = rb.header(name, value);
            }

            tracing::debug!(
                req_id=%req_id,
                attempt=attempt + 1,
                max_retries,
                method=%method,
                host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                query=?redacted_q,
                timeout_ms=timeout.as_millis() as u64,
                auth_kind,
                has_body=%body_bytes.is_some(),
                "http.request.start"
            );

            if raw_enabled() {
                let merged = opts.headers.clone().unwrap_or_default();
                let curl = make_curl(&method, &url, &merged, body_bytes.as_deref());
                tracing::debug!(target: "http.raw", %req_id, %curl, "request");
            }

            // ----- Send -----
            let t0 = std::time::Instant::now();
            let resp = match rb.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = policy.delay(attempt);
                        tracing::warn!(
                            req_id=%req_id,
                            attempt,
                            max_retries,
                            backoff_ms=delay.as_millis() as u64,
                            message=%message,
                            "http.retrying.network_send"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(
                        req_id=%req_id,
                        attempt,
                        max_retries,
                        message=%message,
                        "http.network_error.send"
                    );
                    return Err(HttpError::Network(message));
                }
            };
            let status = resp.status();
            let headers = resp.headers().clone();
            let bytes = match resp.bytes().await {
                Ok(bytes) => bytes,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = policy.delay(attempt);
                        tracing::warn!(
                            req_id=%req_id,
                            attempt,
                            max_retries,
                            backoff_ms=delay.as_millis() as u64,
                            message=%message,
                            "http.retrying.network_body"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(
                        req_id=%req_id,
                        attempt,
                        max_retries,
                        message=%message,
                        "http.network_error.body"
                    );
                    return Err(HttpError::Network(message));
                }
            };
            let dur_ms = t0.elapsed().as_millis() as u64;

            let req_hdr_id = headers
                .get("x-request-id")
                .or_else(|| headers.get("request-id"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();

            tracing::debug!(
                req_id=%req_id,
                %status,
                duration_ms=dur_ms,
                body_len=bytes.len(),
                x_request_id=%req_hdr_id,
                "http.response.headers"
            );

            if raw_enabled() {
                let hdrs = redact_headers(&headers);
                let text = String::from_utf8_lossy(&bytes);
                let body = truncate_chars(&text, RAW_MAX_BODY);
                let truncated = matches!(body, Cow::Owned(_));
                tracing::info!(
                    target:"http.raw",
                    %req_id,
                    status=%status,
                    duration_ms=dur_ms,
                    headers=?hdrs,
                    body=%body,
                    truncated
                );
            }

            let snippet = snip_body(&bytes);
            tracing::trace!(
                req_id=%req_id,
                body_snippet=%snippet,
                "http.response.body_snippet"
            );

            // ----- Success path -----
            if status.is_success() {
                return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                    tracing::warn!(
                        req_id=%req_id,
                        serde_line=%e.line(),
                        serde_col=%e.column(),
                        serde_err=%e.to_string(),
                        body_snippet=%snippet,
                        "http.response.decode_error"
                    );
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            // ----- Non-success: maybe retry -----
            let message = extract_error_message(&bytes);
            let is_429 = status == StatusCode::TOO_MANY_REQUESTS;
            let is_5xx = status.is_server_error();

            if (is_429 || is_5xx) && attempt < max_retries {
                attempt += 1;
                let retry_after = retry_after_delay_secs(&headers);
                let delay = match retry_after {
                    Some(secs) => Duration::from_secs(secs).min(RETRY_AFTER_CAP),
                    None if is_429 => policy.delay(attempt).max(Duration::from_millis(1100)),
                    None => policy.delay(attempt),
                };
                tracing::warn!(
                    req_id=%req_id,
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms=delay.as_millis() as u64,
                    retry_after_secs=?retry_after,
                    message=%message,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                req_id=%req_id,
                %status,
                message=%message,
                x_request_id=%req_hdr_id,
                body_snippet=%snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id: req_hdr_id,
            });
        }
    }
}

// ==============================
// Helpers
// ==============================

fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

fn extract_error_message(body: &[u8]) -> String {
    // OpenAI / Anthropic style: {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct ProviderEnv {
        error: ProviderDetail,
    }
    #[derive(Deserialize)]
    struct ProviderDetail {
        message: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<ProviderEnv>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    snip_body(body)
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .trim()
        .parse()
        .ok()
}

/// Keep at most `max_chars` characters, marking the cut with `...`.
fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => Cow::Owned(format!("{}...", &s[..end])),
        None => Cow::Borrowed(s),
    }
}

fn snip_body(body: &[u8]) -> String {
    truncate_chars(&String::from_utf8_lossy(body), SNIPPET_MAX).into_owned()
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry(n: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries: n,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter: false,
        }
    }

    #[test]
    fn sanitizes_quoted_keys() {
        assert_eq!(sanitize_api_key(" 'sk-abc\n' ").unwrap(), "sk-abc");
        assert!(sanitize_api_key("sk-é").is_err());
    }

    #[test]
    fn provider_error_messages_are_extracted() {
        let body = br#"{"error":{"message":"bad key","type":"auth"}}"#;
        assert_eq!(extract_error_message(body), "bad key");
        assert_eq!(extract_error_message(br#"{"detail":"nope"}"#), "nope");
        assert_eq!(extract_error_message(b"plain text"), "plain text");
    }

    #[test]
    fn snippets_count_characters_not_bytes() {
        let fits = "é".repeat(SNIPPET_MAX);
        assert_eq!(snip_body(fits.as_bytes()), fits);

        let long = "é".repeat(SNIPPET_MAX + 10);
        let s = snip_body(long.as_bytes());
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), SNIPPET_MAX + 3);
        assert!(s.trim_end_matches("...").chars().all(|c| c == 'é'));
    }

    #[test]
    fn secrets_are_redacted_in_urls_and_headers() {
        let url = Url::parse("https://serpapi.com/search.json?q=vote&api_key=s3cret").unwrap();
        let (host_path, q) = redact_query(&url);
        assert_eq!(host_path, "serpapi.com/search.json");
        assert!(q.contains(&("api_key".to_string(), "<redacted>".to_string())));
        assert!(q.contains(&("q".to_string(), "vote".to_string())));

        let mut h = HeaderMap::new();
        h.insert("x-api-key", HeaderValue::from_static("ak-123"));
        assert_eq!(redact_headers(&h)[0].1, "<redacted>");
    }

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/echo"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/echo"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let client = HttpClient::new(&format!("{}/v1", server.uri()))
            .unwrap()
            .with_retry_policy(fast_retry(2));
        let opts = RequestOpts {
            auth: Some(Auth::Bearer("sk-test")),
            ..Default::default()
        };
        let got: Value = client
            .post_json_opts("echo", &json!({"ping": 1}), opts)
            .await
            .unwrap();
        assert_eq!(got, json!({"ok": true}));
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": {"message": "boom"}})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri())
            .unwrap()
            .with_retry_policy(fast_retry(2));
        let err = client
            .get_json::<Value>("items", RequestOpts::default())
            .await
            .unwrap_err();
        match err {
            HttpError::Api {
                status, message, ..
            } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("api_key", "s3cret"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid API key"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri())
            .unwrap()
            .with_retry_policy(fast_retry(3));
        let opts = RequestOpts {
            auth: Some(Auth::Query {
                name: "api_key",
                value: Cow::Borrowed("s3cret"),
            }),
            ..Default::default()
        };
        let err = client
            .get_json::<Value>("search.json", opts)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }
}
