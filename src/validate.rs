use crate::error::Result;
use crate::results::{CandidatePair, ValidatedPair};
use reqwest::{ClientBuilder, StatusCode, redirect};
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Something that can tell whether a URL currently answers
pub trait ReachabilityCheck {
    /// Returns `true` only if `url` is reachable; never fails
    fn is_reachable(&self, url: &str) -> impl Future<Output = bool> + Send;
}

/// Parses `raw` as an absolute http(s) URL with a host
pub fn parse_http_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url),
        _ => None,
    }
}

/// Checks reachability with a single HEAD request per URL.
///
/// Only a `200 OK` counts. Redirects are not followed, and a timeout is
/// treated like any other network failure. There are no retries.
#[derive(Debug, Clone)]
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    /// Create a checker whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_builder(reqwest::Client::builder(), timeout)
    }

    /// Create a checker from a preconfigured client builder
    pub fn with_builder(builder: ClientBuilder, timeout: Duration) -> Result<Self> {
        let client = builder
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

impl ReachabilityCheck for HttpChecker {
    async fn is_reachable(&self, url: &str) -> bool {
        let Some(parsed) = parse_http_url(url) else {
            ::log::warn!("Not a valid http(s) URL: {}", url);
            return false;
        };

        match self.client.head(parsed).send().await {
            Ok(response) => {
                let status = response.status();
                ::log::debug!("HEAD {} -> {}", url, status);
                status == StatusCode::OK
            }
            Err(e) => {
                if e.is_timeout() {
                    ::log::debug!("HEAD {} timed out", url);
                } else {
                    ::log::debug!("HEAD {} failed: {}", url, e);
                }
                false
            }
        }
    }
}

/// Keeps the pairs whose both sides are reachable, in input order.
///
/// The two checks of a pair run concurrently; pairs are checked one after
/// another.
pub async fn validate_pairs<C>(checker: &C, pairs: Vec<CandidatePair>) -> Vec<ValidatedPair>
where
    C: ReachabilityCheck,
{
    let mut validated = Vec::with_capacity(pairs.len());

    for pair in pairs {
        let (before_ok, after_ok) = tokio::join!(
            checker.is_reachable(&pair.before),
            checker.is_reachable(&pair.after)
        );

        match (before_ok, after_ok) {
            (true, true) => {
                ::log::info!("Valid pair: {} -> {}", pair.before, pair.after);
                validated.push(ValidatedPair::from_candidate(pair));
            }
            (false, true) => {
                ::log::warn!("Dropping pair, Before URL unreachable: {}", pair.before);
            }
            (true, false) => {
                ::log::warn!("Dropping pair, After URL unreachable: {}", pair.after);
            }
            (false, false) => {
                ::log::warn!(
                    "Dropping pair, both URLs unreachable: {} / {}",
                    pair.before,
                    pair.after
                );
            }
        }
    }

    validated
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Fake checker answering from a fixed table; unknown URLs are unreachable
    #[derive(Default)]
    pub(crate) struct TableChecker {
        pub reachable: HashMap<String, bool>,
        pub in_flight: Arc<AtomicUsize>,
        pub max_in_flight: Arc<AtomicUsize>,
    }

    impl TableChecker {
        pub(crate) fn new(entries: &[(&str, bool)]) -> Self {
            Self {
                reachable: entries
                    .iter()
                    .map(|(url, ok)| (url.to_string(), *ok))
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl ReachabilityCheck for TableChecker {
        async fn is_reachable(&self, url: &str) -> bool {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.reachable.get(url).copied().unwrap_or(false)
        }
    }

    /// Serves canned statuses on 127.0.0.1 and returns the base URL
    pub(crate) async fn spawn_responder() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let request = String::from_utf8_lossy(&buf);
                    let path = request.split_whitespace().nth(1).unwrap_or("/");
                    let (status, extra) = match path {
                        "/ok" => ("200 OK", ""),
                        "/missing" => ("404 Not Found", ""),
                        "/error" => ("500 Internal Server Error", ""),
                        "/created" => ("201 Created", ""),
                        "/redirect" => ("301 Moved Permanently", "Location: /ok\r\n"),
                        "/slow" => {
                            tokio::time::sleep(Duration::from_secs(5)).await;
                            ("200 OK", "")
                        }
                        _ => ("404 Not Found", ""),
                    };

                    let response = format!(
                        "HTTP/1.1 {}\r\n{}Content-Length: 0\r\nConnection: close\r\n\r\n",
                        status, extra
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    pub(crate) fn local_checker(timeout: Duration) -> HttpChecker {
        HttpChecker::with_builder(reqwest::Client::builder().no_proxy(), timeout).unwrap()
    }

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://a.example/x").is_some());
        assert!(parse_http_url("http://localhost:8080/").is_some());
        assert!(parse_http_url("not a url").is_none());
        assert!(parse_http_url("/relative/path").is_none());
        assert!(parse_http_url("ftp://files.example/x").is_none());
        assert!(parse_http_url("mailto:someone@example.com").is_none());
        assert!(parse_http_url("").is_none());
    }

    #[tokio::test]
    async fn test_only_200_is_reachable() {
        let base = spawn_responder().await;
        let checker = local_checker(Duration::from_secs(5));

        assert!(checker.is_reachable(&format!("{}/ok", base)).await);
        assert!(!checker.is_reachable(&format!("{}/missing", base)).await);
        assert!(!checker.is_reachable(&format!("{}/error", base)).await);
        assert!(!checker.is_reachable(&format!("{}/created", base)).await);
        assert!(!checker.is_reachable(&format!("{}/redirect", base)).await);
    }

    #[tokio::test]
    async fn test_timeout_is_unreachable() {
        let base = spawn_responder().await;
        let checker = local_checker(Duration::from_millis(200));

        assert!(!checker.is_reachable(&format!("{}/slow", base)).await);
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let checker = local_checker(Duration::from_secs(2));
        assert!(!checker.is_reachable(&format!("http://{}/ok", addr)).await);
    }

    #[tokio::test]
    async fn test_malformed_url_is_unreachable() {
        let checker = local_checker(Duration::from_secs(2));
        assert!(!checker.is_reachable("not a url").await);
        assert!(!checker.is_reachable("ftp://files.example/x").await);
    }

    #[tokio::test]
    async fn test_validate_pairs_keeps_only_fully_reachable() {
        let checker = TableChecker::new(&[
            ("https://a.example/1", true),
            ("https://b.example/1", true),
            ("https://a.example/2", true),
            ("https://b.example/2", false),
            ("https://a.example/3", false),
            ("https://b.example/3", true),
            ("https://a.example/4", true),
            ("https://b.example/4", true),
        ]);

        let pairs = (1..=5)
            .map(|i| {
                CandidatePair::new(
                    format!("https://a.example/{}", i),
                    format!("https://b.example/{}", i),
                )
            })
            .collect();

        let validated = validate_pairs(&checker, pairs).await;
        let afters: Vec<&str> = validated.iter().map(|p| p.after()).collect();
        assert_eq!(afters, vec!["https://b.example/1", "https://b.example/4"]);
    }

    #[tokio::test]
    async fn test_validate_pairs_checks_sides_together_and_pairs_in_sequence() {
        let checker = TableChecker::new(&[
            ("https://a.example/1", true),
            ("https://b.example/1", true),
            ("https://a.example/2", true),
            ("https://b.example/2", true),
        ]);

        let pairs = vec![
            CandidatePair::new("https://a.example/1", "https://b.example/1"),
            CandidatePair::new("https://a.example/2", "https://b.example/2"),
        ];
        let validated = validate_pairs(&checker, pairs).await;

        assert_eq!(validated.len(), 2);
        assert_eq!(checker.max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_validate_pairs_empty() {
        let checker = TableChecker::default();
        assert!(validate_pairs(&checker, Vec::new()).await.is_empty());
    }

    #[tokio::test]
    async fn test_validate_pairs_over_http() {
        let base = spawn_responder().await;
        let checker = local_checker(Duration::from_secs(5));

        let pairs = vec![
            CandidatePair::new(format!("{}/ok", base), format!("{}/ok", base)),
            CandidatePair::new(format!("{}/ok", base), format!("{}/missing", base)),
        ];
        let validated = validate_pairs(&checker, pairs).await;

        assert_eq!(validated.len(), 1);
        assert_eq!(validated[0].after(), format!("{}/ok", base));
    }
}
