use crate::browser::lazy_images;
use crate::error::{Error, Result};
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;

/// WebDriver endpoint used when none is configured
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Endpoints tried after the configured one
const FALLBACK_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444",
];

/// The configured endpoint followed by the fallbacks, without repeats
pub fn candidate_urls(webdriver_url: &str) -> Vec<&str> {
    let mut urls = vec![webdriver_url];
    urls.extend(FALLBACK_URLS.iter().copied().filter(|u| *u != webdriver_url));
    urls
}

/// Connects to the first WebDriver server that accepts a session
pub async fn connect_to_webdriver(webdriver_url: &str) -> Option<Client> {
    for (attempt, url) in candidate_urls(webdriver_url).into_iter().enumerate() {
        if attempt > 0 {
            ::log::info!("Trying fallback WebDriver URL: {}", url);
        }
        match ClientBuilder::native().connect(url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", url);
                return Some(client);
            }
            Err(e) if attempt == 0 => {
                ::log::error!("Failed to connect to WebDriver at {}: {}", url, e);
            }
            // Fallback failures are expected; keep the log quiet
            Err(_) => {}
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    None
}

/// What preparing a page did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareReport {
    /// Images whose lazy loading was overridden
    pub touched: usize,
    /// Whether every image finished loading before the wait ran out
    pub complete: bool,
}

/// Opens `page_url`, forces lazy images to load and waits for them.
///
/// The WebDriver session is closed before returning, also on failure.
pub async fn prepare_page(
    webdriver_url: &str,
    page_url: &str,
    wait: Duration,
) -> Result<PrepareReport> {
    let client = connect_to_webdriver(webdriver_url).await.ok_or_else(|| {
        Error::WebDriver(format!("no WebDriver server reachable at {}", webdriver_url))
    })?;

    let result = prepare_in_session(&client, page_url, wait).await;

    if let Err(e) = client.close().await {
        ::log::warn!("Failed to close WebDriver session: {}", e);
    }

    result
}

async fn prepare_in_session(
    client: &Client,
    page_url: &str,
    wait: Duration,
) -> Result<PrepareReport> {
    client
        .goto(page_url)
        .await
        .map_err(|e| Error::WebDriver(format!("failed to open {}: {}", page_url, e)))?;

    let touched = lazy_images::force_lazy_images(client)
        .await
        .map_err(|e| Error::WebDriver(e.to_string()))?;
    let complete = lazy_images::wait_for_images(client, wait)
        .await
        .map_err(|e| Error::WebDriver(e.to_string()))?;

    ::log::info!(
        "Prepared {}: {} lazy image(s) forced, all loaded: {}",
        page_url,
        touched,
        complete
    );
    Ok(PrepareReport { touched, complete })
}
