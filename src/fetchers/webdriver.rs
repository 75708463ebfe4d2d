use crate::config::default_webdriver_fallbacks;
use crate::error::FetchError;
use crate::fetchers::Fetcher;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use tokio::sync::Mutex;

/// Fetches pages by rendering them in a WebDriver-controlled browser.
///
/// Sessions are created lazily when a fetch needs one and returned to an
/// idle pool afterwards, so at most one session exists per concurrent fetch.
pub struct WebDriverFetcher {
    webdriver_url: String,
    fallback_urls: Vec<String>,
    idle: Mutex<Vec<Client>>,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: &str) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            fallback_urls: default_webdriver_fallbacks(),
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Replace the endpoints tried when `webdriver_url` is unreachable
    pub fn with_fallbacks(mut self, fallback_urls: Vec<String>) -> Self {
        self.fallback_urls = fallback_urls;
        self
    }

    /// Takes an idle session or connects a new one
    async fn checkout(&self) -> Option<Client> {
        if let Some(client) = self.idle.lock().await.pop() {
            return Some(client);
        }
        connect_to_webdriver(&self.webdriver_url, &self.fallback_urls).await
    }

    async fn checkin(&self, client: Client) {
        self.idle.lock().await.push(client);
    }
}

#[async_trait]
impl Fetcher for WebDriverFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let client = self.checkout().await.ok_or_else(|| FetchError::Browser {
            url: url.to_string(),
            message: format!("no WebDriver session available at {}", self.webdriver_url),
        })?;

        let result = render(&client, url).await;
        match &result {
            Ok(_) => self.checkin(client).await,
            Err(e) => {
                // The session may be gone; do not hand it out again.
                ::log::warn!("Dropping WebDriver session after error: {}", e);
                if let Err(e) = client.close().await {
                    ::log::debug!("Failed to close WebDriver session: {}", e);
                }
            }
        }
        result
    }

    async fn shutdown(&self) {
        let clients: Vec<Client> = self.idle.lock().await.drain(..).collect();
        ::log::debug!("Closing {} WebDriver sessions", clients.len());
        for client in clients {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }
}

/// Navigates to `url` and returns the rendered page source
async fn render(client: &Client, url: &str) -> Result<String, FetchError> {
    client.goto(url).await.map_err(|e| browser_error(url, e))?;
    client.source().await.map_err(|e| browser_error(url, e))
}

fn browser_error(url: &str, error: fantoccini::error::CmdError) -> FetchError {
    FetchError::Browser {
        url: url.to_string(),
        message: error.to_string(),
    }
}

/// Connects to the WebDriver instance, falling back to common local ports
async fn connect_to_webdriver(webdriver_url: &str, fallback_urls: &[String]) -> Option<Client> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Some(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                webdriver_url,
                e
            );
        }
    }

    for url in fallback_urls {
        if url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Some(client);
        }
    }

    ::log::error!(
        "Failed to connect to any WebDriver server; make sure one is running or set `webdriver_url`"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;

    #[tokio::test]
    async fn test_unreachable_webdriver_is_browser_error() {
        // Bind and drop to get a local port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = WebDriverFetcher::new(&format!("http://{}", addr)).with_fallbacks(vec![]);
        let err = fetcher.fetch("https://example.com/").await.unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Browser);
        assert_eq!(err.url(), "https://example.com/");
        assert!(fetcher.idle.lock().await.is_empty());
        fetcher.shutdown().await;
    }

    #[test]
    fn test_default_fallbacks_cover_common_ports() {
        let fetcher = WebDriverFetcher::new("http://localhost:4444");
        assert!(fetcher
            .fallback_urls
            .iter()
            .any(|url| url == "http://localhost:9515"));
        assert!(WebDriverFetcher::new("http://localhost:4444")
            .with_fallbacks(vec![])
            .fallback_urls
            .is_empty());
    }
}
