use crate::CrawlConfig;
use reqwest::blocking::Client;
use reqwest::header;
use thiserror::Error;
use url::Url;

/// A successfully fetched HTML page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Where the last redirect landed; relative links resolve against it.
    pub final_url: Url,
    pub status: u16,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("{url} is not HTML ({content_type})")]
    NotHtml { url: String, content_type: String },
    #[error("{url} is larger than {limit} bytes")]
    TooLarge { url: String, limit: usize },
}

/// Blocking page source used by the crawler's traversal thread.
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> Result<Page, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        (**self).fetch(url)
    }
}

/// HTTP(S) fetcher following at most `max_redirects` redirects.
pub struct HttpFetcher {
    client: Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, max_bytes: config.max_bytes })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        let transport = |source| FetchError::Transport { url: url.to_string(), source };
        let resp = self.client.get(url.clone()).send().map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }
        if let Some(ct) = resp.headers().get(header::CONTENT_TYPE) {
            let v = ct.to_str().unwrap_or_default().to_ascii_lowercase();
            if !v.starts_with("text/html") {
                return Err(FetchError::NotHtml { url: url.to_string(), content_type: v });
            }
        }
        let too_large = || FetchError::TooLarge { url: url.to_string(), limit: self.max_bytes };
        if resp.content_length().is_some_and(|n| n > self.max_bytes as u64) {
            return Err(too_large());
        }

        let final_url = resp.url().clone();
        let bytes = resp.bytes().map_err(transport)?;
        if bytes.len() > self.max_bytes {
            return Err(too_large());
        }
        Ok(Page { final_url, status: status.as_u16(), html: String::from_utf8_lossy(&bytes).into_owned() })
    }
}
