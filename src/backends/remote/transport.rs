//! HTTP plumbing for the OTE service

use crate::config::ClientConfig;
use crate::error::{OteError, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use tracing::debug;

/// Status and raw body of a finished request
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Shared HTTP client bound to one OTE service
#[derive(Debug)]
pub struct Transport {
    client: Client,
    base_url: String,
    prefix: String,
    debug: bool,
}

impl Transport {
    pub fn new(base_url: &str, config: &ClientConfig) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| OteError::config(format!("invalid service URL {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(OteError::config(format!(
                "service URL {base_url:?} must use http or https"
            )));
        }

        let settings = &config.settings;
        let client = Client::builder()
            .default_headers(build_headers(config)?)
            .connect_timeout(settings.connect_timeout()?)
            .read_timeout(settings.read_timeout()?)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            prefix: settings.prefix.clone(),
            debug: settings.debug,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Full URL of an API path such as `/filter/{id}`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.prefix, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    /// Send a request and read the whole body; only network failures are errors here
    pub async fn send(&self, request: RequestBuilder) -> Result<Reply> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        debug!("OTE service replied {} ({} bytes)", status, body.len());
        Ok(Reply { status, body })
    }

    /// Error for a non-2xx reply, with the raw body appended in debug mode
    pub fn failure(&self, message: impl Into<String>, reply: &Reply) -> OteError {
        OteError::transport(Some(reply.status.as_u16()), self.detail(message, reply))
    }

    /// Message for a failed call, with the raw body appended in debug mode
    pub fn detail(&self, message: impl Into<String>, reply: &Reply) -> String {
        let mut message = message.into();
        if self.debug {
            message.push_str(" content=");
            message.push_str(&String::from_utf8_lossy(&reply.body));
        }
        message
    }
}

fn build_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| OteError::config(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| OteError::config(format!("invalid header value for {name}: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
