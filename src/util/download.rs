use crate::error::{OteError, Result};
use reqwest::Url;
use std::path::PathBuf;
use tracing::debug;

/// Where a resource URL points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Http(Url),
    File(PathBuf),
}

/// Classify a download URL: `http(s)://` goes over the network, `file://` URLs and
/// plain paths are read from disk
pub fn locate(url: &str) -> Result<Location> {
    match Url::parse(url) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" => Ok(Location::Http(parsed)),
            "file" => parsed
                .to_file_path()
                .map(Location::File)
                .map_err(|_| OteError::plugin(format!("invalid file URL {url:?}"))),
            // Windows drive letters parse as a one-letter scheme
            scheme if scheme.len() == 1 => Ok(Location::File(PathBuf::from(url))),
            scheme => Err(OteError::plugin(format!(
                "unsupported URL scheme {scheme:?} in {url:?}"
            ))),
        },
        Err(_) => Ok(Location::File(PathBuf::from(url))),
    }
}

/// Fetch the bytes behind a download URL
pub async fn download(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    match locate(url)? {
        Location::Http(url) => {
            debug!("Downloading {}", url);
            let response = client.get(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(OteError::transport(
                    Some(status.as_u16()),
                    format!("Cannot download {url}"),
                ));
            }
            Ok(response.bytes().await?.to_vec())
        }
        Location::File(path) => {
            debug!("Reading {:?}", path);
            Ok(tokio::fs::read(&path).await?)
        }
    }
}
