use std::time::Duration;

use reqwest::header::{ACCEPT, REFERER};
use serde::Deserialize;

use crate::config::WikimediaConfig;

use super::fetch::{self, FetchError, RetryPolicy};
use super::url::{self as wiki_url, WikimediaImage};

/// Referer sent on image fetches, per Wikimedia's hotlink policy.
const IMAGE_REFERER: &str = "https://commons.wikimedia.org/";

/// Client for the Commons and Wikipedia MediaWiki APIs plus raw image
/// fetching. Shares one pooled HTTP client and one retry policy.
#[derive(Clone)]
pub struct CommonsClient {
    http: reqwest::Client,
    commons_api: String,
    wikipedia_api: String,
    policy: RetryPolicy,
    max_image_bytes: usize,
}

/// Attribution details for a file page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub file_name: String,
    pub file_page_url: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    pub license_url: Option<String>,
}

/// A successfully proxied image body.
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl CommonsClient {
    pub fn new(cfg: &WikimediaConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(cfg.timeout_secs);
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            commons_api: cfg.commons_api.clone(),
            wikipedia_api: cfg.wikipedia_api.clone(),
            policy: RetryPolicy {
                max_attempts: cfg.max_attempts.max(1),
                ..RetryPolicy::default()
            },
            max_image_bytes: cfg.max_image_bytes,
        })
    }

    /// Canonical original-asset URL for a classified reference.
    ///
    /// Direct upload URLs canonicalize locally; bare file names resolve
    /// through the Commons imageinfo API. `None` means the file is unknown
    /// upstream and the caller should treat the photo as absent.
    pub async fn canonical_url(
        &self,
        image: &WikimediaImage,
    ) -> Result<Option<String>, FetchError> {
        match image {
            WikimediaImage::Upload(url) => Ok(Some(wiki_url::canonical_upload_url(url))),
            WikimediaImage::File(name) => self.resolve_original_url(name).await,
        }
    }

    /// Resolve a bare file name to its original upload URL.
    pub async fn resolve_original_url(
        &self,
        file_name: &str,
    ) -> Result<Option<String>, FetchError> {
        let title = format!("File:{file_name}");
        let Some(response) = self
            .query(
                &self.commons_api,
                &[
                    ("prop", "imageinfo"),
                    ("iiprop", "url"),
                    ("redirects", "1"),
                    ("titles", &title),
                ],
            )
            .await?
        else {
            return Ok(None);
        };

        Ok(first_image_info(response).and_then(|info| info.url))
    }

    /// Attribution metadata (author, license) for a file.
    pub async fn file_metadata(
        &self,
        file_name: &str,
    ) -> Result<Option<FileMetadata>, FetchError> {
        let title = format!("File:{file_name}");
        let Some(response) = self
            .query(
                &self.commons_api,
                &[
                    ("prop", "imageinfo"),
                    ("iiprop", "url|extmetadata"),
                    ("redirects", "1"),
                    ("titles", &title),
                ],
            )
            .await?
        else {
            return Ok(None);
        };

        let Some(info) = first_image_info(response) else {
            return Ok(None);
        };

        let ext = info.extmetadata;
        Ok(Some(FileMetadata {
            file_name: file_name.to_string(),
            file_page_url: info.descriptionurl,
            author: ext.as_ref().and_then(|m| m.artist.as_ref()).map(|v| v.value.clone()),
            license: ext
                .as_ref()
                .and_then(|m| m.license_short_name.as_ref())
                .map(|v| v.value.clone()),
            license_url: ext
                .as_ref()
                .and_then(|m| m.license_url.as_ref())
                .map(|v| v.value.clone()),
        }))
    }

    /// Look up a page's lead image via the Wikipedia pageimages API.
    pub async fn page_image(&self, title: &str) -> Result<Option<String>, FetchError> {
        let Some(response) = self
            .query(
                &self.wikipedia_api,
                &[
                    ("prop", "pageimages"),
                    ("piprop", "original"),
                    ("redirects", "1"),
                    ("titles", title),
                ],
            )
            .await?
        else {
            return Ok(None);
        };

        Ok(response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .and_then(|p| p.original)
            .map(|o| o.source))
    }

    /// Discover a photo for a mountain name: the literal title first, then
    /// the parenthesized mountain disambiguator.
    pub async fn discover_photo(&self, name: &str) -> Result<Option<String>, FetchError> {
        if let Some(url) = self.page_image(name).await? {
            return Ok(Some(url));
        }
        self.page_image(&format!("{name} (山)")).await
    }

    /// Fetch image bytes under the timeout/retry/size policy, sending only
    /// the fixed identification headers.
    pub async fn fetch_image(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let resp = fetch::get_with_retry(&self.policy, || {
            self.http
                .get(url)
                .header(ACCEPT, "image/*")
                .header(REFERER, IMAGE_REFERER)
        })
        .await?;

        let content_type = fetch::content_type(&resp);
        let bytes = fetch::read_bounded(resp, self.max_image_bytes).await?;
        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }

    /// Run a MediaWiki `action=query` call and decode it in one step.
    ///
    /// A response that does not match the expected schema yields `None`
    /// ("no data") rather than an error; transport failures propagate.
    async fn query(
        &self,
        api: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<QueryResponse>, FetchError> {
        let resp = fetch::get_with_retry(&self.policy, || {
            self.http
                .get(api)
                .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
                .query(params)
        })
        .await?;

        let body = resp.bytes().await.map_err(FetchError::from)?;
        match serde_json::from_slice::<QueryResponse>(&body) {
            Ok(response) => Ok(Some(response)),
            Err(err) => {
                tracing::warn!(api, error = %err, "undecodable MediaWiki response");
                Ok(None)
            }
        }
    }
}

fn first_image_info(response: QueryResponse) -> Option<ImageInfo> {
    response
        .query?
        .pages
        .into_iter()
        .next()?
        .imageinfo?
        .into_iter()
        .next()
}

// MediaWiki `action=query` response (formatversion=2).

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    imageinfo: Option<Vec<ImageInfo>>,
    original: Option<OriginalImage>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    url: Option<String>,
    descriptionurl: Option<String>,
    extmetadata: Option<ExtMetadata>,
}

#[derive(Debug, Deserialize)]
struct ExtMetadata {
    #[serde(rename = "Artist")]
    artist: Option<MetadataValue>,
    #[serde(rename = "LicenseShortName")]
    license_short_name: Option<MetadataValue>,
    #[serde(rename = "LicenseUrl")]
    license_url: Option<MetadataValue>,
}

#[derive(Debug, Deserialize)]
struct MetadataValue {
    value: String,
}

#[derive(Debug, Deserialize)]
struct OriginalImage {
    source: String,
}
