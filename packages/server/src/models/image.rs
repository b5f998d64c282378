use serde::{Deserialize, Serialize};

use crate::wikimedia::commons::FileMetadata;

/// Query for the image proxy endpoints: `u` is the base64url-encoded URL.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ImageQuery {
    /// base64url-encoded source URL.
    pub u: String,
}

/// Attribution metadata for a proxied Wikimedia image.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetaResponse {
    /// URL-decoded bare file name, without a `File:` prefix.
    #[schema(example = "Fuji.jpg")]
    pub file_name: String,
    /// Canonical file page describing the asset.
    pub file_page_url: Option<String>,
    /// Attributed author (may contain markup, as served by Commons).
    pub author: Option<String>,
    #[schema(example = "CC BY-SA 4.0")]
    pub license: Option<String>,
    pub license_url: Option<String>,
}

impl From<FileMetadata> for ImageMetaResponse {
    fn from(meta: FileMetadata) -> Self {
        Self {
            file_name: meta.file_name,
            file_page_url: meta.file_page_url,
            author: meta.author,
            license: meta.license,
            license_url: meta.license_url,
        }
    }
}
