use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Body of `POST /get-reel-thumbnail`.
#[derive(Debug, Serialize)]
pub struct ThumbnailRequest<'a> {
    pub url: &'a str,
}

/// Backend reply for a thumbnail request. `thumbnail_base64` carries the
/// preview image as a data URI and may be absent when resolution failed.
#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailResponse {
    pub shortcode: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub thumbnail_base64: String,
}

/// Body of `POST /download-reel`.
#[derive(Debug, Serialize)]
pub struct DownloadRequest<'a> {
    pub shortcode: &'a str,
}

/// JSON error shape the backend uses, both for non-2xx replies and for
/// failures smuggled inside a 2xx download response.
#[derive(Debug, Deserialize)]
pub struct BackendError {
    pub error: Option<String>,
}

/// A thumbnail response with its data URI decoded into raw image bytes.
#[derive(Debug, Clone)]
pub struct ThumbnailPreview {
    pub shortcode: String,
    pub source_url: String,
    pub thumbnail_url: String,
    pub image_bytes: Vec<u8>,
    pub image_ext: &'static str,
}

impl ThumbnailPreview {
    pub fn from_response(resp: ThumbnailResponse, source_url: &str) -> Result<Self, ApiError> {
        if resp.thumbnail_base64.is_empty() {
            return Err(ApiError::BadThumbnail(
                "thumbnail not found for this reel".to_string(),
            ));
        }
        let (image_bytes, image_ext) = decode_data_uri(&resp.thumbnail_base64)?;
        Ok(Self {
            shortcode: resp.shortcode,
            source_url: source_url.to_string(),
            thumbnail_url: resp.thumbnail_url,
            image_bytes,
            image_ext,
        })
    }
}

/// Decodes a `data:<mime>;base64,<payload>` URI. A bare base64 string without
/// the `data:` prefix is accepted and treated as JPEG.
fn decode_data_uri(value: &str) -> Result<(Vec<u8>, &'static str), ApiError> {
    let (mime, payload) = match value.strip_prefix("data:") {
        Some(rest) => rest.split_once(";base64,").ok_or_else(|| {
            ApiError::BadThumbnail("thumbnail data URI is not base64-encoded".to_string())
        })?,
        None => ("image/jpeg", value),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ApiError::BadThumbnail(format!("undecodable thumbnail payload: {e}")))?;

    let ext = match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "img",
    };

    Ok((bytes, ext))
}
