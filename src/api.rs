use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::content_disposition::{filename_from_header, sanitize_file_name};
use crate::models::{BackendError, DownloadRequest, ThumbnailRequest, ThumbnailResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the operation; `message` is its own wording when
    /// the body carried one.
    #[error("{message}")]
    Backend { status: StatusCode, message: String },

    #[error("{0}")]
    BadThumbnail(String),

    #[error("failed to write video file: {0}")]
    Io(#[from] std::io::Error),
}

/// Client for the reel backend: one call to resolve a thumbnail, one to pull
/// the video. No retries; callers resubmit manually.
pub struct ReelApi {
    client: Client,
    base_url: String,
}

impl ReelApi {
    pub fn new(base_url: &str, timeout_secs: u64, proxy: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder().timeout(Duration::from_secs(timeout_secs));

        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /get-reel-thumbnail` with `{ url }`.
    pub async fn fetch_thumbnail(&self, url: &str) -> Result<ThumbnailResponse, ApiError> {
        tracing::debug!(%url, "requesting thumbnail");

        let response = self
            .client
            .post(self.endpoint("/get-reel-thumbnail"))
            .json(&ThumbnailRequest { url })
            .send()
            .await?;

        let response = check_status(response).await?;
        let resolved = response.json::<ThumbnailResponse>().await?;
        tracing::info!(shortcode = %resolved.shortcode, "thumbnail resolved");
        Ok(resolved)
    }

    /// `POST /download-reel` with `{ shortcode }`, streaming the video into
    /// `dest_dir`. Returns the path of the saved file.
    ///
    /// The file name comes from the Content-Disposition header when present,
    /// else `{shortcode}.mp4`. A JSON body in place of video bytes is the
    /// backend reporting a failure and is surfaced as such.
    pub async fn download_reel(&self, shortcode: &str, dest_dir: &Path) -> Result<PathBuf, ApiError> {
        tracing::debug!(%shortcode, "requesting video");

        let response = self
            .client
            .post(self.endpoint("/download-reel"))
            .json(&DownloadRequest { shortcode })
            .send()
            .await?;

        let mut response = check_status(response).await?;

        if is_json(&response) {
            let status = response.status();
            let body = response.text().await?;
            return Err(ApiError::Backend {
                status,
                message: backend_message(&body, status),
            });
        }

        let fallback = format!("{shortcode}.mp4");
        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_header)
            .map(|name| sanitize_file_name(&name, &fallback))
            .unwrap_or(fallback);

        let total_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let output_path = dest_dir.join(&file_name);
        let partial_path = dest_dir.join(format!("{file_name}.part"));

        let pb = progress_bar(&file_name, total_bytes);
        let mut file = fs::File::create(&partial_path)?;
        let mut downloaded = 0u64;

        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    abort_partial(&pb, &partial_path);
                    return Err(ApiError::Http(e));
                }
            };
            if let Err(e) = file.write_all(&chunk) {
                abort_partial(&pb, &partial_path);
                return Err(ApiError::Io(e));
            }
            downloaded += chunk.len() as u64;
            if total_bytes.is_some() {
                pb.set_position(downloaded);
            }
        }

        file.flush()?;
        drop(file);
        fs::rename(&partial_path, &output_path)?;
        pb.finish_with_message("Done");

        tracing::info!(path = %output_path.display(), bytes = downloaded, "video saved");
        Ok(output_path)
    }
}

/// A failed download must not leave a stray `.part` file behind.
fn abort_partial(pb: &ProgressBar, partial_path: &Path) {
    pb.abandon();
    let _ = fs::remove_file(partial_path);
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Backend {
        status,
        message: backend_message(&body, status),
    })
}

fn backend_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<BackendError>(body)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or_else(|| format!("server responded with {status}"))
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case("application/json")
        })
        .unwrap_or(false)
}

fn progress_bar(file_name: &str, total_bytes: Option<u64>) -> ProgressBar {
    let pb = match total_bytes {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg:30} {bar:40} {bytes}/{total_bytes} ({bytes_per_sec})")
                    .unwrap()
                    .progress_chars("=>-"),
            );
            pb
        }
        None => ProgressBar::new_spinner(),
    };
    pb.set_message(file_name.to_string());
    pb
}
