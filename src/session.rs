//! Two-step wizard state: collect a URL, then review and download.

use crate::models::ThumbnailPreview;
use crate::reel_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CollectUrl,
    Review,
}

/// Everything the wizard holds between user actions. All of it is ephemeral;
/// `reset` restores the initial state with no other side effects.
#[derive(Debug, Default)]
pub struct Session {
    step: Step,
    url: String,
    preview: Option<ThumbnailPreview>,
    loading: bool,
    error: Option<String>,
}

impl Default for Step {
    fn default() -> Self {
        Step::CollectUrl
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn preview(&self) -> Option<&ThumbnailPreview> {
        self.preview.as_ref()
    }

    pub fn shortcode(&self) -> Option<&str> {
        self.preview.as_ref().map(|p| p.shortcode.as_str())
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    /// The fetch action is available only for a well-formed reel URL and only
    /// while no request is in flight.
    pub fn can_fetch(&self) -> bool {
        !self.loading && reel_url::is_reel_url(&self.url)
    }

    /// Marks a request in flight, clearing any stale error. Duplicate
    /// submissions are gated on `loading` until `finish_request`.
    pub fn begin_request(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn finish_request(&mut self) {
        self.loading = false;
    }

    /// Fetch success: hold the preview and advance to the review step.
    pub fn apply_preview(&mut self, preview: ThumbnailPreview) {
        self.preview = Some(preview);
        self.step = Step::Review;
    }

    /// Records an inline error. Failures never change step; either step can
    /// show one.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
