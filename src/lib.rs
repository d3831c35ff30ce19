pub mod api;
pub mod cli;
pub mod content_disposition;
pub mod logging;
pub mod models;
pub mod reel_url;
pub mod session;
