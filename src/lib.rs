//! ffscrape - fanfiction.net story downloader.
//!
//! This library provides functionality for:
//! - Parsing story metadata out of a story's landing page
//! - Parsing chapter titles and bodies out of chapter pages
//! - Fetching pages through an injectable [`Fetcher`]

pub mod config;
pub mod console;
pub mod error;
pub mod fanfiction;
pub mod fetch;

// Re-export commonly used types
pub use config::Config;
pub use console::Console;
pub use error::{ConfigError, ScraperError};
pub use fanfiction::{Chapter, Rating, Status, Story};
pub use fetch::{Fetcher, HttpFetcher};
