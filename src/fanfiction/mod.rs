//! Story and chapter records for fanfiction.net.
//!
//! Page-level story metadata comes from inline script variables and the
//! free-text "Rated:" line; chapter bodies come from the parsed DOM. Both
//! records are plain values built once from a page snapshot.

mod chapter;
pub mod metadata;
pub mod rating;

pub use chapter::ChapterBody;
pub use rating::{Descriptors, GENRES, Rating, RatingLine, Status, TERMINATOR_PREFIXES};

use crate::error::ScraperError;
use crate::fetch::{Fetcher, decode_body};
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use std::ops::RangeInclusive;

/// Site root used for every generated URL.
pub const BASE_URL: &str = "https://www.fanfiction.net";

/// Hosts that serve story pages.
const HOSTS: [&str; 3] = ["www.fanfiction.net", "fanfiction.net", "m.fanfiction.net"];

/// URL of a story's landing page.
pub fn story_url(story_id: u64) -> String {
    format!("{BASE_URL}/s/{story_id}")
}

/// URL of one chapter page.
pub fn chapter_url(story_id: u64, number: u32) -> String {
    format!("{BASE_URL}/s/{story_id}/{number}")
}

/// Extracts the story id from a `https://www.fanfiction.net/s/<id>/...` URL.
pub fn parse_story_id(url: &str) -> Result<u64, ScraperError> {
    let parsed = url::Url::parse(url).map_err(|e| ScraperError::InvalidUrl(format!("{url}: {e}")))?;

    let on_site = matches!(parsed.scheme(), "http" | "https")
        && parsed.host_str().is_some_and(|host| HOSTS.contains(&host));
    if !on_site {
        return Err(ScraperError::UnsupportedUrl(url.to_string()));
    }

    let mut segments = parsed.path_segments().into_iter().flatten();
    match (segments.next(), segments.next()) {
        (Some("s"), Some(id)) => id
            .parse()
            .map_err(|_| ScraperError::InvalidUrl(format!("{url}: story id {id:?} is not a number"))),
        _ => Err(ScraperError::UnsupportedUrl(url.to_string())),
    }
}

/// Checks if the URL points at a story on the site.
pub fn can_handle(url: &str) -> bool {
    parse_story_id(url).is_ok()
}

/// A story's landing-page metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    pub id: u64,
    pub number_chapters: u32,
    pub number_words: u64,
    pub author_id: u64,
    pub title: String,
    pub summary: String,
    pub category_id: u64,
    pub category: String,
    /// As written by the site, not parsed.
    pub date_published: String,
    /// As written by the site, not parsed.
    pub date_updated: String,
    pub author: String,
    pub rated: Rating,
    pub language: String,
    /// Empty when the story has no genre.
    pub genre: String,
    /// Empty when the story lists no characters.
    pub characters: String,
    pub reviews: u64,
    pub status: Status,
}

impl Story {
    /// Builds a story from a landing-page source.
    pub fn parse(source: &str) -> Result<Self, ScraperError> {
        let number_chapters = metadata::chapter_count(source)?;
        if number_chapters == 0 {
            return Err(ScraperError::ParseError {
                field: "chapters".to_string(),
                message: "story reports zero chapters".to_string(),
            });
        }

        let line = RatingLine::extract(source)?;

        Ok(Self {
            id: metadata::story_id(source)?,
            number_chapters,
            number_words: metadata::word_count(source)?,
            author_id: metadata::author_id(source)?,
            title: metadata::display_title(source)?,
            summary: metadata::summary(source)?,
            category_id: metadata::category_id(source)?,
            category: metadata::category(source)?,
            date_published: metadata::date_published(source)?,
            date_updated: metadata::date_updated(source)?,
            author: metadata::author(source)?,
            rated: line.rated,
            language: line.language,
            genre: line.descriptors.genre().to_string(),
            characters: line.descriptors.characters().to_string(),
            reviews: line.reviews,
            status: line.status,
        })
    }

    /// Fetches and parses a story landing page.
    pub async fn fetch<F: Fetcher + ?Sized>(fetcher: &F, url: &str) -> Result<Self, ScraperError> {
        let source = decode_body(&fetcher.fetch(url).await?);
        let story = Self::parse(&source)?;
        tracing::debug!(
            story_id = story.id,
            chapters = story.number_chapters,
            "parsed story"
        );
        Ok(story)
    }

    /// Streams every chapter, in order.
    ///
    /// Nothing is cached: each pulled item performs one fetch, and every
    /// call starts a fresh pass over the network.
    pub fn fetch_chapters<'a, F: Fetcher + ?Sized>(
        &'a self,
        fetcher: &'a F,
    ) -> impl Stream<Item = Result<Chapter, ScraperError>> + 'a {
        self.fetch_chapter_range(fetcher, 1..=self.number_chapters)
    }

    /// Streams the chapters in `range`, clamped to `1..=number_chapters`.
    pub fn fetch_chapter_range<'a, F: Fetcher + ?Sized>(
        &'a self,
        fetcher: &'a F,
        range: RangeInclusive<u32>,
    ) -> impl Stream<Item = Result<Chapter, ScraperError>> + 'a {
        let start = (*range.start()).max(1);
        let end = (*range.end()).min(self.number_chapters);
        let story_id = self.id;

        stream::iter(start..=end).then(move |number| Chapter::fetch(fetcher, story_id, number))
    }
}

/// One chapter of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub story_id: u64,
    /// 1-based.
    pub number: u32,
    /// Id the site uses for this chapter's text in review links.
    pub story_text_id: u64,
    /// Chapter title, or the story title when the page offers no chapter list.
    pub title: String,
    /// Normalized HTML of the chapter body.
    pub text: String,
}

impl Chapter {
    /// Builds a chapter from a chapter-page source.
    pub fn parse(source: &str) -> Result<Self, ScraperError> {
        let story_id = metadata::story_id(source)?;
        let number = metadata::chapter_number(source)?;
        let story_text_id = metadata::story_text_id(source)?;
        let ChapterBody { title, text } = ChapterBody::extract(source)?;

        Ok(Self {
            story_id,
            number,
            story_text_id,
            title,
            text,
        })
    }

    /// Fetches and parses chapter `number` of story `story_id`.
    pub async fn fetch<F: Fetcher + ?Sized>(
        fetcher: &F,
        story_id: u64,
        number: u32,
    ) -> Result<Self, ScraperError> {
        let url = chapter_url(story_id, number);
        let source = decode_body(&fetcher.fetch(&url).await?);
        let chapter = Self::parse(&source)?;

        if chapter.story_id != story_id {
            return Err(ScraperError::ChapterMismatch {
                expected: story_id,
                found: chapter.story_id,
            });
        }
        if chapter.number != number {
            tracing::warn!(
                story_id,
                requested = number,
                served = chapter.number,
                "site served a different chapter than requested"
            );
        }

        tracing::debug!(story_id, number = chapter.number, title = %chapter.title, "parsed chapter");
        Ok(chapter)
    }
}
