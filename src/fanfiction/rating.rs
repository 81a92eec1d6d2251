//! Tokenizer for the free-text "Rated:" line of a story page.
//!
//! The line looks like
//! `Rated: Fiction  T - English - Romance/Drama - Harry P., Hermione G. - Reviews: 1,234 - Updated: ... - Complete`
//! once its markup is stripped. Rating and language always come first; genre
//! and characters are both optional and have no label, so they are told apart
//! by checking the third token against the closed genre set and the known
//! labelled prefixes.

use crate::error::ScraperError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Every genre label the site offers.
pub const GENRES: [&str; 21] = [
    "General",
    "Romance",
    "Humor",
    "Drama",
    "Poetry",
    "Adventure",
    "Mystery",
    "Horror",
    "Parody",
    "Angst",
    "Supernatural",
    "Suspense",
    "Sci-Fi",
    "Fantasy",
    "Spiritual",
    "Tragedy",
    "Western",
    "Crime",
    "Family",
    "Hurt/Comfort",
    "Friendship",
];

/// Labelled tokens that can follow rating and language. A token starting
/// with one of these is neither a genre nor a character list.
pub const TERMINATOR_PREFIXES: [&str; 5] = [
    "Reviews: ",
    "Updated: ",
    "Published: ",
    "Chapters: ",
    "Words: ",
];

const REVIEWS_PREFIX: &str = "Reviews: ";
const COMPLETE: &str = "Complete";

/// Rating, language and the genre-or-characters token.
const MIN_TOKENS: usize = 3;

static RATING_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Rated:(.+)").unwrap());
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());
static DELIMITER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+-\s+").unwrap());

/// Audience rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rating {
    K,
    #[serde(rename = "K+")]
    KPlus,
    T,
    M,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rating::K => "K",
            Rating::KPlus => "K+",
            Rating::T => "T",
            Rating::M => "M",
        })
    }
}

impl FromStr for Rating {
    type Err = ScraperError;

    /// Accepts a bare label or one carrying the site's `Fiction` prefix.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let label = token.split_whitespace().last().unwrap_or_default();
        match label {
            "K" => Ok(Rating::K),
            "K+" => Ok(Rating::KPlus),
            "T" => Ok(Rating::T),
            "M" => Ok(Rating::M),
            _ => Err(ScraperError::ParseError {
                field: "rating".to_string(),
                message: format!("unknown rating label {token:?}"),
            }),
        }
    }
}

/// Completion status. Stories without the `Complete` marker are ongoing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Status {
    Complete,
    #[default]
    #[serde(rename = "In-Progress")]
    InProgress,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Complete => "Complete",
            Status::InProgress => "In-Progress",
        })
    }
}

/// What the unlabelled tokens after the language turned out to hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptors {
    GenreAndCharacters { genre: String, characters: String },
    GenreOnly(String),
    CharactersOnly(String),
    Neither,
}

impl Descriptors {
    /// The genre, or `""` when the story has none.
    pub fn genre(&self) -> &str {
        match self {
            Descriptors::GenreAndCharacters { genre, .. } | Descriptors::GenreOnly(genre) => genre,
            Descriptors::CharactersOnly(_) | Descriptors::Neither => "",
        }
    }

    /// The character list, or `""` when the story has none.
    pub fn characters(&self) -> &str {
        match self {
            Descriptors::GenreAndCharacters { characters, .. }
            | Descriptors::CharactersOnly(characters) => characters,
            Descriptors::GenreOnly(_) | Descriptors::Neither => "",
        }
    }
}

/// Fields parsed out of the "Rated:" line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingLine {
    pub rated: Rating,
    pub language: String,
    pub descriptors: Descriptors,
    pub reviews: u64,
    pub status: Status,
}

impl RatingLine {
    /// Finds the "Rated:" line in a page source and parses it.
    pub fn extract(source: &str) -> Result<Self, ScraperError> {
        let raw = RATING_LINE
            .captures(source)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| ScraperError::MissingField("Rated: line".to_string()))?;

        Self::parse(&strip_tags(raw.as_str()))
    }

    /// Parses a tag-free rating line (the text after `Rated:`).
    pub fn parse(line: &str) -> Result<Self, ScraperError> {
        let tokens = tokenize(line);
        if tokens.len() < MIN_TOKENS {
            return Err(ScraperError::MalformedToken {
                line: line.trim().to_string(),
                expected: MIN_TOKENS,
                found: tokens.len(),
            });
        }

        Ok(Self {
            rated: tokens[0].parse::<Rating>()?,
            language: tokens[1].to_string(),
            descriptors: classify(&tokens[2..]),
            reviews: review_count(&tokens)?,
            status: status(&tokens),
        })
    }
}

/// Removes markup with a minimal non-greedy `<...>` match.
pub fn strip_tags(fragment: &str) -> String {
    HTML_TAG.replace_all(fragment, "").into_owned()
}

/// Splits on dashes standing between whitespace and trims every piece.
///
/// Hyphens inside a word (`Sci-Fi`, `Jean-Luc`) are not delimiters.
pub fn tokenize(line: &str) -> Vec<&str> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }
    DELIMITER.split(line).map(str::trim).collect()
}

/// True when `token` is one genre label or several joined by `/`.
pub fn is_genre(token: &str) -> bool {
    let mut rest = token;
    loop {
        let Some(tail) = GENRES
            .iter()
            .filter_map(|genre| rest.strip_prefix(*genre))
            .find(|tail| tail.is_empty() || tail.starts_with('/'))
        else {
            return false;
        };

        match tail.strip_prefix('/') {
            Some(next) => rest = next,
            None => return true,
        }
    }
}

fn is_terminator(token: &str) -> bool {
    token == COMPLETE
        || TERMINATOR_PREFIXES
            .iter()
            .any(|prefix| token.starts_with(prefix))
}

/// Classifies the tokens following rating and language.
///
/// Checked in order: a genre (optionally followed by characters), then a
/// labelled token (nothing present), then characters without a genre.
pub fn classify(tail: &[&str]) -> Descriptors {
    let Some(&first) = tail.first() else {
        return Descriptors::Neither;
    };

    if is_genre(first) {
        match tail.get(1) {
            Some(&next) if !is_terminator(next) => Descriptors::GenreAndCharacters {
                genre: first.to_string(),
                characters: next.to_string(),
            },
            _ => Descriptors::GenreOnly(first.to_string()),
        }
    } else if is_terminator(first) {
        Descriptors::Neither
    } else {
        Descriptors::CharactersOnly(first.to_string())
    }
}

/// Review count from the first `Reviews: ` token, 0 when there is none.
pub fn review_count(tokens: &[&str]) -> Result<u64, ScraperError> {
    let Some(token) = tokens.iter().find(|t| t.starts_with(REVIEWS_PREFIX)) else {
        return Ok(0);
    };

    let parse_error = || ScraperError::ParseError {
        field: "reviews".to_string(),
        message: format!("unreadable review token {token:?}"),
    };

    let count = token.split_whitespace().nth(1).ok_or_else(parse_error)?;
    count.replace(',', "").parse().map_err(|_| parse_error())
}

/// `Complete` when a token is exactly the completion marker.
pub fn status(tokens: &[&str]) -> Status {
    if tokens.contains(&COMPLETE) {
        Status::Complete
    } else {
        Status::InProgress
    }
}
